// GitHub API HTTP client.
// Handles authentication, rate limiting, and request/response processing.

use std::sync::Mutex;

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT},
};
use url::Url;

use crate::config::{DEFAULT_API_BASE, RemoteTarget};
use crate::error::{ContentError, Result};

use super::types::{ApiErrorBody, RateLimit};

const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub contents API client bound to one repository and branch.
pub struct GitHubClient {
    client: Client,
    api_base: Url,
    target: RemoteTarget,
    rate_limit: Mutex<RateLimit>,
}

impl GitHubClient {
    /// Create a client against api.github.com. Reads work without a token.
    pub fn new(target: RemoteTarget, token: Option<&str>) -> Result<Self> {
        Self::with_base_url(DEFAULT_API_BASE, target, token)
    }

    /// Create a client against a custom API base URL.
    pub fn with_base_url(api_base: &str, target: RemoteTarget, token: Option<&str>) -> Result<Self> {
        let api_base = Url::parse(api_base)
            .map_err(|e| ContentError::Other(format!("invalid API base {}: {}", api_base, e)))?;

        let mut headers = HeaderMap::new();

        if let Some(token) = token.filter(|t| !t.is_empty()) {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| ContentError::Other(e.to_string()))?,
            );
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("sitecontent"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ContentError::Http)?;

        Ok(Self {
            client,
            api_base,
            target,
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Repository and branch this client reads from and writes to.
    pub fn target(&self) -> &RemoteTarget {
        &self.target
    }

    /// Get the current rate limit information.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// URL of the contents resource for a repository path.
    pub(crate) fn contents_url(&self, path: &str) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| ContentError::Other(format!("API base {} cannot hold paths", self.api_base)))?
            .pop_if_empty()
            .extend([
                "repos",
                self.target.owner.as_str(),
                self.target.repo.as_str(),
                "contents",
            ])
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &self,
        url: Url,
        params: &T,
    ) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(ContentError::Http)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Make a PUT request with a JSON body.
    pub async fn put_json<T: serde::Serialize + ?Sized>(&self, url: Url, body: &T) -> Result<Response> {
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(ContentError::Http)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let header = |name: &str| -> Option<u64> {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        };

        let Ok(mut rate_limit) = self.rate_limit.lock() else {
            return;
        };
        if let Some(limit) = header("x-ratelimit-limit") {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            rate_limit.remaining = remaining;
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let exhausted = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            == Some("0");

        match status {
            StatusCode::UNAUTHORIZED => Err(ContentError::Unauthorized),
            StatusCode::NOT_FOUND => Err(ContentError::NotFound(response.url().path().to_string())),
            StatusCode::CONFLICT => {
                let path = response.url().path().to_string();
                let detail = error_detail(response).await;
                Err(ContentError::Conflict { path, detail })
            }
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS if exhausted => {
                let reset = self.rate_limit().reset;
                let reset_at = chrono::DateTime::from_timestamp(reset as i64, 0)
                    .map(|dt| dt.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                Err(ContentError::RateLimited { reset_at })
            }
            status => Err(ContentError::Status {
                status: status.as_u16(),
                detail: error_detail(response).await,
            }),
        }
    }
}

/// Server-provided error text: the `message` field when present, else the raw body.
async fn error_detail(response: Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<ApiErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text)
}
