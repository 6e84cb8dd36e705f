// GitHub contents API endpoint functions.
// Typed get/put of a single repository file on the client's branch.

use crate::error::Result;

use super::client::GitHubClient;
use super::types::{ContentFile, PutContentsRequest, PutContentsResponse};

impl GitHubClient {
    /// Get a file from the configured branch. A missing file is `Ok(None)`.
    ///
    /// With `bypass_cache`, a timestamp parameter is added so intermediary
    /// HTTP caches cannot answer with a stale copy.
    pub async fn get_contents(&self, path: &str, bypass_cache: bool) -> Result<Option<ContentFile>> {
        let url = self.contents_url(path)?;
        let mut params = vec![("ref", self.target().branch.clone())];
        if bypass_cache {
            params.push(("t", chrono::Utc::now().timestamp_millis().to_string()));
        }

        match self.get_with_params(url, &params).await {
            Ok(response) => {
                let file: ContentFile = response.json().await?;
                Ok(Some(file))
            }
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Create or update a file.
    pub async fn put_contents(
        &self,
        path: &str,
        request: &PutContentsRequest,
    ) -> Result<PutContentsResponse> {
        let url = self.contents_url(path)?;
        let response = self.put_json(url, request).await?;
        let written: PutContentsResponse = response.json().await?;
        Ok(written)
    }
}
