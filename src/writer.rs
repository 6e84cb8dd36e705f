// Remote content writer.
// Create-or-update of repository files with revision lookup and conflict retry.

use std::sync::Arc;

use crate::codec;
use crate::config::{AssetUrlStrategy, RemoteTarget, RepositoryConfig};
use crate::error::Result;
use crate::github::{ContentStore, GitHubClient, PutContentsRequest, PutContentsResponse};
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};

const UPLOAD_ROOT: &str = "public/content/uploads";
const RAW_CONTENT_BASE: &str = "https://raw.githubusercontent.com";

/// Upload folder for images attached to records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadDir {
    News,
    Promos,
}

impl UploadDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadDir::News => "news",
            UploadDir::Promos => "promos",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "news" => Some(UploadDir::News),
            "promos" | "promotions" => Some(UploadDir::Promos),
            _ => None,
        }
    }
}

/// Persists content files to the remote repository.
pub struct ContentWriter {
    store: Arc<dyn ContentStore>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl ContentWriter {
    pub fn new(store: Arc<dyn ContentStore>, policy: RetryPolicy) -> Self {
        Self::with_sleeper(store, policy, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(store: Arc<dyn ContentStore>, policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            store,
            policy,
            sleeper,
        }
    }

    /// Writer authenticated with the session's repository configuration.
    pub fn for_repository(config: &RepositoryConfig, api_base: &str, policy: RetryPolicy) -> Result<Self> {
        let client = GitHubClient::with_base_url(api_base, config.target.clone(), Some(&config.token))?;
        Ok(Self::new(Arc::new(client), policy))
    }

    pub fn target(&self) -> &RemoteTarget {
        self.store.target()
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Create or update a text file using the configured retry policy.
    pub async fn upsert(&self, path: &str, content: &str, message: &str) -> Result<PutContentsResponse> {
        self.upsert_bytes_with(path, content.as_bytes(), message, self.policy)
            .await
    }

    /// Create or update a text file with an explicit attempt budget.
    pub async fn upsert_with_attempts(
        &self,
        path: &str,
        content: &str,
        message: &str,
        max_attempts: u32,
    ) -> Result<PutContentsResponse> {
        let policy = RetryPolicy::new(max_attempts, self.policy.base_delay);
        self.upsert_bytes_with(path, content.as_bytes(), message, policy)
            .await
    }

    /// Create or update a binary file.
    pub async fn upsert_bytes(&self, path: &str, bytes: &[u8], message: &str) -> Result<PutContentsResponse> {
        self.upsert_bytes_with(path, bytes, message, self.policy).await
    }

    async fn upsert_bytes_with(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
        policy: RetryPolicy,
    ) -> Result<PutContentsResponse> {
        let encoded = codec::encode_bytes(bytes);

        let written = policy
            .run(self.sleeper.as_ref(), |attempt| {
                let encoded = encoded.clone();
                async move {
                    // The revision token goes stale after a conflict, so re-read every attempt.
                    let current = self.store.get_file(path, true).await?;
                    let request = PutContentsRequest {
                        message: message.to_string(),
                        content: encoded,
                        branch: self.store.target().branch.clone(),
                        sha: current.map(|file| file.sha),
                    };
                    tracing::debug!(
                        path,
                        attempt,
                        update = request.sha.is_some(),
                        "Writing content"
                    );
                    self.store.put_file(path, &request).await
                }
            })
            .await?;

        tracing::info!(
            path,
            sha = written.sha().unwrap_or("unknown"),
            commit = %written.commit.sha,
            "Content saved to GitHub"
        );
        Ok(written)
    }

    /// Upload an image and return the URL the site should reference.
    pub async fn upload_asset(
        &self,
        bytes: &[u8],
        file_name: &str,
        dir: UploadDir,
        strategy: AssetUrlStrategy,
    ) -> Result<String> {
        let millis = chrono::Utc::now().timestamp_millis();
        let path = asset_path(file_name, dir, millis);
        let message = format!("chore(content): upload image {}", file_name);

        self.upsert_bytes(&path, bytes, &message).await?;
        Ok(asset_url(self.target(), &path, strategy))
    }
}

/// Repository path for an uploaded file.
pub fn asset_path(file_name: &str, dir: UploadDir, millis: i64) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .unwrap_or("bin");

    let mut safe: String = file_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(32)
        .collect();
    if safe.is_empty() {
        safe = "file".to_string();
    }

    format!("{}/{}/{}-{}.{}", UPLOAD_ROOT, dir.as_str(), millis, safe, ext)
}

/// Public URL of an uploaded file.
pub fn asset_url(target: &RemoteTarget, path: &str, strategy: AssetUrlStrategy) -> String {
    match strategy {
        AssetUrlStrategy::SiteRelative => {
            format!("/{}", path.strip_prefix("public/").unwrap_or(path))
        }
        AssetUrlStrategy::RawRemote => format!(
            "{}/{}/{}/{}/{}",
            RAW_CONTENT_BASE, target.owner, target.repo, target.branch, path
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::error::ContentError;
    use crate::github::store::fake::MemoryStore;
    use crate::retry::RecordingSleeper;

    const PATH: &str = "public/content/news.json";

    fn conflict() -> ContentError {
        ContentError::Conflict {
            path: PATH.to_string(),
            detail: "does not match".to_string(),
        }
    }

    fn writer(store: &Arc<MemoryStore>) -> (ContentWriter, RecordingSleeper) {
        let sleeper = RecordingSleeper::new();
        let writer = ContentWriter::with_sleeper(
            store.clone(),
            RetryPolicy::new(3, Duration::from_millis(250)),
            Arc::new(sleeper.clone()),
        );
        (writer, sleeper)
    }

    #[tokio::test]
    async fn test_create_sends_no_revision_token() {
        let store = Arc::new(MemoryStore::new());
        let (writer, _) = writer(&store);

        let written = writer.upsert(PATH, "[]\n", "chore(content): update news").await.unwrap();

        let puts = store.puts();
        assert_eq!(puts.len(), 1);
        assert!(puts[0].1.sha.is_none());
        assert_eq!(puts[0].1.branch, "main");
        assert_eq!(written.sha(), store.sha_of(PATH).as_deref());
        assert_eq!(store.text_of(PATH).as_deref(), Some("[]\n"));
    }

    #[tokio::test]
    async fn test_update_sends_current_revision_token() {
        let store = Arc::new(MemoryStore::new());
        store.insert_text(PATH, "[]");
        let current = store.sha_of(PATH);
        let (writer, _) = writer(&store);

        writer.upsert(PATH, r#"[{"id": "a"}]"#, "update").await.unwrap();

        assert_eq!(store.puts()[0].1.sha, current);
        assert_ne!(store.sha_of(PATH), current);
    }

    #[tokio::test]
    async fn test_conflicts_then_success() {
        let store = Arc::new(MemoryStore::new());
        store.insert_text(PATH, "[]");
        store.fail_next_put(conflict());
        store.fail_next_put(conflict());
        let (writer, sleeper) = writer(&store);

        writer.upsert(PATH, "[1]", "update").await.unwrap();

        assert_eq!(store.gets().len(), 3);
        assert_eq!(store.puts().len(), 3);
        let delays = sleeper.delays();
        assert_eq!(delays.len(), 2);
        assert!(delays[0] < delays[1]);
        assert_eq!(store.text_of(PATH).as_deref(), Some("[1]"));
    }

    #[tokio::test]
    async fn test_conflict_every_attempt_surfaces_last_error() {
        let store = Arc::new(MemoryStore::new());
        for _ in 0..3 {
            store.fail_next_put(conflict());
        }
        let (writer, _) = writer(&store);

        let err = writer.upsert(PATH, "[1]", "update").await.unwrap_err();

        assert!(matches!(err, ContentError::Conflict { .. }));
        assert_eq!(store.puts().len(), 3);
        assert!(store.text_of(PATH).is_none());
    }

    #[tokio::test]
    async fn test_explicit_attempt_budget() {
        let store = Arc::new(MemoryStore::new());
        store.fail_next_put(conflict());
        let (writer, _) = writer(&store);

        let err = writer
            .upsert_with_attempts(PATH, "[1]", "update", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Conflict { .. }));
        assert_eq!(store.puts().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_not_retried() {
        let store = Arc::new(MemoryStore::new());
        store.fail_next_put(ContentError::Status {
            status: 422,
            detail: "Invalid request".to_string(),
        });
        let (writer, sleeper) = writer(&store);

        let err = writer.upsert(PATH, "[]", "update").await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 422: Invalid request");
        assert_eq!(store.puts().len(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_upsert_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let (writer, _) = writer(&store);
        let body = serde_json::to_string_pretty(&json!([{"id": "a"}])).unwrap();

        let first = writer.upsert(PATH, &body, "update").await.unwrap();
        let second = writer.upsert(PATH, &body, "update").await.unwrap();

        assert_ne!(first.sha(), second.sha());
        assert_eq!(store.text_of(PATH), Some(body));
    }

    #[tokio::test]
    async fn test_upload_asset_site_relative() {
        let store = Arc::new(MemoryStore::new());
        let (writer, _) = writer(&store);

        let url = writer
            .upload_asset(
                &[0x89, 0x50, 0x4e, 0x47],
                "Prodejna.png",
                UploadDir::News,
                AssetUrlStrategy::SiteRelative,
            )
            .await
            .unwrap();

        assert!(url.starts_with("/content/uploads/news/"));
        assert!(url.ends_with("-Prodejnapng.png"));
        let puts = store.puts();
        assert_eq!(puts[0].1.message, "chore(content): upload image Prodejna.png");
        assert_eq!(puts[0].1.content, codec::encode_bytes(&[0x89, 0x50, 0x4e, 0x47]));
    }

    #[test]
    fn test_asset_path() {
        assert_eq!(
            asset_path("Sekačka STIGA.jpg", UploadDir::Promos, 1700000000000),
            "public/content/uploads/promos/1700000000000-SekakaSTIGAjpg.jpg"
        );
        assert_eq!(
            asset_path("čč", UploadDir::News, 1),
            "public/content/uploads/news/1-file.bin"
        );
        assert_eq!(
            asset_path("photo", UploadDir::News, 1),
            "public/content/uploads/news/1-photo.bin"
        );
        let long = format!("{}.webp", "a".repeat(40));
        assert_eq!(
            asset_path(&long, UploadDir::News, 1),
            format!("public/content/uploads/news/1-{}.webp", "a".repeat(32))
        );
    }

    #[test]
    fn test_asset_url_strategies() {
        let target = RemoteTarget::new("acme", "site", "main");
        let path = "public/content/uploads/news/1-a.png";
        assert_eq!(
            asset_url(&target, path, AssetUrlStrategy::SiteRelative),
            "/content/uploads/news/1-a.png"
        );
        assert_eq!(
            asset_url(&target, path, AssetUrlStrategy::RawRemote),
            "https://raw.githubusercontent.com/acme/site/main/public/content/uploads/news/1-a.png"
        );
    }

    #[test]
    fn test_upload_dir_parse() {
        assert_eq!(UploadDir::parse("promotions"), Some(UploadDir::Promos));
        assert_eq!(UploadDir::parse("gallery"), None);
    }
}
