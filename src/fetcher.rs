// Content fetcher.
// Resolves content to JSON: fresh cache entry, then the remote repository, then the bundled local copy.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::cache::{CacheInfo, ContentCache, cache_key};
use crate::codec;
use crate::github::ContentStore;

/// Where the bundled fallback copies of the content files are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalSource {
    /// Static site root on disk; `/content/news.json` resolves beneath it.
    Directory(PathBuf),
    /// Origin serving the static site.
    Http(Url),
}

/// Loads content for the public site and the admin panel.
///
/// `load` never fails: every error degrades to the local copy or `None`.
pub struct ContentFetcher {
    store: Arc<dyn ContentStore>,
    cache: Arc<ContentCache>,
    local: Option<LocalSource>,
    http: reqwest::Client,
}

impl ContentFetcher {
    pub fn new(store: Arc<dyn ContentStore>, cache: Arc<ContentCache>, local: Option<LocalSource>) -> Self {
        Self {
            store,
            cache,
            local,
            http: reqwest::Client::new(),
        }
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    /// Load a content file, preferring the remote copy.
    pub async fn load(&self, local_path: &str, remote_path: &str, force_refresh: bool) -> Option<Value> {
        if let Some(data) = self.load_remote(remote_path, force_refresh).await {
            return Some(data);
        }
        self.load_local(local_path).await
    }

    /// Same as `load`, ignoring any fresh cache entry.
    pub async fn load_forced(&self, local_path: &str, remote_path: &str) -> Option<Value> {
        self.load(local_path, remote_path, true).await
    }

    /// Drop the cache entry for one remote path.
    pub async fn invalidate(&self, remote_path: &str) {
        let key = self.key(remote_path);
        if self.cache.invalidate(&key).await {
            tracing::debug!(path = remote_path, "Cache cleared");
        }
    }

    /// Drop every cache entry.
    pub async fn invalidate_all(&self) {
        self.cache.clear().await;
        tracing::debug!("All cache cleared");
    }

    /// Age and remaining freshness of the cache entry for a remote path.
    pub async fn cache_info(&self, remote_path: &str) -> Option<CacheInfo> {
        self.cache.info(&self.key(remote_path)).await
    }

    fn key(&self, remote_path: &str) -> String {
        cache_key(self.store.target(), remote_path)
    }

    async fn load_remote(&self, remote_path: &str, force_refresh: bool) -> Option<Value> {
        let key = self.key(remote_path);

        if !force_refresh {
            if let Some(data) = self.cache.get_fresh(&key).await {
                tracing::debug!(source = "cache", path = remote_path, "Data loaded");
                return Some(data);
            }
        }

        let file = match self.store.get_file(remote_path, force_refresh).await {
            Ok(Some(file)) => file,
            Ok(None) => {
                tracing::debug!(path = remote_path, "Remote file not found");
                return None;
            }
            Err(err) => {
                tracing::warn!(path = remote_path, "Failed to load from GitHub: {}", err);
                return None;
            }
        };

        let Some(content) = file.content.as_deref() else {
            tracing::warn!(path = remote_path, "Remote file has no inline content");
            return None;
        };

        match codec::decode_json(content) {
            Ok(data) => {
                self.cache.insert(&key, data.clone()).await;
                tracing::debug!(source = "github", path = remote_path, "Data loaded");
                Some(data)
            }
            Err(err) => {
                tracing::warn!(path = remote_path, "Failed to decode remote content: {}", err);
                None
            }
        }
    }

    /// Read only the bundled local copy.
    pub(crate) async fn load_local(&self, local_path: &str) -> Option<Value> {
        let data = match self.local.as_ref()? {
            LocalSource::Directory(root) => read_local_file(root, local_path).await,
            LocalSource::Http(base) => self.read_local_url(base, local_path).await,
        };
        if data.is_some() {
            tracing::debug!(source = "local", path = local_path, "Data loaded");
        }
        data
    }

    async fn read_local_url(&self, base: &Url, local_path: &str) -> Option<Value> {
        let url = match base.join(local_path) {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!(path = local_path, "Invalid local URL: {}", err);
                return None;
            }
        };

        let response = match self.http.get(url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(_) => return None,
            Err(err) => {
                tracing::warn!(path = local_path, "Failed to load local file: {}", err);
                return None;
            }
        };

        match response.json::<Value>().await {
            Ok(data) => Some(data),
            Err(err) => {
                tracing::warn!(path = local_path, "Failed to parse local file: {}", err);
                None
            }
        }
    }
}

async fn read_local_file(root: &std::path::Path, local_path: &str) -> Option<Value> {
    let path = root.join(local_path.trim_start_matches('/'));
    let contents = match tokio::fs::read_to_string(&path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
        Err(err) => {
            tracing::warn!(path = %path.display(), "Failed to load local file: {}", err);
            return None;
        }
    };

    match serde_json::from_str(&contents) {
        Ok(data) => Some(data),
        Err(err) => {
            tracing::warn!(path = %path.display(), "Failed to parse local file: {}", err);
            None
        }
    }
}
