// Remote content store abstraction.
// The fetcher and writer talk to this trait; GitHubClient is the production implementation.

use async_trait::async_trait;

use crate::config::RemoteTarget;
use crate::error::Result;

use super::client::GitHubClient;
use super::types::{ContentFile, PutContentsRequest, PutContentsResponse};

/// A repository-backed file store addressed by path.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Repository and branch the store points at.
    fn target(&self) -> &RemoteTarget;

    /// Read a file; `Ok(None)` when it does not exist.
    async fn get_file(&self, path: &str, bypass_cache: bool) -> Result<Option<ContentFile>>;

    /// Create or update a file.
    async fn put_file(&self, path: &str, request: &PutContentsRequest) -> Result<PutContentsResponse>;
}

#[async_trait]
impl ContentStore for GitHubClient {
    fn target(&self) -> &RemoteTarget {
        GitHubClient::target(self)
    }

    async fn get_file(&self, path: &str, bypass_cache: bool) -> Result<Option<ContentFile>> {
        self.get_contents(path, bypass_cache).await
    }

    async fn put_file(&self, path: &str, request: &PutContentsRequest) -> Result<PutContentsResponse> {
        self.put_contents(path, request).await
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory store with scripted failures, used by fetcher and writer tests.

    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use super::*;
    use crate::codec;
    use crate::error::ContentError;
    use crate::github::types::Commit;

    #[derive(Default)]
    struct State {
        files: HashMap<String, (String, u64)>,
        get_failures: VecDeque<ContentError>,
        put_failures: VecDeque<ContentError>,
        gets: Vec<(String, bool)>,
        puts: Vec<(String, PutContentsRequest)>,
        revision: u64,
    }

    pub struct MemoryStore {
        target: RemoteTarget,
        state: Mutex<State>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self {
                target: RemoteTarget::new("acme", "site", "main"),
                state: Mutex::new(State::default()),
            }
        }

        /// Store a file with raw (already base64) content.
        pub fn insert_raw(&self, path: &str, encoded: &str) {
            let mut state = self.state.lock().unwrap();
            state.revision += 1;
            let revision = state.revision;
            state.files.insert(path.to_string(), (encoded.to_string(), revision));
        }

        pub fn insert_text(&self, path: &str, text: &str) {
            self.insert_raw(path, &codec::encode_text(text));
        }

        pub fn fail_next_get(&self, err: ContentError) {
            self.state.lock().unwrap().get_failures.push_back(err);
        }

        pub fn fail_next_put(&self, err: ContentError) {
            self.state.lock().unwrap().put_failures.push_back(err);
        }

        pub fn get_count(&self) -> usize {
            self.state.lock().unwrap().gets.len()
        }

        pub fn gets(&self) -> Vec<(String, bool)> {
            self.state.lock().unwrap().gets.clone()
        }

        pub fn puts(&self) -> Vec<(String, PutContentsRequest)> {
            self.state.lock().unwrap().puts.clone()
        }

        pub fn sha_of(&self, path: &str) -> Option<String> {
            let state = self.state.lock().unwrap();
            state.files.get(path).map(|(_, rev)| format!("sha-{}", rev))
        }

        pub fn text_of(&self, path: &str) -> Option<String> {
            let state = self.state.lock().unwrap();
            state
                .files
                .get(path)
                .map(|(content, _)| codec::decode_text(content).unwrap())
        }
    }

    fn describe(path: &str, content: Option<String>, revision: u64) -> ContentFile {
        ContentFile {
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            sha: format!("sha-{}", revision),
            size: 0,
            content,
            encoding: Some("base64".to_string()),
            download_url: None,
            html_url: None,
        }
    }

    #[async_trait]
    impl ContentStore for MemoryStore {
        fn target(&self) -> &RemoteTarget {
            &self.target
        }

        async fn get_file(&self, path: &str, bypass_cache: bool) -> Result<Option<ContentFile>> {
            let mut state = self.state.lock().unwrap();
            state.gets.push((path.to_string(), bypass_cache));
            if let Some(err) = state.get_failures.pop_front() {
                return Err(err);
            }
            Ok(state
                .files
                .get(path)
                .map(|(content, rev)| describe(path, Some(content.clone()), *rev)))
        }

        async fn put_file(
            &self,
            path: &str,
            request: &PutContentsRequest,
        ) -> Result<PutContentsResponse> {
            let mut state = self.state.lock().unwrap();
            state.puts.push((path.to_string(), request.clone()));
            if let Some(err) = state.put_failures.pop_front() {
                return Err(err);
            }

            let current = state.files.get(path).map(|(_, rev)| format!("sha-{}", rev));
            if current != request.sha {
                return Err(ContentError::Status {
                    status: 422,
                    detail: format!("sha mismatch for {}", path),
                });
            }

            state.revision += 1;
            let revision = state.revision;
            state
                .files
                .insert(path.to_string(), (request.content.clone(), revision));
            Ok(PutContentsResponse {
                content: Some(describe(path, None, revision)),
                commit: Commit {
                    sha: format!("commit-{}", revision),
                    message: Some(request.message.clone()),
                    html_url: None,
                },
            })
        }
    }
}
