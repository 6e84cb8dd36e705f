// GitHub contents API types.
// Defines structs for the get/put contents requests and responses.

use serde::{Deserialize, Serialize};

/// A file as described by the contents API.
///
/// `content` is only present on reads; write responses carry the
/// metadata alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFile {
    pub name: String,
    pub path: String,
    /// Revision token required to update the file.
    pub sha: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Commit created by a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Body of a create-or-update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutContentsRequest {
    pub message: String,
    /// Base64-encoded file content.
    pub content: String,
    pub branch: String,
    /// Current revision token; omitted when creating a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// Response to a successful create-or-update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutContentsResponse {
    pub content: Option<ContentFile>,
    pub commit: Commit,
}

impl PutContentsResponse {
    /// New revision token of the written file.
    pub fn sha(&self) -> Option<&str> {
        self.content.as_ref().map(|c| c.sha.as_str())
    }
}

/// Error body returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}
