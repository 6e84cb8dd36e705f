// sitecontent: content loading and publishing for a small business website.
// Reads news, promotions and opening hours from a GitHub repository with a local fallback,
// and writes edited collections back with conflict retry.

pub mod cache;
pub mod codec;
pub mod config;
pub mod content;
pub mod error;
pub mod fetcher;
pub mod github;
pub mod retry;
pub mod token;
pub mod writer;

pub use cache::ContentCache;
pub use crate::config::{AssetUrlStrategy, RemoteTarget, RepositoryConfig, SiteConfig};
pub use content::{AdminSession, ContentKey, NewsItem, Promotion};
pub use error::{ContentError, Result};
pub use fetcher::{ContentFetcher, LocalSource};
pub use github::{ContentStore, GitHubClient};
pub use retry::RetryPolicy;
pub use writer::{ContentWriter, UploadDir};
