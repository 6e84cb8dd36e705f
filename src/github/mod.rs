// GitHub API module.
// Provides the contents API client, its types, and the store trait the rest of the crate uses.

pub mod client;
pub mod endpoints;
pub mod store;
pub mod types;

pub use client::GitHubClient;
pub use store::ContentStore;
pub use types::*;
