// Cache module for remote content reads.
// Keeps successful remote reads in memory for a bounded time window.

pub mod identity;
pub mod store;

pub use identity::cache_key;
pub use store::{CacheInfo, CachedData, Clock, ContentCache, ManualClock, SystemClock};
