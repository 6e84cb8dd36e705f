// In-memory cache store for remote content.
// Handles TTL checking, invalidation, and a pluggable clock for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;

/// Source of the current time for TTL checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// Public so downstream crates can test TTL behaviour deterministically.
#[derive(Debug, Clone)]
pub struct ManualClock {
    start: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        if let Ok(mut offset) = self.offset.lock() {
            *offset += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = self.offset.lock().map(|o| *o).unwrap_or_default();
        self.start + offset
    }
}

/// A cached remote read.
#[derive(Debug, Clone)]
pub struct CachedData {
    /// The parsed content.
    pub data: Value,
    /// When the content was fetched.
    pub fetched_at: Instant,
}

impl CachedData {
    pub fn new(data: Value, fetched_at: Instant) -> Self {
        Self { data, fetched_at }
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }

    /// An entry is fresh while its age is strictly below the TTL.
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now) >= ttl
    }

    pub fn is_valid(&self, now: Instant, ttl: Duration) -> bool {
        !self.is_expired(now, ttl)
    }
}

/// Age and remaining lifetime of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheInfo {
    pub age: Duration,
    /// Zero once the entry is stale.
    pub expires_in: Duration,
}

/// Process-wide cache shared by every content consumer.
pub struct ContentCache {
    entries: RwLock<HashMap<String, CachedData>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ContentCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value if it is still fresh.
    pub async fn get_fresh(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        let now = self.clock.now();
        entries
            .get(key)
            .filter(|entry| entry.is_valid(now, self.ttl))
            .map(|entry| entry.data.clone())
    }

    /// Store a value, replacing any older entry.
    pub async fn insert(&self, key: &str, data: Value) {
        let entry = CachedData::new(data, self.clock.now());
        self.entries.write().await.insert(key.to_string(), entry);
    }

    /// Remove one entry. Returns whether it existed.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Remove every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn info(&self, key: &str) -> Option<CacheInfo> {
        let entries = self.entries.read().await;
        let now = self.clock.now();
        entries.get(key).map(|entry| {
            let age = entry.age(now);
            CacheInfo {
                age,
                expires_in: self.ttl.saturating_sub(age),
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
