// Typed accessors per content key.
// Thin wrappers over ContentFetcher with the fixed local/remote path pair of each key.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::keys::ContentKey;
use super::records::{NewsItem, Promotion, Record, parse_records};
use crate::fetcher::ContentFetcher;

impl ContentFetcher {
    /// Load the raw JSON for a key.
    pub async fn load_key(&self, key: ContentKey, force_refresh: bool) -> Option<Value> {
        self.load(key.local_path(), key.remote_path(), force_refresh)
            .await
    }

    /// Load a key and deserialize it.
    ///
    /// When the loaded document does not fit `T`, the local copy is tried instead.
    pub async fn load_typed<T: DeserializeOwned>(&self, key: ContentKey, force_refresh: bool) -> Option<T> {
        let data = self.load_key(key, force_refresh).await?;
        match serde_json::from_value(data) {
            Ok(typed) => return Some(typed),
            Err(err) => {
                tracing::warn!(key = %key, "Content does not match the expected shape: {}", err);
            }
        }

        let local = self.load_local(key.local_path()).await?;
        match serde_json::from_value(local) {
            Ok(typed) => Some(typed),
            Err(err) => {
                tracing::warn!(key = %key, "Local copy does not match the expected shape: {}", err);
                None
            }
        }
    }

    /// Load a list of records, skipping single records that do not fit.
    ///
    /// A document that is not a list at all is replaced by the local copy.
    pub async fn load_records<T: Record>(&self, key: ContentKey, force_refresh: bool) -> Option<Vec<T>> {
        let data = self.load_key(key, force_refresh).await?;
        if let Some(records) = records_from(key, data) {
            return Some(records);
        }

        tracing::warn!(key = %key, "Content is not a list, using the local copy");
        let local = self.load_local(key.local_path()).await?;
        records_from(key, local)
    }

    pub async fn clear_key_cache(&self, key: ContentKey) {
        self.invalidate(key.remote_path()).await;
    }

    pub async fn load_news(&self, force_refresh: bool) -> Option<Vec<NewsItem>> {
        self.load_records(ContentKey::News, force_refresh).await
    }

    pub async fn load_news_forced(&self) -> Option<Vec<NewsItem>> {
        self.load_news(true).await
    }

    pub async fn clear_news_cache(&self) {
        self.clear_key_cache(ContentKey::News).await;
    }

    pub async fn load_promotions(&self, force_refresh: bool) -> Option<Vec<Promotion>> {
        self.load_records(ContentKey::Promotions, force_refresh).await
    }

    pub async fn load_promotions_forced(&self) -> Option<Vec<Promotion>> {
        self.load_promotions(true).await
    }

    pub async fn clear_promotions_cache(&self) {
        self.clear_key_cache(ContentKey::Promotions).await;
    }

    /// Opening hours are a free-form object owned by the site layout.
    pub async fn load_opening_hours(&self, force_refresh: bool) -> Option<Value> {
        self.load_key(ContentKey::OpeningHours, force_refresh).await
    }

    pub async fn load_opening_hours_forced(&self) -> Option<Value> {
        self.load_opening_hours(true).await
    }

    pub async fn clear_opening_hours_cache(&self) {
        self.clear_key_cache(ContentKey::OpeningHours).await;
    }
}

fn records_from<T: Record>(key: ContentKey, data: Value) -> Option<Vec<T>> {
    let (records, skipped) = parse_records(data)?;
    if skipped > 0 {
        tracing::warn!(key = %key, skipped, "Skipped records that do not match the expected shape");
    }
    Some(records)
}
