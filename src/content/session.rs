// Admin editing session.
// Seeds editable collections from the fetcher and persists them through the writer.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::collection::Collection;
use super::keys::ContentKey;
use super::records::{NewsItem, Promotion, Record};
use crate::config::AssetUrlStrategy;
use crate::error::{ContentError, Result};
use crate::fetcher::ContentFetcher;
use crate::github::PutContentsResponse;
use crate::writer::{ContentWriter, UploadDir};

/// Editable state of the admin panel.
pub struct AdminSession {
    fetcher: Arc<ContentFetcher>,
    writer: Option<ContentWriter>,
    asset_urls: AssetUrlStrategy,
    pub news: Collection<NewsItem>,
    pub promotions: Collection<Promotion>,
}

impl AdminSession {
    /// A session without a writer can edit but every save fails fast.
    pub fn new(fetcher: Arc<ContentFetcher>, writer: Option<ContentWriter>, asset_urls: AssetUrlStrategy) -> Self {
        Self {
            fetcher,
            writer,
            asset_urls,
            news: Collection::new(ContentKey::News),
            promotions: Collection::new(ContentKey::Promotions),
        }
    }

    pub fn can_write(&self) -> bool {
        self.writer.is_some()
    }

    /// Load the published collections once to start editing from.
    ///
    /// Reads bypass the cache so edits start from the latest commit.
    pub async fn seed(&mut self) {
        if let Some(items) = self.seed_items::<NewsItem>(ContentKey::News).await {
            self.news.replace_all(items);
        }
        if let Some(items) = self.seed_items::<Promotion>(ContentKey::Promotions).await {
            self.promotions.replace_all(items);
        }
    }

    async fn seed_items<T: Record>(&self, key: ContentKey) -> Option<Vec<T>> {
        self.fetcher.load_records::<T>(key, true).await
    }

    pub async fn save_news(&self) -> Result<PutContentsResponse> {
        self.persist(ContentKey::News, self.news.to_json()?).await
    }

    pub async fn save_promotions(&self) -> Result<PutContentsResponse> {
        self.persist(ContentKey::Promotions, self.promotions.to_json()?)
            .await
    }

    pub async fn save_opening_hours(&self, hours: &Value) -> Result<PutContentsResponse> {
        self.persist(ContentKey::OpeningHours, pretty(hours)?).await
    }

    /// Persist an arbitrary JSON document under a key.
    pub async fn save_raw(&self, key: ContentKey, data: &Value) -> Result<PutContentsResponse> {
        self.persist(key, pretty(data)?).await
    }

    /// Upload an image and return the URL to put in a record.
    pub async fn upload_image(&self, bytes: &[u8], file_name: &str, dir: UploadDir) -> Result<String> {
        self.writer()?
            .upload_asset(bytes, file_name, dir, self.asset_urls)
            .await
    }

    async fn persist(&self, key: ContentKey, body: String) -> Result<PutContentsResponse> {
        let written = self
            .writer()?
            .upsert(key.remote_path(), &body, &key.commit_message())
            .await?;
        self.fetcher.clear_key_cache(key).await;
        Ok(written)
    }

    fn writer(&self) -> Result<&ContentWriter> {
        self.writer.as_ref().ok_or_else(|| {
            ContentError::MissingConfig("repository settings and token are required to save".to_string())
        })
    }
}

fn pretty<T: Serialize>(data: &T) -> Result<String> {
    let mut body = serde_json::to_string_pretty(data)?;
    body.push('\n');
    Ok(body)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::cache::ContentCache;
    use crate::github::store::fake::MemoryStore;
    use crate::retry::{RecordingSleeper, RetryPolicy};

    fn session(store: &Arc<MemoryStore>, with_writer: bool) -> AdminSession {
        let fetcher = Arc::new(ContentFetcher::new(
            store.clone(),
            Arc::new(ContentCache::new(Duration::from_secs(300))),
            None,
        ));
        let writer = with_writer.then(|| {
            ContentWriter::with_sleeper(
                store.clone(),
                RetryPolicy::default(),
                Arc::new(RecordingSleeper::new()),
            )
        });
        AdminSession::new(fetcher, writer, AssetUrlStrategy::SiteRelative)
    }

    #[tokio::test]
    async fn test_seed_keeps_published_records() {
        let store = Arc::new(MemoryStore::new());
        store.insert_text(
            "public/content/news.json",
            r#"[{"id": "n1", "title": "A", "date": "2025-01-01"}, {"title": "B", "date": "2025-01-02"}]"#,
        );

        let mut session = session(&store, true);
        session.seed().await;
        assert_eq!(session.news.len(), 2);
        assert!(session.news.items().iter().all(|n| !n.id.is_empty()));

        let mut item = NewsItem::new("C");
        item.date = "2025-02-01".to_string();
        session.news.save(None, item).unwrap();
        session.save_news().await.unwrap();

        let published: Vec<Value> =
            serde_json::from_str(&store.text_of("public/content/news.json").unwrap()).unwrap();
        let titles: Vec<_> = published.iter().map(|n| n["title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
        assert_eq!(published[1]["id"], json!("n1"));
    }

    #[tokio::test]
    async fn test_seed_ignores_non_list_document() {
        let store = Arc::new(MemoryStore::new());
        store.insert_text("public/content/promotions.json", r#"{"oops": true}"#);

        let mut session = session(&store, true);
        session.seed().await;

        assert!(session.promotions.is_empty());
    }

    #[tokio::test]
    async fn test_save_without_writer_fails_fast() {
        let store = Arc::new(MemoryStore::new());
        let mut session = session(&store, false);
        session.news.save(None, NewsItem::new("Draft")).unwrap();

        let err = session.save_news().await.unwrap_err();
        assert!(matches!(err, ContentError::MissingConfig(_)));
        assert!(store.puts().is_empty());
        assert_eq!(session.news.len(), 1);
    }

    #[tokio::test]
    async fn test_save_invalidates_cache() {
        let store = Arc::new(MemoryStore::new());
        store.insert_text("public/content/news.json", "[]");
        let mut session = session(&store, true);

        assert_eq!(session.fetcher.load_news(false).await, Some(vec![]));
        session.news.save(None, NewsItem::new("Nová prodejna")).unwrap();
        session.save_news().await.unwrap();

        let published = session.fetcher.load_news(false).await.unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].title, "Nová prodejna");

        let (_, request) = store.puts().pop().unwrap();
        assert_eq!(request.message, "chore(content): update news");
    }

    #[tokio::test]
    async fn test_failed_save_keeps_edits() {
        let store = Arc::new(MemoryStore::new());
        store.fail_next_put(ContentError::Unauthorized);
        let mut session = session(&store, true);
        session.promotions.save(None, Promotion::new("STIGA")).unwrap();

        assert!(session.save_promotions().await.is_err());
        assert_eq!(session.promotions.len(), 1);
    }

    #[tokio::test]
    async fn test_save_opening_hours() {
        let store = Arc::new(MemoryStore::new());
        let session = session(&store, true);
        let hours = json!({"weekdays": "8:00–17:00", "saturday": "8:00–11:00"});

        session.save_opening_hours(&hours).await.unwrap();

        let text = store.text_of("public/content/opening-hours.json").unwrap();
        assert!(text.ends_with("}\n"));
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), hours);
    }
}
