// Editable record types.
// News items and promotions as stored in the content JSON files.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use url::Url;

use crate::error::{ContentError, Result};

/// Generate a unique record id.
pub fn generate_id() -> String {
    ulid::Ulid::new().to_string().to_lowercase()
}

/// A record kept in an editable collection.
pub trait Record: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Check the record before it enters a collection.
    fn validate(&self) -> Result<()>;
}

/// A news entry.
///
/// Every field has a default so hand-edited files still load; `validate`
/// enforces the required ones when a record is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Fields this crate does not model, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewsItem {
    /// New item dated today.
    pub fn new(title: &str) -> Self {
        Self {
            id: generate_id(),
            title: title.to_string(),
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            summary: None,
            body: None,
            image_url: None,
            link: None,
            extra: Map::new(),
        }
    }
}

impl Record for NewsItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate(&self) -> Result<()> {
        require("title", &self.title)?;
        require("date", &self.date)?;
        validate_image_url(self.image_url.as_deref())?;
        validate_link(self.link.as_deref())
    }
}

/// A sales promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Promotion {
    pub fn new(title: &str) -> Self {
        Self {
            id: generate_id(),
            title: title.to_string(),
            description: None,
            price: None,
            valid_until: None,
            image_url: None,
            link: None,
            tags: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl Record for Promotion {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate(&self) -> Result<()> {
        require("title", &self.title)?;
        validate_image_url(self.image_url.as_deref())?;
        validate_link(self.link.as_deref())
    }
}

/// Deserialize each element of a JSON array on its own.
///
/// Elements that do not fit `T` are skipped and counted; `None` when the
/// document is not an array at all.
pub fn parse_records<T: Record>(data: Value) -> Option<(Vec<T>, usize)> {
    let Value::Array(elements) = data else {
        return None;
    };

    let mut skipped = 0;
    let records = elements
        .into_iter()
        .filter_map(|element| match serde_json::from_value(element) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::debug!("Skipping malformed record: {}", err);
                skipped += 1;
                None
            }
        })
        .collect();
    Some((records, skipped))
}

/// Split a comma-separated tag list, trimming and dropping empties.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ContentError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Images are absolute http(s) URLs or paths from the site root.
fn validate_image_url(value: Option<&str>) -> Result<()> {
    match value {
        None | Some("") => Ok(()),
        Some(v) if v.starts_with("http://") || v.starts_with("https://") || v.starts_with('/') => Ok(()),
        Some(v) => Err(ContentError::Validation(format!(
            "imageUrl must be an http(s) URL or a path starting with '/': {}",
            v
        ))),
    }
}

fn validate_link(value: Option<&str>) -> Result<()> {
    match value {
        None | Some("") => Ok(()),
        Some(v) => Url::parse(v)
            .map(|_| ())
            .map_err(|e| ContentError::Validation(format!("link must be a valid URL ({}): {}", e, v))),
    }
}
