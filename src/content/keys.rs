// Content keys.
// Each editable collection has a bundled local copy and a file in the repository.

use std::fmt;
use std::str::FromStr;

use crate::error::ContentError;

/// Logical name of an editable JSON collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKey {
    News,
    Promotions,
    OpeningHours,
}

impl ContentKey {
    pub const ALL: [ContentKey; 3] = [
        ContentKey::News,
        ContentKey::Promotions,
        ContentKey::OpeningHours,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ContentKey::News => "news",
            ContentKey::Promotions => "promotions",
            ContentKey::OpeningHours => "opening-hours",
        }
    }

    /// Path of the bundled copy, relative to the static site root.
    pub fn local_path(&self) -> &'static str {
        match self {
            ContentKey::News => "/content/news.json",
            ContentKey::Promotions => "/content/promotions.json",
            ContentKey::OpeningHours => "/content/opening-hours.json",
        }
    }

    /// Path of the file within the repository.
    pub fn remote_path(&self) -> &'static str {
        match self {
            ContentKey::News => "public/content/news.json",
            ContentKey::Promotions => "public/content/promotions.json",
            ContentKey::OpeningHours => "public/content/opening-hours.json",
        }
    }

    /// Commit message used when the collection is saved.
    ///
    /// Promotions keep the short `promos` label used by existing history.
    pub fn commit_message(&self) -> String {
        let label = match self {
            ContentKey::Promotions => "promos",
            other => other.name(),
        };
        format!("chore(content): update {}", label)
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContentKey {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "news" => Ok(ContentKey::News),
            "promotions" | "promos" => Ok(ContentKey::Promotions),
            "opening-hours" | "hours" => Ok(ContentKey::OpeningHours),
            other => Err(ContentError::Validation(format!(
                "unknown content key '{}'",
                other
            ))),
        }
    }
}
