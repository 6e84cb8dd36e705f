// Editable collection state.
// The in-memory list is the source of truth until it is explicitly persisted.

use super::keys::ContentKey;
use super::records::{Record, generate_id};
use crate::error::{ContentError, Result};

/// An ordered, editable list of records, newest first.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    key: ContentKey,
    items: Vec<T>,
}

impl<T: Record> Collection<T> {
    pub fn new(key: ContentKey) -> Self {
        Self {
            key,
            items: Vec::new(),
        }
    }

    pub fn with_items(key: ContentKey, items: Vec<T>) -> Self {
        Self { key, items }
    }

    pub fn key(&self) -> ContentKey {
        self.key
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Replace the whole list, e.g. after loading the published copy.
    ///
    /// Records that arrive without an id get a generated one.
    pub fn replace_all(&mut self, mut items: Vec<T>) {
        for item in items.iter_mut().filter(|item| item.id().is_empty()) {
            item.set_id(generate_id());
        }
        self.items = items;
    }

    /// Replace the record at `index`, or insert a new one at the front.
    ///
    /// Records without an id get a generated one. Returns the stored index.
    pub fn save(&mut self, index: Option<usize>, mut item: T) -> Result<usize> {
        item.validate()?;
        if item.id().is_empty() {
            item.set_id(generate_id());
        }

        match index {
            Some(i) => {
                let slot = self.items.get_mut(i).ok_or_else(|| {
                    ContentError::Validation(format!(
                        "no {} record at position {}",
                        self.key, i
                    ))
                })?;
                *slot = item;
                Ok(i)
            }
            None => {
                self.items.insert(0, item);
                Ok(0)
            }
        }
    }

    /// Remove the record at `index`.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Pretty JSON with a trailing newline, as committed to the repository.
    pub fn to_json(&self) -> Result<String> {
        let mut body = serde_json::to_string_pretty(&self.items)?;
        body.push('\n');
        Ok(body)
    }
}
