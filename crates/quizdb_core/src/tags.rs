//! Tag index: tag name to the ids of the documents carrying it.
//!
//! The index is a cache derived from the documents, never a source of
//! truth. Mutations that touch a known set of tags refresh just those
//! tags; deletions rebuild everything.

use crate::model::Document;
use std::collections::{BTreeMap, BTreeSet};

/// Secondary index from tag name to document ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    ids_by_tag: BTreeMap<String, BTreeSet<String>>,
}

impl TagIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index over the given documents.
    pub fn build<'a>(documents: impl IntoIterator<Item = &'a Document>) -> Self {
        let mut index = Self::new();
        for document in documents {
            index.insert_document(document);
        }
        index
    }

    /// Ids of documents carrying `tag`. Empty for unknown tags.
    #[must_use]
    pub fn get_by_tag(&self, tag: &str) -> BTreeSet<String> {
        self.ids_by_tag.get(tag).cloned().unwrap_or_default()
    }

    /// Whether any document carries `tag`.
    #[must_use]
    pub fn contains_tag(&self, tag: &str) -> bool {
        self.ids_by_tag.contains_key(tag)
    }

    /// Tag names with at least one document, in order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.ids_by_tag.keys().map(String::as_str)
    }

    /// Number of distinct tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids_by_tag.len()
    }

    /// Whether no document is tagged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids_by_tag.is_empty()
    }

    /// Recomputes the entries for `tags` only.
    pub fn refresh<'a, I, S>(&mut self, tags: I, documents: impl IntoIterator<Item = &'a Document> + Clone)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            let tag = tag.as_ref();
            let ids: BTreeSet<String> = documents
                .clone()
                .into_iter()
                .filter(|doc| doc.has_tag(tag))
                .map(|doc| doc.id().to_string())
                .collect();
            if ids.is_empty() {
                self.ids_by_tag.remove(tag);
            } else {
                self.ids_by_tag.insert(tag.to_string(), ids);
            }
        }
    }

    /// Recomputes the whole index.
    pub fn rebuild<'a>(&mut self, documents: impl IntoIterator<Item = &'a Document>) {
        *self = Self::build(documents);
    }

    fn insert_document(&mut self, document: &Document) {
        for tag in document.tags().keys() {
            self.ids_by_tag
                .entry(tag.clone())
                .or_default()
                .insert(document.id().to_string());
        }
    }
}
