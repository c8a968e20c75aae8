//! Owner-scoped document collection.
//!
//! Documents are kept in a vector sorted by id, with a second vector of
//! `(name, id)` pairs sorted by name. Both lookups are binary searches;
//! see [`search`] for the result encoding.

pub mod search;

use crate::model::Document;
use tracing::debug;

/// Result of [`DocumentStore::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// No document matched; the incoming one was inserted.
    Inserted {
        /// Id of the inserted document.
        id: String,
    },
    /// An existing document matched by id or name and absorbed the
    /// incoming questions.
    Merged {
        /// Id of the existing document.
        id: String,
        /// Number of questions that were new.
        added: usize,
    },
}

impl AddOutcome {
    /// Id of the stored document.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Inserted { id } | Self::Merged { id, .. } => id,
        }
    }

    /// Whether the store changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Merged { added: 0, .. })
    }
}

/// Documents of one owner, sorted by id with a secondary name index.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
    by_name: Vec<(String, String)>,
}

impl DocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    /// Documents in id order, as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Document] {
        &self.documents
    }

    /// Binary search by id with insertion-point encoding.
    #[must_use]
    pub fn search_id(&self, id: &str) -> isize {
        search::search_by(&self.documents, |doc| doc.id().cmp(id))
    }

    /// Binary search of the name index with insertion-point encoding.
    #[must_use]
    pub fn search_name(&self, name: &str) -> isize {
        search::search_by(&self.by_name, |(n, _)| n.as_str().cmp(name))
    }

    /// Looks up a document by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Document> {
        search::decode(self.search_id(id))
            .ok()
            .map(|index| &self.documents[index])
    }

    /// Looks up a document by name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Document> {
        let index = search::decode(self.search_name(name)).ok()?;
        let id = &self.by_name[index].1;
        self.get(id)
    }

    /// Mutable access for changes that keep the id and name.
    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Document> {
        let index = search::decode(self.search_id(id)).ok()?;
        Some(&mut self.documents[index])
    }

    /// Adds a document, merging it into an existing one when possible.
    ///
    /// An existing document is looked up by id first, then by name. On a
    /// match the incoming questions are added to it (duplicates are
    /// skipped) and nothing else changes. Otherwise the document is
    /// inserted at its sorted position.
    pub fn add(&mut self, document: Document) -> AddOutcome {
        let by_id = search::decode(self.search_id(document.id()));
        let target = match by_id {
            Ok(index) => Some(index),
            Err(_) => self
                .get_by_name(document.name())
                .map(|existing| existing.id().to_string())
                .and_then(|id| search::decode(self.search_id(&id)).ok()),
        };

        if let Some(index) = target {
            let existing = &mut self.documents[index];
            let added = existing.add_questions(document.questions().iter().cloned());
            debug!(
                id = existing.id(),
                incoming = document.id(),
                added,
                "merged document"
            );
            return AddOutcome::Merged {
                id: existing.id().to_string(),
                added,
            };
        }

        let id = document.id().to_string();
        let insert_at = match by_id {
            Ok(index) | Err(index) => index,
        };
        self.insert_name(document.name(), &id);
        self.documents.insert(insert_at, document);
        debug!(id = %id, "inserted document");
        AddOutcome::Inserted { id }
    }

    /// Removes a document.
    pub fn delete(&mut self, id: &str) -> Option<Document> {
        let index = search::decode(self.search_id(id)).ok()?;
        let document = self.documents.remove(index);
        self.remove_name(document.name(), id);
        Some(document)
    }

    /// Renames a document and re-sorts the name index.
    ///
    /// Returns `false` if the document does not exist.
    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        let Ok(index) = search::decode(self.search_id(id)) else {
            return false;
        };
        let old = self.documents[index].name().to_string();
        self.documents[index].rename(name);
        self.remove_name(&old, id);
        self.insert_name(name, id);
        true
    }

    fn insert_name(&mut self, name: &str, id: &str) {
        let key = (name.to_string(), id.to_string());
        let index = match self.by_name.binary_search(&key) {
            Ok(index) | Err(index) => index,
        };
        self.by_name.insert(index, key);
    }

    fn remove_name(&mut self, name: &str, id: &str) {
        if let Some(index) = self
            .by_name
            .iter()
            .position(|(n, i)| n == name && i == id)
        {
            self.by_name.remove(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerOption, Question};

    fn question(text: &str) -> Question {
        Question::new(text, vec![AnswerOption::new("yes", true)])
    }

    fn doc(id: &str, name: &str, questions: &[&str]) -> Document {
        Document::new("u1", name, id, 0).with_questions(questions.iter().map(|q| question(q)))
    }

    #[test]
    fn inserts_stay_sorted() {
        let mut store = DocumentStore::new();
        for id in ["m", "c", "x", "a"] {
            store.add(doc(id, &format!("name-{id}"), &["Q"]));
        }
        let ids: Vec<_> = store.iter().map(Document::id).collect();
        assert_eq!(ids, vec!["a", "c", "m", "x"]);
        assert_eq!(store.search_id("c"), 1);
        assert_eq!(store.search_id("b"), -2);
    }

    #[test]
    fn lookups() {
        let mut store = DocumentStore::new();
        store.add(doc("d1", "Capitals", &["Q"]));
        store.add(doc("d2", "Rivers", &["Q"]));
        assert_eq!(store.get("d2").map(Document::name), Some("Rivers"));
        assert_eq!(store.get_by_name("Capitals").map(Document::id), Some("d1"));
        assert!(store.get("d3").is_none());
        assert!(store.get_by_name("Lakes").is_none());
    }

    #[test]
    fn adding_twice_is_idempotent() {
        let mut store = DocumentStore::new();
        store.add(doc("d1", "Capitals", &["Q1", "Q2"]));
        let outcome = store.add(doc("d1", "Capitals", &["Q1", "Q2"]));
        assert_eq!(
            outcome,
            AddOutcome::Merged {
                id: "d1".into(),
                added: 0
            }
        );
        assert!(!outcome.changed());
        assert_eq!(store.get("d1").unwrap().size(), 2);
    }

    #[test]
    fn merge_by_id_adds_only_new_questions() {
        let mut store = DocumentStore::new();
        store.add(doc("d1", "Capitals", &["Q1"]));
        let outcome = store.add(doc("d1", "Other name", &["Q1", "Q2"]));
        assert_eq!(outcome.id(), "d1");
        assert_eq!(store.get("d1").unwrap().size(), 2);
        assert_eq!(store.get("d1").unwrap().name(), "Capitals");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn merge_by_name() {
        let mut store = DocumentStore::new();
        store.add(doc("d1", "Capitals", &["Q1"]));
        let outcome = store.add(doc("zz", "Capitals", &["Q2"]));
        assert_eq!(
            outcome,
            AddOutcome::Merged {
                id: "d1".into(),
                added: 1
            }
        );
        assert!(store.get("zz").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_and_rename() {
        let mut store = DocumentStore::new();
        store.add(doc("d1", "Capitals", &["Q"]));
        store.add(doc("d2", "Rivers", &["Q"]));

        assert!(store.rename("d1", "World capitals"));
        assert!(store.get_by_name("Capitals").is_none());
        assert_eq!(
            store.get_by_name("World capitals").map(Document::id),
            Some("d1")
        );
        assert!(!store.rename("nope", "x"));

        let removed = store.delete("d2").unwrap();
        assert_eq!(removed.name(), "Rivers");
        assert!(store.get_by_name("Rivers").is_none());
        assert!(store.delete("d2").is_none());
        assert_eq!(store.len(), 1);
    }
}
