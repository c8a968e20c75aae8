//! The owner aggregate: profile, documents, tag index and attempts.

use crate::error::{CoreError, CoreResult};
use crate::model::{Attempt, Document, OwnerProfile, Question};
use crate::store::{AddOutcome, DocumentStore};
use crate::tags::TagIndex;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Everything one owner has.
///
/// All document mutations go through this type so the tag index stays
/// in step with the documents.
#[derive(Debug, Clone, Default)]
pub struct Owner {
    profile: OwnerProfile,
    documents: DocumentStore,
    tag_index: TagIndex,
    /// Attempts per document id, oldest first.
    attempts: BTreeMap<String, Vec<Attempt>>,
}

impl Owner {
    /// Creates an owner with an empty profile.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_profile(OwnerProfile::new(id))
    }

    /// Creates an owner from a stored profile.
    #[must_use]
    pub fn with_profile(profile: OwnerProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    /// Owner id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.profile.id
    }

    /// Profile data.
    #[must_use]
    pub fn profile(&self) -> &OwnerProfile {
        &self.profile
    }

    /// Mutable profile data. The id cannot be changed through this.
    pub fn update_profile<R>(&mut self, f: impl FnOnce(&mut OwnerProfile) -> R) -> R {
        let id = self.profile.id.clone();
        let result = f(&mut self.profile);
        self.profile.id = id;
        result
    }

    /// The documents.
    #[must_use]
    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    /// The tag index.
    #[must_use]
    pub fn tag_index(&self) -> &TagIndex {
        &self.tag_index
    }

    /// Looks up a document by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    /// Looks up a document by name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Document> {
        self.documents.get_by_name(name)
    }

    /// Ids of documents carrying `tag`.
    #[must_use]
    pub fn get_by_tag(&self, tag: &str) -> BTreeSet<String> {
        self.tag_index.get_by_tag(tag)
    }

    /// Adds a document, merging by id or name. The document's owner is
    /// set to this owner.
    pub fn add_document(&mut self, mut document: Document) -> AddOutcome {
        document.set_owner_id(self.id());
        let tags: Vec<String> = document.tags().keys().cloned().collect();
        let outcome = self.documents.add(document);
        if let AddOutcome::Inserted { .. } = outcome {
            self.tag_index.refresh(tags, self.documents.as_slice());
        }
        outcome
    }

    /// Deletes a document and its attempts, then rebuilds the tag index.
    pub fn delete_document(&mut self, id: &str) -> Option<Document> {
        let document = self.documents.delete(id)?;
        self.attempts.remove(id);
        self.tag_index.rebuild(self.documents.iter());
        debug!(owner = self.id(), id, "deleted document");
        Some(document)
    }

    /// Renames a document.
    ///
    /// # Errors
    ///
    /// Fails if the document does not exist or another document already
    /// has the name.
    pub fn rename_document(&mut self, id: &str, name: &str) -> CoreResult<()> {
        if self.documents.get(id).is_none() {
            return Err(CoreError::document_not_found(self.id(), id));
        }
        if let Some(other) = self.documents.get_by_name(name) {
            if other.id() != id {
                return Err(CoreError::invalid_operation(format!(
                    "document {} is already named {name:?}",
                    other.id()
                )));
            }
        }
        self.documents.rename(id, name);
        Ok(())
    }

    /// Adds questions to a document, returning how many were new.
    ///
    /// # Errors
    ///
    /// Fails if the document does not exist.
    pub fn add_questions(
        &mut self,
        id: &str,
        questions: impl IntoIterator<Item = Question>,
    ) -> CoreResult<usize> {
        let owner_id = self.profile.id.clone();
        let document = self
            .documents
            .get_mut(id)
            .ok_or_else(|| CoreError::document_not_found(owner_id, id))?;
        Ok(document.add_questions(questions))
    }

    /// Tag name to glyph for every tag the owner declared or any of the
    /// owner's documents carries. Declared glyphs win.
    #[must_use]
    pub fn tag_vocabulary(&self) -> BTreeMap<String, String> {
        let mut vocabulary = BTreeMap::new();
        for document in self.documents.iter() {
            for (tag, glyph) in document.tags() {
                vocabulary
                    .entry(tag.clone())
                    .or_insert_with(|| glyph.clone());
            }
        }
        for (tag, glyph) in &self.profile.tags {
            vocabulary.insert(tag.clone(), glyph.clone());
        }
        vocabulary
    }

    /// Declares a tag. Returns `true` if it was new.
    ///
    /// # Errors
    ///
    /// Fails on an empty tag name.
    pub fn create_tag(&mut self, name: &str, glyph: &str) -> CoreResult<bool> {
        if name.is_empty() {
            return Err(CoreError::invalid_operation("tag name must not be empty"));
        }
        Ok(self
            .profile
            .tags
            .insert(name.to_string(), glyph.to_string())
            .is_none())
    }

    /// Removes a tag from the vocabulary and from every document.
    ///
    /// Returns the ids of the documents that carried it.
    pub fn delete_tag(&mut self, name: &str) -> Vec<String> {
        self.profile.tags.remove(name);
        let ids: Vec<String> = self.tag_index.get_by_tag(name).into_iter().collect();
        for id in &ids {
            if let Some(document) = self.documents.get_mut(id) {
                document.remove_tag(name);
            }
        }
        self.tag_index.rebuild(self.documents.iter());
        ids
    }

    /// Tags a document with a tag from the vocabulary.
    ///
    /// Returns `true` if the document did not carry it yet.
    ///
    /// # Errors
    ///
    /// Fails if the tag is not in the vocabulary or the document does
    /// not exist.
    pub fn add_tag_to_document(&mut self, id: &str, tag: &str) -> CoreResult<bool> {
        let glyph = self
            .tag_vocabulary()
            .remove(tag)
            .ok_or_else(|| CoreError::unknown_tag(self.id(), tag))?;
        let owner_id = self.profile.id.clone();
        let document = self
            .documents
            .get_mut(id)
            .ok_or_else(|| CoreError::document_not_found(owner_id, id))?;
        let added = document.add_tag(tag, glyph);
        self.tag_index.refresh([tag], self.documents.as_slice());
        Ok(added)
    }

    /// Removes a tag from one document.
    ///
    /// Returns `true` if the document carried it.
    ///
    /// # Errors
    ///
    /// Fails if the document does not exist.
    pub fn remove_tag_from_document(&mut self, id: &str, tag: &str) -> CoreResult<bool> {
        let owner_id = self.profile.id.clone();
        let document = self
            .documents
            .get_mut(id)
            .ok_or_else(|| CoreError::document_not_found(owner_id, id))?;
        let removed = document.remove_tag(tag);
        self.tag_index.refresh([tag], self.documents.as_slice());
        Ok(removed)
    }

    /// Records an attempt, replacing one of the same document and start
    /// time.
    ///
    /// # Errors
    ///
    /// Fails if the attempt belongs to another owner or its document
    /// does not exist.
    pub fn record_attempt(&mut self, attempt: Attempt) -> CoreResult<()> {
        if attempt.owner_id() != self.id() {
            return Err(CoreError::invalid_operation(format!(
                "attempt by {} recorded for owner {}",
                attempt.owner_id(),
                self.id()
            )));
        }
        if self.documents.get(attempt.document_id()).is_none() {
            return Err(CoreError::document_not_found(self.id(), attempt.document_id()));
        }
        let list = self
            .attempts
            .entry(attempt.document_id().to_string())
            .or_default();
        match list.binary_search_by_key(&attempt.started_at_millis(), Attempt::started_at_millis) {
            Ok(index) => list[index] = attempt,
            Err(index) => list.insert(index, attempt),
        }
        Ok(())
    }

    /// Attempts on a document, oldest first.
    #[must_use]
    pub fn attempts(&self, document_id: &str) -> &[Attempt] {
        self.attempts.get(document_id).map_or(&[], Vec::as_slice)
    }

    /// Most recent attempt on a document.
    #[must_use]
    pub fn latest_attempt(&self, document_id: &str) -> Option<&Attempt> {
        self.attempts(document_id).last()
    }

    /// Every attempt, grouped by document id.
    pub fn all_attempts(&self) -> impl Iterator<Item = &Attempt> {
        self.attempts.values().flatten()
    }

    /// Total number of attempts.
    #[must_use]
    pub fn attempt_count(&self) -> usize {
        self.attempts.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerOption;

    fn doc(id: &str, name: &str) -> Document {
        Document::new("someone-else", name, id, 0).with_questions(vec![Question::new(
            "Q",
            vec![AnswerOption::new("a", true)],
        )])
    }

    #[test]
    fn add_sets_owner_and_indexes_tags() {
        let mut owner = Owner::new("u1");
        owner.add_document(doc("d1", "A").with_tag("science", "🧪"));
        assert_eq!(owner.get("d1").unwrap().owner_id(), "u1");
        assert!(owner.get_by_tag("science").contains("d1"));
    }

    #[test]
    fn delete_rebuilds_tags() {
        let mut owner = Owner::new("u1");
        owner.add_document(doc("d1", "A").with_tag("science", "🧪"));
        owner.add_document(doc("d2", "B").with_tag("science", "🧪").with_tag("art", "🎨"));
        owner.delete_document("d2").unwrap();
        assert_eq!(owner.get_by_tag("science").len(), 1);
        assert!(owner.get_by_tag("art").is_empty());
        assert!(owner.delete_document("d2").is_none());
    }

    #[test]
    fn tag_vocabulary_and_tagging() {
        let mut owner = Owner::new("u1");
        owner.add_document(doc("d1", "A").with_tag("history", "📜"));
        owner.add_document(doc("d2", "B"));

        assert!(matches!(
            owner.add_tag_to_document("d2", "science"),
            Err(CoreError::UnknownTag { .. })
        ));
        assert!(owner.create_tag("science", "🧪").unwrap());
        assert!(owner.add_tag_to_document("d2", "science").unwrap());
        assert!(!owner.add_tag_to_document("d2", "science").unwrap());
        // document tags are part of the vocabulary too
        assert!(owner.add_tag_to_document("d2", "history").unwrap());
        assert_eq!(owner.get_by_tag("history").len(), 2);
        assert_eq!(
            owner.get("d2").unwrap().tags().get("science").map(String::as_str),
            Some("🧪")
        );

        assert!(owner.remove_tag_from_document("d2", "history").unwrap());
        assert_eq!(owner.get_by_tag("history").len(), 1);
        assert!(matches!(
            owner.remove_tag_from_document("nope", "history"),
            Err(CoreError::DocumentNotFound { .. })
        ));
    }

    #[test]
    fn delete_tag_strips_documents() {
        let mut owner = Owner::new("u1");
        owner.create_tag("science", "🧪").unwrap();
        owner.add_document(doc("d1", "A").with_tag("science", "🧪"));
        let affected = owner.delete_tag("science");
        assert_eq!(affected, vec!["d1".to_string()]);
        assert!(!owner.get("d1").unwrap().has_tag("science"));
        assert!(!owner.tag_vocabulary().contains_key("science"));
        assert!(owner.create_tag("", "x").is_err());
    }

    #[test]
    fn rename_rejects_taken_names() {
        let mut owner = Owner::new("u1");
        owner.add_document(doc("d1", "A"));
        owner.add_document(doc("d2", "B"));
        assert!(owner.rename_document("d1", "B").is_err());
        owner.rename_document("d1", "C").unwrap();
        assert_eq!(owner.get_by_name("C").unwrap().id(), "d1");
        assert!(matches!(
            owner.rename_document("d9", "Z"),
            Err(CoreError::DocumentNotFound { .. })
        ));
    }

    #[test]
    fn attempts_are_ordered() {
        let mut owner = Owner::new("u1");
        owner.add_document(doc("d1", "A"));
        owner.record_attempt(Attempt::start("u1", "d1", 300)).unwrap();
        owner.record_attempt(Attempt::start("u1", "d1", 100)).unwrap();
        assert_eq!(owner.latest_attempt("d1").unwrap().started_at_millis(), 300);
        assert_eq!(owner.attempt_count(), 2);
        assert!(owner.latest_attempt("d2").is_none());
        assert!(owner.record_attempt(Attempt::start("u2", "d1", 1)).is_err());
        assert!(owner.record_attempt(Attempt::start("u1", "d9", 1)).is_err());
    }

    #[test]
    fn add_questions_to_document() {
        let mut owner = Owner::new("u1");
        owner.add_document(doc("d1", "A"));
        let added = owner
            .add_questions(
                "d1",
                vec![
                    Question::new("Q", vec![AnswerOption::new("a", true)]),
                    Question::new("Q2", vec![AnswerOption::new("a", true)]),
                ],
            )
            .unwrap();
        assert_eq!(added, 1);
    }
}
