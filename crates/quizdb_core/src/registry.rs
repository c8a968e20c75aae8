//! The store: every owner of one data directory.
//!
//! `StoreRegistry` is the entry point for callers. It holds the data
//! directory lock, the shared [`IdRegistry`], and one [`Owner`] per
//! account behind its own mutex. Mutating methods persist their effect
//! before returning.

use crate::codec::{decode_document, DropCounts};
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::id::IdRegistry;
use crate::model::{Attempt, Document, OwnerProfile};
use crate::now_millis;
use crate::owner::Owner;
use crate::persistence::Persistence;
use crate::query::QueryEngine;
use crate::store::AddOutcome;
use fs2::FileExt;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lock file name in the data directory.
pub const LOCK_FILE: &str = "LOCK";

/// Result of importing a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// What the store did with the document.
    pub outcome: AddOutcome,
    /// Content dropped while decoding.
    pub dropped: DropCounts,
}

/// Result of a batch load or save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Owners processed.
    pub owners: usize,
    /// Documents processed.
    pub documents: usize,
    /// Records that failed; each failure was logged.
    pub failures: usize,
}

/// All owners of one data directory.
///
/// Only one registry may be open per data directory; a second `open`
/// fails with [`CoreError::DataDirLocked`] until the first is dropped.
///
/// Each owner sits behind its own mutex, so callers touching different
/// owners do not contend. Operations on one owner are serialized.
#[derive(Debug)]
pub struct StoreRegistry {
    config: Config,
    persistence: Persistence,
    ids: Arc<IdRegistry>,
    owners: RwLock<HashMap<String, Arc<Mutex<Owner>>>>,
    /// Document id to the owner holding it.
    claims: Mutex<HashMap<String, String>>,
    load_report: BatchReport,
    _lock_file: File,
}

impl StoreRegistry {
    /// Opens the store and loads every owner found on disk.
    ///
    /// An owner that fails to load is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The data directory doesn't exist and `create_if_missing` is false
    /// - Another registry holds the lock (returns `DataDirLocked`)
    /// - The data directory cannot be listed
    pub fn open(config: Config) -> CoreResult<Self> {
        let path = config.data_dir().to_path_buf();
        if !path.exists() {
            if config.create_if_missing {
                fs::create_dir_all(&path)?;
            } else {
                return Err(CoreError::invalid_operation(format!(
                    "data directory does not exist: {}",
                    path.display()
                )));
            }
        }
        if !path.is_dir() {
            return Err(CoreError::invalid_operation(format!(
                "path is not a directory: {}",
                path.display()
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;
        if lock_file.try_lock_exclusive().is_err() {
            return Err(CoreError::DataDirLocked { path });
        }

        let mut registry = Self {
            persistence: Persistence::from_config(&config),
            ids: Arc::new(IdRegistry::new(config.id_length, config.id_max_attempts)),
            config,
            owners: RwLock::new(HashMap::new()),
            claims: Mutex::new(HashMap::new()),
            load_report: BatchReport::default(),
            _lock_file: lock_file,
        };
        registry.load_report = registry.load_all()?;
        Ok(registry)
    }

    /// The configuration the store was opened with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The file layout.
    #[must_use]
    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    /// The shared identifier registry.
    #[must_use]
    pub fn ids(&self) -> &Arc<IdRegistry> {
        &self.ids
    }

    /// The data directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.config.data_dir()
    }

    /// What happened when the store was opened.
    #[must_use]
    pub fn load_report(&self) -> BatchReport {
        self.load_report
    }

    /// Known owner ids, sorted.
    #[must_use]
    pub fn owner_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.owners.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Runs `f` on an owner, if it exists.
    pub fn with_owner<R>(&self, owner_id: &str, f: impl FnOnce(&Owner) -> R) -> Option<R> {
        let owner = self.owners.read().get(owner_id).cloned()?;
        let guard = owner.lock();
        Some(f(&guard))
    }

    /// Runs `f` on an owner, creating it if needed.
    ///
    /// Changes made here are not written to disk; call
    /// [`save_owner`](Self::save_owner) afterwards.
    pub fn with_owner_mut<R>(&self, owner_id: &str, f: impl FnOnce(&mut Owner) -> R) -> R {
        let owner = self.owner(owner_id);
        let mut guard = owner.lock();
        f(&mut guard)
    }

    /// A copy of one document.
    #[must_use]
    pub fn document(&self, owner_id: &str, id: &str) -> Option<Document> {
        self.with_owner(owner_id, |owner| owner.get(id).cloned())
            .flatten()
    }

    /// Adds a document to an owner, merging by id or name, and exports
    /// the result.
    ///
    /// A document without an id gets one. A document whose id belongs to
    /// another owner gets a fresh one.
    ///
    /// # Errors
    ///
    /// Fails if identifier generation is exhausted. Export failures are
    /// logged, not returned.
    pub fn add_document(&self, owner_id: &str, mut document: Document) -> CoreResult<AddOutcome> {
        let mut claims = self.claims.lock();
        let taken = match claims.get(document.id()) {
            Some(holder) => holder != owner_id,
            None => document.id().is_empty(),
        };
        if taken {
            let fresh = self
                .ids
                .generate(&format!("{owner_id}|{}", document.name()), now_millis())?;
            debug!(previous = document.id(), id = %fresh, "assigned fresh document id");
            document.set_id(fresh);
        }
        let incoming = document.id().to_string();

        let owner = self.owner(owner_id);
        let mut owner = owner.lock();
        let outcome = owner.add_document(document);
        self.settle_id(&claims, &incoming, &outcome);
        claims.insert(outcome.id().to_string(), owner_id.to_string());
        drop(claims);

        if outcome.changed() {
            if let Some(stored) = owner.get(outcome.id()) {
                self.persistence.export(stored);
            }
        }
        Ok(outcome)
    }

    /// Decodes a document and adds it to an owner.
    ///
    /// # Errors
    ///
    /// Fails on decode errors, on a document with no name or no valid
    /// questions, and if identifier generation is exhausted.
    pub fn import_text(&self, owner_id: &str, text: &str) -> CoreResult<ImportReport> {
        let partial = decode_document(text, self.config.decode_mode)?;
        let dropped = partial.dropped;
        if !dropped.is_empty() {
            warn!(
                owner = owner_id,
                questions = dropped.questions,
                options = dropped.options,
                "dropped invalid content"
            );
        }
        let mut document = partial.into_document(&self.ids, now_millis())?;
        document.set_owner_id(owner_id);
        if !document.is_valid() {
            return Err(CoreError::invalid_operation(
                "document has no name or no valid questions",
            ));
        }
        let outcome = self.add_document(owner_id, document)?;
        Ok(ImportReport { outcome, dropped })
    }

    /// Reads a file and adds the document in it to an owner.
    ///
    /// # Errors
    ///
    /// Same as [`import_text`](Self::import_text), plus I/O failures.
    pub fn import_file(&self, owner_id: &str, path: &Path) -> CoreResult<ImportReport> {
        let text = fs::read_to_string(path)?;
        self.import_text(owner_id, &text)
    }

    /// Writes one document, returning its path.
    ///
    /// # Errors
    ///
    /// Fails if the document does not exist or cannot be written.
    pub fn export_document(&self, owner_id: &str, id: &str) -> CoreResult<PathBuf> {
        let document = self
            .document(owner_id, id)
            .ok_or_else(|| CoreError::document_not_found(owner_id, id))?;
        self.persistence.write_document(&document)
    }

    /// Deletes a document, its attempts, and their files.
    ///
    /// # Errors
    ///
    /// Fails if a file cannot be removed. The in-memory deletion has
    /// happened by then.
    pub fn delete_document(&self, owner_id: &str, id: &str) -> CoreResult<Option<Document>> {
        let Some(owner) = self.owners.read().get(owner_id).cloned() else {
            return Ok(None);
        };
        let (document, attempts) = {
            let mut owner = owner.lock();
            let attempts = owner.attempts(id).to_vec();
            let Some(document) = owner.delete_document(id) else {
                return Ok(None);
            };
            (document, attempts)
        };
        self.claims.lock().remove(id);

        self.persistence.remove_document(&document)?;
        for attempt in &attempts {
            self.persistence.remove_attempt(attempt)?;
        }
        Ok(Some(document))
    }

    /// Renames a document and moves its file.
    ///
    /// # Errors
    ///
    /// Fails if the document does not exist, the name is taken, or the
    /// file cannot be moved.
    pub fn rename_document(&self, owner_id: &str, id: &str, name: &str) -> CoreResult<()> {
        let owner = self
            .owners
            .read()
            .get(owner_id)
            .cloned()
            .ok_or_else(|| CoreError::document_not_found(owner_id, id))?;
        let mut owner = owner.lock();
        let old_path = owner
            .get(id)
            .map(|document| self.persistence.document_path(document))
            .ok_or_else(|| CoreError::document_not_found(owner_id, id))?;
        owner.rename_document(id, name)?;
        let Some(document) = owner.get(id) else {
            return Err(CoreError::document_not_found(owner_id, id));
        };
        let new_path = self.persistence.write_document(document)?;
        if new_path != old_path {
            if let Err(err) = fs::remove_file(&old_path) {
                warn!(path = %old_path.display(), error = %err, "failed to remove old document file");
            }
        }
        Ok(())
    }

    /// Declares a tag and saves the profile. Returns `true` if it was new.
    ///
    /// # Errors
    ///
    /// Fails on an empty name or if the profile cannot be saved.
    pub fn create_tag(&self, owner_id: &str, name: &str, glyph: &str) -> CoreResult<bool> {
        let owner = self.owner(owner_id);
        let mut owner = owner.lock();
        let created = owner.create_tag(name, glyph)?;
        self.persistence.save_profile(owner.profile())?;
        Ok(created)
    }

    /// Removes a tag everywhere and re-exports the affected documents.
    ///
    /// # Errors
    ///
    /// Fails if the profile cannot be saved.
    pub fn delete_tag(&self, owner_id: &str, name: &str) -> CoreResult<Vec<String>> {
        let Some(owner) = self.owners.read().get(owner_id).cloned() else {
            return Ok(Vec::new());
        };
        let mut owner = owner.lock();
        let affected = owner.delete_tag(name);
        for id in &affected {
            if let Some(document) = owner.get(id) {
                self.persistence.export(document);
            }
        }
        self.persistence.save_profile(owner.profile())?;
        Ok(affected)
    }

    /// Tags a document and re-exports it.
    ///
    /// # Errors
    ///
    /// Fails on an unknown tag or document.
    pub fn tag_document(&self, owner_id: &str, id: &str, tag: &str) -> CoreResult<bool> {
        self.edit_document(owner_id, id, |owner| owner.add_tag_to_document(id, tag))
    }

    /// Removes a tag from a document and re-exports it.
    ///
    /// # Errors
    ///
    /// Fails on an unknown document.
    pub fn untag_document(&self, owner_id: &str, id: &str, tag: &str) -> CoreResult<bool> {
        self.edit_document(owner_id, id, |owner| owner.remove_tag_from_document(id, tag))
    }

    /// Records an attempt and saves it.
    ///
    /// # Errors
    ///
    /// Fails if the document does not exist or the file cannot be
    /// written.
    pub fn record_attempt(&self, attempt: Attempt) -> CoreResult<()> {
        let owner = self
            .owners
            .read()
            .get(attempt.owner_id())
            .cloned()
            .ok_or_else(|| CoreError::document_not_found(attempt.owner_id(), attempt.document_id()))?;
        let mut owner = owner.lock();
        owner.record_attempt(attempt.clone())?;
        self.persistence.save_attempt(&attempt)
    }

    /// Changes an owner's profile and saves it.
    ///
    /// # Errors
    ///
    /// Fails if the profile cannot be saved.
    pub fn update_profile<R>(
        &self,
        owner_id: &str,
        f: impl FnOnce(&mut OwnerProfile) -> R,
    ) -> CoreResult<R> {
        let owner = self.owner(owner_id);
        let mut owner = owner.lock();
        let result = owner.update_profile(f);
        self.persistence.save_profile(owner.profile())?;
        Ok(result)
    }

    /// Saves an owner's profile.
    ///
    /// # Errors
    ///
    /// Fails if the owner is unknown or the profile cannot be saved.
    pub fn save_profile(&self, owner_id: &str) -> CoreResult<()> {
        let profile = self
            .with_owner(owner_id, |owner| owner.profile().clone())
            .ok_or_else(|| CoreError::invalid_operation(format!("unknown owner {owner_id}")))?;
        self.persistence.save_profile(&profile)
    }

    /// Filters and sorts an owner's documents. Unknown owners have none.
    #[must_use]
    pub fn query(&self, owner_id: &str, filter: &str, sort: Option<&str>) -> Vec<Document> {
        let rules = self.config.score_rules;
        self.with_owner(owner_id, |owner| {
            QueryEngine::new(owner, rules)
                .run(filter, sort)
                .into_iter()
                .cloned()
                .collect()
        })
        .unwrap_or_default()
    }

    /// Writes everything one owner has.
    pub fn save_owner(&self, owner_id: &str) -> BatchReport {
        let Some(owner) = self.owners.read().get(owner_id).cloned() else {
            return BatchReport::default();
        };
        let owner = owner.lock();
        self.save_locked(&owner)
    }

    /// Writes every owner. Failures are logged and counted.
    pub fn save_all(&self) -> BatchReport {
        let owners: Vec<Arc<Mutex<Owner>>> = self.owners.read().values().cloned().collect();
        let mut report = BatchReport::default();
        for owner in owners {
            let owner = owner.lock();
            let saved = self.save_locked(&owner);
            report.owners += saved.owners;
            report.documents += saved.documents;
            report.failures += saved.failures;
        }
        info!(
            owners = report.owners,
            documents = report.documents,
            failures = report.failures,
            "saved store"
        );
        report
    }

    fn save_locked(&self, owner: &Owner) -> BatchReport {
        let mut report = BatchReport {
            owners: 1,
            ..BatchReport::default()
        };
        if let Err(err) = self.persistence.save_profile(owner.profile()) {
            warn!(owner = owner.id(), error = %err, "failed to save profile");
            report.failures += 1;
        }
        for document in owner.documents().iter() {
            report.documents += 1;
            if !self.persistence.export(document) {
                report.failures += 1;
            }
        }
        for attempt in owner.all_attempts() {
            if let Err(err) = self.persistence.save_attempt(attempt) {
                warn!(owner = owner.id(), error = %err, "failed to save attempt");
                report.failures += 1;
            }
        }
        report
    }

    fn edit_document(
        &self,
        owner_id: &str,
        id: &str,
        f: impl FnOnce(&mut Owner) -> CoreResult<bool>,
    ) -> CoreResult<bool> {
        let owner = self
            .owners
            .read()
            .get(owner_id)
            .cloned()
            .ok_or_else(|| CoreError::document_not_found(owner_id, id))?;
        let mut owner = owner.lock();
        let changed = f(&mut owner)?;
        if changed {
            if let Some(document) = owner.get(id) {
                self.persistence.export(document);
            }
        }
        Ok(changed)
    }

    fn owner(&self, owner_id: &str) -> Arc<Mutex<Owner>> {
        if let Some(owner) = self.owners.read().get(owner_id) {
            return Arc::clone(owner);
        }
        Arc::clone(
            self.owners
                .write()
                .entry(owner_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Owner::new(owner_id)))),
        )
    }

    /// Reserves the id a document was stored under, or hands back the
    /// one it arrived with when it merged into another document.
    fn settle_id(&self, claims: &HashMap<String, String>, incoming: &str, outcome: &AddOutcome) {
        match outcome {
            AddOutcome::Inserted { id } => {
                self.ids.register(id);
            }
            AddOutcome::Merged { id, .. } if id != incoming && !claims.contains_key(incoming) => {
                self.ids.release(incoming);
            }
            AddOutcome::Merged { .. } => {}
        }
    }

    fn load_all(&self) -> CoreResult<BatchReport> {
        let mut report = BatchReport::default();
        for owner_id in self.persistence.list_owner_ids()? {
            match self.load_owner(&owner_id) {
                Ok(owner) => {
                    report.owners += 1;
                    report.documents += owner.documents().len();
                    self.owners
                        .write()
                        .insert(owner_id, Arc::new(Mutex::new(owner)));
                }
                Err(err) => {
                    warn!(owner = %owner_id, error = %err, "skipping owner");
                    report.failures += 1;
                }
            }
        }
        info!(
            owners = report.owners,
            documents = report.documents,
            failures = report.failures,
            "loaded store"
        );
        Ok(report)
    }

    fn load_owner(&self, owner_id: &str) -> CoreResult<Owner> {
        let mut profile = self
            .persistence
            .load_profile(owner_id)?
            .unwrap_or_else(|| OwnerProfile::new(owner_id));
        // the directory name wins over the id inside the file
        profile.id = owner_id.to_string();
        let mut owner = Owner::with_profile(profile);

        let now = now_millis();
        let mut claims = self.claims.lock();
        // previous id -> (file it was read from, id it is held under now)
        let mut moved: HashMap<String, (PathBuf, String)> = HashMap::new();
        for (path, mut document) in self.persistence.import_owner(owner_id, &self.ids, now)? {
            let mut previous = None;
            if claims.get(document.id()).is_some_and(|holder| holder != owner_id) {
                let fresh = self
                    .ids
                    .generate(&format!("{owner_id}|{}", document.name()), now)?;
                warn!(owner = owner_id, previous = document.id(), id = %fresh, "document id claimed by another owner");
                previous = Some(document.id().to_string());
                document.set_id(fresh);
            }
            let incoming = document.id().to_string();
            let outcome = owner.add_document(document);
            self.settle_id(&claims, &incoming, &outcome);
            claims.insert(outcome.id().to_string(), owner_id.to_string());
            if let Some(previous) = previous {
                moved.insert(previous, (path, outcome.id().to_string()));
            }
        }
        drop(claims);

        for (stale, id) in moved.values() {
            let Some(document) = owner.get(id) else {
                continue;
            };
            if self.persistence.export(document)
                && *stale != self.persistence.document_path(document)
            {
                if let Err(err) = self.persistence.remove_document_file(stale) {
                    warn!(owner = owner_id, path = %stale.display(), error = %err, "failed to remove stale document file");
                }
            }
        }

        for mut attempt in self.persistence.load_attempts(owner_id)? {
            if let Some((_, id)) = moved.get(attempt.document_id()) {
                let stale = attempt.clone();
                attempt.set_document_id(id.clone());
                let rewritten = self
                    .persistence
                    .save_attempt(&attempt)
                    .and_then(|()| self.persistence.remove_attempt(&stale));
                if let Err(err) = rewritten {
                    warn!(owner = owner_id, id = %id, error = %err, "failed to move attempt");
                }
            }
            if let Err(err) = owner.record_attempt(attempt) {
                warn!(owner = owner_id, error = %err, "skipping attempt");
            }
        }
        debug!(
            owner = owner_id,
            documents = owner.documents().len(),
            attempts = owner.attempt_count(),
            "loaded owner"
        );
        Ok(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerOption, Question};
    use tempfile::tempdir;

    fn document(id: &str, name: &str, questions: &[&str]) -> Document {
        Document::new("", name, id, 1000).with_questions(
            questions
                .iter()
                .map(|q| Question::new(*q, vec![AnswerOption::new("yes", true)])),
        )
    }

    #[test]
    fn second_open_is_locked() {
        let dir = tempdir().unwrap();
        let _store = StoreRegistry::open(Config::new(dir.path())).unwrap();
        let second = StoreRegistry::open(Config::new(dir.path()));
        assert!(matches!(second, Err(CoreError::DataDirLocked { .. })));
    }

    #[test]
    fn missing_dir_without_create() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path().join("absent")).create_if_missing(false);
        assert!(StoreRegistry::open(config).is_err());
    }

    #[test]
    fn add_persists_and_reloads() {
        let dir = tempdir().unwrap();
        {
            let store = StoreRegistry::open(Config::new(dir.path())).unwrap();
            let outcome = store.add_document("u1", document("d1", "Capitals", &["Q1"])).unwrap();
            assert_eq!(outcome, AddOutcome::Inserted { id: "d1".into() });
            store.create_tag("u1", "geo", "🌍").unwrap();
            assert!(store.tag_document("u1", "d1", "geo").unwrap());
        }
        let store = StoreRegistry::open(Config::new(dir.path())).unwrap();
        assert_eq!(store.owner_ids(), vec!["u1"]);
        let doc = store.document("u1", "d1").unwrap();
        assert_eq!(doc.owner_id(), "u1");
        assert!(doc.has_tag("geo"));
        assert!(store.ids().contains("d1"));
        assert_eq!(store.load_report().documents, 1);
    }

    #[test]
    fn id_claimed_by_other_owner_is_replaced() {
        let dir = tempdir().unwrap();
        let store = StoreRegistry::open(Config::new(dir.path())).unwrap();
        store.add_document("u1", document("d1", "A", &["Q"])).unwrap();
        let outcome = store.add_document("u2", document("d1", "B", &["Q"])).unwrap();
        assert!(matches!(outcome, AddOutcome::Inserted { .. }));
        assert_ne!(outcome.id(), "d1");
        assert_eq!(store.document("u1", "d1").unwrap().name(), "A");
    }

    #[test]
    fn import_text_merges() {
        let dir = tempdir().unwrap();
        let store = StoreRegistry::open(Config::new(dir.path())).unwrap();
        let text = r#"{"name":"Capitals","questions":[
            {"question":"Q1","options":[{"text":"a","isCorrect":true}]},
            {"question":"bad","options":[]}]}"#;
        let first = store.import_text("u1", text).unwrap();
        assert_eq!(first.dropped.questions, 1);
        let id = first.outcome.id().to_string();
        assert_eq!(id.len(), 7);

        let second = store.import_text("u1", text).unwrap();
        assert_eq!(
            second.outcome,
            AddOutcome::Merged { id, added: 0 }
        );
        assert!(store
            .import_text("u1", r#"{"name":"Empty","questions":[]}"#)
            .is_err());
    }

    #[test]
    fn delete_removes_files() {
        let dir = tempdir().unwrap();
        let store = StoreRegistry::open(Config::new(dir.path())).unwrap();
        store.add_document("u1", document("d1", "A", &["Q"])).unwrap();
        store.record_attempt(Attempt::start("u1", "d1", 5)).unwrap();
        let doc = store.document("u1", "d1").unwrap();
        let path = store.persistence().document_path(&doc);
        let attempt_path = store
            .persistence()
            .attempt_path(&Attempt::start("u1", "d1", 5));
        assert!(path.exists());
        assert!(attempt_path.exists());

        assert!(store.delete_document("u1", "d1").unwrap().is_some());
        assert!(!path.exists());
        assert!(!attempt_path.exists());
        assert!(store.delete_document("u1", "d1").unwrap().is_none());
    }

    #[test]
    fn rename_moves_file() {
        let dir = tempdir().unwrap();
        let store = StoreRegistry::open(Config::new(dir.path())).unwrap();
        store.add_document("u1", document("d1", "Old", &["Q"])).unwrap();
        let old = store.persistence().document_path(&store.document("u1", "d1").unwrap());
        store.rename_document("u1", "d1", "New").unwrap();
        let new = store.persistence().document_path(&store.document("u1", "d1").unwrap());
        assert!(!old.exists());
        assert!(new.exists());
    }

    #[test]
    fn query_through_registry() {
        let dir = tempdir().unwrap();
        let store = StoreRegistry::open(Config::new(dir.path())).unwrap();
        store.add_document("u1", document("d1", "Small", &["Q"])).unwrap();
        store
            .add_document("u1", document("d2", "Large", &["Q1", "Q2", "Q3", "Q4"]))
            .unwrap();
        let names: Vec<String> = store
            .query("u1", "size>3", None)
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, vec!["Large"]);
        assert!(store.query("nobody", "", None).is_empty());
    }

    #[test]
    fn save_all_counts() {
        let dir = tempdir().unwrap();
        let store = StoreRegistry::open(Config::new(dir.path())).unwrap();
        store.add_document("u1", document("d1", "A", &["Q"])).unwrap();
        store.add_document("u2", document("d2", "B", &["Q"])).unwrap();
        let report = store.save_all();
        assert_eq!(
            report,
            BatchReport {
                owners: 2,
                documents: 2,
                failures: 0
            }
        );
    }

    #[test]
    fn save_all_counts_failures() {
        let dir = tempdir().unwrap();
        let store = StoreRegistry::open(Config::new(dir.path())).unwrap();
        store.add_document("u1", document("d1", "A", &["Q"])).unwrap();
        store.add_document("u2", document("d2", "B", &["Q"])).unwrap();
        // a plain file where u2's userdata directory should be
        let profile = store.persistence().profile_path("u2");
        let blocked = profile.parent().unwrap();
        fs::create_dir_all(blocked.parent().unwrap()).unwrap();
        fs::write(blocked, "not a directory").unwrap();

        let report = store.save_all();
        assert_eq!(
            report,
            BatchReport {
                owners: 2,
                documents: 2,
                failures: 1
            }
        );
        assert!(store.persistence().profile_path("u1").exists());
    }

    #[test]
    fn unreadable_owner_is_skipped_on_open() {
        let dir = tempdir().unwrap();
        {
            let store = StoreRegistry::open(Config::new(dir.path())).unwrap();
            store.add_document("u1", document("d1", "A", &["Q"])).unwrap();
            store.add_document("u2", document("d2", "B", &["Q"])).unwrap();
        }
        let profile = Persistence::new(dir.path(), dir.path().join("userdata")).profile_path("u1");
        fs::create_dir_all(profile.parent().unwrap()).unwrap();
        fs::write(&profile, r#"{"id": ["#).unwrap();

        let store = StoreRegistry::open(Config::new(dir.path())).unwrap();
        assert_eq!(
            store.load_report(),
            BatchReport {
                owners: 1,
                documents: 1,
                failures: 1
            }
        );
        assert_eq!(store.owner_ids(), vec!["u2"]);
        assert!(store.document("u2", "d2").is_some());
        assert!(store.document("u1", "d1").is_none());
    }

    #[test]
    fn merged_document_does_not_keep_its_id() {
        let dir = tempdir().unwrap();
        let store = StoreRegistry::open(Config::new(dir.path())).unwrap();
        store.add_document("u1", document("d1", "Capitals", &["Q1"])).unwrap();
        let outcome = store
            .add_document("u1", document("zz", "Capitals", &["Q2"]))
            .unwrap();
        assert_eq!(outcome, AddOutcome::Merged { id: "d1".into(), added: 1 });
        assert!(store.ids().contains("d1"));
        assert!(!store.ids().contains("zz"));

        let text = r#"{"name":"Rivers","questions":[{"question":"Q","options":[{"text":"a","isCorrect":true}]}]}"#;
        store.import_text("u1", text).unwrap();
        let reserved = store.ids().len();
        store.import_text("u1", text).unwrap();
        assert_eq!(store.ids().len(), reserved);
    }

    #[test]
    fn reassigned_id_is_written_back_on_open() {
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(dir.path(), dir.path().join("userdata"));
        let mut first = document("x1", "A", &["Q"]);
        first.set_owner_id("u1");
        let mut second = document("x1", "B", &["Q"]);
        second.set_owner_id("u2");
        assert!(persistence.export(&first));
        assert!(persistence.export(&second));
        let stale_attempt = Attempt::start("u2", "x1", 5);
        persistence.save_attempt(&stale_attempt).unwrap();

        let moved = {
            let store = StoreRegistry::open(Config::new(dir.path())).unwrap();
            assert_eq!(store.document("u1", "x1").unwrap().name(), "A");
            let moved = store
                .with_owner("u2", |owner| {
                    owner.documents().iter().map(|d| d.id().to_string()).collect::<Vec<_>>()
                })
                .unwrap();
            assert_eq!(moved.len(), 1);
            let moved = moved[0].clone();
            assert_ne!(moved, "x1");

            let current = store
                .persistence()
                .document_path(&store.document("u2", &moved).unwrap());
            assert_eq!(store.persistence().document_files("u2").unwrap(), vec![current]);
            assert!(!persistence.document_path(&second).exists());
            store
                .with_owner("u2", |owner| assert_eq!(owner.attempts(&moved).len(), 1))
                .unwrap();
            moved
        };
        assert!(!persistence.attempt_path(&stale_attempt).exists());
        assert!(persistence
            .attempt_path(&Attempt::start("u2", moved.as_str(), 5))
            .exists());

        let store = StoreRegistry::open(Config::new(dir.path())).unwrap();
        assert_eq!(store.document("u2", &moved).unwrap().name(), "B");
        assert_eq!(store.persistence().document_files("u2").unwrap().len(), 1);
        assert_eq!(store.load_report().documents, 2);
    }
}
