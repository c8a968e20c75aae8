//! On-disk layout and file I/O.
//!
//! ```text
//! <data_dir>/
//! ├─ LOCK                                   # held by an open StoreRegistry
//! └─ <ownerId>/
//!    └─ [<theme>-]<name>-<id>.json          # one file per document
//!
//! <userdata_dir>/                           # defaults to <data_dir>/userdata
//! └─ <ownerId>/
//!    ├─ owner-data.json                     # profile and tag vocabulary
//!    └─ attempts/
//!       └─ <documentId>-<startedAtMillis>.json
//! ```
//!
//! Every write goes to a temporary file first and is renamed into
//! place, so a reader never sees a half-written record.

use crate::codec::{
    decode_attempt, decode_document, decode_profile, encode_attempt, encode_document,
    encode_profile, DecodeMode, PartialDocument,
};
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::id::IdRegistry;
use crate::model::{Attempt, Document, OwnerProfile};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the profile file inside an owner's userdata directory.
pub const PROFILE_FILE: &str = "owner-data.json";
/// Directory holding an owner's attempts.
pub const ATTEMPTS_DIR: &str = "attempts";
/// Extension of every record file.
pub const EXTENSION: &str = "json";
const TEMP_SUFFIX: &str = ".tmp";

/// Replaces characters that cannot appear in a file name component.
///
/// Spaces and path separators become `_`. An empty result becomes `_`.
#[must_use]
pub fn sanitize(component: &str) -> String {
    let cleaned: String = component
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Maps records to files and reads and writes them.
#[derive(Debug, Clone)]
pub struct Persistence {
    data_dir: PathBuf,
    userdata_dir: PathBuf,
    pretty: bool,
    decode_mode: DecodeMode,
}

impl Persistence {
    /// Creates a persistence layer over the given roots.
    pub fn new(data_dir: impl Into<PathBuf>, userdata_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            userdata_dir: userdata_dir.into(),
            pretty: true,
            decode_mode: DecodeMode::Lenient,
        }
    }

    /// Creates a persistence layer from a configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            userdata_dir: config.resolved_userdata_dir(),
            pretty: config.pretty_output,
            decode_mode: config.decode_mode,
        }
    }

    /// Sets whether written files are indented.
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Sets the decode mode used when reading documents.
    #[must_use]
    pub fn decode_mode(mut self, mode: DecodeMode) -> Self {
        self.decode_mode = mode;
        self
    }

    /// The documents root.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The owner metadata root.
    #[must_use]
    pub fn userdata_dir(&self) -> &Path {
        &self.userdata_dir
    }

    /// Directory holding an owner's documents.
    #[must_use]
    pub fn owner_dir(&self, owner_id: &str) -> PathBuf {
        self.data_dir.join(sanitize(owner_id))
    }

    /// File of a document: `<owner>/<theme>-<name>-<id>.json`, or
    /// `<owner>/<name>-<id>.json` without a theme.
    ///
    /// The id keeps two documents apart when their names only differ in
    /// characters that [`sanitize`] replaces.
    #[must_use]
    pub fn document_path(&self, document: &Document) -> PathBuf {
        let stem = match document.theme() {
            Some(theme) => format!("{}-{}", sanitize(theme), sanitize(document.name())),
            None => sanitize(document.name()),
        };
        self.owner_dir(document.owner_id())
            .join(format!("{stem}-{}.{EXTENSION}", sanitize(document.id())))
    }

    /// File of an owner's profile.
    #[must_use]
    pub fn profile_path(&self, owner_id: &str) -> PathBuf {
        self.userdata_dir.join(sanitize(owner_id)).join(PROFILE_FILE)
    }

    /// Directory of an owner's attempts.
    #[must_use]
    pub fn attempts_dir(&self, owner_id: &str) -> PathBuf {
        self.userdata_dir.join(sanitize(owner_id)).join(ATTEMPTS_DIR)
    }

    /// File of an attempt.
    #[must_use]
    pub fn attempt_path(&self, attempt: &Attempt) -> PathBuf {
        self.attempts_dir(attempt.owner_id()).join(format!(
            "{}-{}.{EXTENSION}",
            sanitize(attempt.document_id()),
            attempt.started_at_millis()
        ))
    }

    /// Writes a document, returning its path.
    ///
    /// # Errors
    ///
    /// Returns encoding and I/O failures.
    pub fn write_document(&self, document: &Document) -> CoreResult<PathBuf> {
        let path = self.document_path(document);
        let text = encode_document(document, self.pretty)?;
        atomic_write(&path, text.as_bytes())?;
        debug!(path = %path.display(), "exported document");
        Ok(path)
    }

    /// Writes a document, logging instead of returning failures.
    ///
    /// Returns whether the file was written.
    pub fn export(&self, document: &Document) -> bool {
        match self.write_document(document) {
            Ok(_) => true,
            Err(err) => {
                warn!(
                    owner = document.owner_id(),
                    id = document.id(),
                    error = %err,
                    "failed to export document"
                );
                false
            }
        }
    }

    /// Reads and decodes a document file without completing it.
    ///
    /// # Errors
    ///
    /// Returns I/O and decode failures.
    pub fn read_document(&self, path: &Path) -> CoreResult<PartialDocument> {
        let text = fs::read_to_string(path)?;
        Ok(decode_document(&text, self.decode_mode)?)
    }

    /// Reads a document file.
    ///
    /// Returns `None` when the file is absent, cannot be decoded, or
    /// holds a document with no name or no valid questions.
    pub fn import(&self, path: &Path, ids: &IdRegistry, now_millis: i64) -> Option<Document> {
        let partial = match self.read_document(path) {
            Ok(partial) => partial,
            Err(CoreError::Io(err)) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot import document");
                return None;
            }
        };
        if !partial.dropped.is_empty() {
            warn!(
                path = %path.display(),
                questions = partial.dropped.questions,
                options = partial.dropped.options,
                "dropped invalid content"
            );
        }
        let document = match partial.into_document(ids, now_millis) {
            Ok(document) => document,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot import document");
                return None;
            }
        };
        if document.is_valid() {
            Some(document)
        } else {
            warn!(path = %path.display(), "ignoring document without name or questions");
            None
        }
    }

    /// Reads every document file of an owner.
    ///
    /// Files that fail to import are logged and skipped.
    ///
    /// # Errors
    ///
    /// Fails only if the owner directory exists but cannot be listed.
    pub fn import_owner(
        &self,
        owner_id: &str,
        ids: &IdRegistry,
        now_millis: i64,
    ) -> CoreResult<Vec<(PathBuf, Document)>> {
        Ok(self
            .document_files(owner_id)?
            .into_iter()
            .filter_map(|path| {
                let document = self.import(&path, ids, now_millis)?;
                Some((path, document))
            })
            .collect())
    }

    /// Document files of an owner, sorted by path.
    ///
    /// # Errors
    ///
    /// Fails if the owner directory exists but cannot be listed.
    pub fn document_files(&self, owner_id: &str) -> CoreResult<Vec<PathBuf>> {
        list_files(&self.owner_dir(owner_id))
    }

    /// Deletes a document's file. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns other I/O failures.
    pub fn remove_document(&self, document: &Document) -> CoreResult<()> {
        remove_file(&self.document_path(document))
    }

    /// Deletes a document file that no longer matches its record.
    ///
    /// # Errors
    ///
    /// Returns I/O failures other than a missing file.
    pub fn remove_document_file(&self, path: &Path) -> CoreResult<()> {
        remove_file(path)
    }

    /// Loads an owner's profile, if one was saved.
    ///
    /// # Errors
    ///
    /// Returns I/O and decode failures other than a missing file.
    pub fn load_profile(&self, owner_id: &str) -> CoreResult<Option<OwnerProfile>> {
        let path = self.profile_path(owner_id);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(decode_profile(&text)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Saves an owner's profile.
    ///
    /// # Errors
    ///
    /// Returns encoding and I/O failures.
    pub fn save_profile(&self, profile: &OwnerProfile) -> CoreResult<()> {
        let text = encode_profile(profile, self.pretty)?;
        atomic_write(&self.profile_path(&profile.id), text.as_bytes())
    }

    /// Loads an owner's attempts. Unreadable files are logged and skipped.
    ///
    /// # Errors
    ///
    /// Fails only if the attempts directory exists but cannot be listed.
    pub fn load_attempts(&self, owner_id: &str) -> CoreResult<Vec<Attempt>> {
        let mut attempts = Vec::new();
        for path in self.attempt_files(owner_id)? {
            let decoded = fs::read_to_string(&path)
                .map_err(CoreError::from)
                .and_then(|text| Ok(decode_attempt(&text)?));
            match decoded {
                Ok(attempt) => attempts.push(attempt),
                Err(err) => warn!(path = %path.display(), error = %err, "skipping attempt"),
            }
        }
        Ok(attempts)
    }

    /// Attempt files of an owner, sorted by path.
    ///
    /// # Errors
    ///
    /// Fails if the attempts directory exists but cannot be listed.
    pub fn attempt_files(&self, owner_id: &str) -> CoreResult<Vec<PathBuf>> {
        list_files(&self.attempts_dir(owner_id))
    }

    /// Saves an attempt.
    ///
    /// # Errors
    ///
    /// Returns encoding and I/O failures.
    pub fn save_attempt(&self, attempt: &Attempt) -> CoreResult<()> {
        let text = encode_attempt(attempt, self.pretty)?;
        atomic_write(&self.attempt_path(attempt), text.as_bytes())
    }

    /// Deletes an attempt's file. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns other I/O failures.
    pub fn remove_attempt(&self, attempt: &Attempt) -> CoreResult<()> {
        remove_file(&self.attempt_path(attempt))
    }

    /// Ids of every owner with documents or userdata on disk.
    ///
    /// # Errors
    ///
    /// Fails if a root exists but cannot be listed.
    pub fn list_owner_ids(&self) -> CoreResult<Vec<String>> {
        let mut owners = list_dirs(&self.data_dir)?
            .into_iter()
            .filter(|dir| *dir != self.userdata_dir)
            .chain(list_dirs(&self.userdata_dir)?)
            .filter_map(|dir| dir.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect::<Vec<_>>();
        owners.sort();
        owners.dedup();
        Ok(owners)
    }
}

/// Writes `contents` to `path` through a temporary file and a rename.
///
/// Parent directories are created as needed.
///
/// # Errors
///
/// Returns I/O failures; the destination is untouched when one occurs.
pub fn atomic_write(path: &Path, contents: &[u8]) -> CoreResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| CoreError::invalid_operation(format!("no parent: {}", path.display())))?;
    fs::create_dir_all(parent)?;

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(TEMP_SUFFIX);
    let temp_path = parent.join(temp_name);

    let mut file = File::create(&temp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    sync_directory(parent)
}

#[cfg(unix)]
fn sync_directory(dir: &Path) -> CoreResult<()> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> CoreResult<()> {
    // NTFS journals metadata; directories cannot be fsynced
    Ok(())
}

fn remove_file(path: &Path) -> CoreResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Record files directly inside `dir`, sorted. A missing directory is empty.
fn list_files(dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(files),
        Err(err) => return Err(err.into()),
    };
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Subdirectories of `dir`. A missing directory is empty.
fn list_dirs(dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(dirs),
        Err(err) => return Err(err.into()),
    };
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    Ok(dirs)
}
