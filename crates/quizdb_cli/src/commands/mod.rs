//! CLI command implementations.

pub mod delete;
pub mod export;
pub mod import;
pub mod inspect;
pub mod list;
pub mod tag;
pub mod verify;

use quizdb_core::{Config, CoreResult, DecodeMode, StoreRegistry};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the CLI itself rather than the store.
#[derive(Debug, Error)]
pub enum CliError {
    /// No `--path` given.
    #[error("data path required for {0} (use --path)")]
    MissingPath(&'static str),

    /// A document named on the command line does not exist.
    #[error("document {id} not found for owner {owner}")]
    DocumentNotFound {
        /// Owner id.
        owner: String,
        /// Document id.
        id: String,
    },

    /// Files failed verification.
    #[error("verification failed: {0} invalid file(s)")]
    VerificationFailed(usize),

    /// Some files could not be imported.
    #[error("{0} file(s) could not be imported")]
    ImportFailed(usize),
}

/// Where the store lives and how to read it.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Data directory.
    pub path: PathBuf,
    /// Owner metadata directory override.
    pub userdata: Option<PathBuf>,
    /// Strict decoding.
    pub strict: bool,
}

impl StoreOptions {
    /// Store configuration for these options.
    pub fn config(&self) -> Config {
        let mut config = Config::new(&self.path).decode_mode(if self.strict {
            DecodeMode::Strict
        } else {
            DecodeMode::Lenient
        });
        if let Some(userdata) = &self.userdata {
            config = config.userdata_dir(userdata);
        }
        config
    }

    /// Opens the store.
    pub fn open(&self) -> CoreResult<StoreRegistry> {
        StoreRegistry::open(self.config())
    }
}

/// Prints `value` as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
