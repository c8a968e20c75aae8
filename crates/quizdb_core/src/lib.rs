//! # QuizDB Core
//!
//! Embedded, file-backed store for quiz documents, scoped per owner.
//!
//! This crate provides:
//! - The data model: [`Document`]s of [`Question`]s of [`AnswerOption`]s,
//!   [`Attempt`]s, and [`OwnerProfile`]s
//! - Alias-tolerant decoders and encoders for each record ([`codec`])
//! - Unique short identifiers ([`IdRegistry`])
//! - An id-sorted document collection with merge-on-conflict ([`DocumentStore`])
//! - A tag index kept in step with the documents ([`TagIndex`])
//! - A filter and sort language ([`QueryEngine`])
//! - The on-disk layout ([`Persistence`]) and the store itself ([`StoreRegistry`])
//!
//! ## Example
//!
//! ```no_run
//! use quizdb_core::{Config, StoreRegistry};
//!
//! let store = StoreRegistry::open(Config::new("data"))?;
//! store.import_text(
//!     "u1",
//!     r#"{"name": "Capitals", "questions": [
//!         {"question": "Capital of Peru?",
//!          "options": [{"text": "Lima", "isCorrect": true}]}]}"#,
//! )?;
//! for document in store.query("u1", "size>0 name=cap.*", Some("-date")) {
//!     println!("{} {}", document.id(), document.name());
//! }
//! # Ok::<(), quizdb_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
mod config;
mod error;
mod id;
pub mod model;
mod owner;
pub mod persistence;
pub mod query;
mod registry;
pub mod store;
mod tags;

pub use codec::{DecodeError, DecodeMode, DropCounts, PartialDocument};
pub use config::{Config, ScoreRules};
pub use error::{CoreError, CoreResult};
pub use id::{derive_code, IdRegistry};
pub use model::{Answer, AnswerOption, Attempt, Document, OwnerProfile, Preferences, Question};
pub use owner::Owner;
pub use persistence::Persistence;
pub use query::{Filter, QueryEngine, Sort, SortKey};
pub use registry::{BatchReport, ImportReport, StoreRegistry, LOCK_FILE};
pub use store::{AddOutcome, DocumentStore};
pub use tags::TagIndex;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Milliseconds since the Unix epoch. Clocks before the epoch read as 0.
#[must_use]
pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}
