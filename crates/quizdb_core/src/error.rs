//! Error types for QuizDB core.

use crate::codec::DecodeError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in QuizDB core operations.
///
/// Lookups that find nothing are not errors: they return `None`.
/// Questions and options that fail validation during a lenient decode
/// are not errors either; they are counted in
/// [`DropCounts`](crate::codec::DropCounts).
#[derive(Debug, Error)]
pub enum CoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A document, attempt or profile could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Text could not be produced for a record.
    #[error("encode error: {0}")]
    Encode(#[from] quizdb_codec::CodecError),

    /// The identifier generator ran out of retries.
    ///
    /// Indicates that the issued set is too large for the configured
    /// identifier length.
    #[error("identifier generation exhausted after {attempts} attempts (length {length})")]
    IdGenerationExhausted {
        /// Number of salts tried.
        attempts: u32,
        /// Configured identifier length.
        length: usize,
    },

    /// Another store already holds the data directory.
    #[error("data directory locked: {path}")]
    DataDirLocked {
        /// The locked directory.
        path: PathBuf,
    },

    /// A tag is not part of the owner's vocabulary.
    #[error("unknown tag {tag:?} for owner {owner_id}")]
    UnknownTag {
        /// The owner.
        owner_id: String,
        /// The tag name.
        tag: String,
    },

    /// A mutation referenced a document that does not exist.
    #[error("document {document_id} not found for owner {owner_id}")]
    DocumentNotFound {
        /// The owner.
        owner_id: String,
        /// The missing document id.
        document_id: String,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates a document not found error.
    pub fn document_not_found(owner_id: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self::DocumentNotFound {
            owner_id: owner_id.into(),
            document_id: document_id.into(),
        }
    }

    /// Creates an unknown tag error.
    pub fn unknown_tag(owner_id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::UnknownTag {
            owner_id: owner_id.into(),
            tag: tag.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let err = CoreError::unknown_tag("u1", "science");
        assert_eq!(err.to_string(), "unknown tag \"science\" for owner u1");

        let err = CoreError::document_not_found("u1", "abc1234");
        assert_eq!(err.to_string(), "document abc1234 not found for owner u1");

        let err = CoreError::IdGenerationExhausted {
            attempts: 64,
            length: 7,
        };
        assert!(err.to_string().contains("64 attempts"));
    }

    #[test]
    fn io_errors_convert() {
        let io = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
