//! Document codec.
//!
//! Converts between JSON text and the data model in one forward pass
//! over a [`quizdb_codec::Tokenizer`]. Each record type has its own
//! decoder that reads fields in any order, accepts the aliases listed
//! in [`fields`] and skips unknown fields.
//!
//! ## Absent values
//!
//! JSON `null`, the string `"null"` and a missing field all mean
//! "absent" for optional strings. An empty string is kept as an empty
//! string.
//!
//! ## Validation
//!
//! In [`DecodeMode::Lenient`] questions and options that fail their
//! minimum-content rules are dropped and counted in [`DropCounts`].
//! In [`DecodeMode::Strict`] the first such question fails the decode
//! with [`DecodeError::InvalidQuestion`].

mod attempt;
mod document;
pub mod fields;
mod option;
mod owner;
mod question;
mod reader;

pub use attempt::{decode_attempt, encode_attempt};
pub use document::{decode_document, encode_document, PartialDocument};
pub use owner::{decode_profile, encode_profile};

use quizdb_codec::CodecError;
use thiserror::Error;

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors that abort a decode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The text is not well-formed.
    #[error("malformed input: {0}")]
    Lex(#[from] CodecError),

    /// A scalar appeared where an object or array is required.
    #[error("{field}: expected {expected}, found {found}")]
    NotAContainer {
        /// Where the container was expected.
        field: String,
        /// `"object"` or `"array"`.
        expected: &'static str,
        /// What was found instead.
        found: String,
    },

    /// A required field with no fallback is missing.
    #[error("{record} is missing required field {field}")]
    MissingField {
        /// The record being decoded.
        record: &'static str,
        /// Canonical name of the missing field.
        field: &'static str,
    },

    /// A question failed validation during a strict decode.
    #[error("question {index} is invalid: {reason}")]
    InvalidQuestion {
        /// Position of the question in the input.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },
}

/// How decoders treat questions and options that fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Drop invalid content and count it.
    #[default]
    Lenient,
    /// Fail the decode on the first invalid question.
    Strict,
}

/// Counts of content dropped during a lenient decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DropCounts {
    /// Questions dropped.
    pub questions: usize,
    /// Options dropped from questions that were kept or dropped.
    pub options: usize,
}

impl DropCounts {
    /// Total dropped items.
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions + self.options
    }

    /// Whether nothing was dropped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Adds another set of counts to this one.
    pub fn merge(&mut self, other: DropCounts) {
        self.questions += other.questions;
        self.options += other.options;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_counts() {
        let mut counts = DropCounts::default();
        assert!(counts.is_empty());
        counts.merge(DropCounts {
            questions: 1,
            options: 2,
        });
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn lex_errors_convert() {
        let err: DecodeError = CodecError::UnexpectedEof.into();
        assert!(matches!(err, DecodeError::Lex(_)));
    }
}
