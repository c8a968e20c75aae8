//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while reading or writing a token stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Unexpected end of input.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A character that cannot start or continue the current construct.
    #[error("unexpected character {found:?} at byte {offset}")]
    UnexpectedChar {
        /// The offending character.
        found: char,
        /// Byte offset in the input.
        offset: usize,
    },

    /// Malformed escape sequence inside a string.
    #[error("invalid escape sequence at byte {offset}")]
    InvalidEscape {
        /// Byte offset of the backslash.
        offset: usize,
    },

    /// A numeric literal that is not a valid JSON number.
    #[error("invalid number {text:?} at byte {offset}")]
    InvalidNumber {
        /// The literal as written.
        text: String,
        /// Byte offset in the input.
        offset: usize,
    },

    /// Input continues after the top-level value.
    #[error("trailing characters at byte {offset}")]
    TrailingCharacters {
        /// Byte offset of the first trailing character.
        offset: usize,
    },

    /// Container nesting exceeds the configured limit.
    #[error("nesting deeper than {max_depth} levels")]
    DepthLimitExceeded {
        /// The configured limit.
        max_depth: usize,
    },

    /// The writer was driven out of order (e.g. a value without a field name
    /// inside an object, or an unbalanced end).
    #[error("invalid write sequence: {message}")]
    InvalidStructure {
        /// Description of the structural error.
        message: String,
    },
}

impl CodecError {
    /// Create an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }
}
