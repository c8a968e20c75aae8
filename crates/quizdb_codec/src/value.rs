//! Token and scalar types.

use std::fmt;

/// A scalar JSON value.
///
/// Containers never appear here: they are represented by the
/// start/end tokens of the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// JSON `null`.
    Null,
    /// JSON `true` / `false`.
    Bool(bool),
    /// A number without fraction or exponent that fits in an `i64`.
    Integer(i64),
    /// Any other number.
    Float(f64),
    /// A string (escapes already resolved).
    Text(String),
}

impl Scalar {
    /// Returns the string payload, if this is a text scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Consumes the scalar and returns the owned string payload.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer.
    ///
    /// Floats with no fractional part are accepted.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Integer(n) => Some(*n),
            Scalar::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    /// Returns the boolean payload.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether this is JSON `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Short name of the scalar kind, for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "boolean",
            Scalar::Integer(_) | Scalar::Float(_) => "number",
            Scalar::Text(_) => "string",
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Integer(n)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Null, Into::into)
    }
}

/// One lexical unit of a JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `{`
    ObjectStart,
    /// `}`
    ObjectEnd,
    /// `[`
    ArrayStart,
    /// `]`
    ArrayEnd,
    /// A key inside an object (the `:` is consumed with it).
    FieldName(String),
    /// A scalar value.
    Scalar(Scalar),
}

impl Token {
    /// Short description of the token, for error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Token::ObjectStart => "object".to_string(),
            Token::ObjectEnd => "end of object".to_string(),
            Token::ArrayStart => "array".to_string(),
            Token::ArrayEnd => "end of array".to_string(),
            Token::FieldName(name) => format!("field {name:?}"),
            Token::Scalar(s) => s.kind().to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_float_is_an_integer() {
        assert_eq!(Scalar::Float(12.0).as_i64(), Some(12));
        assert_eq!(Scalar::Float(12.5).as_i64(), None);
        assert_eq!(Scalar::Text("12".into()).as_i64(), None);
    }

    #[test]
    fn option_converts_to_null() {
        let absent: Option<&str> = None;
        assert_eq!(Scalar::from(absent), Scalar::Null);
        assert_eq!(Scalar::from(Some("x")), Scalar::Text("x".into()));
    }

    #[test]
    fn token_description() {
        assert_eq!(Token::ArrayStart.describe(), "array");
        assert_eq!(Token::Scalar(Scalar::Integer(3)).describe(), "number");
        assert_eq!(Token::FieldName("id".into()).to_string(), "field \"id\"");
    }
}
