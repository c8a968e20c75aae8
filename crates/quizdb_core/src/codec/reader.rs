//! Typed reads over a token stream.

use super::{DecodeError, DecodeResult};
use quizdb_codec::{CodecError, Scalar, Token, Tokenizer};
use std::collections::BTreeMap;

/// Kind of container opened by [`Reader::begin_container`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Container {
    Object,
    Array,
}

/// Wraps a [`Tokenizer`] with the reads the record decoders need.
///
/// Scalar reads are tolerant: a value of the wrong scalar kind is
/// coerced when there is an obvious conversion and treated as absent
/// otherwise, and a container where a scalar was expected is skipped
/// and treated as absent.
pub(crate) struct Reader<'a> {
    tokens: Tokenizer<'a>,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            tokens: Tokenizer::new(text),
        }
    }

    fn next(&mut self) -> DecodeResult<Token> {
        self.tokens
            .next_token()?
            .ok_or(DecodeError::Lex(CodecError::UnexpectedEof))
    }

    fn not_a_container(field: &str, expected: &'static str, found: &Token) -> DecodeError {
        DecodeError::NotAContainer {
            field: field.to_string(),
            expected,
            found: found.describe(),
        }
    }

    /// Consumes the `{` of a required object.
    pub(crate) fn begin_object(&mut self, field: &str) -> DecodeResult<()> {
        match self.next()? {
            Token::ObjectStart => Ok(()),
            other => Err(Self::not_a_container(field, "object", &other)),
        }
    }

    /// Consumes the start of an object or array, or a `null`.
    ///
    /// Returns `None` for `null`.
    pub(crate) fn begin_container(&mut self, field: &str) -> DecodeResult<Option<Container>> {
        match self.next()? {
            Token::ObjectStart => Ok(Some(Container::Object)),
            Token::ArrayStart => Ok(Some(Container::Array)),
            Token::Scalar(Scalar::Null) => Ok(None),
            other => Err(Self::not_a_container(field, "object or array", &other)),
        }
    }

    /// Consumes the `[` of an array that may also be `null`.
    ///
    /// Returns `false` for `null`.
    pub(crate) fn begin_optional_array(&mut self, field: &str) -> DecodeResult<bool> {
        match self.next()? {
            Token::ArrayStart => Ok(true),
            Token::Scalar(Scalar::Null) => Ok(false),
            other => Err(Self::not_a_container(field, "array", &other)),
        }
    }

    /// Returns the next field name, or `None` at the end of the object.
    pub(crate) fn next_field(&mut self) -> DecodeResult<Option<String>> {
        match self.next()? {
            Token::FieldName(name) => Ok(Some(name)),
            Token::ObjectEnd => Ok(None),
            other => Err(DecodeError::Lex(CodecError::invalid_structure(format!(
                "expected field name, found {other}"
            )))),
        }
    }

    /// Whether another array element follows. Consumes the `]` when not.
    pub(crate) fn has_element(&mut self) -> DecodeResult<bool> {
        let at_end = match self.tokens.peek()? {
            Some(Token::ArrayEnd) => true,
            Some(_) => false,
            None => return Err(DecodeError::Lex(CodecError::UnexpectedEof)),
        };
        if at_end {
            self.next()?;
        }
        Ok(!at_end)
    }

    /// Skips the next value.
    pub(crate) fn skip(&mut self) -> DecodeResult<()> {
        self.tokens.skip_value()?;
        Ok(())
    }

    /// Checks that the input ends after the top-level value.
    pub(crate) fn finish(&mut self) -> DecodeResult<()> {
        self.tokens.finish()?;
        Ok(())
    }

    /// Reads a scalar, skipping a container in its place.
    pub(crate) fn read_scalar(&mut self) -> DecodeResult<Option<Scalar>> {
        let is_container = matches!(
            self.tokens.peek()?,
            Some(Token::ObjectStart | Token::ArrayStart)
        );
        if is_container {
            self.skip()?;
            return Ok(None);
        }
        match self.next()? {
            Token::Scalar(value) => Ok(Some(value)),
            other => Err(DecodeError::Lex(CodecError::invalid_structure(format!(
                "expected a value, found {other}"
            )))),
        }
    }

    /// Reads an optional string.
    ///
    /// `null` and the string `"null"` are both absent. Numbers and
    /// booleans are converted to their text.
    pub(crate) fn read_text(&mut self) -> DecodeResult<Option<String>> {
        Ok(match self.read_scalar()? {
            Some(Scalar::Text(s)) if s == "null" => None,
            Some(Scalar::Text(s)) => Some(s),
            Some(Scalar::Integer(n)) => Some(n.to_string()),
            Some(Scalar::Float(f)) => Some(f.to_string()),
            Some(Scalar::Bool(b)) => Some(b.to_string()),
            Some(Scalar::Null) | None => None,
        })
    }

    /// Reads an integer. Numeric strings are accepted.
    pub(crate) fn read_i64(&mut self) -> DecodeResult<Option<i64>> {
        Ok(match self.read_scalar()? {
            Some(Scalar::Text(s)) => s.trim().parse().ok(),
            Some(value) => value.as_i64(),
            None => None,
        })
    }

    /// Reads a boolean. `"true"`/`"false"` and `0`/`1` are accepted.
    pub(crate) fn read_bool(&mut self) -> DecodeResult<Option<bool>> {
        Ok(match self.read_scalar()? {
            Some(Scalar::Bool(b)) => Some(b),
            Some(Scalar::Text(s)) if s.eq_ignore_ascii_case("true") => Some(true),
            Some(Scalar::Text(s)) if s.eq_ignore_ascii_case("false") => Some(false),
            Some(Scalar::Integer(0)) => Some(false),
            Some(Scalar::Integer(1)) => Some(true),
            _ => None,
        })
    }

    /// Reads a tag map.
    ///
    /// Accepts an object of tag name to glyph, or an array of tag names
    /// (each with an empty glyph). `null` yields an empty map.
    pub(crate) fn read_tags(&mut self, field: &str) -> DecodeResult<BTreeMap<String, String>> {
        let mut tags = BTreeMap::new();
        match self.begin_container(field)? {
            Some(Container::Object) => {
                while let Some(name) = self.next_field()? {
                    let glyph = self.read_text()?.unwrap_or_default();
                    if !name.is_empty() {
                        tags.insert(name, glyph);
                    }
                }
            }
            Some(Container::Array) => {
                while self.has_element()? {
                    if let Some(name) = self.read_text()? {
                        if !name.is_empty() {
                            tags.insert(name, String::new());
                        }
                    }
                }
            }
            None => {}
        }
        Ok(tags)
    }
}
