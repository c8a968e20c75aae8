//! Incremental JSON tokenizer.

use crate::error::{CodecError, CodecResult};
use crate::value::{Scalar, Token};

/// Tokenize a complete document into a vector.
///
/// Mostly useful in tests; decoders should pull tokens from a
/// [`Tokenizer`] one at a time instead.
///
/// # Errors
///
/// Returns an error if the text is not a single well-formed JSON value.
pub fn tokenize(text: &str) -> CodecResult<Vec<Token>> {
    let mut tokenizer = Tokenizer::new(text);
    let mut tokens = Vec::new();
    while let Some(token) = tokenizer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

/// Default container nesting limit.
///
/// Quiz documents nest four levels deep; anything far beyond that is
/// not a document we wrote.
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting the top-level value.
    Start,
    /// Just after `{`: a key or `}`.
    ObjectFirst,
    /// After a member value: `,` or `}`.
    ObjectNext,
    /// After `key:`: a value.
    Value,
    /// Just after `[`: a value or `]`.
    ArrayFirst,
    /// After an element: `,` or `]`.
    ArrayNext,
    /// The top-level value is complete.
    Done,
}

/// A forward-only tokenizer over JSON text.
///
/// The tokenizer never builds a tree: each call to [`next_token`]
/// scans just enough input to produce one [`Token`]. Object keys are
/// reported as [`Token::FieldName`], so consumers can dispatch on field
/// names without tracking the key/value alternation themselves.
///
/// [`next_token`]: Tokenizer::next_token
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    stack: Vec<Frame>,
    state: State,
    peeked: Option<Token>,
    poisoned: bool,
    max_depth: usize,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over the given text.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            stack: Vec::new(),
            state: State::Start,
            peeked: None,
            poisoned: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the maximum container nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Byte offset of the next unread character.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Current container nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Return the next token without consuming it.
    pub fn peek(&mut self) -> CodecResult<Option<&Token>> {
        if self.peeked.is_none() {
            self.peeked = self.read_token()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// Consume and return the next token.
    ///
    /// Returns `Ok(None)` once the top-level value is complete and only
    /// whitespace remains.
    pub fn next_token(&mut self) -> CodecResult<Option<Token>> {
        if let Some(token) = self.peeked.take() {
            return Ok(Some(token));
        }
        self.read_token()
    }

    /// Skip the value that follows, including any nested containers.
    ///
    /// Call this right after a [`Token::FieldName`] to ignore the
    /// member, or inside an array to ignore one element.
    pub fn skip_value(&mut self) -> CodecResult<()> {
        let mut depth = 0usize;
        loop {
            match self.next_token()?.ok_or(CodecError::UnexpectedEof)? {
                Token::ObjectStart | Token::ArrayStart => depth += 1,
                Token::ObjectEnd | Token::ArrayEnd => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Token::FieldName(_) => {}
                Token::Scalar(_) => {
                    if depth == 0 {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Verify that nothing but whitespace follows the top-level value.
    pub fn finish(&mut self) -> CodecResult<()> {
        match self.next_token()? {
            None => Ok(()),
            Some(_) => Err(CodecError::TrailingCharacters { offset: self.pos }),
        }
    }

    fn read_token(&mut self) -> CodecResult<Option<Token>> {
        if self.poisoned {
            return Ok(None);
        }
        let result = self.scan();
        if result.is_err() {
            self.poisoned = true;
        }
        result
    }

    fn scan(&mut self) -> CodecResult<Option<Token>> {
        self.skip_whitespace();
        match self.state {
            State::Done => {
                if self.pos < self.input.len() {
                    Err(CodecError::TrailingCharacters { offset: self.pos })
                } else {
                    Ok(None)
                }
            }
            State::Start | State::Value => self.read_value().map(Some),
            State::ObjectFirst => match self.peek_byte()? {
                b'}' => self.close(Frame::Object).map(Some),
                b'"' => self.read_key().map(Some),
                _ => Err(self.unexpected()),
            },
            State::ObjectNext => match self.peek_byte()? {
                b'}' => self.close(Frame::Object).map(Some),
                b',' => {
                    self.pos += 1;
                    self.skip_whitespace();
                    if self.peek_byte()? == b'"' {
                        self.read_key().map(Some)
                    } else {
                        Err(self.unexpected())
                    }
                }
                _ => Err(self.unexpected()),
            },
            State::ArrayFirst => match self.peek_byte()? {
                b']' => self.close(Frame::Array).map(Some),
                _ => self.read_value().map(Some),
            },
            State::ArrayNext => match self.peek_byte()? {
                b']' => self.close(Frame::Array).map(Some),
                b',' => {
                    self.pos += 1;
                    self.skip_whitespace();
                    self.read_value().map(Some)
                }
                _ => Err(self.unexpected()),
            },
        }
    }

    fn read_value(&mut self) -> CodecResult<Token> {
        match self.peek_byte()? {
            b'{' => self.open(Frame::Object),
            b'[' => self.open(Frame::Array),
            b'"' => {
                let text = self.read_string()?;
                self.after_value();
                Ok(Token::Scalar(Scalar::Text(text)))
            }
            b't' => self.read_literal("true", Scalar::Bool(true)),
            b'f' => self.read_literal("false", Scalar::Bool(false)),
            b'n' => self.read_literal("null", Scalar::Null),
            b'-' | b'0'..=b'9' => {
                let number = self.read_number()?;
                self.after_value();
                Ok(Token::Scalar(number))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn read_key(&mut self) -> CodecResult<Token> {
        let key = self.read_string()?;
        self.skip_whitespace();
        if self.peek_byte()? != b':' {
            return Err(self.unexpected());
        }
        self.pos += 1;
        self.state = State::Value;
        Ok(Token::FieldName(key))
    }

    fn open(&mut self, frame: Frame) -> CodecResult<Token> {
        if self.stack.len() >= self.max_depth {
            return Err(CodecError::DepthLimitExceeded {
                max_depth: self.max_depth,
            });
        }
        self.pos += 1;
        self.stack.push(frame);
        Ok(match frame {
            Frame::Object => {
                self.state = State::ObjectFirst;
                Token::ObjectStart
            }
            Frame::Array => {
                self.state = State::ArrayFirst;
                Token::ArrayStart
            }
        })
    }

    fn close(&mut self, frame: Frame) -> CodecResult<Token> {
        // The state machine only reaches here with a matching frame on top.
        debug_assert_eq!(self.stack.last(), Some(&frame));
        self.pos += 1;
        self.stack.pop();
        self.after_value();
        Ok(match frame {
            Frame::Object => Token::ObjectEnd,
            Frame::Array => Token::ArrayEnd,
        })
    }

    fn after_value(&mut self) {
        self.state = match self.stack.last() {
            Some(Frame::Object) => State::ObjectNext,
            Some(Frame::Array) => State::ArrayNext,
            None => State::Done,
        };
    }

    fn read_literal(&mut self, word: &str, value: Scalar) -> CodecResult<Token> {
        if self.input[self.pos..].starts_with(word) {
            self.pos += word.len();
            self.after_value();
            Ok(Token::Scalar(value))
        } else if self.input.len() - self.pos < word.len()
            && word.starts_with(&self.input[self.pos..])
        {
            Err(CodecError::UnexpectedEof)
        } else {
            Err(self.unexpected())
        }
    }

    fn read_number(&mut self) -> CodecResult<Scalar> {
        let input = self.input;
        let start = self.pos;
        let bytes = input.as_bytes();
        let mut end = start;
        let mut integral = true;

        if bytes.get(end) == Some(&b'-') {
            end += 1;
        }
        let digits_start = end;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        let mut valid = end > digits_start;

        if bytes.get(end) == Some(&b'.') {
            integral = false;
            end += 1;
            let frac_start = end;
            while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                end += 1;
            }
            valid &= end > frac_start;
        }
        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            integral = false;
            end += 1;
            if matches!(bytes.get(end), Some(b'+' | b'-')) {
                end += 1;
            }
            let exp_start = end;
            while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                end += 1;
            }
            valid &= end > exp_start;
        }

        let text = &input[start..end];
        self.pos = end;
        let invalid = || CodecError::InvalidNumber {
            text: text.to_string(),
            offset: start,
        };
        if !valid {
            return Err(invalid());
        }
        if integral {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Scalar::Integer(n));
            }
        }
        text.parse::<f64>().map(Scalar::Float).map_err(|_| invalid())
    }

    fn read_string(&mut self) -> CodecResult<String> {
        // Opening quote.
        self.pos += 1;
        let mut out = String::new();
        loop {
            let rest = &self.input[self.pos..];
            // Copy the run up to the next quote, backslash or control char.
            let run = rest
                .find(|c: char| c == '"' || c == '\\' || (c as u32) < 0x20)
                .ok_or(CodecError::UnexpectedEof)?;
            out.push_str(&rest[..run]);
            self.pos += run;

            match self.next_char()? {
                '"' => return Ok(out),
                '\\' => {
                    let escape_at = self.pos - 1;
                    let decoded = match self.next_char()? {
                        '"' => '"',
                        '\\' => '\\',
                        '/' => '/',
                        'b' => '\u{0008}',
                        'f' => '\u{000c}',
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        'u' => self.read_unicode_escape(escape_at)?,
                        _ => return Err(CodecError::InvalidEscape { offset: escape_at }),
                    };
                    out.push(decoded);
                }
                control => {
                    return Err(CodecError::UnexpectedChar {
                        found: control,
                        offset: self.pos - control.len_utf8(),
                    })
                }
            }
        }
    }

    fn read_unicode_escape(&mut self, escape_at: usize) -> CodecResult<char> {
        let high = self.read_hex4(escape_at)?;
        let code = match high {
            0xD800..=0xDBFF => {
                if !self.input[self.pos..].starts_with("\\u") {
                    return Err(CodecError::InvalidEscape { offset: escape_at });
                }
                self.pos += 2;
                let low = self.read_hex4(escape_at)?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(CodecError::InvalidEscape { offset: escape_at });
                }
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            }
            0xDC00..=0xDFFF => return Err(CodecError::InvalidEscape { offset: escape_at }),
            other => other,
        };
        char::from_u32(code).ok_or(CodecError::InvalidEscape { offset: escape_at })
    }

    fn read_hex4(&mut self, escape_at: usize) -> CodecResult<u32> {
        let digits = self
            .input
            .get(self.pos..self.pos + 4)
            .ok_or(CodecError::UnexpectedEof)?;
        let value = u32::from_str_radix(digits, 16)
            .ok()
            .filter(|_| digits.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or(CodecError::InvalidEscape { offset: escape_at })?;
        self.pos += 4;
        Ok(value)
    }

    fn next_char(&mut self) -> CodecResult<char> {
        let c = self.input[self.pos..]
            .chars()
            .next()
            .ok_or(CodecError::UnexpectedEof)?;
        self.pos += c.len_utf8();
        Ok(c)
    }

    fn peek_byte(&self) -> CodecResult<u8> {
        self.input
            .as_bytes()
            .get(self.pos)
            .copied()
            .ok_or(CodecError::UnexpectedEof)
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.input.as_bytes();
        while matches!(bytes.get(self.pos), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn unexpected(&self) -> CodecError {
        match self.input[self.pos..].chars().next() {
            Some(found) => CodecError::UnexpectedChar {
                found,
                offset: self.pos,
            },
            None => CodecError::UnexpectedEof,
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = CodecResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}
