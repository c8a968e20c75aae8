//! JSON token writer.

use crate::error::{CodecError, CodecResult};
use crate::value::{Scalar, Token};

/// Write a token sequence as JSON text.
///
/// # Errors
///
/// Returns an error if the tokens do not form a single balanced value.
pub fn to_json(tokens: &[Token], pretty: bool) -> CodecResult<String> {
    let mut writer = TokenWriter::new(pretty);
    for token in tokens {
        writer.write_token(token)?;
    }
    writer.into_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug)]
struct Frame {
    container: Container,
    /// Members or elements written so far.
    count: usize,
    /// A field name has been written and its value has not.
    awaiting_value: bool,
}

/// Emits JSON text from a sequence of structural calls.
///
/// The writer inserts separators and (optionally) indentation itself,
/// and rejects sequences that would produce invalid JSON, such as a
/// value inside an object with no preceding [`field`](Self::field).
#[derive(Debug)]
pub struct TokenWriter {
    buffer: String,
    stack: Vec<Frame>,
    pretty: bool,
    root_written: bool,
}

const INDENT: &str = "  ";

impl TokenWriter {
    /// Create a writer. `pretty` selects two-space indented output.
    pub fn new(pretty: bool) -> Self {
        Self {
            buffer: String::new(),
            stack: Vec::new(),
            pretty,
            root_written: false,
        }
    }

    /// Create a compact writer.
    pub fn compact() -> Self {
        Self::new(false)
    }

    /// Write any token.
    pub fn write_token(&mut self, token: &Token) -> CodecResult<()> {
        match token {
            Token::ObjectStart => self.begin_object(),
            Token::ObjectEnd => self.end_object(),
            Token::ArrayStart => self.begin_array(),
            Token::ArrayEnd => self.end_array(),
            Token::FieldName(name) => self.field(name),
            Token::Scalar(value) => self.scalar(value),
        }
    }

    /// Open an object.
    pub fn begin_object(&mut self) -> CodecResult<()> {
        self.begin_value()?;
        self.buffer.push('{');
        self.stack.push(Frame {
            container: Container::Object,
            count: 0,
            awaiting_value: false,
        });
        Ok(())
    }

    /// Close the innermost object.
    pub fn end_object(&mut self) -> CodecResult<()> {
        self.end(Container::Object, '}')
    }

    /// Open an array.
    pub fn begin_array(&mut self) -> CodecResult<()> {
        self.begin_value()?;
        self.buffer.push('[');
        self.stack.push(Frame {
            container: Container::Array,
            count: 0,
            awaiting_value: false,
        });
        Ok(())
    }

    /// Close the innermost array.
    pub fn end_array(&mut self) -> CodecResult<()> {
        self.end(Container::Array, ']')
    }

    /// Write an object key. The next call must write its value.
    pub fn field(&mut self, name: &str) -> CodecResult<()> {
        let depth = self.stack.len();
        let pretty = self.pretty;
        let frame = match self.stack.last_mut() {
            Some(frame) if frame.container == Container::Object && !frame.awaiting_value => frame,
            _ => return Err(CodecError::invalid_structure("field name outside an object")),
        };
        if frame.count > 0 {
            self.buffer.push(',');
        }
        frame.count += 1;
        frame.awaiting_value = true;
        if pretty {
            newline(&mut self.buffer, depth);
        }
        write_string(&mut self.buffer, name);
        self.buffer.push(':');
        if pretty {
            self.buffer.push(' ');
        }
        Ok(())
    }

    /// Write a scalar value.
    pub fn scalar(&mut self, value: &Scalar) -> CodecResult<()> {
        self.begin_value()?;
        match value {
            Scalar::Null => self.buffer.push_str("null"),
            Scalar::Bool(true) => self.buffer.push_str("true"),
            Scalar::Bool(false) => self.buffer.push_str("false"),
            Scalar::Integer(n) => self.buffer.push_str(&n.to_string()),
            Scalar::Float(f) => {
                if !f.is_finite() {
                    return Err(CodecError::invalid_structure(
                        "non-finite numbers have no JSON form",
                    ));
                }
                self.buffer.push_str(&format!("{f:?}"));
            }
            Scalar::Text(s) => write_string(&mut self.buffer, s),
        }
        Ok(())
    }

    /// Shorthand for `field(name)` followed by `scalar(value)`.
    pub fn member(&mut self, name: &str, value: impl Into<Scalar>) -> CodecResult<()> {
        self.field(name)?;
        self.scalar(&value.into())
    }

    /// Consume the writer and return the text.
    ///
    /// # Errors
    ///
    /// Fails if a container is still open or nothing was written.
    pub fn into_string(self) -> CodecResult<String> {
        if !self.stack.is_empty() {
            return Err(CodecError::invalid_structure("unclosed container"));
        }
        if !self.root_written {
            return Err(CodecError::invalid_structure("nothing written"));
        }
        let mut buffer = self.buffer;
        if self.pretty {
            buffer.push('\n');
        }
        Ok(buffer)
    }

    fn begin_value(&mut self) -> CodecResult<()> {
        let depth = self.stack.len();
        match self.stack.last_mut() {
            None => {
                if self.root_written {
                    return Err(CodecError::invalid_structure("second top-level value"));
                }
                self.root_written = true;
            }
            Some(frame) => match frame.container {
                Container::Object => {
                    if !frame.awaiting_value {
                        return Err(CodecError::invalid_structure(
                            "object member without a field name",
                        ));
                    }
                    frame.awaiting_value = false;
                }
                Container::Array => {
                    if frame.count > 0 {
                        self.buffer.push(',');
                    }
                    frame.count += 1;
                    if self.pretty {
                        newline(&mut self.buffer, depth);
                    }
                }
            },
        }
        Ok(())
    }

    fn end(&mut self, container: Container, close: char) -> CodecResult<()> {
        match self.stack.last() {
            Some(frame) if frame.container == container && !frame.awaiting_value => {}
            _ => return Err(CodecError::invalid_structure("unbalanced container end")),
        }
        let frame = self.stack.pop();
        if self.pretty && frame.is_some_and(|f| f.count > 0) {
            newline(&mut self.buffer, self.stack.len());
        }
        self.buffer.push(close);
        Ok(())
    }
}

impl Default for TokenWriter {
    fn default() -> Self {
        Self::compact()
    }
}

fn newline(buffer: &mut String, depth: usize) {
    buffer.push('\n');
    for _ in 0..depth {
        buffer.push_str(INDENT);
    }
}

fn write_string(buffer: &mut String, s: &str) {
    buffer.push('"');
    for c in s.chars() {
        match c {
            '"' => buffer.push_str("\\\""),
            '\\' => buffer.push_str("\\\\"),
            '\n' => buffer.push_str("\\n"),
            '\r' => buffer.push_str("\\r"),
            '\t' => buffer.push_str("\\t"),
            '\u{0008}' => buffer.push_str("\\b"),
            '\u{000c}' => buffer.push_str("\\f"),
            c if (c as u32) < 0x20 => buffer.push_str(&format!("\\u{:04x}", c as u32)),
            c => buffer.push(c),
        }
    }
    buffer.push('"');
}
