//! # QuizDB Codec
//!
//! Token-level JSON reading and writing for QuizDB documents.
//!
//! This crate knows nothing about quizzes. It turns text into a flat
//! stream of [`Token`]s and back, so that the document decoders in
//! `quizdb_core` can consume input in a single forward pass without
//! building an intermediate tree.
//!
//! ## Token stream
//!
//! - `ObjectStart` / `ObjectEnd` and `ArrayStart` / `ArrayEnd` bracket containers
//! - `FieldName` precedes every object member value
//! - `Scalar` carries null, booleans, numbers and strings
//!
//! ## Usage
//!
//! ```
//! use quizdb_codec::{Scalar, Token, TokenWriter, Tokenizer};
//!
//! let mut tokens = Tokenizer::new(r#"{"name": "Capitals", "size": 3}"#);
//! assert_eq!(tokens.next_token().unwrap(), Some(Token::ObjectStart));
//! assert_eq!(
//!     tokens.next_token().unwrap(),
//!     Some(Token::FieldName("name".to_string()))
//! );
//!
//! let mut writer = TokenWriter::compact();
//! writer.begin_object().unwrap();
//! writer.member("name", "Capitals").unwrap();
//! writer.end_object().unwrap();
//! assert_eq!(writer.into_string().unwrap(), r#"{"name":"Capitals"}"#);
//! # let _ = Scalar::Null;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod value;

pub use decoder::{tokenize, Tokenizer, DEFAULT_MAX_DEPTH};
pub use encoder::{to_json, TokenWriter};
pub use error::{CodecError, CodecResult};
pub use value::{Scalar, Token};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tokens_survive_writer_and_tokenizer() {
        let text = r#"{"ownerId":"u1","questions":[{"question":"2+2?","options":[{"text":"4","isCorrect":true,"explication":null}]}],"score":-0.5}"#;
        let tokens = tokenize(text).unwrap();
        let written = to_json(&tokens, false).unwrap();
        assert_eq!(written, text);
        assert_eq!(tokenize(&written).unwrap(), tokens);
    }

    #[test]
    fn pretty_output_tokenizes_identically() {
        let text = r#"{"a":[1,2,{"b":"c\nd"}],"e":{}}"#;
        let tokens = tokenize(text).unwrap();
        let pretty = to_json(&tokens, true).unwrap();
        assert!(pretty.contains('\n'));
        assert_eq!(tokenize(&pretty).unwrap(), tokens);
    }

    #[test]
    fn unicode_text_is_preserved() {
        let tokens = vec![Token::Scalar(Scalar::Text("🧪 science é".to_string()))];
        let written = to_json(&tokens, false).unwrap();
        assert_eq!(tokenize(&written).unwrap(), tokens);
    }

    fn scalar() -> impl Strategy<Value = Scalar> {
        prop_oneof![
            Just(Scalar::Null),
            any::<bool>().prop_map(Scalar::Bool),
            any::<i64>().prop_map(Scalar::Integer),
            any::<f64>()
                .prop_filter("finite", |f| f.is_finite())
                .prop_map(Scalar::Float),
            any::<String>().prop_map(Scalar::Text),
        ]
    }

    /// An object of scalar members followed by an array of scalars.
    fn document_tokens() -> impl Strategy<Value = Vec<Token>> {
        (
            prop::collection::vec((any::<String>(), scalar()), 0..8),
            prop::collection::vec(scalar(), 0..8),
        )
            .prop_map(|(members, items)| {
                let mut tokens = vec![Token::ObjectStart];
                for (name, value) in members {
                    tokens.push(Token::FieldName(name));
                    tokens.push(Token::Scalar(value));
                }
                tokens.push(Token::FieldName("items".to_string()));
                tokens.push(Token::ArrayStart);
                tokens.extend(items.into_iter().map(Token::Scalar));
                tokens.push(Token::ArrayEnd);
                tokens.push(Token::ObjectEnd);
                tokens
            })
    }

    proptest! {
        #[test]
        fn written_tokens_read_back(tokens in document_tokens(), pretty in any::<bool>()) {
            let text = to_json(&tokens, pretty).unwrap();
            prop_assert_eq!(tokenize(&text).unwrap(), tokens);
        }

        #[test]
        fn control_characters_and_quotes_survive(text in r#"["\\\x00-\x1fa-z]{0,32}"#) {
            let tokens = vec![Token::Scalar(Scalar::Text(text))];
            let written = to_json(&tokens, false).unwrap();
            prop_assert!(!written[1..written.len() - 1].chars().any(|c| (c as u32) < 0x20));
            prop_assert_eq!(tokenize(&written).unwrap(), tokens);
        }

        #[test]
        fn escaped_surrogate_pairs_decode(c in prop::char::range('\u{10000}', '\u{10FFFF}')) {
            let mut units = [0u16; 2];
            let escaped: String = c
                .encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("\\u{unit:04X}"))
                .collect();
            prop_assert_eq!(
                tokenize(&format!("\"{escaped}\"")).unwrap(),
                vec![Token::Scalar(Scalar::Text(c.to_string()))]
            );
        }
    }
}
