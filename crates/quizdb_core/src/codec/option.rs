//! Option records.

use super::fields::OptionField;
use super::reader::Reader;
use super::DecodeResult;
use crate::model::AnswerOption;
use quizdb_codec::{CodecResult, Scalar, TokenWriter};

/// Decodes one option object. Returns `None` when it has no text.
pub(crate) fn decode_option(reader: &mut Reader<'_>, field: &str) -> DecodeResult<Option<AnswerOption>> {
    reader.begin_object(field)?;
    let mut text = None;
    let mut is_correct = false;
    let mut explanation = None;
    while let Some(name) = reader.next_field()? {
        match OptionField::lookup(&name) {
            Some(OptionField::Text) => text = reader.read_text()?,
            Some(OptionField::IsCorrect) => is_correct = reader.read_bool()?.unwrap_or(false),
            Some(OptionField::Explanation) => explanation = reader.read_text()?,
            None => reader.skip()?,
        }
    }
    Ok(text
        .filter(|t| !t.is_empty())
        .map(|t| AnswerOption::new(t, is_correct).with_explanation(explanation)))
}

pub(crate) fn write_option(writer: &mut TokenWriter, option: &AnswerOption) -> CodecResult<()> {
    writer.begin_object()?;
    writer.member(OptionField::Text.canonical(), option.text())?;
    writer.member(OptionField::IsCorrect.canonical(), option.is_correct())?;
    writer.member(
        OptionField::Explanation.canonical(),
        Scalar::from(option.explanation()),
    )?;
    writer.end_object()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(text: &str) -> Option<AnswerOption> {
        let mut reader = Reader::new(text);
        decode_option(&mut reader, "option").unwrap()
    }

    #[test]
    fn canonical_fields() {
        let option = decode(r#"{"text":"Paris","isCorrect":true,"explication":"capital"}"#).unwrap();
        assert_eq!(option.text(), "Paris");
        assert!(option.is_correct());
        assert_eq!(option.explanation(), Some("capital"));
    }

    #[test]
    fn aliases_and_defaults() {
        let option = decode(r#"{"explanation":"null","option":"Lyon","correct":false}"#).unwrap();
        assert_eq!(option.text(), "Lyon");
        assert!(!option.is_correct());
        assert_eq!(option.explanation(), None);

        let option = decode(r#"{"text":"Nice","extra":[1,2]}"#).unwrap();
        assert!(!option.is_correct());
    }

    #[test]
    fn missing_text_is_dropped() {
        assert!(decode(r#"{"isCorrect":true}"#).is_none());
        assert!(decode(r#"{"text":"","isCorrect":true}"#).is_none());
    }

    #[test]
    fn absent_explanation_is_written_as_null() {
        let mut writer = TokenWriter::compact();
        write_option(&mut writer, &AnswerOption::new("a", false)).unwrap();
        assert_eq!(
            writer.into_string().unwrap(),
            r#"{"text":"a","isCorrect":false,"explication":null}"#
        );
    }
}
