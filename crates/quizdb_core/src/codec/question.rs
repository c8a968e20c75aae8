//! Question records.

use super::fields::QuestionField;
use super::option::{decode_option, write_option};
use super::reader::Reader;
use super::{DecodeError, DecodeMode, DecodeResult, DropCounts};
use crate::model::Question;
use quizdb_codec::{CodecResult, Scalar, TokenWriter};
use tracing::warn;

/// Decodes the question at position `index`.
///
/// Returns `None` for a question that fails validation in lenient
/// mode; the caller counts it. Dropped options are counted here.
pub(crate) fn decode_question(
    reader: &mut Reader<'_>,
    index: usize,
    mode: DecodeMode,
    drops: &mut DropCounts,
) -> DecodeResult<Option<Question>> {
    reader.begin_object(&format!("questions[{index}]"))?;
    let mut text = None;
    let mut explanation = None;
    let mut image_ref = None;
    let mut options = Vec::new();
    while let Some(name) = reader.next_field()? {
        match QuestionField::lookup(&name) {
            Some(QuestionField::Text) => text = reader.read_text()?,
            Some(QuestionField::Explanation) => explanation = reader.read_text()?,
            Some(QuestionField::ImageRef) => image_ref = reader.read_text()?,
            Some(QuestionField::Options) => {
                let field = format!("questions[{index}].options");
                if reader.begin_optional_array(&field)? {
                    let mut position = 0usize;
                    while reader.has_element()? {
                        let element = format!("{field}[{position}]");
                        match decode_option(reader, &element)? {
                            Some(option) => options.push(option),
                            None if mode == DecodeMode::Strict => {
                                return Err(DecodeError::InvalidQuestion {
                                    index,
                                    reason: format!("option {position} has no text"),
                                });
                            }
                            None => drops.options += 1,
                        }
                        position += 1;
                    }
                }
            }
            None => reader.skip()?,
        }
    }

    let question = Question::new(text.unwrap_or_default(), options)
        .with_explanation(explanation)
        .with_image_ref(image_ref);
    if let Some(reason) = invalid_reason(&question) {
        if mode == DecodeMode::Strict {
            return Err(DecodeError::InvalidQuestion {
                index,
                reason: reason.to_string(),
            });
        }
        warn!(index, reason, "dropping invalid question");
        return Ok(None);
    }
    Ok(Some(question))
}

fn invalid_reason(question: &Question) -> Option<&'static str> {
    if question.text().is_empty() {
        Some("missing text")
    } else if question.options().is_empty() {
        Some("no options")
    } else if question.correct_count() == 0 {
        Some("no correct option")
    } else {
        None
    }
}

pub(crate) fn write_question(writer: &mut TokenWriter, question: &Question) -> CodecResult<()> {
    writer.begin_object()?;
    writer.member(QuestionField::Text.canonical(), question.text())?;
    writer.member(
        QuestionField::Explanation.canonical(),
        Scalar::from(question.explanation()),
    )?;
    writer.member(
        QuestionField::ImageRef.canonical(),
        Scalar::from(question.image_ref()),
    )?;
    writer.field(QuestionField::Options.canonical())?;
    writer.begin_array()?;
    for option in question.options() {
        write_option(writer, option)?;
    }
    writer.end_array()?;
    writer.end_object()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(text: &str, mode: DecodeMode) -> (DecodeResult<Option<Question>>, DropCounts) {
        let mut reader = Reader::new(text);
        let mut drops = DropCounts::default();
        let result = decode_question(&mut reader, 0, mode, &mut drops);
        (result, drops)
    }

    #[test]
    fn options_are_reordered_correct_first() {
        let (q, _) = decode(
            r#"{"options":[{"text":"b","isCorrect":false},{"text":"a","isCorrect":true}],"question":"Q"}"#,
            DecodeMode::Lenient,
        );
        let q = q.unwrap().unwrap();
        assert_eq!(q.options()[0].text(), "a");
        assert_eq!(q.text(), "Q");
    }

    #[test]
    fn empty_options_drops_question() {
        let (q, _) = decode(r#"{"question":"Q","options":[]}"#, DecodeMode::Lenient);
        assert!(q.unwrap().is_none());
    }

    #[test]
    fn text_less_options_are_counted() {
        let (q, drops) = decode(
            r#"{"question":"Q","answers":[{"text":"a","correct":true},{"isCorrect":false}]}"#,
            DecodeMode::Lenient,
        );
        assert_eq!(q.unwrap().unwrap().options().len(), 1);
        assert_eq!(drops.options, 1);
    }

    #[test]
    fn strict_mode_raises() {
        let (q, _) = decode(r#"{"question":"Q","options":[]}"#, DecodeMode::Strict);
        assert!(matches!(
            q,
            Err(DecodeError::InvalidQuestion { index: 0, .. })
        ));

        let (q, _) = decode(
            r#"{"question":"Q","options":[{"isCorrect":true}]}"#,
            DecodeMode::Strict,
        );
        assert!(q.is_err());
    }

    #[test]
    fn scalar_options_is_not_a_container() {
        let (q, _) = decode(r#"{"question":"Q","options":"a"}"#, DecodeMode::Lenient);
        assert!(matches!(q, Err(DecodeError::NotAContainer { .. })));

        let (q, _) = decode(r#"{"question":"Q","options":["a"]}"#, DecodeMode::Lenient);
        assert!(matches!(q, Err(DecodeError::NotAContainer { .. })));
    }
}
