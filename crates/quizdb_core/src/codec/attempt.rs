//! Attempt records.

use super::fields::{AnswerField, AttemptField};
use super::option::{decode_option, write_option};
use super::reader::{Container, Reader};
use super::{DecodeError, DecodeResult};
use crate::model::{Answer, Attempt};
use quizdb_codec::{CodecResult, Scalar, TokenWriter};
use std::collections::BTreeMap;

/// Decodes an attempt.
///
/// Answers may be an array of `{index, durationMillis, chosen}` objects
/// or an object keyed by the question index. Answers without a usable
/// index are skipped, as are chosen options without text.
///
/// # Errors
///
/// Fails on malformed text, on scalars where containers are required,
/// and when the owner, document or start time is missing.
pub fn decode_attempt(text: &str) -> DecodeResult<Attempt> {
    let mut reader = Reader::new(text);
    reader.begin_object("attempt")?;
    let mut owner_id = None;
    let mut document_id = None;
    let mut started_at = None;
    let mut ended_at = None;
    let mut answers = BTreeMap::new();
    while let Some(name) = reader.next_field()? {
        match AttemptField::lookup(&name) {
            Some(AttemptField::OwnerId) => owner_id = reader.read_text()?,
            Some(AttemptField::DocumentId) => document_id = reader.read_text()?,
            Some(AttemptField::StartedAt) => started_at = reader.read_i64()?,
            Some(AttemptField::EndedAt) => ended_at = reader.read_i64()?,
            Some(AttemptField::Answers) => read_answers(&mut reader, &mut answers)?,
            None => reader.skip()?,
        }
    }
    reader.finish()?;

    let missing = |field: AttemptField| DecodeError::MissingField {
        record: "attempt",
        field: field.canonical(),
    };
    Ok(Attempt::from_parts(
        owner_id.ok_or_else(|| missing(AttemptField::OwnerId))?,
        document_id.ok_or_else(|| missing(AttemptField::DocumentId))?,
        started_at.ok_or_else(|| missing(AttemptField::StartedAt))?,
        ended_at,
        answers,
    ))
}

fn read_answers(reader: &mut Reader<'_>, answers: &mut BTreeMap<usize, Answer>) -> DecodeResult<()> {
    match reader.begin_container("answers")? {
        // {"0": {...}, "3": {...}}
        Some(Container::Object) => {
            while let Some(key) = reader.next_field()? {
                let (index, answer) = read_answer(reader, &format!("answers.{key}"))?;
                if let Some(index) = key.parse().ok().or(index) {
                    answers.insert(index, answer);
                }
            }
        }
        Some(Container::Array) => {
            let mut position = 0usize;
            while reader.has_element()? {
                let (index, answer) = read_answer(reader, &format!("answers[{position}]"))?;
                if let Some(index) = index {
                    answers.insert(index, answer);
                }
                position += 1;
            }
        }
        None => {}
    }
    Ok(())
}

fn read_answer(reader: &mut Reader<'_>, field: &str) -> DecodeResult<(Option<usize>, Answer)> {
    reader.begin_object(field)?;
    let mut index = None;
    let mut answer = Answer::default();
    while let Some(name) = reader.next_field()? {
        match AnswerField::lookup(&name) {
            Some(AnswerField::Index) => {
                index = reader.read_i64()?.and_then(|i| usize::try_from(i).ok());
            }
            Some(AnswerField::Duration) => {
                answer.duration_millis = reader.read_i64()?.unwrap_or(0);
            }
            Some(AnswerField::Chosen) => {
                let chosen_field = format!("{field}.chosen");
                if reader.begin_optional_array(&chosen_field)? {
                    let mut position = 0usize;
                    while reader.has_element()? {
                        let element = format!("{chosen_field}[{position}]");
                        if let Some(option) = decode_option(reader, &element)? {
                            answer.chosen.insert(option);
                        }
                        position += 1;
                    }
                }
            }
            None => reader.skip()?,
        }
    }
    Ok((index, answer))
}

/// Encodes an attempt with canonical field names.
///
/// # Errors
///
/// Fails only on numbers with no JSON form.
pub fn encode_attempt(attempt: &Attempt, pretty: bool) -> CodecResult<String> {
    let mut writer = TokenWriter::new(pretty);
    writer.begin_object()?;
    writer.member(AttemptField::OwnerId.canonical(), attempt.owner_id())?;
    writer.member(AttemptField::DocumentId.canonical(), attempt.document_id())?;
    writer.member(AttemptField::StartedAt.canonical(), attempt.started_at_millis())?;
    writer.member(
        AttemptField::EndedAt.canonical(),
        Scalar::from(attempt.ended_at_millis()),
    )?;
    writer.field(AttemptField::Answers.canonical())?;
    writer.begin_array()?;
    for (&index, answer) in attempt.answers() {
        writer.begin_object()?;
        writer.member(
            AnswerField::Index.canonical(),
            i64::try_from(index).unwrap_or(i64::MAX),
        )?;
        writer.member(AnswerField::Duration.canonical(), answer.duration_millis)?;
        writer.field(AnswerField::Chosen.canonical())?;
        writer.begin_array()?;
        for option in &answer.chosen {
            write_option(&mut writer, option)?;
        }
        writer.end_array()?;
        writer.end_object()?;
    }
    writer.end_array()?;
    writer.end_object()?;
    writer.into_string()
}
