//! Document records.

use super::fields::DocumentField;
use super::question::{decode_question, write_question};
use super::reader::Reader;
use super::{DecodeMode, DecodeResult, DropCounts};
use crate::error::CoreResult;
use crate::id::IdRegistry;
use crate::model::{Document, Question};
use quizdb_codec::{CodecResult, Scalar, TokenWriter};
use std::collections::BTreeMap;

/// A decoded document before defaults are filled in.
///
/// Every field the input may omit is optional here; see
/// [`into_document`](Self::into_document) for the fallbacks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialDocument {
    /// Owning account.
    pub owner_id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Identifier.
    pub id: Option<String>,
    /// Creation time.
    pub created_at_millis: Option<i64>,
    /// Theme.
    pub theme: Option<String>,
    /// Tag name to glyph.
    pub tags: BTreeMap<String, String>,
    /// Questions that passed validation, in input order.
    pub questions: Vec<Question>,
    /// What was dropped on the way.
    pub dropped: DropCounts,
}

impl PartialDocument {
    /// Completes the document.
    ///
    /// A missing or empty id is generated from the owner and name; an
    /// explicit id is registered so it is never generated again. A
    /// missing creation time becomes `now_millis`. Duplicate questions
    /// collapse into one.
    ///
    /// # Errors
    ///
    /// Fails only if identifier generation is exhausted.
    pub fn into_document(self, ids: &IdRegistry, now_millis: i64) -> CoreResult<Document> {
        let owner_id = self.owner_id.unwrap_or_default();
        let name = self.name.unwrap_or_default();
        let id = match self.id.filter(|id| !id.is_empty()) {
            Some(id) => {
                ids.register(&id);
                id
            }
            None => ids.generate(&format!("{owner_id}|{name}"), now_millis)?,
        };
        let created_at_millis = self.created_at_millis.unwrap_or(now_millis);
        let mut document = Document::new(owner_id, name, id, created_at_millis)
            .with_theme(self.theme)
            .with_questions(self.questions);
        for (tag, glyph) in self.tags {
            document.add_tag(tag, glyph);
        }
        Ok(document)
    }
}

/// Decodes a document.
///
/// # Errors
///
/// Fails on malformed text, on a scalar where the document, its
/// question list, a question, an option list, an option or the tag map
/// must be, and in strict mode on the first invalid question.
pub fn decode_document(text: &str, mode: DecodeMode) -> DecodeResult<PartialDocument> {
    let mut reader = Reader::new(text);
    let document = read_document(&mut reader, mode)?;
    reader.finish()?;
    Ok(document)
}

fn read_document(reader: &mut Reader<'_>, mode: DecodeMode) -> DecodeResult<PartialDocument> {
    reader.begin_object("document")?;
    let mut partial = PartialDocument::default();
    while let Some(name) = reader.next_field()? {
        match DocumentField::lookup(&name) {
            Some(DocumentField::OwnerId) => partial.owner_id = reader.read_text()?,
            Some(DocumentField::Name) => partial.name = reader.read_text()?,
            Some(DocumentField::Id) => partial.id = reader.read_text()?,
            Some(DocumentField::CreatedAt) => partial.created_at_millis = reader.read_i64()?,
            Some(DocumentField::Theme) => partial.theme = reader.read_text()?,
            Some(DocumentField::Tags) => partial.tags = reader.read_tags(&name)?,
            Some(DocumentField::Questions) => {
                if reader.begin_optional_array("questions")? {
                    let mut index = 0usize;
                    while reader.has_element()? {
                        match decode_question(reader, index, mode, &mut partial.dropped)? {
                            Some(question) => partial.questions.push(question),
                            None => partial.dropped.questions += 1,
                        }
                        index += 1;
                    }
                }
            }
            None => reader.skip()?,
        }
    }
    Ok(partial)
}

/// Encodes a document with canonical field names.
///
/// Absent optional strings are written as `null`.
///
/// # Errors
///
/// Fails only on numbers with no JSON form.
pub fn encode_document(document: &Document, pretty: bool) -> CodecResult<String> {
    let mut writer = TokenWriter::new(pretty);
    writer.begin_object()?;
    writer.member(DocumentField::OwnerId.canonical(), document.owner_id())?;
    writer.member(DocumentField::Name.canonical(), document.name())?;
    writer.member(DocumentField::Id.canonical(), document.id())?;
    writer.member(DocumentField::CreatedAt.canonical(), document.created_at_millis())?;
    writer.member(DocumentField::Theme.canonical(), Scalar::from(document.theme()))?;
    writer.field(DocumentField::Tags.canonical())?;
    writer.begin_object()?;
    for (tag, glyph) in document.tags() {
        writer.member(tag, glyph.as_str())?;
    }
    writer.end_object()?;
    writer.field(DocumentField::Questions.canonical())?;
    writer.begin_array()?;
    for question in document.questions() {
        write_question(&mut writer, question)?;
    }
    writer.end_array()?;
    writer.end_object()?;
    writer.into_string()
}
