//! Documents (named question lists).

use super::question::Question;
use std::collections::BTreeMap;

/// A named list of questions belonging to one owner.
///
/// Questions form a set under structural equality: adding a question
/// that is already present does nothing. Tags map a tag name to the
/// glyph shown next to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    owner_id: String,
    name: String,
    id: String,
    created_at_millis: i64,
    theme: Option<String>,
    tags: BTreeMap<String, String>,
    questions: Vec<Question>,
}

impl Document {
    /// Creates an empty document.
    pub fn new(
        owner_id: impl Into<String>,
        name: impl Into<String>,
        id: impl Into<String>,
        created_at_millis: i64,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            name: name.into(),
            id: id.into(),
            created_at_millis,
            theme: None,
            tags: BTreeMap::new(),
            questions: Vec::new(),
        }
    }

    /// Sets the theme.
    #[must_use]
    pub fn with_theme(mut self, theme: Option<String>) -> Self {
        self.theme = theme;
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, name: impl Into<String>, glyph: impl Into<String>) -> Self {
        self.add_tag(name, glyph);
        self
    }

    /// Adds questions, skipping duplicates.
    #[must_use]
    pub fn with_questions(mut self, questions: impl IntoIterator<Item = Question>) -> Self {
        self.add_questions(questions);
        self
    }

    /// Owning account.
    #[must_use]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store-wide unique identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Creation time in milliseconds since the Unix epoch.
    #[must_use]
    pub fn created_at_millis(&self) -> i64 {
        self.created_at_millis
    }

    /// Theme used to group files on disk.
    #[must_use]
    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    /// Tag name to glyph.
    #[must_use]
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Whether the document carries the given tag.
    #[must_use]
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// The questions in insertion order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions.
    #[must_use]
    pub fn size(&self) -> usize {
        self.questions.len()
    }

    /// Adds a question unless an equal one is present.
    ///
    /// Returns `true` if the question was added.
    pub fn add_question(&mut self, question: Question) -> bool {
        if self.questions.contains(&question) {
            return false;
        }
        self.questions.push(question);
        true
    }

    /// Adds questions, returning how many were new.
    pub fn add_questions(&mut self, questions: impl IntoIterator<Item = Question>) -> usize {
        let mut added = 0;
        for question in questions {
            if self.add_question(question) {
                added += 1;
            }
        }
        added
    }

    /// Adds or updates a tag. Returns `true` if the tag was new.
    pub fn add_tag(&mut self, name: impl Into<String>, glyph: impl Into<String>) -> bool {
        self.tags.insert(name.into(), glyph.into()).is_none()
    }

    /// Removes a tag. Returns `true` if it was present.
    pub fn remove_tag(&mut self, name: &str) -> bool {
        self.tags.remove(name).is_some()
    }

    /// Changes the display name.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Sets the theme.
    pub fn set_theme(&mut self, theme: Option<String>) {
        self.theme = theme;
    }

    pub(crate) fn set_owner_id(&mut self, owner_id: impl Into<String>) {
        self.owner_id = owner_id.into();
    }

    pub(crate) fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// A document needs a name, an id and at least one question, and
    /// every question must be valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
            && !self.id.is_empty()
            && !self.questions.is_empty()
            && self.questions.iter().all(Question::is_valid)
    }
}
