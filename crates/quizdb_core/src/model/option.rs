//! Answer options.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// One possible answer to a question.
///
/// # Identity
///
/// Equality, ordering and hashing consider **only the text**. Two options
/// with the same text are the same option even if one is marked correct
/// and the other is not, or their explanations differ. Question merging
/// and chosen-option sets rely on this, so it is kept deliberately.
///
/// ```
/// use quizdb_core::AnswerOption;
///
/// let a = AnswerOption::new("Paris", true);
/// let b = AnswerOption::new("Paris", false);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone)]
pub struct AnswerOption {
    text: String,
    is_correct: bool,
    explanation: Option<String>,
}

impl AnswerOption {
    /// Creates an option with no explanation.
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
            explanation: None,
        }
    }

    /// Sets the explanation.
    #[must_use]
    pub fn with_explanation(mut self, explanation: Option<String>) -> Self {
        self.explanation = explanation;
        self
    }

    /// The option text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether this option is a correct answer.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    /// Explanation shown after answering, if any.
    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// An option needs non-empty text.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.text.is_empty()
    }
}

impl PartialEq for AnswerOption {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for AnswerOption {}

impl Hash for AnswerOption {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl PartialOrd for AnswerOption {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AnswerOption {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text.cmp(&other.text)
    }
}
