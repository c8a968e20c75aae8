//! Questions.

use super::option::AnswerOption;

/// A question with its answer options.
///
/// Options are always kept with every correct option before every
/// incorrect one; the relative order inside each group is the order
/// they were supplied in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    explanation: Option<String>,
    image_ref: Option<String>,
    options: Vec<AnswerOption>,
}

impl Question {
    /// Creates a question from its text and options.
    pub fn new(text: impl Into<String>, options: impl IntoIterator<Item = AnswerOption>) -> Self {
        let mut question = Self {
            text: text.into(),
            explanation: None,
            image_ref: None,
            options: options.into_iter().collect(),
        };
        question.order_options();
        question
    }

    /// Sets the explanation.
    #[must_use]
    pub fn with_explanation(mut self, explanation: Option<String>) -> Self {
        self.explanation = explanation;
        self
    }

    /// Sets the image reference.
    #[must_use]
    pub fn with_image_ref(mut self, image_ref: Option<String>) -> Self {
        self.image_ref = image_ref;
        self
    }

    /// The question text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Explanation shown after answering, if any.
    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// Image shown with the question, if any.
    #[must_use]
    pub fn image_ref(&self) -> Option<&str> {
        self.image_ref.as_deref()
    }

    /// Options, correct ones first.
    #[must_use]
    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    /// Number of correct options.
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.options.iter().filter(|o| o.is_correct()).count()
    }

    /// Finds the option with the given text.
    #[must_use]
    pub fn option(&self, text: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.text() == text)
    }

    /// Adds an option unless one with the same text exists.
    ///
    /// Returns `true` if the option was added.
    pub fn add_option(&mut self, option: AnswerOption) -> bool {
        if self.options.contains(&option) {
            return false;
        }
        self.options.push(option);
        self.order_options();
        true
    }

    /// A question needs text, at least one option and at least one
    /// correct option.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.text.is_empty() && !self.options.is_empty() && self.correct_count() > 0
    }

    fn order_options(&mut self) {
        // sort_by_key is stable
        self.options.sort_by_key(|o| !o.is_correct());
    }
}
