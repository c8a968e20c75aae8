//! Attempts: one play-through of a document.

use super::document::Document;
use super::option::AnswerOption;
use crate::config::ScoreRules;
use crate::error::{CoreError, CoreResult};
use std::collections::{BTreeMap, BTreeSet};

/// The answer given to one question.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Answer {
    /// Time spent on the question.
    pub duration_millis: i64,
    /// Options the player picked.
    pub chosen: BTreeSet<AnswerOption>,
}

impl Answer {
    /// Creates an answer.
    pub fn new(duration_millis: i64, chosen: impl IntoIterator<Item = AnswerOption>) -> Self {
        Self {
            duration_millis,
            chosen: chosen.into_iter().collect(),
        }
    }
}

/// A record of an owner playing through a document.
///
/// Answers are appended while the attempt is running and frozen once
/// [`end`](Self::end) is called. The score is derived on demand and
/// never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    owner_id: String,
    document_id: String,
    started_at_millis: i64,
    ended_at_millis: Option<i64>,
    answers: BTreeMap<usize, Answer>,
}

impl Attempt {
    /// Starts a new attempt.
    pub fn start(owner_id: impl Into<String>, document_id: impl Into<String>, now_millis: i64) -> Self {
        Self {
            owner_id: owner_id.into(),
            document_id: document_id.into(),
            started_at_millis: now_millis,
            ended_at_millis: None,
            answers: BTreeMap::new(),
        }
    }

    pub(crate) fn from_parts(
        owner_id: String,
        document_id: String,
        started_at_millis: i64,
        ended_at_millis: Option<i64>,
        answers: BTreeMap<usize, Answer>,
    ) -> Self {
        Self {
            owner_id,
            document_id,
            started_at_millis,
            ended_at_millis,
            answers,
        }
    }

    pub(crate) fn set_document_id(&mut self, document_id: impl Into<String>) {
        self.document_id = document_id.into();
    }

    /// Records the answer to the question at `index`, replacing any
    /// earlier answer to it.
    ///
    /// # Errors
    ///
    /// Fails once the attempt has ended.
    pub fn record(&mut self, index: usize, answer: Answer) -> CoreResult<()> {
        if self.is_finished() {
            return Err(CoreError::invalid_operation(format!(
                "attempt on {} started at {} has already ended",
                self.document_id, self.started_at_millis
            )));
        }
        self.answers.insert(index, answer);
        Ok(())
    }

    /// Ends the attempt.
    ///
    /// # Errors
    ///
    /// Fails if the attempt has already ended.
    pub fn end(&mut self, now_millis: i64) -> CoreResult<()> {
        if self.is_finished() {
            return Err(CoreError::invalid_operation("attempt has already ended"));
        }
        self.ended_at_millis = Some(now_millis);
        Ok(())
    }

    /// Whether [`end`](Self::end) has been called.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.ended_at_millis.is_some()
    }

    /// The player.
    #[must_use]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// The document played.
    #[must_use]
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Start time in milliseconds since the Unix epoch.
    #[must_use]
    pub fn started_at_millis(&self) -> i64 {
        self.started_at_millis
    }

    /// End time, if the attempt has ended.
    #[must_use]
    pub fn ended_at_millis(&self) -> Option<i64> {
        self.ended_at_millis
    }

    /// Answers keyed by question index.
    #[must_use]
    pub fn answers(&self) -> &BTreeMap<usize, Answer> {
        &self.answers
    }

    /// Computes the score against `document`.
    ///
    /// For each answered question: every chosen correct option earns
    /// `points_for_correct / correct options in the question`, every
    /// chosen incorrect option earns `points_for_incorrect`. Whether a
    /// chosen option is correct is decided by the question's own option
    /// of the same text; a chosen option the question does not contain
    /// counts as incorrect. Answers to indices past the end of the
    /// document are ignored.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score(&self, document: &Document, rules: &ScoreRules) -> f64 {
        let questions = document.questions();
        let mut total = 0.0;
        for (&index, answer) in &self.answers {
            let Some(question) = questions.get(index) else {
                continue;
            };
            let true_options = question.correct_count();
            let mut correct = 0usize;
            let mut incorrect = 0usize;
            for chosen in &answer.chosen {
                match question.option(chosen.text()) {
                    Some(option) if option.is_correct() => correct += 1,
                    _ => incorrect += 1,
                }
            }
            if true_options > 0 {
                total += correct as f64 * rules.points_for_correct / true_options as f64;
            }
            total += incorrect as f64 * rules.points_for_incorrect;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Question;

    fn document() -> Document {
        Document::new("u1", "Maths", "m1", 0).with_questions(vec![
            Question::new(
                "Primes",
                vec![
                    AnswerOption::new("2", true),
                    AnswerOption::new("3", true),
                    AnswerOption::new("4", false),
                ],
            ),
            Question::new("1+1", vec![AnswerOption::new("2", true), AnswerOption::new("3", false)]),
        ])
    }

    #[test]
    fn score_formula() {
        let doc = document();
        let rules = ScoreRules::default();
        let mut attempt = Attempt::start("u1", "m1", 100);
        // one of two correct options, plus one wrong: 0.5 - 0.5
        attempt
            .record(0, Answer::new(10, vec![AnswerOption::new("2", false), AnswerOption::new("4", true)]))
            .unwrap();
        // the single correct option: 1.0
        attempt.record(1, Answer::new(5, vec![AnswerOption::new("2", false)])).unwrap();
        assert!((attempt.score(&doc, &rules) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unanswered_and_out_of_range_are_ignored() {
        let doc = document();
        let mut attempt = Attempt::start("u1", "m1", 100);
        assert_eq!(attempt.score(&doc, &ScoreRules::default()), 0.0);
        attempt.record(7, Answer::new(1, vec![AnswerOption::new("2", true)])).unwrap();
        assert_eq!(attempt.score(&doc, &ScoreRules::default()), 0.0);
    }

    #[test]
    fn frozen_after_end() {
        let mut attempt = Attempt::start("u1", "m1", 100);
        assert!(!attempt.is_finished());
        attempt.end(200).unwrap();
        assert!(attempt.is_finished());
        assert_eq!(attempt.ended_at_millis(), Some(200));
        assert!(attempt.record(0, Answer::default()).is_err());
        assert!(attempt.end(300).is_err());
    }
}
