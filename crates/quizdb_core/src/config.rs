//! Store configuration.

use crate::codec::DecodeMode;
use std::path::{Path, PathBuf};

/// Points awarded per chosen option when scoring an attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRules {
    /// Points for choosing every correct option of a question.
    ///
    /// Split evenly between the question's correct options.
    pub points_for_correct: f64,

    /// Points for each incorrect option chosen (usually negative).
    pub points_for_incorrect: f64,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self {
            points_for_correct: 1.0,
            points_for_incorrect: -0.5,
        }
    }
}

/// Configuration for opening a store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for documents.
    pub data_dir: PathBuf,

    /// Root directory for owner metadata and attempts.
    ///
    /// `None` means `<data_dir>/userdata`.
    pub userdata_dir: Option<PathBuf>,

    /// Length of generated document identifiers.
    pub id_length: usize,

    /// Salts tried before identifier generation gives up.
    pub id_max_attempts: u32,

    /// Scoring constants for attempts.
    pub score_rules: ScoreRules,

    /// How decoders treat invalid questions and options.
    pub decode_mode: DecodeMode,

    /// Whether exported files are indented.
    pub pretty_output: bool,

    /// Whether to create the data directory if it doesn't exist.
    pub create_if_missing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            userdata_dir: None,
            id_length: 7,
            id_max_attempts: 64,
            score_rules: ScoreRules::default(),
            decode_mode: DecodeMode::Lenient,
            pretty_output: true,
            create_if_missing: true,
        }
    }
}

impl Config {
    /// Creates a new configuration rooted at `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Sets the owner metadata directory.
    #[must_use]
    pub fn userdata_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.userdata_dir = Some(dir.into());
        self
    }

    /// Sets the generated identifier length.
    #[must_use]
    pub const fn id_length(mut self, length: usize) -> Self {
        self.id_length = length;
        self
    }

    /// Sets the identifier retry budget.
    #[must_use]
    pub const fn id_max_attempts(mut self, attempts: u32) -> Self {
        self.id_max_attempts = attempts;
        self
    }

    /// Sets the scoring constants.
    #[must_use]
    pub const fn score_rules(mut self, rules: ScoreRules) -> Self {
        self.score_rules = rules;
        self
    }

    /// Sets the decode mode.
    #[must_use]
    pub const fn decode_mode(mut self, mode: DecodeMode) -> Self {
        self.decode_mode = mode;
        self
    }

    /// Sets whether exported files are indented.
    #[must_use]
    pub const fn pretty_output(mut self, value: bool) -> Self {
        self.pretty_output = value;
        self
    }

    /// Sets whether to create the data directory if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// The effective owner metadata directory.
    #[must_use]
    pub fn resolved_userdata_dir(&self) -> PathBuf {
        self.userdata_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("userdata"))
    }

    /// The documents root.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.id_length, 7);
        assert_eq!(config.id_max_attempts, 64);
        assert_eq!(config.decode_mode, DecodeMode::Lenient);
        assert!(config.pretty_output);
        assert!(config.create_if_missing);
        assert_eq!(config.score_rules.points_for_correct, 1.0);
        assert_eq!(config.score_rules.points_for_incorrect, -0.5);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new("/tmp/quiz")
            .id_length(9)
            .decode_mode(DecodeMode::Strict)
            .pretty_output(false);

        assert_eq!(config.id_length, 9);
        assert_eq!(config.decode_mode, DecodeMode::Strict);
        assert!(!config.pretty_output);
    }

    #[test]
    fn userdata_defaults_under_data_dir() {
        let config = Config::new("/srv/quiz");
        assert_eq!(
            config.resolved_userdata_dir(),
            PathBuf::from("/srv/quiz/userdata")
        );

        let config = config.userdata_dir("/srv/users");
        assert_eq!(config.resolved_userdata_dir(), PathBuf::from("/srv/users"));
    }
}
