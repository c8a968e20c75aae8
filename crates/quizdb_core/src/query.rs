//! Filter and sort expressions over an owner's documents.
//!
//! # Filters
//!
//! Whitespace-separated tokens, all of which must match:
//!
//! | form                 | fields                        | meaning                                 |
//! |----------------------|-------------------------------|-----------------------------------------|
//! | `<field><op><int>`   | `size`, `date`, `start`, `end` | numeric comparison, op one of `= != < <= > >=` |
//! | `<field>=<regex>`    | `name`, `id`, `author`        | case-insensitive full match             |
//! | `<field>!=<regex>`   | `name`, `id`, `author`        | negated full match                      |
//! | `tag` / `tag!`       |                               | has any tag / has no tag                |
//! | `tag=<regex>`        |                               | some tag name full-matches              |
//! | `tag!=<regex>`       |                               | no tag name full-matches                |
//!
//! `start` and `end` read the most recent attempt on the document and
//! are `0` when there is none (or, for `end`, when it has not ended).
//! A token that cannot be parsed matches nothing.
//!
//! # Sorting
//!
//! One of `name`, `date`, `id`, `size`, `start`, `score`, optionally
//! prefixed with `-` to reverse. Unknown keys sort by `date`. Documents
//! never played sort before played ones for `start` and `score`. Ties
//! are broken by id so the order is total.

use crate::config::ScoreRules;
use crate::model::Document;
use crate::owner::Owner;
use regex::Regex;
use std::cmp::Ordering;
use tracing::debug;

/// Numeric document properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    /// Number of questions.
    Size,
    /// Creation time.
    Date,
    /// Start time of the latest attempt.
    Start,
    /// End time of the latest attempt.
    End,
}

impl NumericField {
    const ALL: [(&'static str, Self); 4] = [
        ("size", Self::Size),
        ("date", Self::Date),
        ("start", Self::Start),
        ("end", Self::End),
    ];

    fn value(self, document: &Document, owner: &Owner) -> i64 {
        match self {
            Self::Size => i64::try_from(document.size()).unwrap_or(i64::MAX),
            Self::Date => document.created_at_millis(),
            Self::Start => owner
                .latest_attempt(document.id())
                .map_or(0, |a| a.started_at_millis()),
            Self::End => owner
                .latest_attempt(document.id())
                .and_then(|a| a.ended_at_millis())
                .unwrap_or(0),
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    // Two-character operators first so `<=` is not read as `<`.
    const ALL: [(&'static str, Self); 6] = [
        ("!=", Self::Ne),
        ("<=", Self::Le),
        (">=", Self::Ge),
        ("=", Self::Eq),
        ("<", Self::Lt),
        (">", Self::Gt),
    ];

    fn split(text: &str) -> Option<(Self, &str)> {
        Self::ALL
            .iter()
            .find_map(|(symbol, op)| text.strip_prefix(symbol).map(|rest| (*op, rest)))
    }

    fn apply(self, left: i64, right: i64) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
        }
    }
}

/// Text document properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    /// Display name.
    Name,
    /// Identifier.
    Id,
    /// Owning account.
    Author,
}

impl TextField {
    const ALL: [(&'static str, Self); 3] = [
        ("name", Self::Name),
        ("id", Self::Id),
        ("author", Self::Author),
    ];

    fn value(self, document: &Document) -> &str {
        match self {
            Self::Name => document.name(),
            Self::Id => document.id(),
            Self::Author => document.owner_id(),
        }
    }
}

/// One parsed filter token.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Numeric comparison.
    Numeric {
        /// Property compared.
        field: NumericField,
        /// Operator.
        op: CompareOp,
        /// Right-hand side.
        value: i64,
    },
    /// Regular expression over a text property.
    Text {
        /// Property matched.
        field: TextField,
        /// Whether the match is negated.
        negate: bool,
        /// Anchored, case-insensitive pattern.
        pattern: Regex,
    },
    /// Has any tag (or, negated, none).
    Tagged {
        /// Whether the test is negated.
        negate: bool,
    },
    /// Some tag name matches (or, negated, none does).
    Tag {
        /// Whether the match is negated.
        negate: bool,
        /// Anchored, case-insensitive pattern.
        pattern: Regex,
    },
    /// An unrecognized token. Matches nothing.
    Never,
}

impl Filter {
    /// Parses a single token. Never fails: bad tokens become [`Filter::Never`].
    #[must_use]
    pub fn parse(token: &str) -> Self {
        Self::try_parse(token).unwrap_or_else(|| {
            debug!(token, "unrecognized filter token");
            Self::Never
        })
    }

    fn try_parse(token: &str) -> Option<Self> {
        for (name, field) in NumericField::ALL {
            if let Some(rest) = token.strip_prefix(name) {
                if let Some((op, value)) = CompareOp::split(rest) {
                    return Some(Self::Numeric {
                        field,
                        op,
                        value: value.trim().parse().ok()?,
                    });
                }
            }
        }
        for (name, field) in TextField::ALL {
            if let Some(rest) = token.strip_prefix(name) {
                if let Some((negate, pattern)) = split_match(rest) {
                    return Some(Self::Text {
                        field,
                        negate,
                        pattern: full_match(pattern)?,
                    });
                }
            }
        }
        match token {
            "tag" => return Some(Self::Tagged { negate: false }),
            "tag!" => return Some(Self::Tagged { negate: true }),
            _ => {}
        }
        let rest = token.strip_prefix("tag")?;
        let (negate, pattern) = split_match(rest)?;
        Some(Self::Tag {
            negate,
            pattern: full_match(pattern)?,
        })
    }

    /// Whether `document` (owned by `owner`) passes this filter.
    #[must_use]
    pub fn matches(&self, document: &Document, owner: &Owner) -> bool {
        match self {
            Self::Numeric { field, op, value } => op.apply(field.value(document, owner), *value),
            Self::Text {
                field,
                negate,
                pattern,
            } => pattern.is_match(field.value(document)) != *negate,
            Self::Tagged { negate } => document.tags().is_empty() == *negate,
            Self::Tag { negate, pattern } => {
                document.tags().keys().any(|tag| pattern.is_match(tag)) != *negate
            }
            Self::Never => false,
        }
    }
}

/// Splits `=rest` or `!=rest` into (negated, rest).
fn split_match(text: &str) -> Option<(bool, &str)> {
    if let Some(rest) = text.strip_prefix("!=") {
        Some((true, rest))
    } else {
        text.strip_prefix('=').map(|rest| (false, rest))
    }
}

fn full_match(pattern: &str) -> Option<Regex> {
    // compiled alone first so unbalanced groups cannot escape the anchors
    match Regex::new(pattern).and_then(|_| Regex::new(&format!("(?i)^(?:{pattern})$"))) {
        Ok(regex) => Some(regex),
        Err(err) => {
            debug!(pattern, error = %err, "invalid filter pattern");
            None
        }
    }
}

/// Sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Display name.
    Name,
    /// Creation time.
    Date,
    /// Identifier.
    Id,
    /// Number of questions.
    Size,
    /// Start time of the latest attempt.
    Start,
    /// Score of the latest attempt.
    Score,
}

/// A parsed sort token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    /// Key compared.
    pub key: SortKey,
    /// Whether the order is reversed.
    pub descending: bool,
}

impl Sort {
    /// Parses a sort token. Unknown keys fall back to [`SortKey::Date`].
    #[must_use]
    pub fn parse(token: &str) -> Self {
        let (descending, name) = match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token),
        };
        let key = match name {
            "name" => SortKey::Name,
            "date" => SortKey::Date,
            "id" => SortKey::Id,
            "size" => SortKey::Size,
            "start" => SortKey::Start,
            "score" => SortKey::Score,
            other => {
                debug!(token = other, "unrecognized sort key, sorting by date");
                SortKey::Date
            }
        };
        Self { key, descending }
    }

    /// Compares two documents of `owner`.
    #[must_use]
    pub fn compare(&self, a: &Document, b: &Document, owner: &Owner, rules: &ScoreRules) -> Ordering {
        let ordering = match self.key {
            SortKey::Name => a.name().cmp(b.name()),
            SortKey::Date => a.created_at_millis().cmp(&b.created_at_millis()),
            SortKey::Id => Ordering::Equal,
            SortKey::Size => a.size().cmp(&b.size()),
            SortKey::Start => {
                let start = |d: &Document| owner.latest_attempt(d.id()).map(|t| t.started_at_millis());
                start(a).cmp(&start(b))
            }
            SortKey::Score => {
                let score = |d: &Document| owner.latest_attempt(d.id()).map(|t| t.score(d, rules));
                match (score(a), score(b)) {
                    (Some(x), Some(y)) => x.total_cmp(&y),
                    (x, y) => x.is_some().cmp(&y.is_some()),
                }
            }
        }
        .then_with(|| a.id().cmp(b.id()));
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            key: SortKey::Date,
            descending: false,
        }
    }
}

/// Evaluates filters and sorts over one owner's documents.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    owner: &'a Owner,
    rules: ScoreRules,
}

impl<'a> QueryEngine<'a> {
    /// Creates an engine over `owner`.
    #[must_use]
    pub fn new(owner: &'a Owner, rules: ScoreRules) -> Self {
        Self { owner, rules }
    }

    /// Parses whitespace-separated filter tokens.
    #[must_use]
    pub fn parse_filters(tokens: &str) -> Vec<Filter> {
        tokens.split_whitespace().map(Filter::parse).collect()
    }

    /// Documents passing every filter token, in id order.
    #[must_use]
    pub fn filter(&self, tokens: &str) -> Vec<&'a Document> {
        let filters = Self::parse_filters(tokens);
        let owner = self.owner;
        owner
            .documents()
            .iter()
            .filter(|doc| filters.iter().all(|f| f.matches(doc, owner)))
            .collect()
    }

    /// A comparator for the sort token.
    pub fn sort(&self, token: &str) -> impl Fn(&Document, &Document) -> Ordering + 'a {
        let sort = Sort::parse(token);
        let owner = self.owner;
        let rules = self.rules;
        move |a: &Document, b: &Document| sort.compare(a, b, owner, &rules)
    }

    /// Filters, then sorts.
    #[must_use]
    pub fn run(&self, filter: &str, sort: Option<&str>) -> Vec<&'a Document> {
        let mut documents = self.filter(filter);
        let compare = self.sort(sort.unwrap_or("date"));
        documents.sort_by(|a, b| compare(*a, *b));
        documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, AnswerOption, Attempt, Question};

    fn question(text: &str) -> Question {
        Question::new(text, vec![AnswerOption::new("yes", true), AnswerOption::new("no", false)])
    }

    fn owner() -> Owner {
        let mut owner = Owner::new("alice");
        owner.add_document(
            Document::new("alice", "Chemistry", "a", 300)
                .with_tag("science", "🧪")
                .with_questions((0..5).map(|i| question(&format!("Q{i}")))),
        );
        owner.add_document(
            Document::new("alice", "Romans", "b", 100)
                .with_tag("history", "📜")
                .with_questions((0..2).map(|i| question(&format!("Q{i}")))),
        );
        owner.add_document(
            Document::new("alice", "Misc", "c", 200).with_questions(vec![question("Q")]),
        );
        owner
    }

    fn ids(documents: &[&Document]) -> Vec<String> {
        documents.iter().map(|d| d.id().to_string()).collect()
    }

    fn filter(owner: &Owner, tokens: &str) -> Vec<String> {
        ids(&QueryEngine::new(owner, ScoreRules::default()).filter(tokens))
    }

    #[test]
    fn tag_filters() {
        let owner = owner();
        assert_eq!(filter(&owner, "tag=sci.*"), vec!["a"]);
        assert_eq!(filter(&owner, "tag!=sci.*"), vec!["b", "c"]);
        assert_eq!(filter(&owner, "tag"), vec!["a", "b"]);
        assert_eq!(filter(&owner, "tag!"), vec!["c"]);
        assert_eq!(filter(&owner, "tag=SCIENCE"), vec!["a"]);
    }

    #[test]
    fn numeric_filters() {
        let owner = owner();
        assert_eq!(filter(&owner, "size>3"), vec!["a"]);
        assert!(!filter(&owner, "size<3").contains(&"a".to_string()));
        assert_eq!(filter(&owner, "size<=2"), vec!["b", "c"]);
        assert_eq!(filter(&owner, "size!=5"), vec!["b", "c"]);
        assert_eq!(filter(&owner, "date>=200"), vec!["a", "c"]);
        assert_eq!(filter(&owner, "start=0"), vec!["a", "b", "c"]);
    }

    #[test]
    fn text_filters_are_full_match() {
        let owner = owner();
        assert_eq!(filter(&owner, "name=rom.*"), vec!["b"]);
        assert!(filter(&owner, "name=rom").is_empty());
        assert_eq!(filter(&owner, "name!=rom.*"), vec!["a", "c"]);
        assert_eq!(filter(&owner, "author=ALICE"), vec!["a", "b", "c"]);
        assert_eq!(filter(&owner, "id=a|c"), vec!["a", "c"]);
    }

    #[test]
    fn unbalanced_groups_match_nothing() {
        let owner = owner();
        assert_eq!(filter(&owner, "name=c.*"), vec!["a"]);
        assert!(filter(&owner, "name=c)|(zzz").is_empty());
        assert!(filter(&owner, "name!=c)|(zzz").is_empty());
        assert!(filter(&owner, "tag=s)|(x").is_empty());
    }

    #[test]
    fn tokens_are_anded() {
        let owner = owner();
        assert_eq!(filter(&owner, "tag size<3"), vec!["b"]);
        assert!(filter(&owner, "tag=science size<3").is_empty());
        assert_eq!(filter(&owner, ""), vec!["a", "b", "c"]);
    }

    #[test]
    fn bad_tokens_match_nothing() {
        let owner = owner();
        assert!(filter(&owner, "colour=red").is_empty());
        assert!(filter(&owner, "size>three").is_empty());
        assert!(filter(&owner, "name=(").is_empty());
        assert!(filter(&owner, "size~3").is_empty());
    }

    #[test]
    fn sorting() {
        let owner = owner();
        let engine = QueryEngine::new(&owner, ScoreRules::default());
        assert_eq!(ids(&engine.run("", Some("name"))), vec!["a", "c", "b"]);
        assert_eq!(ids(&engine.run("", Some("date"))), vec!["b", "c", "a"]);
        assert_eq!(ids(&engine.run("", Some("-size"))), vec!["a", "b", "c"]);
        assert_eq!(ids(&engine.run("", Some("bogus"))), vec!["b", "c", "a"]);
        assert_eq!(ids(&engine.run("", None)), vec!["b", "c", "a"]);
    }

    #[test]
    fn never_played_sorts_first() {
        let mut owner = owner();
        let mut attempt = Attempt::start("alice", "b", 50);
        attempt
            .record(0, Answer::new(1, vec![AnswerOption::new("yes", true)]))
            .unwrap();
        attempt.end(60).unwrap();
        owner.record_attempt(attempt).unwrap();
        owner.record_attempt(Attempt::start("alice", "a", 10)).unwrap();

        let engine = QueryEngine::new(&owner, ScoreRules::default());
        assert_eq!(ids(&engine.run("", Some("start"))), vec!["c", "a", "b"]);
        assert_eq!(ids(&engine.run("", Some("score"))), vec!["c", "a", "b"]);
        assert_eq!(ids(&engine.run("", Some("-score"))), vec!["b", "a", "c"]);
        assert_eq!(filter(&owner, "end>0"), vec!["b"]);
        assert_eq!(filter(&owner, "start>=10"), vec!["a", "b"]);
    }

    #[test]
    fn sort_parse() {
        assert_eq!(
            Sort::parse("-score"),
            Sort {
                key: SortKey::Score,
                descending: true
            }
        );
        assert_eq!(Sort::parse("whatever").key, SortKey::Date);
    }
}
