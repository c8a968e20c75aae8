//! List command implementation.

use super::{print_json, StoreOptions};
use quizdb_core::{Document, StoreRegistry};
use serde::Serialize;

/// One row of the listing.
#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    /// Document id.
    pub id: String,
    /// Document name.
    pub name: String,
    /// Theme, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Number of questions.
    pub size: usize,
    /// Creation time in milliseconds since the epoch.
    pub created_at_millis: i64,
    /// Tag names.
    pub tags: Vec<String>,
    /// Number of recorded attempts.
    pub attempts: usize,
}

/// Runs the list command.
pub fn run(
    options: &StoreOptions,
    owner: &str,
    filter: &str,
    sort: Option<&str>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open()?;
    let rows = list(&store, owner, filter, sort);

    match format {
        "json" => print_json(&rows)?,
        _ => {
            if rows.is_empty() {
                println!("No documents match.");
            }
            for row in &rows {
                let tags = if row.tags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", row.tags.join(", "))
                };
                println!(
                    "{:<10} {:>4} questions  {}{}",
                    row.id, row.size, row.name, tags
                );
            }
        }
    }
    Ok(())
}

/// Runs a query and summarizes the matches.
pub fn list(
    store: &StoreRegistry,
    owner: &str,
    filter: &str,
    sort: Option<&str>,
) -> Vec<DocumentSummary> {
    store
        .query(owner, filter, sort)
        .iter()
        .map(|document| summarize(store, document))
        .collect()
}

fn summarize(store: &StoreRegistry, document: &Document) -> DocumentSummary {
    DocumentSummary {
        id: document.id().to_string(),
        name: document.name().to_string(),
        theme: document.theme().map(str::to_string),
        size: document.size(),
        created_at_millis: document.created_at_millis(),
        tags: document.tags().keys().cloned().collect(),
        attempts: store
            .with_owner(document.owner_id(), |owner| {
                owner.attempts(document.id()).len()
            })
            .unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizdb_core::{AnswerOption, Config, Question};
    use tempfile::tempdir;

    #[test]
    fn filters_and_sorts() {
        let dir = tempdir().unwrap();
        let store = StoreRegistry::open(Config::new(dir.path())).unwrap();
        for (id, name, size) in [("d1", "Beta", 1), ("d2", "Alpha", 4), ("d3", "Gamma", 5)] {
            let questions =
                (0..size).map(|i| Question::new(format!("Q{i}"), [AnswerOption::new("a", true)]));
            store
                .add_document("u1", Document::new("u1", name, id, 0).with_questions(questions))
                .unwrap();
        }

        let rows = list(&store, "u1", "size>3", Some("name"));
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Gamma"]);

        let rows = list(&store, "u1", "", Some("-size"));
        assert_eq!(rows[0].id, "d3");
        assert!(list(&store, "nobody", "", None).is_empty());
    }
}
