//! Inspect command implementation.

use super::{print_json, StoreOptions};
use quizdb_core::{Owner, StoreRegistry};
use serde::Serialize;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Data directory.
    pub path: String,
    /// Owner metadata directory.
    pub userdata_path: String,
    /// Number of owners.
    pub owner_count: usize,
    /// Number of documents across owners.
    pub document_count: usize,
    /// Number of questions across documents.
    pub question_count: usize,
    /// Number of attempts across owners.
    pub attempt_count: usize,
    /// Owners that failed to load.
    pub load_failures: usize,
    /// Per-owner statistics (if requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owners: Option<Vec<OwnerStats>>,
}

/// Statistics for a single owner.
#[derive(Debug, Serialize)]
pub struct OwnerStats {
    /// Owner id.
    pub id: String,
    /// Number of documents.
    pub document_count: usize,
    /// Number of questions.
    pub question_count: usize,
    /// Tag vocabulary size.
    pub tag_count: usize,
    /// Number of attempts.
    pub attempt_count: usize,
}

impl OwnerStats {
    fn of(owner: &Owner) -> Self {
        Self {
            id: owner.id().to_string(),
            document_count: owner.documents().len(),
            question_count: owner.documents().iter().map(|d| d.size()).sum(),
            tag_count: owner.tag_vocabulary().len(),
            attempt_count: owner.attempt_count(),
        }
    }
}

/// Runs the inspect command.
pub fn run(
    options: &StoreOptions,
    show_owners: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open()?;
    let result = inspect(&store, show_owners);

    match format {
        "json" => print_json(&result)?,
        _ => print_text_output(&result),
    }
    Ok(())
}

/// Collects statistics from an open store.
pub fn inspect(store: &StoreRegistry, show_owners: bool) -> InspectResult {
    let stats: Vec<OwnerStats> = store
        .owner_ids()
        .iter()
        .filter_map(|id| store.with_owner(id, OwnerStats::of))
        .collect();

    InspectResult {
        path: store.path().display().to_string(),
        userdata_path: store.persistence().userdata_dir().display().to_string(),
        owner_count: stats.len(),
        document_count: stats.iter().map(|s| s.document_count).sum(),
        question_count: stats.iter().map(|s| s.question_count).sum(),
        attempt_count: stats.iter().map(|s| s.attempt_count).sum(),
        load_failures: store.load_report().failures,
        owners: show_owners.then_some(stats),
    }
}

fn print_text_output(result: &InspectResult) {
    println!("QuizDB Store Inspection");
    println!("=======================");
    println!();
    println!("Path:     {}", result.path);
    println!("Userdata: {}", result.userdata_path);
    println!();
    println!("Contents:");
    println!("  Owners:    {}", result.owner_count);
    println!("  Documents: {}", result.document_count);
    println!("  Questions: {}", result.question_count);
    println!("  Attempts:  {}", result.attempt_count);
    if result.load_failures > 0 {
        println!("  Owners that failed to load: {}", result.load_failures);
    }

    if let Some(owners) = &result.owners {
        println!();
        println!("Owners:");
        for owner in owners {
            println!(
                "  [{}] {} documents, {} questions, {} tags, {} attempts",
                owner.id,
                owner.document_count,
                owner.question_count,
                owner.tag_count,
                owner.attempt_count
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizdb_core::{AnswerOption, Config, Document, Question};
    use tempfile::tempdir;

    #[test]
    fn counts_across_owners() {
        let dir = tempdir().unwrap();
        let store = StoreRegistry::open(Config::new(dir.path())).unwrap();
        for (owner, id) in [("u1", "d1"), ("u1", "d2"), ("u2", "d3")] {
            let doc = Document::new(owner, format!("name {id}"), id, 0).with_questions([
                Question::new("Q", [AnswerOption::new("a", true)]),
            ]);
            store.add_document(owner, doc).unwrap();
        }
        store.create_tag("u2", "art", "🎨").unwrap();

        let result = inspect(&store, true);
        assert_eq!(result.owner_count, 2);
        assert_eq!(result.document_count, 3);
        assert_eq!(result.question_count, 3);
        let owners = result.owners.unwrap();
        assert_eq!(owners[1].id, "u2");
        assert_eq!(owners[1].tag_count, 1);
    }
}
