//! Import command implementation.

use super::{print_json, CliError, StoreOptions};
use quizdb_core::{AddOutcome, StoreRegistry};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of importing one file.
#[derive(Debug, Serialize)]
pub struct ImportResult {
    /// The file.
    pub file: String,
    /// Stored document id, when the import succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// `inserted`, `merged` or `failed`.
    pub status: &'static str,
    /// Questions added by a merge.
    pub added_questions: usize,
    /// Questions dropped while decoding.
    pub dropped_questions: usize,
    /// Options dropped while decoding.
    pub dropped_options: usize,
    /// Why the import failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs the import command.
pub fn run(
    options: &StoreOptions,
    owner: &str,
    files: &[PathBuf],
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open()?;
    let results: Vec<ImportResult> = files
        .iter()
        .map(|file| import_one(&store, owner, file))
        .collect();
    let failed = results.iter().filter(|r| r.error.is_some()).count();

    match format {
        "json" => print_json(&results)?,
        _ => {
            for result in &results {
                match (&result.id, &result.error) {
                    (Some(id), _) => println!(
                        "✓ {} -> {} ({}, {} new questions, {} dropped)",
                        result.file,
                        id,
                        result.status,
                        result.added_questions,
                        result.dropped_questions
                    ),
                    (None, Some(error)) => println!("✗ {}: {}", result.file, error),
                    (None, None) => {}
                }
            }
        }
    }

    info!(owner, files = files.len(), failed, "import finished");
    if failed > 0 {
        return Err(CliError::ImportFailed(failed).into());
    }
    Ok(())
}

/// Imports one file, capturing failure in the result.
pub fn import_one(store: &StoreRegistry, owner: &str, file: &Path) -> ImportResult {
    let mut result = ImportResult {
        file: file.display().to_string(),
        id: None,
        status: "failed",
        added_questions: 0,
        dropped_questions: 0,
        dropped_options: 0,
        error: None,
    };
    match store.import_file(owner, file) {
        Ok(report) => {
            result.id = Some(report.outcome.id().to_string());
            result.dropped_questions = report.dropped.questions;
            result.dropped_options = report.dropped.options;
            match report.outcome {
                AddOutcome::Inserted { .. } => result.status = "inserted",
                AddOutcome::Merged { added, .. } => {
                    result.status = "merged";
                    result.added_questions = added;
                }
            }
        }
        Err(err) => result.error = Some(err.to_string()),
    }
    result
}
