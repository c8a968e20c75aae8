//! Export command implementation.

use super::{print_json, CliError, StoreOptions};
use quizdb_core::codec::encode_document;
use quizdb_core::BatchReport;
use serde::Serialize;

/// Export summary.
#[derive(Debug, Serialize)]
pub struct ExportResult {
    /// Owners written.
    pub owners: usize,
    /// Documents written.
    pub documents: usize,
    /// Records that failed to write.
    pub failures: usize,
    /// Path of the single exported document, if one was named.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl From<BatchReport> for ExportResult {
    fn from(report: BatchReport) -> Self {
        Self {
            owners: report.owners,
            documents: report.documents,
            failures: report.failures,
            path: None,
        }
    }
}

/// Runs the export command.
///
/// With no owner every owner is written; with an owner but no id every
/// document of that owner is written.
pub fn run(
    options: &StoreOptions,
    owner: Option<&str>,
    id: Option<&str>,
    stdout: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open()?;

    let result = match (owner, id) {
        (Some(owner), Some(id)) if stdout => {
            let document = store
                .document(owner, id)
                .ok_or_else(|| CliError::DocumentNotFound {
                    owner: owner.to_string(),
                    id: id.to_string(),
                })?;
            print!("{}", encode_document(&document, true)?);
            return Ok(());
        }
        (Some(owner), Some(id)) => {
            let path = store.export_document(owner, id)?;
            ExportResult {
                owners: 1,
                documents: 1,
                failures: 0,
                path: Some(path.display().to_string()),
            }
        }
        (Some(owner), None) => ExportResult::from(store.save_owner(owner)),
        (None, _) => ExportResult::from(store.save_all()),
    };

    match format {
        "json" => print_json(&result)?,
        _ => {
            if let Some(path) = &result.path {
                println!("✓ Exported to {path}");
            } else {
                println!(
                    "✓ Exported {} documents for {} owners ({} failures)",
                    result.documents, result.owners, result.failures
                );
            }
        }
    }
    Ok(())
}
