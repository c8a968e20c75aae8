//! Delete command implementation.

use super::{print_json, CliError, StoreOptions};
use serde::Serialize;

/// What was deleted.
#[derive(Debug, Serialize)]
pub struct DeleteResult {
    /// Document id.
    pub id: String,
    /// Document name.
    pub name: String,
    /// Number of questions it had.
    pub size: usize,
}

/// Runs the delete command.
pub fn run(
    options: &StoreOptions,
    owner: &str,
    id: &str,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open()?;
    let document = store
        .delete_document(owner, id)?
        .ok_or_else(|| CliError::DocumentNotFound {
            owner: owner.to_string(),
            id: id.to_string(),
        })?;
    let result = DeleteResult {
        id: document.id().to_string(),
        name: document.name().to_string(),
        size: document.size(),
    };

    match format {
        "json" => print_json(&result)?,
        _ => println!("✓ Deleted {} ({}, {} questions)", result.id, result.name, result.size),
    }
    Ok(())
}
