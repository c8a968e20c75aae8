//! Verify command implementation.
//!
//! Reads files directly and does not take the data directory lock, so
//! it can run next to a live store.

use super::{print_json, CliError, StoreOptions};
use quizdb_core::codec::{decode_attempt, decode_profile};
use quizdb_core::{CoreResult, Persistence};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Verification result.
#[derive(Debug, Default, Serialize)]
pub struct VerifyResult {
    /// Number of files checked.
    pub files_checked: usize,
    /// Files that decoded cleanly.
    pub valid_files: usize,
    /// Files that decoded but lost questions or options.
    pub files_with_drops: usize,
    /// Files that could not be used at all.
    pub invalid_files: usize,
    /// Questions dropped across all files.
    pub dropped_questions: usize,
    /// Options dropped across all files.
    pub dropped_options: usize,
    /// One line per problem.
    pub errors: Vec<String>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.invalid_files == 0
    }

    fn fail(&mut self, path: &Path, reason: impl std::fmt::Display) {
        self.invalid_files += 1;
        self.errors.push(format!("{}: {reason}", path.display()));
    }
}

/// Runs the verify command.
pub fn run(options: &StoreOptions, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let persistence = Persistence::from_config(&options.config());
    let result = verify(&persistence)?;

    match format {
        "json" => print_json(&result)?,
        _ => print_text_output(&persistence, &result),
    }

    if result.is_ok() {
        Ok(())
    } else {
        Err(CliError::VerificationFailed(result.invalid_files).into())
    }
}

/// Decodes every document, profile and attempt file.
pub fn verify(persistence: &Persistence) -> CoreResult<VerifyResult> {
    let mut result = VerifyResult::default();
    for owner in persistence.list_owner_ids()? {
        for path in persistence.document_files(&owner)? {
            result.files_checked += 1;
            match persistence.read_document(&path) {
                Ok(partial) => {
                    let named = partial.name.as_deref().is_some_and(|n| !n.is_empty());
                    if !named {
                        result.fail(&path, "document has no name");
                    } else if partial.questions.is_empty() {
                        result.fail(&path, "document has no valid questions");
                    } else if partial.dropped.is_empty() {
                        result.valid_files += 1;
                    } else {
                        result.files_with_drops += 1;
                        result.errors.push(format!(
                            "{}: dropped {} questions and {} options",
                            path.display(),
                            partial.dropped.questions,
                            partial.dropped.options
                        ));
                    }
                    result.dropped_questions += partial.dropped.questions;
                    result.dropped_options += partial.dropped.options;
                }
                Err(err) => result.fail(&path, err),
            }
        }

        let profile = persistence.profile_path(&owner);
        if profile.exists() {
            result.files_checked += 1;
            match fs::read_to_string(&profile).map(|text| decode_profile(&text)) {
                Ok(Ok(_)) => result.valid_files += 1,
                Ok(Err(err)) => result.fail(&profile, err),
                Err(err) => result.fail(&profile, err),
            }
        }

        for path in persistence.attempt_files(&owner)? {
            result.files_checked += 1;
            match fs::read_to_string(&path).map(|text| decode_attempt(&text)) {
                Ok(Ok(_)) => result.valid_files += 1,
                Ok(Err(err)) => result.fail(&path, err),
                Err(err) => result.fail(&path, err),
            }
        }
    }
    Ok(result)
}

fn print_text_output(persistence: &Persistence, result: &VerifyResult) {
    println!("Verifying store at {}", persistence.data_dir().display());
    println!();
    println!("  Files checked:    {}", result.files_checked);
    println!("  Valid:            {}", result.valid_files);
    println!("  With drops:       {}", result.files_with_drops);
    println!("  Invalid:          {}", result.invalid_files);
    println!("  Dropped questions: {}", result.dropped_questions);
    println!("  Dropped options:   {}", result.dropped_options);
    if !result.errors.is_empty() {
        println!();
        println!("Problems:");
        for error in &result.errors {
            println!("  - {error}");
        }
    }
    println!();
    if result.is_ok() {
        println!("✓ Store verification passed");
    } else {
        println!("✗ Store verification failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn classifies_files() {
        let dir = tempdir().unwrap();
        let owner = dir.path().join("u1");
        fs::create_dir_all(&owner).unwrap();
        fs::write(
            owner.join("good.json"),
            r#"{"name":"Good","questions":[{"question":"Q","options":[{"text":"a","isCorrect":true}]}]}"#,
        )
        .unwrap();
        fs::write(
            owner.join("lossy.json"),
            r#"{"name":"Lossy","questions":[
                {"question":"Q","options":[{"text":"a","isCorrect":true}]},
                {"question":"Q2","options":[]}]}"#,
        )
        .unwrap();
        fs::write(owner.join("empty.json"), r#"{"name":"Empty","questions":[]}"#).unwrap();
        fs::write(owner.join("broken.json"), "{").unwrap();

        let persistence = Persistence::new(dir.path(), dir.path().join("userdata"));
        let result = verify(&persistence).unwrap();
        assert_eq!(result.files_checked, 4);
        assert_eq!(result.valid_files, 1);
        assert_eq!(result.files_with_drops, 1);
        assert_eq!(result.invalid_files, 2);
        assert_eq!(result.dropped_questions, 1);
        assert!(!result.is_ok());
    }
}
