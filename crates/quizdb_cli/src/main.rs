//! QuizDB CLI
//!
//! Command-line tools for QuizDB data directories.
//!
//! # Commands
//!
//! - `inspect` - Display owners and document, tag and attempt counts
//! - `list` - List an owner's documents with filter and sort tokens
//! - `import` - Import document files into an owner
//! - `export` - Write documents back to the data directory
//! - `delete` - Delete a document and its attempts
//! - `tag` - Manage tags
//! - `verify` - Decode every file and report invalid content

mod commands;

use clap::{Parser, Subcommand};
use commands::{CliError, StoreOptions};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// QuizDB command-line tools.
#[derive(Parser)]
#[command(name = "quizdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the data directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Path to the owner metadata directory (default: <path>/userdata)
    #[arg(global = true, short, long)]
    userdata: Option<PathBuf>,

    /// Reject invalid questions instead of dropping them
    #[arg(global = true, long)]
    strict: bool,

    /// Output format (text, json)
    #[arg(global = true, short, long, default_value = "text")]
    format: String,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display owners and document, tag and attempt counts
    Inspect {
        /// Show per-owner details
        #[arg(short, long)]
        owners: bool,
    },

    /// List an owner's documents
    List {
        /// Owner id
        owner: String,

        /// Whitespace-separated filter tokens, e.g. "size>3 tag=sci.*"
        #[arg(long, default_value = "")]
        filter: String,

        /// Sort key (name, date, id, size, start, score), "-" prefix reverses
        #[arg(long)]
        sort: Option<String>,
    },

    /// Import document files into an owner
    Import {
        /// Owner id
        owner: String,

        /// Files to import
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Write documents back to the data directory
    Export {
        /// Owner id (all owners if omitted)
        owner: Option<String>,

        /// Document id (all of the owner's documents if omitted)
        id: Option<String>,

        /// Print the document instead of writing it
        #[arg(long, requires = "id")]
        stdout: bool,
    },

    /// Delete a document and its attempts
    Delete {
        /// Owner id
        owner: String,

        /// Document id
        id: String,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Decode every file and report invalid content
    Verify,

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum TagAction {
    /// List an owner's tags with document counts
    List {
        /// Owner id
        owner: String,
    },
    /// Declare a tag
    Create {
        /// Owner id
        owner: String,
        /// Tag name
        name: String,
        /// Glyph shown next to the tag
        #[arg(default_value = "🏷")]
        glyph: String,
    },
    /// Remove a tag from the owner and every document
    Delete {
        /// Owner id
        owner: String,
        /// Tag name
        name: String,
    },
    /// Tag a document
    Add {
        /// Owner id
        owner: String,
        /// Document id
        id: String,
        /// Tag name
        tag: String,
    },
    /// Remove a tag from a document
    Remove {
        /// Owner id
        owner: String,
        /// Document id
        id: String,
        /// Tag name
        tag: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so json output stays parseable
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let options = |command: &'static str| -> Result<StoreOptions, CliError> {
        Ok(StoreOptions {
            path: cli.path.clone().ok_or(CliError::MissingPath(command))?,
            userdata: cli.userdata.clone(),
            strict: cli.strict,
        })
    };
    let format = cli.format.as_str();

    match &cli.command {
        Commands::Inspect { owners } => {
            commands::inspect::run(&options("inspect")?, *owners, format)?;
        }
        Commands::List {
            owner,
            filter,
            sort,
        } => {
            commands::list::run(&options("list")?, owner, filter, sort.as_deref(), format)?;
        }
        Commands::Import { owner, files } => {
            commands::import::run(&options("import")?, owner, files, format)?;
        }
        Commands::Export { owner, id, stdout } => {
            commands::export::run(
                &options("export")?,
                owner.as_deref(),
                id.as_deref(),
                *stdout,
                format,
            )?;
        }
        Commands::Delete { owner, id } => {
            commands::delete::run(&options("delete")?, owner, id, format)?;
        }
        Commands::Tag { action } => {
            let options = options("tag")?;
            match action {
                TagAction::List { owner } => commands::tag::list(&options, owner, format)?,
                TagAction::Create { owner, name, glyph } => {
                    commands::tag::create(&options, owner, name, glyph)?;
                }
                TagAction::Delete { owner, name } => commands::tag::delete(&options, owner, name)?,
                TagAction::Add { owner, id, tag } => commands::tag::add(&options, owner, id, tag)?,
                TagAction::Remove { owner, id, tag } => {
                    commands::tag::remove(&options, owner, id, tag)?;
                }
            }
        }
        Commands::Verify => {
            commands::verify::run(&options("verify")?, format)?;
        }
        Commands::Version => {
            println!("QuizDB CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("QuizDB Core v{}", quizdb_core::VERSION);
        }
    }

    Ok(())
}
