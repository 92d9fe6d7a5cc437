// wardscrub/src/cli.rs
//! This file defines the command-line interface (CLI) for the wardscrub
//! application, including all available commands and their arguments.
//! License: MIT OR APACHE 2.0

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "wardscrub",
    version = env!("CARGO_PKG_VERSION"),
    about = "Redact patient identifiers from OCR-transcribed hospital forms",
    long_about = "Wardscrub detects personally identifiable and clinical information in text recognised from scanned hospital forms. It rewrites the text with typed placeholders, masks the matching word boxes on the scan, and writes a per-document audit report.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, conflicts_with = "quiet", help = "Enable debug logging.")]
    pub debug: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `wardscrub` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Redacts one document: text, and optionally its scan.
    #[command(about = "Redact one document's text and, optionally, its scanned image.")]
    Redact(RedactCommand),

    /// Reports detected PII without redacting anything.
    #[command(about = "Scan a document and print the categorized PII it contains.")]
    Scan(ScanCommand),

    /// Redacts every document of a directory in parallel.
    #[command(about = "Redact every document in a directory, in parallel.")]
    Batch(BatchCommand),
}

/// Pattern library selection, shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct PatternArgs {
    /// Path to a YAML pattern file merged over the built-in library.
    #[arg(long = "config", value_name = "FILE", env = "WARDSCRUB_CONFIG", help = "Path to a YAML pattern file merged over the built-in library.")]
    pub config: Option<PathBuf>,

    /// Rule or group names to enable (comma-separated); opt-in rules need this.
    #[arg(long, short = 'e', value_delimiter = ',', help = "Enable these rules or groups (comma-separated).")]
    pub enable: Vec<String>,

    /// Rule or group names to disable (comma-separated).
    #[arg(long, short = 'x', value_delimiter = ',', help = "Disable these rules or groups (comma-separated).")]
    pub disable: Vec<String>,

    /// Skip text cleaning; offsets then refer to the raw input.
    #[arg(long = "no-clean", help = "Do not normalise whitespace and control characters before extraction.")]
    pub no_clean: bool,
}

/// Arguments for the `redact` command.
#[derive(Parser, Debug)]
pub struct RedactCommand {
    /// Recognised text of the document (reads from stdin if not provided).
    #[arg(long = "text", short = 't', value_name = "FILE", help = "Read the document text from a file instead of stdin.")]
    pub text: Option<PathBuf>,

    /// OCR token geometry (.tsv or .json).
    #[arg(long = "tokens", value_name = "FILE", help = "OCR token geometry: Tesseract TSV or JSON.")]
    pub tokens: Option<PathBuf>,

    /// Scanned image of the document.
    #[arg(long = "image", value_name = "FILE", requires = "image_output", help = "Scanned image to mask.")]
    pub image: Option<PathBuf>,

    /// Write redacted text to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write redacted text to a file instead of stdout.")]
    pub output: Option<PathBuf>,

    /// Where to write the masked image.
    #[arg(long = "image-output", value_name = "FILE", help = "Write the masked image to this file.")]
    pub image_output: Option<PathBuf>,

    /// Where to write the audit report (JSON).
    #[arg(long = "report", value_name = "FILE", help = "Write the audit report (JSON) to this file.")]
    pub report: Option<PathBuf>,

    #[command(flatten)]
    pub patterns: PatternArgs,
}

/// Arguments for the `scan` command.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Recognised text of the document (reads from stdin if not provided).
    #[arg(long = "text", short = 't', value_name = "FILE", help = "Read the document text from a file instead of stdin.")]
    pub text: Option<PathBuf>,

    /// Print the categorized view as JSON instead of a table.
    #[arg(long = "json", help = "Print the categorized view as JSON to stdout.")]
    pub json: bool,

    #[command(flatten)]
    pub patterns: PatternArgs,
}

/// Arguments for the `batch` command.
#[derive(Parser, Debug)]
pub struct BatchCommand {
    /// Directory holding `<stem>.txt` documents with optional `<stem>.tsv|json` and `<stem>.png|jpg|jpeg`.
    #[arg(long = "input", short = 'i', value_name = "DIR", help = "Directory of documents to redact.")]
    pub input: PathBuf,

    /// Directory receiving redacted text, images and reports.
    #[arg(long = "output", short = 'o', value_name = "DIR", help = "Directory for redacted outputs (created if missing).")]
    pub output: PathBuf,

    /// Number of documents processed at once.
    #[arg(long = "jobs", short = 'j', value_name = "N", default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..), help = "Number of documents processed concurrently.")]
    pub jobs: u16,

    /// Redact documents whose outputs already exist.
    #[arg(long = "force", help = "Reprocess documents that already have outputs in the output directory.")]
    pub force: bool,

    #[command(flatten)]
    pub patterns: PatternArgs,
}
