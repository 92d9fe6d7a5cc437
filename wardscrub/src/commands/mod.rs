// wardscrub/src/commands/mod.rs
//! Subcommand implementations and the helpers they share: building the
//! engine from the pattern flags and reading a document's text.

pub mod batch;
pub mod redact;
pub mod scan;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use wardscrub_core::{clean_text, merge_patterns, PatternConfig, PatternOverlay, RegexEngine};

use crate::cli::PatternArgs;

/// Loads the built-in library, merges the user overlay and applies the
/// enable/disable filters.
pub fn load_pattern_config(args: &PatternArgs) -> Result<PatternConfig> {
    let defaults = PatternConfig::load_default_patterns().context("Failed to load default patterns")?;
    let overlay = match &args.config {
        Some(path) => {
            info!("Merging pattern overrides from {}", path.display());
            Some(
                PatternOverlay::load_from_file(path)
                    .with_context(|| format!("Failed to load pattern file {}", path.display()))?,
            )
        }
        None => None,
    };
    let mut config = merge_patterns(defaults, overlay);
    config.set_active_rules(&args.enable, &args.disable);
    Ok(config)
}

pub fn build_engine(args: &PatternArgs) -> Result<RegexEngine> {
    RegexEngine::new(load_pattern_config(args)?)
}

/// Reads document text from `path`, or from stdin when absent.
pub fn read_text(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => fs::read_to_string(p).with_context(|| format!("Failed to read text file {}", p.display())),
        None => {
            debug!("Reading document text from stdin.");
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read text from stdin")?;
            Ok(buffer)
        }
    }
}

/// Applies the cleaner unless `--no-clean` was given.
pub fn prepare_text(raw: &str, no_clean: bool) -> String {
    if no_clean {
        raw.to_string()
    } else {
        clean_text(raw)
    }
}
