// wardscrub/src/commands/scan.rs
//! `wardscrub scan`: prints the categorized view without redacting.

use std::io::{self, Write};

use anyhow::{Context, Result};
use log::info;

use wardscrub_core::PiiEngine;

use crate::cli::ScanCommand;
use crate::commands::{build_engine, prepare_text, read_text};
use crate::ui::output_format::info_msg;
use crate::ui::summary::{categories_table, medications_table};

pub fn run_scan(cmd: &ScanCommand, quiet: bool) -> Result<()> {
    info!("Starting scan operation.");
    let engine = build_engine(&cmd.patterns)?;
    let text = prepare_text(&read_text(cmd.text.as_deref())?, cmd.patterns.no_clean);
    let views = engine.analyze(&text);

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    if cmd.json {
        let json = serde_json::to_string_pretty(&views.categorized).context("Failed to serialize scan result")?;
        writeln!(writer, "{}", json)?;
        return Ok(());
    }

    if views.categorized.is_empty() {
        info_msg("No PII detected.", quiet);
        return Ok(());
    }
    writeln!(writer, "{}", categories_table(&views.categorized))?;
    if let Some(table) = medications_table(&views.categorized) {
        writeln!(writer, "{}", table)?;
    }
    info_msg(
        format!(
            "{} matches, {} distinct values, {} medication lines.",
            views.spans.len(),
            views.categorized.value_count(),
            views.categorized.medications.len()
        ),
        quiet,
    );
    Ok(())
}
