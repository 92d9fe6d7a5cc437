// wardscrub/src/commands/redact.rs
//! `wardscrub redact`: one document, text plus optional scan.

use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use log::{debug, info};

use wardscrub_core::{load_image, load_word_boxes, process_document, save_image, DocumentInput};

use crate::cli::RedactCommand;
use crate::commands::{build_engine, prepare_text, read_text};
use crate::ui::output_format::{info_msg, success_msg, warn_msg};

pub fn run_redact(cmd: &RedactCommand, quiet: bool) -> Result<()> {
    info!("Starting redact operation.");
    let engine = build_engine(&cmd.patterns)?;

    let raw = read_text(cmd.text.as_deref())?;
    let text = prepare_text(&raw, cmd.patterns.no_clean);
    debug!("Document text: {} bytes raw, {} bytes prepared.", raw.len(), text.len());

    let word_boxes = match &cmd.tokens {
        Some(path) => Some(
            load_word_boxes(path).with_context(|| format!("Failed to load OCR tokens from {}", path.display()))?,
        ),
        None => None,
    };
    if cmd.image.is_some() && word_boxes.is_none() {
        warn_msg("No --tokens given: the image will be copied without masking.");
    }
    let image = match &cmd.image {
        Some(path) => Some(load_image(path)?),
        None => None,
    };

    let source_id = cmd
        .text
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdin".to_string());
    let input = DocumentInput {
        source_id,
        text,
        word_boxes,
        image,
    };
    let output = process_document(&engine, &input)?;

    match &cmd.output {
        Some(path) => {
            fs::write(path, format!("{}\n", output.redacted_text))
                .with_context(|| format!("Failed to write redacted text to {}", path.display()))?;
            info_msg(format!("Redacted text written to {}", path.display()), quiet);
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            writeln!(writer, "{}", output.redacted_text)?;
        }
    }

    if let (Some(image), Some(path)) = (&output.redacted_image, &cmd.image_output) {
        save_image(image, path).with_context(|| format!("Failed to save redacted image to {}", path.display()))?;
        info_msg(format!("Redacted image written to {}", path.display()), quiet);
    }

    if let Some(path) = &cmd.report {
        output.report.write_to(path)?;
    }

    success_msg(
        format!(
            "{} matches redacted, {} image regions masked.",
            output.report.match_count, output.report.masked_boxes
        ),
        quiet,
    );
    Ok(())
}
