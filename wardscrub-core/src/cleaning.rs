// wardscrub-core/src/cleaning.rs
//! Normalisation of raw OCR output before extraction.
//!
//! Offsets produced by extraction refer to the cleaned text, never to the raw
//! OCR string, so callers must redact the same snapshot they extracted from.
//! License: MIT OR APACHE 2.0

use log::debug;
use strip_ansi_escapes::strip;

/// Cleans recognised text for extraction.
///
/// Strips ANSI escape sequences and control characters, collapses runs of
/// spaces and tabs inside each line, trims every line and drops blank
/// lines. Line breaks are kept.
pub fn clean_text(raw: &str) -> String {
    // The ANSI stripper only passes `\n` through, so tabs and carriage
    // returns are turned into plain spaces/newlines first.
    let prepared = raw.replace("\r\n", "\n").replace(['\r', '\t'], " ");
    let stripped_bytes = strip(prepared.as_bytes());
    let stripped = String::from_utf8_lossy(&stripped_bytes);

    let cleaned = stripped
        .lines()
        .map(|line| {
            line.chars()
                .filter(|c| !c.is_control())
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    debug!("Cleaned text: {} bytes in, {} bytes out.", raw.len(), cleaned.len());
    cleaned
}
