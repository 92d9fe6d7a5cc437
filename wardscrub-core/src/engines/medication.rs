// wardscrub-core/src/engines/medication.rs
//! Per-line medication parser.
//!
//! A line qualifies only when it contains a drug-form keyword. Lines are
//! never joined: a dose or frequency wrapped onto the next physical line is
//! not picked up.
//! License: MIT OR APACHE 2.0

use std::sync::Arc;

use log::debug;

use crate::patterns::compiler::{CompiledMedication, CompiledPatterns};
use crate::pii_match::{get_loggable_content, MedicationRecord};

#[derive(Debug, Clone)]
pub struct MedicationParser {
    patterns: Arc<CompiledPatterns>,
}

impl MedicationParser {
    pub fn new(patterns: Arc<CompiledPatterns>) -> Self {
        Self { patterns }
    }

    fn vocab(&self) -> Option<&CompiledMedication> {
        self.patterns.medication.as_ref()
    }

    /// Parses one already-trimmed line. Returns `None` when the line has no
    /// drug-form keyword.
    pub fn parse_line(&self, line: &str) -> Option<MedicationRecord> {
        let vocab = self.vocab()?;
        let form = vocab.form.find(line)?;

        let name = form.as_str().trim().trim_end_matches([' ', ':']).to_string();
        let dose = vocab.dose.find(line).map(|m| m.as_str().to_string()).unwrap_or_default();
        let route = vocab
            .route
            .as_ref()
            .and_then(|re| re.find(line))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let frequency = vocab
            .frequency
            .as_ref()
            .and_then(|re| re.find(line))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| fallback_frequency(vocab, line));

        let record = MedicationRecord { name, dose, route, frequency };
        debug!(
            "Parsed medication line '{}': dose='{}', route='{}', frequency='{}'",
            get_loggable_content(&record.name),
            record.dose,
            record.route,
            record.frequency
        );
        Some(record)
    }

    /// Parses every non-empty line of `text`, at most one record per line.
    pub fn parse(&self, text: &str) -> Vec<MedicationRecord> {
        if self.vocab().is_none() {
            return Vec::new();
        }
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|line| self.parse_line(line))
            .collect()
    }
}

/// Scans the ordered fallback table against the space-stripped, lowercased
/// line. First fragment found wins; empty when none is.
fn fallback_frequency(vocab: &CompiledMedication, line: &str) -> String {
    let normalized = line.replace(' ', "").to_lowercase();
    vocab
        .fallbacks
        .iter()
        .find(|entry| normalized.contains(entry.fragment.as_str()))
        .map(|entry| entry.value.clone())
        .unwrap_or_default()
}
