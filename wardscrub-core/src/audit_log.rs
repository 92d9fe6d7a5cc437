// wardscrub-core/src/audit_log.rs
//! Per-document audit report.
//!
//! The report is the downstream consumer of the categorized view, so it
//! carries the deduplicated values verbatim. Span entries only carry a
//! canonical hash of the matched text.
//!
//! License: MIT OR APACHE 2.0

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::pii_match::{canonical_sample_hash, PiiMatch};
use crate::views::CategorizedPii;

/// A single redacted span, without its raw value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(rename = "type")]
    pub pii_type: String,
    pub start: usize,
    pub end: usize,
    pub sample_hash: String,
}

impl From<&PiiMatch> for AuditEntry {
    fn from(m: &PiiMatch) -> Self {
        Self {
            pii_type: m.pii_type.clone(),
            start: m.start,
            end: m.end,
            sample_hash: canonical_sample_hash(&m.pii_type, &m.value),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub run_id: String,
    pub timestamp: String,
    pub source_id: String,
    /// SHA-256 of the cleaned text the offsets refer to.
    pub input_hash: String,
    pub match_count: usize,
    pub matches: Vec<AuditEntry>,
    pub categorized: CategorizedPii,
    pub masked_boxes: usize,
}

/// Hex SHA-256 of `content`.
pub fn input_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

impl AuditReport {
    pub fn new(source_id: &str, cleaned_text: &str, spans: &[PiiMatch], categorized: CategorizedPii) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            source_id: source_id.to_string(),
            input_hash: input_hash(cleaned_text),
            match_count: spans.len(),
            matches: spans.iter().map(AuditEntry::from).collect(),
            categorized,
            masked_boxes: 0,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize audit report")
    }

    /// Writes the report as pretty JSON, replacing any existing file.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json_pretty()?)
            .with_context(|| format!("Failed to write audit report to {}", path.display()))?;
        info!("Wrote audit report for '{}' to {}", self.source_id, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_report_never_holds_raw_span_values() -> Result<()> {
        let spans = vec![PiiMatch::new("uhid", "UH998877", 9, 17)];
        let mut categorized = CategorizedPii::with_categories(["uhid_numbers"]);
        categorized.insert("uhid_numbers", "UH998877");
        let report = AuditReport::new("doc1", "UHID No: UH998877", &spans, categorized);

        assert_eq!(report.match_count, 1);
        assert_eq!(report.matches[0].sample_hash, canonical_sample_hash("uhid", "UH998877"));
        let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty()?)?;
        assert_eq!(json["matches"][0]["type"], "uhid");
        assert!(json["matches"][0].get("value").is_none());
        assert_eq!(json["categorized"]["uhid_numbers"][0], "UH998877");
        Ok(())
    }

    #[test]
    fn test_input_hash_is_sha256_hex() {
        assert_eq!(
            input_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_write_to_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("report.json");
        let report = AuditReport::new("doc", "", &[], CategorizedPii::default());
        report.write_to(&path)?;
        let back: AuditReport = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(back.run_id, report.run_id);
        Ok(())
    }
}
