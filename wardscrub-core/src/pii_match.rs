// wardscrub-core/src/pii_match.rs
//! Provides the canonical record types produced by extraction, plus the
//! logging helpers that keep matched values out of debug output.

use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

lazy_static! {
    /// Read once: whether raw PII may appear in debug logs.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("WARDSCRUB_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// A single canonical match produced by one regex hit.
///
/// `start`/`end` are a half-open byte interval into the exact text snapshot
/// the match was produced from. Applying it to any other string is undefined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PiiMatch {
    #[serde(rename = "type")]
    pub pii_type: String,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

impl PiiMatch {
    pub fn new(pii_type: impl Into<String>, value: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            pii_type: pii_type.into(),
            value: value.into(),
            start,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn overlaps(&self, other: &PiiMatch) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The literal text that replaces this span: `[<TYPE> REDACTED]`.
    pub fn placeholder(&self) -> String {
        format!("[{} REDACTED]", self.pii_type.to_uppercase())
    }
}

/// A structured medication line. Fields that could not be parsed are empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MedicationRecord {
    pub name: String,
    pub dose: String,
    pub route: String,
    pub frequency: String,
}

impl MedicationRecord {
    /// Non-empty fields, in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        [&self.name, &self.dose, &self.route, &self.frequency]
            .into_iter()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    if s.len() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", s.len())
    }
}

pub(crate) fn get_loggable_content(sensitive_content: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        sensitive_content.to_string()
    } else {
        redact_sensitive(sensitive_content)
    }
}

pub fn log_captured_match_debug(module_path: &str, pii_type: &str, value: &str, start: usize, end: usize) {
    debug!(
        "{} Captured match for rule '{}' at [{}, {}): '{}'",
        module_path,
        pii_type,
        start,
        end,
        get_loggable_content(value)
    );
}

pub fn log_redaction_action_debug(module_path: &str, original: &str, replacement: &str, pii_type: &str) {
    debug!(
        "{} Redaction action: Original='{}', Redacted='{}' for rule '{}'",
        module_path,
        get_loggable_content(original),
        replacement,
        pii_type
    );
}

/// Stable, whitespace- and case-insensitive hash of a matched value.
pub fn canonical_sample_hash(pii_type: &str, snippet: &str) -> String {
    let normalized = snippet
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut hasher = Sha256::new();
    hasher.update(pii_type.as_bytes());
    hasher.update(b":");
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_sensitive_short_string() {
        assert_eq!(redact_sensitive("abc"), "[REDACTED]".to_string());
    }

    #[test]
    fn test_redact_sensitive_long_string() {
        assert_eq!(redact_sensitive("123456789"), "[REDACTED: 9 chars]".to_string());
    }

    #[test]
    fn test_placeholder_uppercases_type() {
        let m = PiiMatch::new("uhid", "12345", 0, 5);
        assert_eq!(m.placeholder(), "[UHID REDACTED]");
    }

    #[test]
    fn test_overlaps_is_half_open() {
        let a = PiiMatch::new("a", "x", 0, 5);
        let b = PiiMatch::new("b", "y", 5, 8);
        let c = PiiMatch::new("c", "z", 4, 6);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn test_match_serializes_type_field() {
        let m = PiiMatch::new("age", "45", 5, 7);
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["type"], "age");
        assert_eq!(json["start"], 5);
    }

    #[test]
    fn test_canonical_sample_hash_consistency() {
        let h1 = canonical_sample_hash("email", "Test@Example.COM ");
        let h2 = canonical_sample_hash("email", "test@example.com");
        assert_eq!(h1, h2);
    }
}
