// wardscrub-core/src/engines/regex_engine.rs
//! A `PiiEngine` implementation built on the regex pattern library.
//!
//! Composes the [`EntityExtractor`] and the [`MedicationParser`] over a single
//! [`CompiledPatterns`] set owned by the engine.
//! License: MIT OR APACHE 2.0

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::config::PatternConfig;
use crate::engine::{PiiEngine, RedactedText};
use crate::engines::extractor::EntityExtractor;
use crate::engines::medication::MedicationParser;
use crate::errors::WardscrubError;
use crate::patterns::compiler::{compile_patterns, CompiledPatterns};
use crate::pii_match::{MedicationRecord, PiiMatch};
use crate::redact::redact_spans;
use crate::views::{build_views, resolve_overlaps, PiiViews};

#[derive(Debug, Clone)]
pub struct RegexEngine {
    compiled: Arc<CompiledPatterns>,
    config: PatternConfig,
    extractor: EntityExtractor,
    medications: MedicationParser,
}

impl RegexEngine {
    pub fn new(config: PatternConfig) -> Result<Self> {
        let compiled = Arc::new(
            compile_patterns(&config).context("Failed to compile PII patterns for RegexEngine")?,
        );
        info!(
            "RegexEngine ready with {} rules (medication parsing {}).",
            compiled.rules.len(),
            if compiled.medication.is_some() { "on" } else { "off" }
        );
        Ok(Self {
            extractor: EntityExtractor::new(Arc::clone(&compiled)),
            medications: MedicationParser::new(Arc::clone(&compiled)),
            compiled,
            config,
        })
    }

    /// Builds an engine from the embedded default pattern library.
    pub fn with_defaults() -> Result<Self> {
        Self::new(PatternConfig::load_default_patterns()?)
    }
}

impl PiiEngine for RegexEngine {
    fn find_matches(&self, text: &str) -> Vec<PiiMatch> {
        self.extractor.extract(text)
    }

    fn parse_medications(&self, text: &str) -> Vec<MedicationRecord> {
        self.medications.parse(text)
    }

    fn analyze(&self, text: &str) -> PiiViews {
        let matches = self.find_matches(text);
        let medications = self.parse_medications(text);
        build_views(&self.compiled, matches, medications)
    }

    fn redact_text(&self, text: &str) -> Result<RedactedText, WardscrubError> {
        let views = self.analyze(text);
        let applied = resolve_overlaps(&views.spans);
        debug!(
            "Resolved {} canonical spans into {} redaction spans.",
            views.spans.len(),
            applied.len()
        );
        let redacted = redact_spans(text, &applied)?;
        Ok(RedactedText {
            text: redacted,
            views,
            applied,
        })
    }

    fn compiled_patterns(&self) -> &CompiledPatterns {
        &self.compiled
    }

    fn get_config(&self) -> &PatternConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_redact_text_handles_overlapping_rules() -> Result<()> {
        let engine = RegexEngine::with_defaults()?;
        let out = engine.redact_text("IPD No: 12/05/2023")?;
        assert_eq!(out.text, "IPD No: [IPD REDACTED]");
        assert_eq!(out.views.spans.len(), 2);
        assert_eq!(out.applied.len(), 1);
        Ok(())
    }

    #[test]
    fn test_analyze_without_pii() -> Result<()> {
        let engine = RegexEngine::with_defaults()?;
        let views = engine.analyze("Diet: soft\nRest advised");
        assert!(views.spans.is_empty());
        assert!(views.categorized.is_empty());
        assert_eq!(engine.redact_text("Diet: soft")?.text, "Diet: soft");
        Ok(())
    }

    #[test]
    fn test_medications_are_not_redacted_in_text() -> Result<()> {
        let engine = RegexEngine::with_defaults()?;
        let out = engine.redact_text("TAB PARACETAMOL 500mg PO BD")?;
        assert_eq!(out.views.categorized.medications.len(), 1);
        assert_eq!(out.text, "TAB PARACETAMOL 500mg PO BD");
        Ok(())
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let config = PatternConfig {
            rules: vec![crate::config::PatternRule {
                name: "broken".to_string(),
                pattern: Some("(".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(RegexEngine::new(config).is_err());
    }

    #[test]
    fn test_engine_is_shareable_across_threads() -> Result<()> {
        let engine: Arc<dyn PiiEngine> = Arc::new(RegexEngine::with_defaults()?);
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || engine.find_matches(&format!("Age: {}", 40 + i)).len())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 1);
        }
        Ok(())
    }
}
