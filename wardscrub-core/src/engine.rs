// wardscrub-core/src/engine.rs
//! Defines the core `PiiEngine` trait and the result of a text redaction.
//!
//! The trait decouples the CLI and the headless helpers from the concrete
//! extraction strategy. Every engine works on one immutable text snapshot per
//! call and keeps no state between calls, so a single engine can serve many
//! documents from many threads.
//!
//! License: MIT OR APACHE 2.0

use serde::{Deserialize, Serialize};

use crate::config::PatternConfig;
use crate::errors::WardscrubError;
use crate::patterns::compiler::CompiledPatterns;
use crate::pii_match::{MedicationRecord, PiiMatch};
use crate::views::PiiViews;

/// Output of [`PiiEngine::redact_text`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactedText {
    /// The rewritten text.
    pub text: String,
    /// Both views over the canonical matches of the input snapshot.
    pub views: PiiViews,
    /// The non-overlapping spans that were actually replaced, by start offset.
    pub applied: Vec<PiiMatch>,
}

/// A trait that defines the core functionality of a PII engine.
pub trait PiiEngine: Send + Sync {
    /// Finds every canonical match in `text`, in rule order then position.
    ///
    /// Matches may overlap. Offsets refer to `text` exactly as passed.
    fn find_matches(&self, text: &str) -> Vec<PiiMatch>;

    /// Parses medication lines. Records carry no offsets.
    fn parse_medications(&self, text: &str) -> Vec<MedicationRecord>;

    /// Runs extraction and medication parsing and builds both views.
    fn analyze(&self, text: &str) -> PiiViews;

    /// Analyzes `text` and replaces every detected span with its placeholder.
    ///
    /// Overlapping spans are resolved before rewriting.
    fn redact_text(&self, text: &str) -> Result<RedactedText, WardscrubError>;

    /// Returns the patterns compiled at construction.
    fn compiled_patterns(&self) -> &CompiledPatterns;

    /// Returns the configuration the engine was built from.
    fn get_config(&self) -> &PatternConfig;
}
