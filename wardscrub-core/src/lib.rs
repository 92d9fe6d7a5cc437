// wardscrub-core/src/lib.rs
//! # Wardscrub Core Library
//!
//! `wardscrub-core` detects and redacts personally identifiable and clinical
//! information in OCR-transcribed hospital forms. It turns recognised text
//! into typed, positioned matches, rewrites the text without corrupting
//! offsets, and masks the pixel boxes of OCR tokens that belong to detected
//! values.
//!
//! The library is pure: no I/O happens inside extraction or redaction, and no
//! state is shared between documents. Loading files and encoding images are
//! left to the caller (see the `wardscrub` CLI).
//!
//! ## Modules
//!
//! * `config`: The Pattern Library (`PatternConfig`), medication vocabularies and image settings.
//! * `patterns`: Compiles the library into ready-to-run regexes.
//! * `validators`: Structural checks (Verhoeff, PAN) applied after a regex hit.
//! * `cleaning`: Normalises raw OCR output before extraction.
//! * `ocr`: Reads OCR token geometry (Tesseract TSV or JSON).
//! * `engines`: The entity extractor, the medication line parser and the `RegexEngine`.
//! * `engine`: The `PiiEngine` trait.
//! * `views`: Categorized view, span list and overlap resolution.
//! * `redact`: Span redaction for text and box masking for images.
//! * `audit_log`: Per-document audit report.
//! * `headless`: One-shot helpers for non-interactive use.
//!
//! ## Usage Example
//!
//! ```rust
//! use wardscrub_core::{PatternConfig, PiiEngine, RegexEngine};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let engine = RegexEngine::new(PatternConfig::load_default_patterns()?)?;
//!     let out = engine.redact_text("UHID No: 12345\nAge: 45")?;
//!     assert_eq!(out.text, "UHID No: [UHID REDACTED]\nAge: [AGE REDACTED]");
//!     assert_eq!(out.views.categorized.get("ages"), ["45"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Operations with a precise failure mode return [`WardscrubError`]
//! (`SpanOutOfBounds`, `ImageLoadError`...). Configuration loading returns
//! `anyhow::Error` with context. Extraction never fails for lack of matches.
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod audit_log;
pub mod cleaning;
pub mod config;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod headless;
pub mod ocr;
pub mod patterns;
pub mod pii_match;
pub mod redact;
pub mod validators;
pub mod views;

/// Re-exports the Pattern Library types and helpers.
pub use config::{
    merge_patterns, FrequencyFallback, ImageRedactionConfig, MedicationVocabulary, PatternConfig, PatternGroup,
    PatternOverlay, PatternRule, RuleNotFoundError, MAX_PATTERN_LENGTH,
};

pub use errors::WardscrubError;

pub use engine::{PiiEngine, RedactedText};
pub use engines::extractor::EntityExtractor;
pub use engines::medication::MedicationParser;
pub use engines::regex_engine::RegexEngine;

pub use pii_match::{canonical_sample_hash, redact_sensitive, MedicationRecord, PiiMatch};
pub use views::{build_views, resolve_overlaps, CategorizedPii, PiiViews};

pub use cleaning::clean_text;
pub use ocr::{load_word_boxes, parse_tesseract_tsv, parse_word_boxes_json, WordBox};
pub use redact::{decode_image, load_image, redact_image, redact_spans, save_image, tokens_to_mask, ImageRedaction};

pub use audit_log::{AuditEntry, AuditReport};
pub use headless::{headless_redact_string, process_document, DocumentInput, DocumentOutput};

pub use patterns::compiler::{compile_patterns, CompiledMedication, CompiledPatterns, CompiledRule};
