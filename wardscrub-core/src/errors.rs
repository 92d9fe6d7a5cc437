//! errors.rs - Custom error types for the wardscrub-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that callers can match on. Extraction
//! itself never fails for lack of matches; these variants cover bad
//! configuration, invalid spans and undecodable images.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// All error types produced by `wardscrub-core`.
///
/// Marked `#[non_exhaustive]` so new variants can be added without breaking
/// downstream matches.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum WardscrubError {
    #[error("Failed to compile pattern '{0}': {1}")]
    PatternCompilationError(String, regex::Error),

    #[error("Pattern '{0}': pattern length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    /// A span handed to the span redactor does not fit the text it is applied to.
    #[error("Span [{start}, {end}) is out of bounds for text of length {len}")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },

    #[error("Span [{start}, {end}) does not fall on UTF-8 character boundaries")]
    SpanNotCharBoundary { start: usize, end: usize },

    #[error("Failed to load image: {0}")]
    ImageLoadError(String),

    #[error("Failed to save image: {0}")]
    ImageSaveError(#[from] image::ImageError),

    #[error("Failed to parse OCR token geometry: {0}")]
    GeometryParseError(String),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}
