// wardscrub-core/src/headless.rs
//! `headless.rs`
//! Convenience wrappers for running the engine without a UI.
//!
//! [`process_document`] is the single-document pass used by the CLI and by
//! batch workers: extract, build views, redact text, then redact the image
//! when one is supplied. It performs no I/O; callers load and store files.

use anyhow::Result;
use image::DynamicImage;
use log::info;

use crate::audit_log::AuditReport;
use crate::config::PatternConfig;
use crate::engine::PiiEngine;
use crate::engines::regex_engine::RegexEngine;
use crate::ocr::WordBox;
use crate::redact::redact_image;

/// One already-materialised document: cleaned text plus optional geometry and image.
#[derive(Debug, Clone, Default)]
pub struct DocumentInput {
    pub source_id: String,
    pub text: String,
    pub word_boxes: Option<Vec<WordBox>>,
    pub image: Option<DynamicImage>,
}

#[derive(Debug, Clone)]
pub struct DocumentOutput {
    pub redacted_text: String,
    pub redacted_image: Option<DynamicImage>,
    pub report: AuditReport,
}

/// Runs the full redaction pass over one document.
pub fn process_document(engine: &dyn PiiEngine, input: &DocumentInput) -> Result<DocumentOutput> {
    let redacted = engine.redact_text(&input.text)?;
    let mut report = AuditReport::new(
        &input.source_id,
        &input.text,
        &redacted.views.spans,
        redacted.views.categorized.clone(),
    );

    let redacted_image = input.image.as_ref().map(|image| {
        let settings = &engine.get_config().image;
        let values = redacted.views.categorized.flatten_values(settings.mask_medications);
        let result = redact_image(image, input.word_boxes.as_deref(), &values, settings);
        report.masked_boxes = result.masked_boxes;
        result.image
    });

    info!(
        "Processed '{}': {} matches, {} masked boxes.",
        input.source_id, report.match_count, report.masked_boxes
    );
    Ok(DocumentOutput {
        redacted_text: redacted.text,
        redacted_image,
        report,
    })
}

/// Redacts a string in one call with a freshly built engine.
///
/// # Arguments
///
/// * `config` - The merged PatternConfig (defaults + optional user overrides).
/// * `content` - The cleaned text to redact.
pub fn headless_redact_string(config: PatternConfig, content: &str) -> Result<String> {
    let engine = RegexEngine::new(config)?;
    Ok(engine.redact_text(content)?.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PatternRule;
    use anyhow::Result;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_headless_redact_string() -> Result<()> {
        let config = PatternConfig {
            rules: vec![PatternRule {
                name: "email".to_string(),
                category: "emails".to_string(),
                pattern: Some(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[A-Za-z]{2,}".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let out = headless_redact_string(config, "Mail test@example.com or another@example.net.")?;
        assert_eq!(out, "Mail [EMAIL REDACTED] or [EMAIL REDACTED].");
        Ok(())
    }

    #[test]
    fn test_process_document_text_only() -> Result<()> {
        let engine = RegexEngine::with_defaults()?;
        let input = DocumentInput {
            source_id: "form-1".to_string(),
            text: "Patient Name: John Doe\nAge: 45".to_string(),
            ..Default::default()
        };
        let out = process_document(&engine, &input)?;
        assert_eq!(out.redacted_text, "Patient Name: [PATIENT_NAME REDACTED]\nAge: [AGE REDACTED]");
        assert!(out.redacted_image.is_none());
        assert_eq!(out.report.match_count, 2);
        Ok(())
    }

    #[test]
    fn test_process_document_masks_image() -> Result<()> {
        let engine = RegexEngine::with_defaults()?;
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(60, 20, Rgb([255, 255, 255])));
        let input = DocumentInput {
            source_id: "form-2".to_string(),
            text: "Patient Name: John Doe".to_string(),
            word_boxes: Some(vec![
                WordBox::new("Patient", 0, 0, 10, 10),
                WordBox::new("John", 20, 0, 10, 10),
            ]),
            image: Some(image),
        };
        let out = process_document(&engine, &input)?;
        assert_eq!(out.report.masked_boxes, 1);
        let rgb = out.redacted_image.expect("image was supplied").to_rgb8();
        assert_eq!(rgb.get_pixel(25, 5), &Rgb([0, 0, 0]));
        assert_eq!(rgb.get_pixel(5, 5), &Rgb([255, 255, 255]));
        Ok(())
    }
}
