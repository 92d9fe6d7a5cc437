//! Span redactor.
//!
//! Spans are applied in descending `start` order so that replacing a later
//! span never shifts the offsets of an earlier, still unprocessed one.
//!
//! Precondition: spans must not overlap. Overlapping spans are not repaired
//! here; the last one processed wins and can cut into the boundary of an
//! earlier one. Its range is clamped to the rewritten text, so the result is
//! still a valid string. Use [`resolve_overlaps`](crate::views::resolve_overlaps)
//! first when the list may overlap.
//!
//! License: MIT OR APACHE 2.0

use log::debug;

use crate::errors::WardscrubError;
use crate::pii_match::{log_redaction_action_debug, PiiMatch};

fn check_span(text: &str, span: &PiiMatch) -> Result<(), WardscrubError> {
    if span.start > span.end || span.end > text.len() {
        return Err(WardscrubError::SpanOutOfBounds {
            start: span.start,
            end: span.end,
            len: text.len(),
        });
    }
    if !text.is_char_boundary(span.start) || !text.is_char_boundary(span.end) {
        return Err(WardscrubError::SpanNotCharBoundary {
            start: span.start,
            end: span.end,
        });
    }
    Ok(())
}

/// Clamps `end` to `redacted`, which may already be shorter than the
/// original after an overlapping span was rewritten.
///
/// `start` stays valid: spans run in descending `start` order, so the prefix
/// before it is still the original text.
fn clamp_end(redacted: &str, start: usize, end: usize) -> usize {
    let mut end = end.min(redacted.len());
    while end > start && !redacted.is_char_boundary(end) {
        end -= 1;
    }
    end.max(start)
}

/// Replaces every span of `text` with its placeholder.
///
/// `text` must be the exact snapshot the spans were computed against. All
/// spans are bounds-checked before any rewriting; an out-of-range span fails
/// the whole call with [`WardscrubError::SpanOutOfBounds`].
pub fn redact_spans(text: &str, spans: &[PiiMatch]) -> Result<String, WardscrubError> {
    for span in spans {
        check_span(text, span)?;
    }

    let mut ordered: Vec<&PiiMatch> = spans.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    let mut redacted = text.to_string();
    for span in ordered {
        let placeholder = span.placeholder();
        log_redaction_action_debug(module_path!(), &text[span.start..span.end], &placeholder, &span.pii_type);
        let end = clamp_end(&redacted, span.start, span.end);
        redacted.replace_range(span.start..end, &placeholder);
    }

    debug!(
        "Redacted {} spans. Original length: {}, redacted length: {}",
        spans.len(),
        text.len(),
        redacted.len()
    );
    Ok(redacted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_span_list_is_identity() {
        let text = "Age: 45";
        assert_eq!(redact_spans(text, &[]).unwrap(), text);
    }

    #[test]
    fn test_right_to_left_rewrite_keeps_offsets() {
        let text = "Name: John Age: 45";
        let spans = vec![PiiMatch::new("patient_name", "John", 6, 10), PiiMatch::new("age", "45", 16, 18)];
        assert_eq!(
            redact_spans(text, &spans).unwrap(),
            "Name: [PATIENT_NAME REDACTED] Age: [AGE REDACTED]"
        );
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let text = "a 1 b 2";
        let forward = vec![PiiMatch::new("n", "1", 2, 3), PiiMatch::new("n", "2", 6, 7)];
        let backward: Vec<PiiMatch> = forward.iter().rev().cloned().collect();
        assert_eq!(redact_spans(text, &forward).unwrap(), redact_spans(text, &backward).unwrap());
    }

    #[test]
    fn test_length_law() {
        let text = "UHID No: 12345, Bed No: 7, Age: 45";
        let spans = vec![
            PiiMatch::new("uhid", "12345", 9, 14),
            PiiMatch::new("bed", "7", 24, 25),
            PiiMatch::new("age", "45", 32, 34),
        ];
        let redacted = redact_spans(text, &spans).unwrap();
        let removed: usize = spans.iter().map(|s| s.end - s.start).sum();
        let added: usize = spans.iter().map(|s| s.placeholder().len()).sum();
        assert_eq!(redacted.len(), text.len() - removed + added);
        assert_eq!(
            redacted,
            "UHID No: [UHID REDACTED], Bed No: [BED REDACTED], Age: [AGE REDACTED]"
        );
    }

    #[test]
    fn test_out_of_bounds_span_is_an_error() {
        let text = "x".repeat(20);
        let err = redact_spans(&text, &[PiiMatch::new("uhid", "?", 5, 1000)]).unwrap_err();
        assert!(matches!(
            err,
            WardscrubError::SpanOutOfBounds { start: 5, end: 1000, len: 20 }
        ));
    }

    #[test]
    fn test_inverted_span_is_out_of_bounds() {
        let err = redact_spans("abcdef", &[PiiMatch::new("t", "", 4, 2)]).unwrap_err();
        assert!(matches!(err, WardscrubError::SpanOutOfBounds { .. }));
    }

    #[test]
    fn test_no_partial_rewrite_on_error() {
        let spans = vec![PiiMatch::new("a", "b", 1, 2), PiiMatch::new("a", "b", 3, 99)];
        assert!(redact_spans("abcd", &spans).is_err());
    }

    #[test]
    fn test_overlapping_spans_last_processed_wins() {
        let text = "a".repeat(30);
        let spans = vec![PiiMatch::new("x", "", 10, 30), PiiMatch::new("y", "", 5, 25)];
        assert_eq!(redact_spans(&text, &spans).unwrap(), "aaaaa[Y REDACTED]");
    }

    #[test]
    fn test_overlap_into_multibyte_placeholder_stays_valid() {
        let text = "ab 12345 cd";
        let spans = vec![PiiMatch::new("é", "", 3, 8), PiiMatch::new("n", "", 0, 5)];
        let redacted = redact_spans(text, &spans).unwrap();
        assert!(redacted.starts_with("[N REDACTED]"));
        assert!(redacted.ends_with(" cd"));
    }

    #[test]
    fn test_span_inside_multibyte_char_is_rejected() {
        let text = "née 45";
        let err = redact_spans(text, &[PiiMatch::new("t", "", 2, 3)]).unwrap_err();
        assert!(matches!(err, WardscrubError::SpanNotCharBoundary { .. }));
    }
}
