// wardscrub-core/src/engines/extractor.rs
//! Entity extractor: applies every compiled rule to a text snapshot and
//! produces canonical [`PiiMatch`] records.
//!
//! Each regex hit yields at most one match. When a rule defines a capture
//! group, group 1 (trimmed) is the value and its trimmed range is the span;
//! otherwise the whole match is. Hits whose value is empty are dropped,
//! except for rules marked `continues_on_next_line`, which take the next
//! non-blank line instead.
//! License: MIT OR APACHE 2.0

use std::sync::Arc;

use log::debug;

use crate::patterns::compiler::{CompiledPatterns, CompiledRule};
use crate::pii_match::{log_captured_match_debug, PiiMatch};
use crate::validators;

/// Trims `text[start..end]` and returns the narrowed byte range.
fn trimmed_range(text: &str, start: usize, end: usize) -> (usize, usize) {
    let slice = &text[start..end];
    let leading = slice.len() - slice.trim_start().len();
    let trailing = slice.len() - slice.trim_end().len();
    if leading == slice.len() {
        return (end, end);
    }
    (start + leading, end - trailing)
}

/// Finds the first non-blank line strictly after the line containing `pos`.
/// Returns its trimmed byte range.
fn next_non_blank_line(text: &str, pos: usize) -> Option<(usize, usize)> {
    let newline = text[pos..].find('\n')?;
    let mut line_start = pos + newline + 1;
    for line in text[line_start..].split('\n') {
        let line_end = line_start + line.len();
        let (s, e) = trimmed_range(text, line_start, line_end);
        if s < e {
            return Some((s, e));
        }
        line_start = line_end + 1;
    }
    None
}

#[derive(Debug, Clone)]
pub struct EntityExtractor {
    patterns: Arc<CompiledPatterns>,
}

impl EntityExtractor {
    pub fn new(patterns: Arc<CompiledPatterns>) -> Self {
        Self { patterns }
    }

    fn run_programmatic_validator(&self, rule: &CompiledRule, value: &str) -> bool {
        if !rule.programmatic_validation {
            return true;
        }
        match rule.name.as_str() {
            "aadhaar" => validators::is_valid_aadhaar_programmatically(value),
            "pan" => validators::is_valid_pan_programmatically(value),
            _ => true,
        }
    }

    /// Runs one rule over the text, appending its matches in left-to-right order.
    fn extract_rule(&self, rule: &CompiledRule, text: &str, out: &mut Vec<PiiMatch>) {
        for caps in rule.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let (raw_start, raw_end) = match (rule.has_capture, caps.get(1)) {
                (true, Some(group)) => (group.start(), group.end()),
                (true, None) => (whole.end(), whole.end()),
                (false, _) => (whole.start(), whole.end()),
            };

            let (mut start, mut end) = trimmed_range(text, raw_start, raw_end);
            if start == end {
                if !rule.continues_on_next_line {
                    debug!("Rule '{}' matched a label with no value; skipping.", rule.name);
                    continue;
                }
                match next_non_blank_line(text, whole.end()) {
                    Some((s, e)) => {
                        start = s;
                        end = e;
                    }
                    None => {
                        debug!("Rule '{}' label has no following line; dropping match.", rule.name);
                        continue;
                    }
                }
            }

            let value = &text[start..end];
            if !self.run_programmatic_validator(rule, value) {
                debug!("Rule '{}' hit failed programmatic validation.", rule.name);
                continue;
            }

            log_captured_match_debug(module_path!(), &rule.name, value, start, end);
            out.push(PiiMatch::new(rule.name.clone(), value, start, end));
        }
    }

    /// Extracts canonical matches from `text`, rule by rule in library order.
    ///
    /// Never fails: a rule without hits contributes nothing, and empty input
    /// yields an empty list.
    pub fn extract(&self, text: &str) -> Vec<PiiMatch> {
        let mut matches = Vec::new();
        if text.is_empty() {
            return matches;
        }
        for rule in &self.patterns.rules {
            self.extract_rule(rule, text, &mut matches);
        }
        debug!("Extracted {} canonical matches.", matches.len());
        matches
    }

    pub fn patterns(&self) -> &CompiledPatterns {
        &self.patterns
    }
}
