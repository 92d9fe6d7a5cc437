//! compiler.rs - Compiles the pattern library into regular expressions.
//!
//! Each extraction rule becomes a [`CompiledRule`]; the medication token
//! tables become a [`CompiledMedication`]. Compilation errors are collected
//! across all rules and reported together.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};
use regex::{Regex, RegexBuilder};

use crate::config::{FrequencyFallback, MedicationVocabulary, PatternConfig, PatternRule, MAX_PATTERN_LENGTH};
use crate::errors::WardscrubError;

/// Upper bound on the compiled size of any single regex.
const REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

/// A single compiled extraction rule.
#[derive(Debug)]
pub struct CompiledRule {
    /// The compiled regular expression used for matching.
    pub regex: Regex,
    /// The unique rule name; becomes the match type.
    pub name: String,
    /// The categorized-view key.
    pub category: String,
    /// Whether group 1 carries the value.
    pub has_capture: bool,
    pub continues_on_next_line: bool,
    pub programmatic_validation: bool,
}

/// The medication vocabularies, compiled.
#[derive(Debug)]
pub struct CompiledMedication {
    /// Drug-form keyword through the end of the line.
    pub form: Regex,
    pub dose: Regex,
    pub route: Option<Regex>,
    pub frequency: Option<Regex>,
    pub fallbacks: Vec<FrequencyFallback>,
}

/// Everything an engine needs to run, compiled once.
#[derive(Debug)]
pub struct CompiledPatterns {
    pub rules: Vec<CompiledRule>,
    /// `None` when the library defines no drug-form keywords.
    pub medication: Option<CompiledMedication>,
}

fn build_regex(name: &str, pattern: &str, case_insensitive: bool) -> Result<Regex, WardscrubError> {
    if pattern.len() > MAX_PATTERN_LENGTH {
        return Err(WardscrubError::PatternLengthExceeded(
            name.to_string(),
            pattern.len(),
            MAX_PATTERN_LENGTH,
        ));
    }
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|e| WardscrubError::PatternCompilationError(name.to_string(), e))
}

/// `(?:a|b|c)`, keeping the vocabulary order so leftmost-first alternation
/// prefers earlier entries.
fn alternation(entries: &[String]) -> String {
    format!("(?:{})", entries.join("|"))
}

fn compile_rule(rule: &PatternRule) -> Option<Result<CompiledRule, WardscrubError>> {
    let Some(pattern) = rule.pattern.as_ref() else {
        warn!("Skipping rule '{}' because its pattern is missing.", &rule.name);
        return None;
    };
    debug!("Attempting to compile rule: '{}' with pattern '{:?}'", &rule.name, pattern);

    Some(build_regex(&rule.name, pattern, rule.case_insensitive).map(|regex| {
        log::debug!(
            target: "wardscrub_core::patterns",
            "Rule '{}' compiled successfully.",
            &rule.name
        );
        CompiledRule {
            has_capture: regex.captures_len() > 1,
            regex,
            name: rule.name.clone(),
            category: rule.category_key().to_string(),
            continues_on_next_line: rule.continues_on_next_line,
            programmatic_validation: rule.programmatic_validation,
        }
    }))
}

/// Compiles the medication token tables. Returns `Ok(None)` when no
/// drug-form keywords are configured.
pub fn compile_medication(vocab: &MedicationVocabulary) -> Result<Option<CompiledMedication>, WardscrubError> {
    if vocab.is_empty() {
        debug!("No drug-form keywords configured; medication parsing disabled.");
        return Ok(None);
    }

    let form = build_regex(
        "medication.form_keywords",
        &format!(r"\b{}[^\n]*", alternation(&vocab.form_keywords)),
        true,
    )?;

    let dose_pattern = if vocab.dose_units.is_empty() {
        r"\b\d+\b".to_string()
    } else {
        format!(r"\b\d+\s*{}?\b", alternation(&vocab.dose_units))
    };
    let dose = build_regex("medication.dose_units", &dose_pattern, true)?;

    let route = match vocab.routes.is_empty() {
        true => None,
        false => Some(build_regex(
            "medication.routes",
            &format!(r"\b{}\b", alternation(&vocab.routes)),
            true,
        )?),
    };

    let frequency = match vocab.frequencies.is_empty() {
        true => None,
        false => Some(build_regex(
            "medication.frequencies",
            &format!(r"\b{}\b", alternation(&vocab.frequencies)),
            true,
        )?),
    };

    Ok(Some(CompiledMedication {
        form,
        dose,
        route,
        frequency,
        fallbacks: vocab.frequency_fallbacks.clone(),
    }))
}

/// Compiles a whole pattern library.
///
/// Rules without a pattern are skipped with a warning; any other failure is
/// collected and reported as a single fatal error.
pub fn compile_patterns(config: &PatternConfig) -> Result<CompiledPatterns, WardscrubError> {
    debug!("Starting compilation of {} rules.", config.rules.len());

    let mut compiled_rules = Vec::with_capacity(config.rules.len());
    let mut compilation_errors = Vec::new();

    for rule in config.rules.iter().filter(|r| r.enabled != Some(false)) {
        match compile_rule(rule) {
            Some(Ok(compiled)) => compiled_rules.push(compiled),
            Some(Err(e)) => compilation_errors.push(e),
            None => continue,
        }
    }

    let medication = match compile_medication(&config.medication) {
        Ok(m) => m,
        Err(e) => {
            compilation_errors.push(e);
            None
        }
    };

    if !compilation_errors.is_empty() {
        let error_message = compilation_errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>()
            .join("\n");
        return Err(WardscrubError::Fatal(format!(
            "Failed to compile {} pattern(s):\n{}",
            compilation_errors.len(),
            error_message
        )));
    }

    debug!("Finished compiling patterns. Total compiled: {}.", compiled_rules.len());
    Ok(CompiledPatterns {
        rules: compiled_rules,
        medication,
    })
}
