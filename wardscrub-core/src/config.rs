//! Configuration management for `wardscrub-core`.
//!
//! This module defines the Pattern Library: the named regex rules grouped by
//! category, the medication vocabularies with their ordered frequency
//! fallback table, and the image masking settings. It handles YAML
//! (de)serialization and provides utilities for loading, merging, filtering
//! and validating these configs.
//!
//! The library is plain data. It is compiled once into
//! [`CompiledPatterns`](crate::patterns::compiler::CompiledPatterns) when an
//! engine is constructed and never mutated afterwards.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Maximum allowed length for a regex pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// Broad grouping of a rule. Informational, and usable for enabling or
/// disabling a whole family of rules at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PatternGroup {
    Identifiers,
    Demographics,
    Vitals,
    #[default]
    Generic,
}

impl fmt::Display for PatternGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PatternGroup::Identifiers => "identifiers",
            PatternGroup::Demographics => "demographics",
            PatternGroup::Vitals => "vitals",
            PatternGroup::Generic => "generic",
        };
        f.write_str(s)
    }
}

/// A single entity extraction rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PatternRule {
    /// Unique identifier, used as the `type` of every match (e.g. "uhid").
    pub name: String,
    /// Key of the categorized view this rule feeds (e.g. "uhid_numbers").
    pub category: String,
    pub group: PatternGroup,
    pub description: Option<String>,
    /// The regex pattern string. When it defines a capture group, group 1 is the value.
    pub pattern: Option<String>,
    pub case_insensitive: bool,
    /// Label-only hit: take the next non-blank line as the value.
    pub continues_on_next_line: bool,
    /// If true, a structural check from `validators` must also pass.
    pub programmatic_validation: bool,
    /// Explicit override for enabling/disabling the rule.
    pub enabled: Option<bool>,
    /// If true, the rule is disabled unless explicitly enabled.
    pub opt_in: bool,
}

impl Default for PatternRule {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: String::new(),
            group: PatternGroup::Generic,
            description: None,
            pattern: None,
            case_insensitive: false,
            continues_on_next_line: false,
            programmatic_validation: false,
            enabled: None,
            opt_in: false,
        }
    }
}

impl PatternRule {
    /// The categorized-view key, falling back to the rule name.
    pub fn category_key(&self) -> &str {
        if self.category.is_empty() {
            &self.name
        } else {
            &self.category
        }
    }
}

/// One entry of the ordered frequency fallback table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FrequencyFallback {
    /// Substring searched for in the space-stripped, lowercased line.
    pub fragment: String,
    /// Normalized frequency reported when the fragment is found.
    pub value: String,
}

/// Token tables used by the medication line parser.
///
/// Every vocabulary entry is a regex fragment; literal dots and other
/// metacharacters must be escaped in the YAML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MedicationVocabulary {
    /// Drug-form keywords (TAB, CAP, INJ...) that qualify a line.
    pub form_keywords: Vec<String>,
    /// Units that may follow a dose number.
    pub dose_units: Vec<String>,
    pub routes: Vec<String>,
    pub frequencies: Vec<String>,
    /// Evaluated in order; first fragment found wins.
    pub frequency_fallbacks: Vec<FrequencyFallback>,
}

impl MedicationVocabulary {
    pub fn is_empty(&self) -> bool {
        self.form_keywords.is_empty()
    }
}

/// Settings for the geometry-based image redactor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageRedactionConfig {
    /// RGB colour of the opaque mask.
    pub mask_color: [u8; 3],
    /// Extra pixels added on every side of a token box.
    pub padding: u32,
    /// Also mask tokens found inside medication names.
    pub mask_medications: bool,
}

impl Default for ImageRedactionConfig {
    fn default() -> Self {
        Self {
            mask_color: [0, 0, 0],
            padding: 0,
            mask_medications: false,
        }
    }
}

/// Top-level Pattern Library.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct PatternConfig {
    /// Entity extraction rules, evaluated in this order.
    pub rules: Vec<PatternRule>,
    #[serde(default)]
    pub medication: MedicationVocabulary,
    #[serde(default)]
    pub image: ImageRedactionConfig,
}

/// User-supplied overlay: every section is optional so a file may override
/// only the rules, only the medication tables, or only image settings.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PatternOverlay {
    pub rules: Vec<PatternRule>,
    pub medication: Option<MedicationVocabulary>,
    pub image: Option<ImageRedactionConfig>,
}

/// Error type for a rule name that does not exist in the library.
#[derive(Debug)]
pub struct RuleNotFoundError {
    pub rule_name: String,
}

impl fmt::Display for RuleNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pattern rule '{}' not found.", self.rule_name)
    }
}

impl std::error::Error for RuleNotFoundError {}

impl PatternConfig {
    /// Loads a complete pattern library from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading pattern library from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pattern file {}", path.display()))?;
        let config: PatternConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse pattern file {}", path.display()))?;

        validate_config(&config.rules, &config.medication)?;
        info!("Loaded {} rules from file {}.", config.rules.len(), path.display());

        Ok(config)
    }

    /// Loads the built-in pattern library.
    pub fn load_default_patterns() -> Result<Self> {
        debug!("Loading default patterns from embedded string...");
        let default_yaml = include_str!("../config/default_patterns.yaml");
        let config: PatternConfig = serde_yml::from_str(default_yaml)
            .context("Failed to parse default patterns")?;

        debug!("Loaded {} default rules.", config.rules.len());
        Ok(config)
    }

    /// Filters active rules based on enable/disable lists provided via CLI.
    ///
    /// Names may be rule names or group names (`vitals`, `generic`...).
    pub fn set_active_rules(&mut self, enable_rules: &[String], disable_rules: &[String]) {
        let enable_set: HashSet<&str> = enable_rules.iter().map(String::as_str).collect();
        let disable_set: HashSet<&str> = disable_rules.iter().map(String::as_str).collect();

        debug!("Initial rules count before filtering: {}", self.rules.len());

        let mut known: HashSet<String> = self.rules.iter().map(|r| r.name.clone()).collect();
        known.extend(self.rules.iter().map(|r| r.group.to_string()));

        for name in enable_set.iter().filter(|n| !known.contains(**n)) {
            warn!("Rule '{}' in `enable` list does not exist.", name);
        }
        for name in disable_set.iter().filter(|n| !known.contains(**n)) {
            warn!("Rule '{}' in `disable` list does not exist.", name);
        }

        self.rules.retain(|rule| {
            let group = rule.group.to_string();
            let disabled = disable_set.contains(rule.name.as_str()) || disable_set.contains(group.as_str());
            let enabled = enable_set.contains(rule.name.as_str()) || enable_set.contains(group.as_str());
            !disabled && (!rule.opt_in || enabled)
        });

        debug!("Final active rules count after filtering: {}", self.rules.len());
    }

    /// Looks up a rule by name.
    pub fn rule(&self, name: &str) -> Result<&PatternRule, RuleNotFoundError> {
        self.rules.iter().find(|r| r.name == name).ok_or_else(|| RuleNotFoundError {
            rule_name: name.to_string(),
        })
    }

    /// Every categorized-view key, in rule order, without duplicates.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.rules
            .iter()
            .map(|r| r.category_key().to_string())
            .filter(|c| seen.insert(c.clone()))
            .collect()
    }
}

impl PatternOverlay {
    /// Loads a partial pattern file used to override the defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading pattern overrides from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pattern file {}", path.display()))?;
        let overlay: PatternOverlay = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse pattern file {}", path.display()))?;

        let empty = MedicationVocabulary::default();
        validate_config(&overlay.rules, overlay.medication.as_ref().unwrap_or(&empty))?;
        Ok(overlay)
    }
}

/// Merges user-defined rules and settings into the defaults.
///
/// A user rule replaces the default rule with the same name in place; new
/// rules are appended. Rule order is evaluation order, so it is preserved.
pub fn merge_patterns(default_config: PatternConfig, user_config: Option<PatternOverlay>) -> PatternConfig {
    debug!("merge_patterns called. Initial default rules count: {}", default_config.rules.len());

    let PatternConfig { mut rules, mut medication, mut image } = default_config;

    if let Some(user_cfg) = user_config {
        debug!("User overlay provided. Merging {} user rules.", user_cfg.rules.len());
        for user_rule in user_cfg.rules {
            match rules.iter_mut().find(|r| r.name == user_rule.name) {
                Some(existing) => *existing = user_rule,
                None => rules.push(user_rule),
            }
        }
        if let Some(user_medication) = user_cfg.medication {
            debug!("Replacing medication vocabulary with user tables.");
            medication = user_medication;
        }
        if let Some(user_image) = user_cfg.image {
            image = user_image;
        }
    }

    debug!("Final total rules after merge: {}", rules.len());
    PatternConfig { rules, medication, image }
}

/// Validates rule integrity (names, regex compilation) and fallback table entries.
fn validate_config(rules: &[PatternRule], medication: &MedicationVocabulary) -> Result<()> {
    let mut rule_names = HashSet::new();
    let mut errors = Vec::new();

    for rule in rules {
        if rule.name.is_empty() {
            errors.push("A rule has an empty `name` field.".to_string());
        } else if !rule_names.insert(rule.name.clone()) {
            errors.push(format!("Duplicate rule name found: '{}'.", rule.name));
        }

        let pattern = match &rule.pattern {
            Some(p) => p,
            None => {
                errors.push(format!("Rule '{}' is missing the `pattern` field.", rule.name));
                continue;
            }
        };

        if pattern.is_empty() {
            errors.push(format!("Rule '{}' has an empty `pattern` field.", rule.name));
        }

        match Regex::new(pattern) {
            Ok(re) => {
                if rule.continues_on_next_line && re.captures_len() < 2 {
                    errors.push(format!(
                        "Rule '{}' continues on the next line but defines no capture group.",
                        rule.name
                    ));
                }
            }
            Err(e) => errors.push(format!("Rule '{}' has an invalid regex pattern: {}", rule.name, e)),
        }
    }

    for (i, entry) in medication.frequency_fallbacks.iter().enumerate() {
        if entry.fragment.is_empty() {
            errors.push(format!("Frequency fallback #{} has an empty `fragment`.", i));
        }
    }

    if !errors.is_empty() {
        let full_error_message = format!("Pattern validation failed:\n{}", errors.join("\n"));
        Err(anyhow!(full_error_message))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, group: PatternGroup) -> PatternRule {
        PatternRule {
            name: name.to_string(),
            category: format!("{}s", name),
            group,
            pattern: Some(r"x(\d+)".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_patterns_parse_and_validate() {
        let config = PatternConfig::load_default_patterns().unwrap();
        assert!(config.rules.iter().any(|r| r.name == "patient_name"));
        assert!(!config.medication.frequency_fallbacks.is_empty());
        validate_config(&config.rules, &config.medication).unwrap();
    }

    #[test]
    fn test_fallback_table_order_is_kept() {
        let config = PatternConfig::load_default_patterns().unwrap();
        let fragments: Vec<&str> = config
            .medication
            .frequency_fallbacks
            .iter()
            .map(|f| f.fragment.as_str())
            .collect();
        assert_eq!(
            fragments,
            vec!["oncea", "once ", "twicey", "twice ", "bd", "od", "tds", "tid"]
        );
    }

    #[test]
    fn test_set_active_rules_by_group_and_opt_in() {
        let mut opt = rule("secret", PatternGroup::Generic);
        opt.opt_in = true;
        let mut config = PatternConfig {
            rules: vec![rule("bp", PatternGroup::Vitals), rule("age", PatternGroup::Demographics), opt],
            ..Default::default()
        };
        config.set_active_rules(&[], &["vitals".to_string()]);
        let names: Vec<&str> = config.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["age"]);
    }

    #[test]
    fn test_merge_replaces_in_place_and_appends() {
        let default_config = PatternConfig {
            rules: vec![rule("a", PatternGroup::Generic), rule("b", PatternGroup::Generic)],
            ..Default::default()
        };
        let mut replacement = rule("a", PatternGroup::Generic);
        replacement.category = "replaced".to_string();
        let overlay = PatternOverlay {
            rules: vec![replacement, rule("c", PatternGroup::Generic)],
            ..Default::default()
        };
        let merged = merge_patterns(default_config, Some(overlay));
        let names: Vec<&str> = merged.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(merged.rules[0].category, "replaced");
    }

    #[test]
    fn test_validation_rejects_continuation_without_group() {
        let mut bad = rule("name", PatternGroup::Demographics);
        bad.pattern = Some("Name:".to_string());
        bad.continues_on_next_line = true;
        let err = validate_config(&[bad], &MedicationVocabulary::default()).unwrap_err();
        assert!(err.to_string().contains("no capture group"));
    }

    #[test]
    fn test_categories_are_deduplicated_in_rule_order() {
        let mut second = rule("ipd_alt", PatternGroup::Identifiers);
        second.category = "as".to_string();
        let config = PatternConfig {
            rules: vec![rule("a", PatternGroup::Generic), second, rule("b", PatternGroup::Generic)],
            ..Default::default()
        };
        assert_eq!(config.categories(), vec!["as", "bs"]);
    }
}
