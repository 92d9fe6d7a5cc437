// wardscrub-core/src/views.rs
//! Consumer-facing projections of the canonical match list.
//!
//! One extraction pass feeds two views: the categorized mapping used for
//! logging and image redaction (deduplicated, loses spans) and the span list
//! used for text redaction (complete, keeps overlaps). Building them is pure.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::patterns::compiler::CompiledPatterns;
use crate::pii_match::{MedicationRecord, PiiMatch};

/// Category name to ordered, deduplicated values, plus the medication list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategorizedPii {
    #[serde(flatten)]
    pub categories: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub medications: Vec<MedicationRecord>,
}

impl CategorizedPii {
    /// Creates a view in which every listed category exists and is empty.
    pub fn with_categories<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(|c| (c.into(), Vec::new())).collect(),
            medications: Vec::new(),
        }
    }

    /// Appends `value` unless the category already holds it. First occurrence wins.
    pub fn insert(&mut self, category: &str, value: &str) {
        let values = self.categories.entry(category.to_string()).or_default();
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }

    /// Values for a category; empty for unknown categories.
    pub fn get(&self, category: &str) -> &[String] {
        self.categories.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.medications.is_empty() && self.categories.values().all(Vec::is_empty)
    }

    /// Number of distinct values over all categories (medications excluded).
    pub fn value_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Every PII value as one flat list, for the image redactor.
    ///
    /// Medication fields are included only when `include_medications` is set.
    pub fn flatten_values(&self, include_medications: bool) -> Vec<String> {
        let mut out: Vec<String> = self.categories.values().flatten().cloned().collect();
        if include_medications {
            out.extend(
                self.medications
                    .iter()
                    .flat_map(|m| m.values().map(str::to_string).collect::<Vec<_>>()),
            );
        }
        out
    }
}

/// Both projections of one extraction pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PiiViews {
    pub categorized: CategorizedPii,
    /// Every canonical match in original order; may contain overlaps.
    pub spans: Vec<PiiMatch>,
}

/// Groups matches by their rule's category and keeps the full span list.
pub fn build_views(patterns: &CompiledPatterns, matches: Vec<PiiMatch>, medications: Vec<MedicationRecord>) -> PiiViews {
    let category_of: HashMap<&str, &str> = patterns
        .rules
        .iter()
        .map(|r| (r.name.as_str(), r.category.as_str()))
        .collect();

    let mut categorized = CategorizedPii::with_categories(patterns.rules.iter().map(|r| r.category.clone()));
    for m in &matches {
        let category = category_of.get(m.pii_type.as_str()).copied().unwrap_or(m.pii_type.as_str());
        categorized.insert(category, &m.value);
    }
    categorized.medications = medications;

    PiiViews {
        categorized,
        spans: matches,
    }
}

/// Makes a span list safe for the span redactor.
///
/// Spans are ordered by start (longer first on ties). A span entirely
/// covered by an already kept span is dropped; one that only partially
/// overlaps is clipped to begin where the kept span ends. The set of covered
/// offsets is unchanged. Zero-length spans are dropped.
pub fn resolve_overlaps(spans: &[PiiMatch]) -> Vec<PiiMatch> {
    let mut sorted: Vec<&PiiMatch> = spans.iter().filter(|m| !m.is_empty()).collect();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut resolved: Vec<PiiMatch> = Vec::with_capacity(sorted.len());
    let mut last_end: Option<usize> = None;
    for m in sorted {
        match last_end {
            Some(end) if m.end <= end => continue,
            Some(end) if m.start < end => {
                let mut clipped = m.clone();
                clipped.start = end;
                resolved.push(clipped);
            }
            _ => resolved.push(m.clone()),
        }
        last_end = Some(m.end);
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PatternConfig;
    use crate::patterns::compiler::compile_patterns;

    fn compiled() -> CompiledPatterns {
        compile_patterns(&PatternConfig::load_default_patterns().unwrap()).unwrap()
    }

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let matches = vec![
            PiiMatch::new("age", "50", 0, 2),
            PiiMatch::new("age", "45", 3, 5),
            PiiMatch::new("age", "50", 6, 8),
        ];
        let views = build_views(&compiled(), matches.clone(), Vec::new());
        assert_eq!(views.categorized.get("ages"), ["50", "45"]);
        assert_eq!(views.spans, matches);
    }

    #[test]
    fn test_every_category_present_when_empty() {
        let views = build_views(&compiled(), Vec::new(), Vec::new());
        assert!(views.categorized.is_empty());
        assert!(views.categorized.categories.contains_key("patient_names"));
        assert!(views.categorized.get("emails").is_empty());
    }

    #[test]
    fn test_medications_pass_through() {
        let med = MedicationRecord {
            name: "TAB X".to_string(),
            dose: "5mg".to_string(),
            ..Default::default()
        };
        let views = build_views(&compiled(), Vec::new(), vec![med.clone(), med.clone()]);
        assert_eq!(views.categorized.medications, vec![med.clone(), med]);
    }

    #[test]
    fn test_flatten_values() {
        let mut view = CategorizedPii::with_categories(["a", "b"]);
        view.insert("a", "x");
        view.insert("b", "y");
        view.medications.push(MedicationRecord {
            name: "TAB Z".to_string(),
            ..Default::default()
        });
        assert_eq!(view.flatten_values(false), vec!["x", "y"]);
        assert_eq!(view.flatten_values(true), vec!["x", "y", "TAB Z"]);
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let mut view = CategorizedPii::with_categories(["ages"]);
        view.insert("ages", "45");
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["ages"][0], "45");
        assert!(json["medications"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_resolve_overlaps() {
        let spans = vec![
            PiiMatch::new("date", "12/05", 8, 13),
            PiiMatch::new("ipd", "12/05/2023", 8, 18),
            PiiMatch::new("tail", "2023 x", 14, 20),
            PiiMatch::new("inner", "05", 11, 13),
            PiiMatch::new("empty", "", 2, 2),
            PiiMatch::new("head", "No", 0, 2),
        ];
        let resolved = resolve_overlaps(&spans);
        let ranges: Vec<(&str, usize, usize)> = resolved
            .iter()
            .map(|m| (m.pii_type.as_str(), m.start, m.end))
            .collect();
        assert_eq!(ranges, vec![("head", 0, 2), ("ipd", 8, 18), ("tail", 18, 20)]);
        for pair in resolved.windows(2) {
            assert!(!pair[0].overlaps(&pair[1]));
        }
    }
}
