// wardscrub/src/ui/summary.rs
//! Renders the categorized PII view as tables for the `scan` command.
//! License: MIT OR APACHE 2.0

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};

use wardscrub_core::CategorizedPii;

/// One row per non-empty category: name, distinct value count, values.
pub fn categories_table(view: &CategorizedPii) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Category", "Count", "Values"]);

    for (category, values) in view.categories.iter().filter(|(_, v)| !v.is_empty()) {
        table.add_row(vec![
            Cell::new(category),
            Cell::new(values.len()),
            Cell::new(values.join(", ")),
        ]);
    }
    table
}

/// One row per parsed medication line.
pub fn medications_table(view: &CategorizedPii) -> Option<Table> {
    if view.medications.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Medication", "Dose", "Route", "Frequency"]);
    for med in &view.medications {
        table.add_row(vec![&med.name, &med.dose, &med.route, &med.frequency]);
    }
    Some(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wardscrub_core::MedicationRecord;

    #[test]
    fn test_empty_categories_are_left_out() {
        let mut view = CategorizedPii::with_categories(["ages", "emails"]);
        view.insert("ages", "45");
        let rendered = categories_table(&view).to_string();
        assert!(rendered.contains("ages"));
        assert!(rendered.contains("45"));
        assert!(!rendered.contains("emails"));
    }

    #[test]
    fn test_medications_table() {
        let mut view = CategorizedPii::default();
        assert!(medications_table(&view).is_none());
        view.medications.push(MedicationRecord {
            name: "TAB DOLO".to_string(),
            dose: "650 mg".to_string(),
            route: String::new(),
            frequency: "TDS".to_string(),
        });
        let rendered = medications_table(&view).map(|t| t.to_string()).unwrap_or_default();
        assert!(rendered.contains("TAB DOLO"));
        assert!(rendered.contains("TDS"));
    }
}
