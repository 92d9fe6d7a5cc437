//! OCR token geometry.
//!
//! The OCR engine itself lives outside this crate; this module only reads
//! the word-level geometry it produces. Two formats are accepted:
//!
//! * Tesseract `image_to_data` TSV (tab separated, header row, one row per
//!   layout element; word rows carry the text).
//! * JSON, either an array of [`WordBox`] objects or the column-oriented
//!   dictionary form (`{"text": [...], "left": [...], ...}`).
//!
//! Token order is kept as produced; it is not guaranteed to be reading order.

use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::WardscrubError;

/// One OCR token and its axis-aligned pixel box (top-left origin).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBox {
    pub text: String,
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl WordBox {
    pub fn new(text: impl Into<String>, left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            text: text.into(),
            left,
            top,
            width,
            height,
        }
    }
}

/// Column-oriented token table, as emitted by Tesseract's dictionary output.
#[derive(Debug, Clone, Deserialize)]
struct ColumnarTokens {
    text: Vec<String>,
    left: Vec<i32>,
    top: Vec<i32>,
    width: Vec<u32>,
    height: Vec<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenJson {
    Boxes(Vec<WordBox>),
    Columns(ColumnarTokens),
}

impl ColumnarTokens {
    fn into_word_boxes(self) -> Result<Vec<WordBox>, WardscrubError> {
        let n = self.text.len();
        if [self.left.len(), self.top.len(), self.width.len(), self.height.len()]
            .iter()
            .any(|&len| len != n)
        {
            return Err(WardscrubError::GeometryParseError(
                "column lengths of the token table differ".to_string(),
            ));
        }
        Ok(self
            .text
            .into_iter()
            .enumerate()
            .map(|(i, text)| WordBox::new(text, self.left[i], self.top[i], self.width[i], self.height[i]))
            .collect())
    }
}

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize, WardscrubError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| WardscrubError::GeometryParseError(format!("TSV header has no '{}' column", name)))
}

fn parse_field<T: std::str::FromStr>(record: &csv::StringRecord, idx: usize, name: &str, row: usize) -> Result<T, WardscrubError> {
    let raw = record.get(idx).unwrap_or("").trim();
    raw.parse::<T>().map_err(|_| {
        WardscrubError::GeometryParseError(format!("row {}: invalid {} value '{}'", row, name, raw))
    })
}

/// Parses Tesseract `image_to_data` TSV output.
///
/// Rows whose text column is missing are kept with empty text.
pub fn parse_tesseract_tsv(tsv: &str) -> Result<Vec<WordBox>, WardscrubError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(tsv.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| WardscrubError::GeometryParseError(format!("failed to read TSV header: {}", e)))?
        .clone();
    let left = column(&headers, "left")?;
    let top = column(&headers, "top")?;
    let width = column(&headers, "width")?;
    let height = column(&headers, "height")?;
    let text = column(&headers, "text")?;

    let mut boxes = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = i + 2;
        let record = result.map_err(|e| WardscrubError::GeometryParseError(format!("row {}: {}", row, e)))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        boxes.push(WordBox {
            text: record.get(text).unwrap_or("").to_string(),
            left: parse_field(&record, left, "left", row)?,
            top: parse_field(&record, top, "top", row)?,
            width: parse_field(&record, width, "width", row)?,
            height: parse_field(&record, height, "height", row)?,
        });
    }

    debug!("Parsed {} token rows from TSV.", boxes.len());
    Ok(boxes)
}

/// Parses token geometry from JSON (array or column-oriented form).
pub fn parse_word_boxes_json(json: &str) -> Result<Vec<WordBox>, WardscrubError> {
    let parsed: TokenJson = serde_json::from_str(json)
        .map_err(|e| WardscrubError::GeometryParseError(format!("invalid token JSON: {}", e)))?;
    match parsed {
        TokenJson::Boxes(boxes) => Ok(boxes),
        TokenJson::Columns(columns) => columns.into_word_boxes(),
    }
}

/// Loads token geometry from a `.tsv` or `.json` file.
pub fn load_word_boxes<P: AsRef<Path>>(path: P) -> Result<Vec<WordBox>, WardscrubError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "tsv" => parse_tesseract_tsv(&content),
        "json" => parse_word_boxes_json(&content),
        other => {
            warn!("Unrecognised token geometry extension '{}' for {}", other, path.display());
            Err(WardscrubError::GeometryParseError(format!(
                "unsupported token file '{}': expected .tsv or .json",
                path.display()
            )))
        }
    }
}
