// wardscrub/src/ui/mod.rs
//! Terminal output: status messages and the categorized PII table.

pub mod output_format;
pub mod summary;
