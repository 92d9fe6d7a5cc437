// wardscrub/src/lib.rs
//! # Wardscrub CLI Application
//!
//! The command-line surface around `wardscrub-core`: single-document
//! redaction, scanning, and parallel batch redaction of a directory.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;

pub use commands::batch::{run_batch, BatchError};
pub use commands::redact::run_redact;
pub use commands::scan::run_scan;
