// wardscrub-core/src/engines/mod.rs
//! Engine implementations and the components they are built from.
//!
//! `extractor` and `medication` are the two passes over a text snapshot;
//! `regex_engine` composes them behind the `PiiEngine` trait.
//!
//! # License
//! MIT OR APACHE 2.0

pub mod extractor;
pub mod medication;
pub mod regex_engine;
