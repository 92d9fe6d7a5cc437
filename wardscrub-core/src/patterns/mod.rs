//! Pattern compilation for wardscrub.
//!
//! Turns the plain-data [`PatternConfig`](crate::config::PatternConfig) into
//! ready-to-run regular expressions: one per extraction rule, plus the
//! medication vocabularies folded into alternation patterns. Compilation
//! happens once per engine; the compiled set is immutable and owned by the
//! engine that built it.

pub mod compiler;
