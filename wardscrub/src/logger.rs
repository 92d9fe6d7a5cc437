// wardscrub/src/logger.rs
//! Logger initialisation for the wardscrub binary.
//!
//! Logs go to stderr so redacted text on stdout stays pipeable. Matched PII
//! values never appear in debug output unless `WARDSCRUB_ALLOW_DEBUG_PII=true`
//! is set; that gate lives in `wardscrub-core`.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initialises `env_logger` once.
///
/// An explicit level wins over `RUST_LOG`; without one, `RUST_LOG` is honoured
/// and defaults to `warn`.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.format_timestamp(None).target(env_logger::Target::Stderr);
    // A second call (tests, embedding) keeps the first logger.
    builder.try_init().ok();
}

/// Maps the global `--quiet` / `--debug` flags to a level override.
pub fn level_from_flags(quiet: bool, debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_flags() {
        assert_eq!(level_from_flags(true, false), Some(LevelFilter::Off));
        assert_eq!(level_from_flags(false, true), Some(LevelFilter::Debug));
        assert_eq!(level_from_flags(false, false), None);
    }
}
