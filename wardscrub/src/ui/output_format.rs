// wardscrub/src/ui/output_format.rs
//! Coloured status lines on stderr.
//!
//! Colour is only emitted when the target stream is a terminal, so captured
//! output (tests, pipes) is plain text.
//! License: MIT OR APACHE 2.0

use std::io::{self, Write};

use is_terminal::IsTerminal;
use owo_colors::{AnsiColors, OwoColorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warn,
    Error,
}

impl MessageKind {
    fn prefix(self) -> &'static str {
        match self {
            MessageKind::Info => "info",
            MessageKind::Success => "done",
            MessageKind::Warn => "warning",
            MessageKind::Error => "error",
        }
    }

    fn color(self) -> AnsiColors {
        match self {
            MessageKind::Info => AnsiColors::Cyan,
            MessageKind::Success => AnsiColors::Green,
            MessageKind::Warn => AnsiColors::Yellow,
            MessageKind::Error => AnsiColors::Red,
        }
    }
}

/// Writes `prefix: message` to `writer`, coloured when `use_color` is set.
pub fn print_message<W: Write>(writer: &mut W, kind: MessageKind, message: &str, use_color: bool) -> io::Result<()> {
    if use_color {
        writeln!(writer, "{}: {}", kind.prefix().color(kind.color()).bold(), message)
    } else {
        writeln!(writer, "{}: {}", kind.prefix(), message)
    }
}

fn to_stderr(kind: MessageKind, message: &str) {
    let stderr = io::stderr();
    let use_color = stderr.is_terminal();
    let _ = print_message(&mut stderr.lock(), kind, message, use_color);
}

/// Helper for printing info messages to stderr. Suppressed by `--quiet`.
pub fn info_msg(msg: impl AsRef<str>, quiet: bool) {
    if !quiet {
        to_stderr(MessageKind::Info, msg.as_ref());
    }
}

pub fn success_msg(msg: impl AsRef<str>, quiet: bool) {
    if !quiet {
        to_stderr(MessageKind::Success, msg.as_ref());
    }
}

pub fn warn_msg(msg: impl AsRef<str>) {
    to_stderr(MessageKind::Warn, msg.as_ref());
}

pub fn error_msg(msg: impl AsRef<str>) {
    to_stderr(MessageKind::Error, msg.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_message_has_no_escape_codes() {
        let mut buf = Vec::new();
        print_message(&mut buf, MessageKind::Warn, "3 documents failed", false).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "warning: 3 documents failed\n");
    }

    #[test]
    fn test_colored_message_keeps_text() {
        let mut buf = Vec::new();
        print_message(&mut buf, MessageKind::Error, "boom", true).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("\u{1b}["));
        assert!(out.contains("boom"));
    }
}
