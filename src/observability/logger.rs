//! Structured JSON logger for hbnb
//!
//! One line per event on stderr, stdout belongs to the console:
//!
//! ```text
//! {"event":"RECORD_CREATED","severity":"INFO","ts":"2024-03-01T10:00:00.000001","key":"City.1234"}
//! ```
//!
//! `event`, `severity` and `ts` lead; the remaining fields follow sorted by
//! key so identical calls produce identical lines apart from `ts`.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};

use serde_json::Value;

use crate::model::{format_timestamp, now};

/// Log severity levels, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Trace = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    /// The process cannot continue without losing data
    Fatal = 4,
}

const LEVELS: [Severity; 5] = [
    Severity::Trace,
    Severity::Info,
    Severity::Warn,
    Severity::Error,
    Severity::Fatal,
];

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /// Parses a configured level name, ignoring case
    pub fn from_name(name: &str) -> Option<Severity> {
        LEVELS
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static MIN_SEVERITY: AtomicU8 = AtomicU8::new(Severity::Warn as u8);

/// Process-wide event logger
pub struct Logger;

impl Logger {
    /// Events below `severity` are dropped from now on
    pub fn set_min_severity(severity: Severity) {
        MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
    }

    pub fn min_severity() -> Severity {
        let stored = MIN_SEVERITY.load(Ordering::Relaxed) as usize;
        LEVELS.get(stored).copied().unwrap_or(Severity::Fatal)
    }

    pub fn enabled(severity: Severity) -> bool {
        severity >= Self::min_severity()
    }

    /// Writes one event line to stderr if `severity` is enabled
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !Self::enabled(severity) {
            return;
        }
        let line = render(severity, event, &format_timestamp(&now()), fields);

        // A single write keeps concurrent lines from interleaving
        let mut stderr = io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Renders one newline-terminated log line
fn render(severity: Severity, event: &str, ts: &str, fields: &[(&str, &str)]) -> String {
    let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
    sorted.sort_by_key(|(key, _)| *key);

    let leading = [("event", event), ("severity", severity.as_str()), ("ts", ts)];
    let parts: Vec<String> = leading
        .iter()
        .chain(sorted)
        .map(|(key, value)| format!("{}:{}", quote(key), quote(value)))
        .collect();

    format!("{{{}}}\n", parts.join(","))
}

fn quote(text: &str) -> String {
    Value::from(text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: &str = "2024-03-01T10:00:00.000001";

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn test_severity_from_name() {
        assert_eq!(Severity::from_name("warn"), Some(Severity::Warn));
        assert_eq!(Severity::from_name("TRACE"), Some(Severity::Trace));
        assert_eq!(Severity::from_name("loud"), None);
    }

    #[test]
    fn test_render_is_json() {
        let line = render(Severity::Info, "RECORD_CREATED", TS, &[("key", "City.1")]);
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["event"], "RECORD_CREATED");
        assert_eq!(parsed["severity"], "INFO");
        assert_eq!(parsed["ts"], TS);
        assert_eq!(parsed["key"], "City.1");
        assert!(line.starts_with("{\"event\":"));
    }

    #[test]
    fn test_render_sorts_fields() {
        let a = render(Severity::Info, "E", TS, &[("zebra", "1"), ("apple", "2")]);
        let b = render(Severity::Info, "E", TS, &[("apple", "2"), ("zebra", "1")]);
        assert_eq!(a, b);
        assert!(a.find("apple").unwrap() < a.find("zebra").unwrap());
    }

    #[test]
    fn test_render_escapes() {
        let text = "update City 1 name \"Big\nApple\"";
        let line = render(Severity::Warn, "E", TS, &[("line", text)]);
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["line"], text);
        assert_eq!(line.matches('\n').count(), 1);
    }
}
