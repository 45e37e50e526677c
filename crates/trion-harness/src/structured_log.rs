//! Structured logging contract for Trion conformance/e2e runs.
//!
//! Provides [`LogEntry`] (a canonical JSONL log record), [`LogEmitter`]
//! (writes JSONL lines to a file or stdout), and [`validate_log_line`] /
//! [`validate_log_file`] schema checks — the same JSONL-plus-validator shape
//! `frankenlibc-harness` uses for its evidence trail, scaled down to the
//! fields a Trion conformance run actually needs.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Severity level for log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Scenario/check outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Skip,
}

/// Canonical structured log entry for a harness run.
///
/// Required fields: `timestamp`, `trace_id`, `level`, `event`. Everything
/// else is optional context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    /// Create a new log entry with required fields only. `timestamp` is
    /// caller-supplied (not sampled here) so harness output stays
    /// deterministic under a fixed clock in tests.
    #[must_use]
    pub fn new(
        timestamp: impl Into<String>,
        trace_id: impl Into<String>,
        level: LogLevel,
        event: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            scenario: None,
            outcome: None,
            duration_ms: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = Some(scenario.into());
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Serialize as a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Writes [`LogEntry`] records as JSONL, either to a file or to stdout.
pub enum LogEmitter {
    File(std::fs::File),
    Stdout,
}

impl LogEmitter {
    /// Open (creating or truncating) a JSONL log file.
    pub fn to_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::File(file))
    }

    #[must_use]
    pub fn to_stdout() -> Self {
        Self::Stdout
    }

    /// Append one entry, flushing immediately so a crash mid-run leaves a
    /// valid prefix of complete JSONL lines.
    pub fn emit(&mut self, entry: &LogEntry) -> std::io::Result<()> {
        let line = entry
            .to_jsonl()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        match self {
            Self::File(file) => {
                writeln!(file, "{line}")?;
                file.flush()
            }
            Self::Stdout => {
                println!("{line}");
                Ok(())
            }
        }
    }
}

/// Validate a single JSONL line: it must parse as a [`LogEntry`] with
/// non-empty `trace_id` and `event` fields.
pub fn validate_log_line(line: &str) -> Result<LogEntry, String> {
    let entry: LogEntry = serde_json::from_str(line).map_err(|e| e.to_string())?;
    if entry.trace_id.is_empty() {
        return Err("trace_id must not be empty".to_string());
    }
    if entry.event.is_empty() {
        return Err("event must not be empty".to_string());
    }
    Ok(entry)
}

/// Validate every line of a JSONL log file, returning the parsed entries or
/// the first validation error encountered (with its 1-based line number).
pub fn validate_log_file(path: impl AsRef<Path>) -> Result<Vec<LogEntry>, String> {
    let contents = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| validate_log_line(line).map_err(|e| format!("line {}: {e}", i + 1)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_round_trips_through_jsonl() {
        let entry = LogEntry::new("2026-07-28T00:00:00Z", "scenario-1", LogLevel::Info, "start")
            .with_scenario("quarantine_seal_destroy")
            .with_outcome(Outcome::Pass)
            .with_duration_ms(3);
        let line = entry.to_jsonl().unwrap();
        let parsed = validate_log_line(&line).unwrap();
        assert_eq!(parsed.trace_id, "scenario-1");
        assert_eq!(parsed.outcome, Some(Outcome::Pass));
    }

    #[test]
    fn empty_trace_id_fails_validation() {
        let entry = LogEntry::new("2026-07-28T00:00:00Z", "", LogLevel::Info, "start");
        let line = entry.to_jsonl().unwrap();
        assert!(validate_log_line(&line).is_err());
    }

    #[test]
    fn emitter_writes_jsonl_file() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("trion-harness-log-test-{}.jsonl", std::process::id()));
        let mut emitter = LogEmitter::to_file(&path).unwrap();
        emitter
            .emit(&LogEntry::new(
                "2026-07-28T00:00:00Z",
                "t1",
                LogLevel::Info,
                "ran",
            ))
            .unwrap();
        drop(emitter);
        let entries = validate_log_file(&path).unwrap();
        assert_eq!(entries.len(), 1);
        let _ = std::fs::remove_file(&path);
    }
}
