//! Append-only audit log.
//!
//! Optional file handle; when absent, records fall through to standard
//! error. Each record is prefixed with a local-time timestamp formatted
//! `YYYY-MM-DD HH:MM:SS`. The file handle and its guarding lock are
//! lazily initialized behind a `OnceLock`, replacing the racy ad-hoc
//! "initialized flag" double-checked pattern the original implementation
//! used.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

use parking_lot::Mutex;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

static TIMESTAMP_FORMAT: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

fn audit_state() -> &'static Mutex<Option<File>> {
    static STATE: OnceLock<Mutex<Option<File>>> = OnceLock::new();
    STATE.get_or_init(|| Mutex::new(None))
}

/// Open (or replace) the audit log file in append mode.
pub fn audit_open(path: impl AsRef<Path>) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    *audit_state().lock() = Some(file);
    Ok(())
}

/// Drop the currently-open audit log handle, if any. Subsequent records
/// fall back to standard error until `audit_open` is called again.
pub fn audit_close() {
    *audit_state().lock() = None;
}

fn timestamp() -> String {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| String::from("0000-00-00 00:00:00"))
}

/// Append a record to the audit log.
///
/// If a file is open, the record is written as `[timestamp] message\n` and
/// flushed immediately (line-buffered semantics). If no file is open, the
/// message is written to standard error unformatted by timestamp.
pub fn audit_log(message: impl AsRef<str>) {
    let message = message.as_ref();
    let mut guard = audit_state().lock();
    match guard.as_mut() {
        Some(file) => {
            let _ = writeln!(file, "[{}] {}", timestamp(), message);
            let _ = file.flush();
        }
        None => {
            eprintln!("{message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn audit_log_without_open_file_does_not_panic() {
        audit_close();
        audit_log("fell through to stderr");
    }

    #[test]
    fn audit_log_writes_timestamped_record_to_file() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("trion-audit-test-{}.log", std::process::id()));
        audit_open(&path).unwrap();
        audit_log("syscall_registered: echo flags=1");
        audit_close();

        let mut contents = String::new();
        File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert!(contents.starts_with('['));
        assert!(contents.contains("syscall_registered: echo"));
        let _ = std::fs::remove_file(&path);
    }
}
