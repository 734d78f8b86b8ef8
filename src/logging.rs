// Run log: best-effort side channel
//
// Mirrors diagnostic text to the log facade and to an append-only
// timestamped file under logs/. An explicitly constructed instance is
// passed to collaborators; file-side failures are swallowed so logging
// can never abort the main flow.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::constants::LOG_FILE_PREFIX;

#[derive(Debug, Clone)]
pub struct RunLog {
    file: PathBuf,
}

impl RunLog {
    /// Create a run log writing to a fresh timestamped file under `logs_dir`.
    pub fn new(logs_dir: &Path) -> Self {
        let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S");
        Self {
            file: logs_dir.join(format!("{}-{}.log", LOG_FILE_PREFIX, stamp)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file
    }

    /// Record a message on the console and in the log file.
    pub fn note(&self, message: &str) {
        log::info!("{}", message);

        if let Err(e) = self.append(message) {
            // Never escalate a logging failure
            log::debug!("run log write failed: {}", e);
        }
    }

    fn append(&self, message: &str) -> std::io::Result<()> {
        if let Some(parent) = self.file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut f = OpenOptions::new().create(true).append(true).open(&self.file)?;
        writeln!(f, "[{}] {}", Utc::now().to_rfc3339(), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_note_appends_timestamped_lines() {
        let tmp = TempDir::new().unwrap();
        let log = RunLog::new(tmp.path());

        log.note("first");
        log.note("second");

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("first"));
        assert!(lines[1].ends_with("second"));
    }

    #[test]
    fn test_note_survives_unwritable_target() {
        // Point the log at a path whose parent is a regular file; the
        // append must fail internally without panicking or erroring out.
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let log = RunLog::new(&blocker.join("sub"));
        log.note("dropped on the floor");
    }
}
