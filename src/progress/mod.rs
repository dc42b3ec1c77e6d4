// src/progress/mod.rs
use anyhow::{Context, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Timestamp layout used for every progress line.
const TIMESTAMP_FORMAT: &str = "%Y-%b-%d-%H:%M:%S";

/// Appends `<timestamp>: <message>` lines to a flat journal file, creating
/// it on first use. One per pipeline; it carries no state beyond the path
/// and plays no part in error handling. Write failures propagate.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ProgressLog { path: path.into() }
    }

    pub fn record(&self, message: &str) -> Result<()> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening progress log {}", self.path.display()))?;
        writeln!(file, "{}: {}", timestamp, message)
            .with_context(|| format!("appending to {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn lines_append_without_truncating() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("log_file.txt");
        let log = ProgressLog::new(&path);

        log.record("ETL Job Started")?;
        log.record("Extract Phase Started")?;

        let content = fs::read_to_string(&path)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(": ETL Job Started"));
        assert!(lines[1].ends_with(": Extract Phase Started"));
        Ok(())
    }

    #[test]
    fn timestamp_precedes_the_message() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("log_file.txt");
        ProgressLog::new(&path).record("Process Complete")?;

        let content = fs::read_to_string(&path)?;
        let (timestamp, rest) = content
            .split_once(": ")
            .expect("line has a timestamp prefix");
        assert!(!timestamp.is_empty());
        assert_eq!(rest.trim_end(), "Process Complete");
        Ok(())
    }
}
