// EventLog: append-only JSON Lines store of risk events.
//
// One LogRecord per line. Appends go through a single write on a file
// opened in append mode, under the store's exclusive lock. Reads tolerate
// damage: a line that fails to parse is skipped and counted, and a missing
// log reads as empty.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::lock::StoreLock;
use super::models::LogRecord;

pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a new line. Never touches existing lines.
    /// Only risk events belong in the log; anything else is refused.
    pub fn append(&self, record: &LogRecord) -> Result<()> {
        if !record.classification.is_risk {
            anyhow::bail!("Refusing to log record {}: not a risk event", record.id);
        }

        let mut line = serde_json::to_string(record).context("Failed to serialize log record")?;
        line.push('\n');

        let _lock = StoreLock::exclusive(&self.path)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open event log {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("Failed to append to event log {}", self.path.display()))?;
        file.flush()?;

        debug!(id = %record.id, url = %record.post.url, "Appended risk event");
        Ok(())
    }

    /// Read every well-formed record, keeping those accepted by `predicate`
    /// (all of them when it is None).
    pub fn list_all(&self, predicate: Option<&dyn Fn(&LogRecord) -> bool>) -> Result<Vec<LogRecord>> {
        let Some(contents) = self.read_raw()? else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for line in split_lines(&contents) {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<LogRecord>(line) {
                Ok(record) => {
                    let keep = match predicate {
                        Some(keep) => keep(&record),
                        None => true,
                    };
                    if keep {
                        records.push(record);
                    }
                }
                Err(e) => {
                    skipped += 1;
                    debug!(error = %e, "Skipping malformed log line");
                }
            }
        }

        if skipped > 0 {
            warn!(
                skipped,
                path = %self.path.display(),
                "Skipped malformed lines while reading event log"
            );
        }
        Ok(records)
    }

    /// Raw log bytes under a shared lock, or None if the log does not exist.
    fn read_raw(&self) -> Result<Option<Vec<u8>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let _lock = StoreLock::shared(&self.path)?;
        read_bytes(&self.path)
    }
}

/// Read the whole log, mapping "not found" to None. Callers hold the lock.
pub(crate) fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read event log {}", path.display())),
    }
}

/// Non-empty lines of the log, without their '\n'. A trailing '\r' is left
/// in place; JSON parsing treats it as whitespace.
pub(crate) fn split_lines(contents: &[u8]) -> impl Iterator<Item = &[u8]> {
    contents.split(|b| *b == b'\n').filter(|line| !line.is_empty())
}
