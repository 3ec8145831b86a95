// VerificationStore: the human confirm/reject overlay on the event log.
//
// Updates are a read-modify-write of the whole log, so they run under the
// store's exclusive lock (which appends also take) and replace the log by
// writing a sibling temp file and renaming it over the original. Lines that
// are not being updated are copied back byte-for-byte, malformed ones
// included.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::event_log::{read_bytes, split_lines, EventLog};
use super::lock::{sibling_path, StoreLock};
use super::models::{LogRecord, Verdict, Verification};

/// Outcome of a verification update. Failures are reported here, never raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateOutcome {
    pub success: bool,
    /// Number of records whose verdict was set
    pub updated: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UpdateOutcome {
    fn from_result(result: Result<usize>) -> Self {
        match result {
            Ok(updated) => Self {
                success: true,
                updated,
                error: None,
            },
            Err(e) => Self {
                success: false,
                updated: 0,
                error: Some(format!("{e:#}")),
            },
        }
    }
}

/// Which records an update applies to.
enum Target<'a> {
    Id(&'a str),
    Url(&'a str),
}

impl Target<'_> {
    fn matches(&self, record: &serde_json::Map<String, Value>) -> bool {
        let (key, wanted) = match self {
            Target::Id(id) => ("id", *id),
            Target::Url(url) => ("url", *url),
        };
        record.get(key).and_then(Value::as_str) == Some(wanted)
    }
}

pub struct VerificationStore {
    log: EventLog,
}

impl VerificationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            log: EventLog::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.log.path()
    }

    /// Set the verdict on the record with this id.
    pub fn update_by_id(&self, id: &str, verdict: Verdict) -> UpdateOutcome {
        if id.is_empty() {
            return UpdateOutcome::from_result(Err(anyhow::anyhow!("Record id is empty")));
        }
        UpdateOutcome::from_result(self.update(Target::Id(id), verdict))
    }

    /// Set the verdict on every record with this source URL. URLs are not
    /// unique, so this can touch several records.
    pub fn update_by_url(&self, url: &str, verdict: Verdict) -> UpdateOutcome {
        UpdateOutcome::from_result(self.update(Target::Url(url), verdict))
    }

    /// Records still awaiting review or confirmed as risks.
    pub fn list_pending_or_confirmed(&self) -> Result<Vec<LogRecord>> {
        let not_rejected: &dyn Fn(&LogRecord) -> bool = &|record| !record.is_rejected();
        self.log.list_all(Some(not_rejected))
    }

    fn update(&self, target: Target<'_>, verdict: Verdict) -> Result<usize> {
        let path = self.log.path();
        let _lock = StoreLock::exclusive(path)?;

        let Some(contents) = read_bytes(path)? else {
            return Ok(0);
        };

        let new_value: Option<bool> = Verification::from(verdict).into();
        let mut rewritten = Vec::with_capacity(contents.len() + 64);
        let mut updated = 0usize;

        for line in split_lines(&contents) {
            match serde_json::from_slice::<Value>(line) {
                Ok(Value::Object(mut record)) if target.matches(&record) => {
                    record.insert("human_verified".to_string(), Value::from(new_value));
                    serde_json::to_writer(&mut rewritten, &record)?;
                    updated += 1;
                }
                _ => rewritten.extend_from_slice(line),
            }
            rewritten.push(b'\n');
        }

        if updated == 0 {
            warn!(path = %path.display(), "Verification matched no records");
            return Ok(0);
        }

        replace_file(path, &rewritten)?;
        info!(updated, path = %path.display(), "Recorded human verification");
        Ok(updated)
    }
}

/// Write `contents` to a sibling temp file, sync it, and rename it over `path`.
fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = sibling_path(path, ".tmp");
    let mut file =
        File::create(&tmp).with_context(|| format!("Failed to create {}", tmp.display()))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace event log {}", path.display()))?;
    Ok(())
}
