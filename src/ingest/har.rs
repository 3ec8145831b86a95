// HAR extraction: pull note cards out of a browser network capture.
//
// Walks `log.entries[]`, reads each response body (plain JSON, or base64
// JSON as Chrome stores binary-ish bodies), keeps `data.items[]` entries of
// model_type "note", then adds the fields the batch runner expects:
// `unified_title` and readable UTC+8 renderings of the millisecond times.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::temporal::{beijing_offset, DISPLAY_FORMAT};

/// (millisecond field, readable field) pairs written by the extractor.
const TIME_FIELDS: [(&str, &str); 2] = [
    ("time", "readable_time"),
    ("current_time", "readable_current_time"),
];

pub struct HarExtractor {
    offset: FixedOffset,
}

impl Default for HarExtractor {
    fn default() -> Self {
        Self {
            offset: beijing_offset(),
        }
    }
}

impl HarExtractor {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Read and extract a HAR file. Errors if the file is unreadable, is
    /// not JSON, or yields no note cards.
    pub fn extract_file(&self, path: &Path) -> Result<Vec<Value>> {
        info!(path = %path.display(), "Reading HAR file");
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read HAR file {}", path.display()))?;
        let har: Value = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;

        let notes = self.extract(&har);
        if notes.is_empty() {
            anyhow::bail!("No note cards found in {}", path.display());
        }
        Ok(notes)
    }

    /// Extract and enrich every note card in a parsed HAR document.
    pub fn extract(&self, har: &Value) -> Vec<Value> {
        let empty = Vec::new();
        let entries = har
            .pointer("/log/entries")
            .and_then(Value::as_array)
            .unwrap_or(&empty);
        info!(entries = entries.len(), "Scanning HAR entries");

        let mut notes = Vec::new();
        for entry in entries {
            let content = entry
                .get("content")
                .or_else(|| entry.pointer("/response/content"));
            let url = entry
                .get("url")
                .or_else(|| entry.pointer("/request/url"))
                .and_then(Value::as_str)
                .unwrap_or("");

            let Some(text) = content.and_then(|c| c.get("text")).and_then(Value::as_str) else {
                continue;
            };

            let cards = process_content(text, url);
            if !cards.is_empty() {
                debug!(url, count = cards.len(), "Extracted note cards");
                notes.extend(cards);
            }
        }

        for note in notes.iter_mut() {
            if let Value::Object(map) = note {
                unify_title(map);
                self.convert_timestamps(map);
            }
        }

        info!(count = notes.len(), "HAR extraction complete");
        notes
    }

    fn convert_timestamps(&self, note: &mut Map<String, Value>) {
        for (field, readable_field) in TIME_FIELDS {
            let Some(value) = note.get(field) else {
                continue;
            };
            match millis_from(value).and_then(DateTime::from_timestamp_millis) {
                Some(t) => {
                    let readable = t.with_timezone(&self.offset).format(DISPLAY_FORMAT).to_string();
                    note.insert(readable_field.to_string(), Value::String(readable));
                }
                None => warn!(field, value = %value, "Could not convert timestamp"),
            }
        }
    }
}

/// Default output path: `<har stem>_content.json` next to the working dir.
pub fn default_output_path(har_path: &Path) -> PathBuf {
    let stem = har_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "har".to_string());
    PathBuf::from(format!("{stem}_content.json"))
}

/// Parse one response body into note cards. Bodies that are neither JSON
/// nor base64 JSON are skipped with a warning.
fn process_content(text: &str, url: &str) -> Vec<Value> {
    let parsed = serde_json::from_str::<Value>(text)
        .ok()
        .or_else(|| decode_base64(text).and_then(|decoded| serde_json::from_str(&decoded).ok()));

    match parsed {
        Some(content) => extract_note_cards(&content),
        None => {
            warn!(url, "Response body is neither JSON nor base64 JSON, skipping");
            Vec::new()
        }
    }
}

/// Decode base64, repairing missing padding. None if it is not valid
/// base64 or not UTF-8.
pub fn decode_base64(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let mut padded = trimmed.to_string();
    let remainder = trimmed.len() % 4;
    if remainder != 0 {
        padded.push_str(&"=".repeat(4 - remainder));
    }
    let bytes = STANDARD.decode(padded.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}

/// `data.items[]` entries with model_type "note", unwrapped to their note_card.
fn extract_note_cards(content: &Value) -> Vec<Value> {
    content
        .pointer("/data/items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.get("model_type").and_then(Value::as_str) == Some("note"))
                .filter_map(|item| item.get("note_card").cloned())
                .collect()
        })
        .unwrap_or_default()
}

fn unify_title(note: &mut Map<String, Value>) {
    let title = ["display_title", "title"]
        .iter()
        .filter_map(|key| note.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or("")
        .to_string();
    note.insert("unified_title".to_string(), Value::String(title));
}

/// Milliseconds from a number or a numeric string.
fn millis_from(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
