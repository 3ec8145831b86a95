// Batch pipeline: classify a JSON array of posts, keep the risky ones.
//
// Input is the array the HAR extractor writes (or any array of note-card
// shaped objects). Each flagged post is written back out as its original
// object with the classification fields merged in, so nothing the capture
// contained is lost. Posts whose cleaned text is empty are skipped and do
// not count toward the totals.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::ingest::note_card::NoteCard;
use crate::scoring::risk::RiskClassifier;
use crate::sentiment::traits::{SentimentLabel, SentimentSource};

/// Aggregate counts for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub risk_count: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    /// Posts whose sentiment fell back to the neutral default
    pub defaulted: usize,
    /// Entries skipped for being non-objects or having no usable text
    pub skipped: usize,
}

impl BatchStats {
    /// Share of classified posts flagged as risks, in percent.
    pub fn risk_percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.risk_count as f64 / self.total as f64 * 100.0
        }
    }

    fn record_label(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Negative => self.negative += 1,
        }
    }
}

/// Classify `posts` as of `now`. Returns the flagged subset and the counts.
pub fn run(
    classifier: &RiskClassifier,
    posts: Vec<Value>,
    now: DateTime<Utc>,
    progress: Option<&ProgressBar>,
) -> (Vec<Value>, BatchStats) {
    let mut stats = BatchStats::default();
    let mut flagged = Vec::new();

    for mut raw in posts {
        if let Some(pb) = progress {
            pb.inc(1);
        }

        let Some(card) = NoteCard::from_value(&raw) else {
            stats.skipped += 1;
            continue;
        };
        let post = card.to_post("");
        let result = classifier.classify_at(&post, now);
        if result.cleaned_text.is_empty() {
            stats.skipped += 1;
            continue;
        }

        stats.total += 1;
        stats.record_label(result.sentiment_label);
        if result.sentiment_source == SentimentSource::Defaulted {
            stats.defaulted += 1;
        }
        if !result.is_risk {
            continue;
        }
        stats.risk_count += 1;

        if let (Value::Object(map), Ok(Value::Object(fields))) =
            (&mut raw, serde_json::to_value(&result))
        {
            map.extend(fields);
        }
        flagged.push(raw);
    }

    (flagged, stats)
}

/// Read `input`, classify, and write the flagged posts to `output` as a
/// pretty-printed JSON array.
pub fn run_file(classifier: &RiskClassifier, input: &Path, output: &Path) -> Result<BatchStats> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    let raw = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let posts: Vec<Value> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of posts", input.display()))?;

    info!(
        posts = posts.len(),
        window_days = classifier.settings().window_days,
        "Starting batch classification"
    );

    let pb = ProgressBar::new(posts.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len} posts")
            .expect("valid template"),
    );
    let (flagged, stats) = run(classifier, posts, Utc::now(), Some(&pb));
    pb.finish_and_clear();

    if stats.skipped > 0 {
        warn!(
            skipped = stats.skipped,
            "Skipped entries that were not note cards or had no usable text"
        );
    }

    let json = serde_json::to_string_pretty(&flagged)?;
    fs::write(output, json).with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        total = stats.total,
        risk = stats.risk_count,
        output = %output.display(),
        "Batch classification complete"
    );
    Ok(stats)
}
