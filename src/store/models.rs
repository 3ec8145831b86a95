// Data models: the records that flow through the pipeline and the log.
//
// Optional and later-added fields carry serde defaults so log lines written
// by older versions still deserialize. Unknown keys are ignored.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::sentiment::traits::{SentimentLabel, SentimentSource};

/// A post as supplied by the ingestion side. Never mutated by the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    pub title: String,
    pub content: String,
    /// Numeric epoch (seconds or milliseconds), kept exactly as received
    pub timestamp: Option<serde_json::Number>,
    /// Readable `YYYY-MM-DD HH:MM:SS` / `YYYY/MM/DD HH:MM:SS` time, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readable_time: Option<String>,
    pub location: String,
    pub user_nickname: String,
    pub user_id: String,
    /// Engagement counters as the platform renders them (e.g. "1.2万")
    pub liked_count: String,
    pub comment_count: String,
    pub share_count: String,
    pub tags: Vec<String>,
    pub url: String,
}

impl Post {
    pub fn timestamp_f64(&self) -> Option<f64> {
        self.timestamp.as_ref().and_then(serde_json::Number::as_f64)
    }
}

/// Output of the risk classifier for one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub sentiment_label: SentimentLabel,
    pub sentiment_score: f64,
    /// Absent on lines logged before fallbacks were tracked
    #[serde(default)]
    pub sentiment_source: SentimentSource,
    pub has_keywords: bool,
    pub is_recent: bool,
    pub is_risk: bool,
    pub cleaned_text: String,
    /// The resolved post time, or None when it could not be parsed
    #[serde(default)]
    pub parsed_time: Option<String>,
}

/// A human judgment layered on top of a logged event.
///
/// Persisted as `null` (unset), `true` (confirmed) or `false` (rejected).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Verification {
    #[default]
    Unset,
    Confirmed,
    Rejected,
}

impl From<Option<bool>> for Verification {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => Verification::Unset,
            Some(true) => Verification::Confirmed,
            Some(false) => Verification::Rejected,
        }
    }
}

impl From<Verification> for Option<bool> {
    fn from(value: Verification) -> Self {
        match value {
            Verification::Unset => None,
            Verification::Confirmed => Some(true),
            Verification::Rejected => Some(false),
        }
    }
}

impl Verification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verification::Unset => "unset",
            Verification::Confirmed => "confirmed",
            Verification::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for Verification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reviewer's decision. Unlike [`Verification`] it has no "unset" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Confirmed,
    Rejected,
}

impl From<bool> for Verdict {
    fn from(is_risk: bool) -> Self {
        if is_risk {
            Verdict::Confirmed
        } else {
            Verdict::Rejected
        }
    }
}

impl From<Verdict> for Verification {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Confirmed => Verification::Confirmed,
            Verdict::Rejected => Verification::Rejected,
        }
    }
}

/// One line of the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Stable identifier assigned at append time. Empty for lines written
    /// before identifiers existed.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub logged_at: String,
    #[serde(flatten)]
    pub classification: ClassificationResult,
    #[serde(flatten)]
    pub post: Post,
    #[serde(default)]
    pub human_verified: Verification,
}

impl LogRecord {
    /// Wrap a classified post in a fresh, unverified record with a new id.
    pub fn new(post: Post, classification: ClassificationResult) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            logged_at: Utc::now().to_rfc3339(),
            classification,
            post,
            human_verified: Verification::Unset,
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.human_verified == Verification::Rejected
    }
}
