// Combined risk verdict.
//
// A post is a risk event when it carries either a strong lexical signal
// (a risk keyword) or strong negative polarity, AND it falls inside the
// recency window. Stale posts are never actionable, whatever they say.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::sentiment::traits::{assess, SentimentLabel, SentimentScorer, Thresholds};
use crate::store::models::{ClassificationResult, Post};
use crate::temporal::{is_recent_at, TemporalGate};
use crate::text::keywords::KeywordMatcher;
use crate::text::normalize::normalize_post;

/// Tunable parameters of the classifier.
///
/// `window_days` has no default: deployments have used both one day and one
/// hundred days, so callers must choose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierSettings {
    /// Scores above this are positive (default 0.6)
    pub pos_thresh: f64,
    /// Scores below this are negative (default 0.4)
    pub neg_thresh: f64,
    /// Recency horizon in days
    pub window_days: u32,
}

impl ClassifierSettings {
    /// Default thresholds with the given recency window.
    pub fn new(window_days: u32) -> Self {
        let defaults = Thresholds::default();
        Self {
            pos_thresh: defaults.positive,
            neg_thresh: defaults.negative,
            window_days,
        }
    }

    pub fn with_thresholds(mut self, pos_thresh: f64, neg_thresh: f64) -> Self {
        self.pos_thresh = pos_thresh;
        self.neg_thresh = neg_thresh;
        self
    }

    /// Validated sentiment cutoffs.
    pub fn thresholds(&self) -> Result<Thresholds> {
        Thresholds::new(self.pos_thresh, self.neg_thresh)
    }
}

/// The verdict formula: `(negative OR keyword) AND recent`.
pub fn is_risk(label: SentimentLabel, has_keywords: bool, is_recent: bool) -> bool {
    (label == SentimentLabel::Negative || has_keywords) && is_recent
}

pub struct RiskClassifier {
    settings: ClassifierSettings,
    thresholds: Thresholds,
    matcher: KeywordMatcher,
    scorer: Box<dyn SentimentScorer>,
    gate: TemporalGate,
}

impl RiskClassifier {
    /// Fails only if the thresholds are invalid.
    pub fn new(
        settings: ClassifierSettings,
        matcher: KeywordMatcher,
        scorer: Box<dyn SentimentScorer>,
        gate: TemporalGate,
    ) -> Result<Self> {
        let thresholds = settings.thresholds()?;
        Ok(Self {
            settings,
            thresholds,
            matcher,
            scorer,
            gate,
        })
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    pub fn matcher(&self) -> &KeywordMatcher {
        &self.matcher
    }

    pub fn gate(&self) -> &TemporalGate {
        &self.gate
    }

    /// Classify a post against the wall clock.
    pub fn classify(&self, post: &Post) -> ClassificationResult {
        self.classify_at(post, Utc::now())
    }

    /// Classify a post as of `now`. Never fails: scoring and segmentation
    /// problems degrade to their safe defaults.
    pub fn classify_at(&self, post: &Post, now: DateTime<Utc>) -> ClassificationResult {
        let cleaned_text = normalize_post(&post.title, &post.content);

        let sentiment = assess(self.scorer.as_ref(), &cleaned_text);
        let sentiment_label = sentiment.label(&self.thresholds);
        let has_keywords = self.matcher.has_keywords(&cleaned_text);

        let post_time = self
            .gate
            .parse_post_time(post.readable_time.as_deref(), post.timestamp_f64());
        let is_recent = is_recent_at(post_time, self.settings.window_days, now);

        ClassificationResult {
            sentiment_label,
            sentiment_score: sentiment.score(),
            sentiment_source: sentiment.source(),
            has_keywords,
            is_recent,
            is_risk: is_risk(sentiment_label, has_keywords, is_recent),
            cleaned_text,
            parsed_time: post_time.map(|t| self.gate.format(t)),
        }
    }
}
