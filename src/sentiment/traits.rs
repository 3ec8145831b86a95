// Sentiment scorer trait and the outcome types the classifier consumes.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Score used whenever no real score is available.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Trait for scoring text polarity.
pub trait SentimentScorer: Send + Sync {
    /// Score non-empty text from 0.0 (negative) to 1.0 (positive).
    fn score(&self, text: &str) -> Result<f64>;
}

/// Scorer used when sentiment is switched off (keyword-only runs).
/// Always fails, so every post lands on the neutral default.
pub struct NoopScorer;

impl SentimentScorer for NoopScorer {
    fn score(&self, _text: &str) -> Result<f64> {
        anyhow::bail!("Sentiment scoring is disabled")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a score came from the scorer or from the neutral fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentSource {
    #[default]
    Scored,
    Defaulted,
}

/// Label cutoffs. A score above `positive` is positive, below `negative`
/// is negative, anything in between (inclusive) is neutral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub positive: f64,
    pub negative: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            positive: 0.6,
            negative: 0.4,
        }
    }
}

impl Thresholds {
    /// Validate the cutoffs: both in [0, 1] and positive strictly above negative.
    pub fn new(positive: f64, negative: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&positive) || !(0.0..=1.0).contains(&negative) {
            anyhow::bail!(
                "Sentiment thresholds must lie in [0, 1] (got pos={positive}, neg={negative})"
            );
        }
        if positive <= negative {
            anyhow::bail!(
                "Positive threshold must be greater than negative threshold (got pos={positive}, neg={negative})"
            );
        }
        Ok(Self { positive, negative })
    }

    /// Map a score to exactly one label.
    pub fn label(&self, score: f64) -> SentimentLabel {
        if score > self.positive {
            SentimentLabel::Positive
        } else if score < self.negative {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// Result of asking a scorer about a text.
#[derive(Debug, Clone, PartialEq)]
pub enum SentimentOutcome {
    Scored { score: f64 },
    Defaulted { reason: String },
}

impl SentimentOutcome {
    pub fn score(&self) -> f64 {
        match self {
            SentimentOutcome::Scored { score } => *score,
            SentimentOutcome::Defaulted { .. } => NEUTRAL_SCORE,
        }
    }

    pub fn source(&self) -> SentimentSource {
        match self {
            SentimentOutcome::Scored { .. } => SentimentSource::Scored,
            SentimentOutcome::Defaulted { .. } => SentimentSource::Defaulted,
        }
    }

    /// Defaulted outcomes are always neutral, whatever the thresholds.
    pub fn label(&self, thresholds: &Thresholds) -> SentimentLabel {
        match self {
            SentimentOutcome::Scored { score } => thresholds.label(*score),
            SentimentOutcome::Defaulted { .. } => SentimentLabel::Neutral,
        }
    }
}

/// Score `text`, absorbing every failure into a Defaulted outcome.
///
/// Empty text, scorer errors, and scores that are NaN or outside [0, 1]
/// all fall back to neutral.
pub fn assess(scorer: &dyn SentimentScorer, text: &str) -> SentimentOutcome {
    if text.trim().is_empty() {
        return SentimentOutcome::Defaulted {
            reason: "empty text".to_string(),
        };
    }

    match scorer.score(text) {
        Ok(score) if (0.0..=1.0).contains(&score) => SentimentOutcome::Scored { score },
        Ok(score) => {
            warn!(score, "Sentiment scorer returned an out-of-range score");
            SentimentOutcome::Defaulted {
                reason: format!("score {score} outside [0, 1]"),
            }
        }
        Err(e) => {
            debug!(error = %e, "Sentiment scoring failed, using neutral default");
            SentimentOutcome::Defaulted {
                reason: e.to_string(),
            }
        }
    }
}
