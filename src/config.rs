use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::scoring::risk::{ClassifierSettings, RiskClassifier};
use crate::sentiment::lexicon::LexiconScorer;
use crate::sentiment::traits::{NoopScorer, SentimentScorer, Thresholds};
use crate::temporal::TemporalGate;
use crate::text::keywords::{KeywordMatcher, DEFAULT_KEYWORDS};
use crate::text::segment::DictionarySegmenter;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. CLI flags
/// override individual values.
pub struct Config {
    /// JSON Lines event log (YUQING_LOG_PATH, default ./yuqing_log.jsonl)
    pub log_path: PathBuf,
    /// Recency window in days (YUQING_WINDOW_DAYS). No default; see
    /// `require_window_days`.
    pub window_days: Option<u32>,
    pub pos_thresh: f64,
    pub neg_thresh: f64,
    /// Risk keywords, in priority order (YUQING_KEYWORDS, comma-separated)
    pub keywords: Vec<String>,
    /// UTC offset used to read zone-less timestamps (YUQING_TZ_OFFSET_HOURS, default 8)
    pub tz_offset_hours: i32,
    /// Address the web server binds to (YUQING_BIND, default 127.0.0.1)
    #[cfg(feature = "web")]
    pub bind: String,
    /// Port the web server listens on (YUQING_PORT, default 5000)
    #[cfg(feature = "web")]
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let defaults = Thresholds::default();

        let window_days = match env::var("YUQING_WINDOW_DAYS") {
            Ok(v) if !v.trim().is_empty() => Some(
                v.trim()
                    .parse()
                    .with_context(|| format!("YUQING_WINDOW_DAYS is not a whole number: {v}"))?,
            ),
            _ => None,
        };

        let mut keywords = env::var("YUQING_KEYWORDS")
            .map(|v| parse_keyword_list(&v))
            .unwrap_or_default();
        if keywords.is_empty() {
            keywords = DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect();
        }

        Ok(Self {
            log_path: env::var("YUQING_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./yuqing_log.jsonl")),
            window_days,
            pos_thresh: parse_env_or("YUQING_POS_THRESH", defaults.positive)?,
            neg_thresh: parse_env_or("YUQING_NEG_THRESH", defaults.negative)?,
            keywords,
            tz_offset_hours: parse_env_or("YUQING_TZ_OFFSET_HOURS", 8)?,
            #[cfg(feature = "web")]
            bind: env::var("YUQING_BIND").unwrap_or_else(|_| "127.0.0.1".to_string()),
            #[cfg(feature = "web")]
            port: parse_env_or("YUQING_PORT", 5000)?,
        })
    }

    /// The recency window: the CLI override if given, else the configured one.
    /// Call this before building a classifier.
    pub fn require_window_days(&self, cli_override: Option<u32>) -> Result<u32> {
        match cli_override.or(self.window_days) {
            Some(days) => Ok(days),
            None => anyhow::bail!(
                "Recency window not set. Pass --days or set YUQING_WINDOW_DAYS in your .env file.\n\
                 (Earlier deployments used 1 day for batch runs and 100 days for the live server.)"
            ),
        }
    }

    /// Classifier settings with optional CLI overrides applied.
    pub fn classifier_settings(
        &self,
        window_days: Option<u32>,
        pos_thresh: Option<f64>,
        neg_thresh: Option<f64>,
    ) -> Result<ClassifierSettings> {
        let settings = ClassifierSettings::new(self.require_window_days(window_days)?)
            .with_thresholds(
                pos_thresh.unwrap_or(self.pos_thresh),
                neg_thresh.unwrap_or(self.neg_thresh),
            );
        settings.thresholds()?;
        Ok(settings)
    }

    /// Build the standard classifier: dictionary segmenter seeded with the
    /// configured keywords, and the lexicon scorer unless sentiment is off.
    pub fn build_classifier(
        &self,
        settings: ClassifierSettings,
        keywords_only: bool,
    ) -> Result<RiskClassifier> {
        let mut segmenter = DictionarySegmenter::default();
        segmenter.extend(&self.keywords);

        let matcher = KeywordMatcher::new(self.keywords.clone(), Box::new(segmenter));
        let scorer: Box<dyn SentimentScorer> = if keywords_only {
            Box::new(NoopScorer)
        } else {
            Box::new(LexiconScorer::default())
        };
        let gate = TemporalGate::with_offset_hours(self.tz_offset_hours)?;

        RiskClassifier::new(settings, matcher, scorer, gate)
    }
}

/// Split a comma-separated keyword list (ASCII or full-width commas).
pub fn parse_keyword_list(raw: &str) -> Vec<String> {
    raw.split([',', '，'])
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {v}")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyword_list() {
        assert_eq!(
            parse_keyword_list("投诉, 曝光，维权,,"),
            vec!["投诉".to_string(), "曝光".to_string(), "维权".to_string()]
        );
    }

    #[test]
    fn test_window_override_wins() {
        let config = Config {
            log_path: PathBuf::from("log.jsonl"),
            window_days: Some(100),
            pos_thresh: 0.6,
            neg_thresh: 0.4,
            keywords: vec![],
            tz_offset_hours: 8,
            #[cfg(feature = "web")]
            bind: "127.0.0.1".to_string(),
            #[cfg(feature = "web")]
            port: 5000,
        };
        assert_eq!(config.require_window_days(Some(1)).unwrap(), 1);
        assert_eq!(config.require_window_days(None).unwrap(), 100);

        let unset = Config {
            window_days: None,
            ..config
        };
        assert!(unset.require_window_days(None).is_err());
    }
}
