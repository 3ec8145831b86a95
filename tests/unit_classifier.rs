// Unit tests for sentiment labeling and the combined risk verdict.
//
// The clock is pinned with `classify_at` so results never depend on when
// the suite runs.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use yuqing::scoring::risk::{is_risk, ClassifierSettings, RiskClassifier};
use yuqing::sentiment::lexicon::LexiconScorer;
use yuqing::sentiment::traits::{
    assess, NoopScorer, SentimentLabel, SentimentScorer, SentimentSource, Thresholds,
};
use yuqing::store::models::Post;
use yuqing::temporal::TemporalGate;
use yuqing::text::keywords::KeywordMatcher;
use yuqing::text::segment::DictionarySegmenter;

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn classifier_with(scorer: Box<dyn SentimentScorer>, window_days: u32) -> RiskClassifier {
    RiskClassifier::new(
        ClassifierSettings::new(window_days),
        KeywordMatcher::with_default_keywords(Box::new(DictionarySegmenter::default())),
        scorer,
        TemporalGate::default(),
    )
    .unwrap()
}

fn classifier(window_days: u32) -> RiskClassifier {
    classifier_with(Box::new(LexiconScorer::default()), window_days)
}

fn post_at(title: &str, content: &str, time: DateTime<Utc>) -> Post {
    Post {
        title: title.to_string(),
        content: content.to_string(),
        timestamp: Some(serde_json::Number::from(time.timestamp_millis())),
        ..Default::default()
    }
}

// ============================================================
// Thresholds and labels
// ============================================================

#[test]
fn default_thresholds() {
    let t = Thresholds::default();
    assert_eq!(t.positive, 0.6);
    assert_eq!(t.negative, 0.4);
}

#[test]
fn labels_are_exclusive_and_follow_strict_cutoffs() {
    let t = Thresholds::default();
    for i in 0..=100 {
        let score = f64::from(i) / 100.0;
        let label = t.label(score);
        let expected = if score > 0.6 {
            SentimentLabel::Positive
        } else if score < 0.4 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };
        assert_eq!(label, expected, "score {score}");
    }
}

#[test]
fn threshold_values_themselves_are_neutral() {
    let t = Thresholds::default();
    assert_eq!(t.label(0.6), SentimentLabel::Neutral);
    assert_eq!(t.label(0.4), SentimentLabel::Neutral);
}

#[test]
fn invalid_thresholds_are_rejected() {
    assert!(Thresholds::new(0.4, 0.6).is_err());
    assert!(Thresholds::new(0.5, 0.5).is_err());
    assert!(Thresholds::new(1.5, 0.4).is_err());
    assert!(Thresholds::new(0.6, -0.1).is_err());
    assert!(Thresholds::new(0.7, 0.3).is_ok());
}

#[test]
fn classifier_refuses_bad_thresholds() {
    let settings = ClassifierSettings::new(1).with_thresholds(0.3, 0.7);
    let result = RiskClassifier::new(
        settings,
        KeywordMatcher::with_default_keywords(Box::new(DictionarySegmenter::default())),
        Box::new(LexiconScorer::default()),
        TemporalGate::default(),
    );
    assert!(result.is_err());
}

// ============================================================
// Sentiment fallbacks
// ============================================================

struct FailingScorer;

impl SentimentScorer for FailingScorer {
    fn score(&self, _text: &str) -> Result<f64> {
        anyhow::bail!("model not loaded")
    }
}

struct FixedScorer(f64);

impl SentimentScorer for FixedScorer {
    fn score(&self, _text: &str) -> Result<f64> {
        Ok(self.0)
    }
}

#[test]
fn scorer_failure_defaults_to_neutral() {
    let outcome = assess(&FailingScorer, "任何文本");
    assert_eq!(outcome.source(), SentimentSource::Defaulted);
    assert_eq!(outcome.score(), 0.5);
    assert_eq!(outcome.label(&Thresholds::default()), SentimentLabel::Neutral);
}

#[test]
fn out_of_range_and_nan_scores_default() {
    for bad in [1.5, -0.2, f64::NAN] {
        let outcome = assess(&FixedScorer(bad), "文本");
        assert_eq!(outcome.source(), SentimentSource::Defaulted, "score {bad}");
        assert_eq!(outcome.score(), 0.5);
    }
}

#[test]
fn defaulted_is_neutral_even_with_unusual_thresholds() {
    // 0.5 would be positive under these cutoffs, but a default is never labeled
    let thresholds = Thresholds::new(0.45, 0.1).unwrap();
    let outcome = assess(&NoopScorer, "文本");
    assert_eq!(outcome.label(&thresholds), SentimentLabel::Neutral);
}

#[test]
fn empty_text_is_not_scored() {
    let outcome = assess(&FixedScorer(0.1), "   ");
    assert_eq!(outcome.source(), SentimentSource::Defaulted);
}

// ============================================================
// Risk formula
// ============================================================

#[test]
fn risk_truth_table() {
    let labels = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ];
    for label in labels {
        for has_keywords in [false, true] {
            for is_recent in [false, true] {
                let expected =
                    (label == SentimentLabel::Negative || has_keywords) && is_recent;
                assert_eq!(
                    is_risk(label, has_keywords, is_recent),
                    expected,
                    "{label} keywords={has_keywords} recent={is_recent}"
                );
            }
        }
    }
}

// ============================================================
// End-to-end classification
// ============================================================

#[test]
fn recent_complaint_is_a_risk() {
    let post = post_at("", "这次活动很失望大家都在维权", now());
    let result = classifier(1).classify_at(&post, now());

    assert_eq!(result.cleaned_text, "这次活动很失望大家都在维权");
    assert!(result.has_keywords);
    assert!(result.is_recent);
    assert_eq!(result.sentiment_label, SentimentLabel::Negative);
    assert_eq!(result.sentiment_source, SentimentSource::Scored);
    assert!(result.is_risk);
    assert_eq!(result.parsed_time.as_deref(), Some("2023-11-15 06:13:20"));
}

#[test]
fn stale_complaint_is_not_a_risk() {
    let post = post_at("", "这次活动很失望大家都在维权", now() - Duration::days(200));
    let result = classifier(100).classify_at(&post, now());

    assert!(result.has_keywords);
    assert!(!result.is_recent);
    assert!(!result.is_risk);
}

#[test]
fn empty_post_is_neutral_default_and_not_a_risk() {
    let post = post_at("", "", now());
    let result = classifier(1).classify_at(&post, now());

    assert_eq!(result.cleaned_text, "");
    assert_eq!(result.sentiment_label, SentimentLabel::Neutral);
    assert_eq!(result.sentiment_score, 0.5);
    assert_eq!(result.sentiment_source, SentimentSource::Defaulted);
    assert!(!result.has_keywords);
    assert!(!result.is_risk);
}

#[test]
fn post_without_time_is_never_a_risk() {
    let post = Post {
        content: "投诉 投诉 投诉".to_string(),
        ..Default::default()
    };
    let result = classifier(36_500).classify_at(&post, now());
    assert!(result.has_keywords);
    assert!(!result.is_recent);
    assert!(!result.is_risk);
    assert_eq!(result.parsed_time, None);
}

#[test]
fn positive_post_with_keyword_is_still_a_risk() {
    let post = post_at("", "售后处理问题很快 非常满意 推荐 点赞", now());
    let result = classifier(1).classify_at(&post, now());

    assert_eq!(result.sentiment_label, SentimentLabel::Positive);
    assert!(result.has_keywords);
    assert!(result.is_risk);
}

#[test]
fn negative_post_without_keyword_is_a_risk() {
    let post = post_at("", "质量太差 后悔 垃圾", now());
    let result = classifier(1).classify_at(&post, now());

    assert!(!result.has_keywords);
    assert_eq!(result.sentiment_label, SentimentLabel::Negative);
    assert!(result.is_risk);
}

#[test]
fn keywords_only_mode_relies_on_keywords() {
    let c = classifier_with(Box::new(NoopScorer), 1);

    let complaint = c.classify_at(&post_at("", "我要投诉", now()), now());
    assert_eq!(complaint.sentiment_source, SentimentSource::Defaulted);
    assert!(complaint.is_risk);

    let rant = c.classify_at(&post_at("", "垃圾 后悔", now()), now());
    assert_eq!(rant.sentiment_label, SentimentLabel::Neutral);
    assert!(!rant.is_risk);
}

#[test]
fn readable_time_wins_over_stale_epoch() {
    let gate = TemporalGate::default();
    let mut post = post_at("", "投诉", now() - Duration::days(400));
    post.readable_time = Some(gate.format(now() - Duration::hours(3)));

    let result = classifier(1).classify_at(&post, now());
    assert!(result.is_recent);
    assert!(result.is_risk);
}
