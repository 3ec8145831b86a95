// Composition tests: verifying that the stages chain together correctly.
//
// These tests exercise the data flow between modules:
//   HAR capture -> note cards -> batch classification -> event log -> review
// using temp files only.

use std::fs;

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;
use yuqing::ingest::har::HarExtractor;
use yuqing::ingest::note_card::NoteCard;
use yuqing::output::truncate_chars;
use yuqing::pipeline::batch;
use yuqing::scoring::risk::{ClassifierSettings, RiskClassifier};
use yuqing::sentiment::lexicon::LexiconScorer;
use yuqing::store::{EventLog, LogRecord, Verdict, Verification, VerificationStore};
use yuqing::temporal::TemporalGate;
use yuqing::text::keywords::KeywordMatcher;
use yuqing::text::segment::DictionarySegmenter;

fn classifier(window_days: u32) -> RiskClassifier {
    RiskClassifier::new(
        ClassifierSettings::new(window_days),
        KeywordMatcher::with_default_keywords(Box::new(DictionarySegmenter::default())),
        Box::new(LexiconScorer::default()),
        TemporalGate::default(),
    )
    .unwrap()
}

/// A HAR capture with one feed response holding three notes and an ad:
/// a fresh complaint, a stale complaint and a fresh happy post.
fn capture() -> Value {
    let now_ms = Utc::now().timestamp_millis();
    let old_ms = (Utc::now() - Duration::days(30)).timestamp_millis();

    let feed = json!({
        "data": {
            "items": [
                {"model_type": "note", "note_card": {
                    "display_title": "活动翻车",
                    "desc": "这次活动很失望大家都在维权",
                    "time": now_ms,
                    "url": "https://example.com/note/1",
                    "user": {"nickname": "小王", "user_id": "u1"},
                    "interact_info": {"liked_count": "1.2万", "comment_count": 35},
                    "tag_list": [{"name": "维权"}]
                }},
                {"model_type": "note", "note_card": {
                    "display_title": "旧帖",
                    "desc": "去年投诉过一次",
                    "time": old_ms,
                    "url": "https://example.com/note/2"
                }},
                {"model_type": "note", "note_card": {
                    "title": "好物分享",
                    "desc": "非常满意 推荐",
                    "time": now_ms,
                    "url": "https://example.com/note/3"
                }},
                {"model_type": "ads", "note_card": {"title": "广告", "desc": "投诉"}}
            ]
        }
    });

    json!({
        "log": {"entries": [
            {"request": {"url": "https://example.com/api/feed"},
             "response": {"content": {"text": feed.to_string()}}},
            {"request": {"url": "https://example.com/static.js"},
             "response": {"content": {"text": "function(){}"}}}
        ]}
    })
}

// ============================================================
// HAR -> batch
// ============================================================

#[test]
fn har_notes_flow_through_batch() {
    let notes = HarExtractor::default().extract(&capture());
    assert_eq!(notes.len(), 3);
    assert_eq!(notes[2]["unified_title"], "好物分享");
    assert!(notes[0]["readable_time"].is_string());

    let (flagged, stats) = batch::run(&classifier(7), notes, Utc::now(), None);

    assert_eq!(stats.total, 3);
    assert_eq!(stats.risk_count, 1);
    assert_eq!(stats.negative, 2);
    assert_eq!(stats.positive, 1);
    assert_eq!(stats.skipped, 0);
    assert!((stats.risk_percentage() - 100.0 / 3.0).abs() < 1e-9);

    assert_eq!(flagged.len(), 1);
    let hit = &flagged[0];
    // Original fields survive next to the merged classification
    assert_eq!(hit["display_title"], "活动翻车");
    assert_eq!(hit["user"]["nickname"], "小王");
    assert_eq!(hit["is_risk"], true);
    assert_eq!(hit["sentiment_label"], "negative");
    assert_eq!(hit["cleaned_text"], "活动翻车 这次活动很失望大家都在维权");
}

#[test]
fn wider_window_catches_the_stale_complaint() {
    let notes = HarExtractor::default().extract(&capture());
    let (flagged, stats) = batch::run(&classifier(60), notes, Utc::now(), None);
    assert_eq!(stats.risk_count, 2);
    assert_eq!(flagged[1]["unified_title"], "旧帖");
}

#[test]
fn batch_skips_entries_without_text() {
    let posts = vec![json!({"title": "", "desc": ""}), json!("not an object"), json!({"desc": "😀😀"})];
    let (flagged, stats) = batch::run(&classifier(1), posts, Utc::now(), None);
    assert!(flagged.is_empty());
    assert_eq!(stats.total, 0);
    assert_eq!(stats.skipped, 3);
    assert_eq!(stats.risk_percentage(), 0.0);
}

#[test]
fn batch_classifies_cards_with_null_lists_and_numeric_ids() {
    let posts = vec![json!({
        "display_title": "标题",
        "desc": "我要投诉这家店",
        "time": Utc::now().timestamp_millis(),
        "user": {"nickname": "小李", "user_id": 98765},
        "tag_list": null
    })];
    let (flagged, stats) = batch::run(&classifier(7), posts, Utc::now(), None);

    assert_eq!(stats.skipped, 0);
    assert_eq!(stats.total, 1);
    assert_eq!(stats.risk_count, 1);
    assert_eq!(flagged[0]["user"]["user_id"], 98765);
}

#[test]
fn har_file_to_batch_file() {
    let dir = TempDir::new().unwrap();
    let har_path = dir.path().join("capture.har");
    let posts_path = dir.path().join("capture_content.json");
    let out_path = dir.path().join("yuqing_posts.json");
    fs::write(&har_path, capture().to_string()).unwrap();

    let notes = HarExtractor::default().extract_file(&har_path).unwrap();
    fs::write(&posts_path, serde_json::to_string_pretty(&notes).unwrap()).unwrap();

    let stats = batch::run_file(&classifier(7), &posts_path, &out_path).unwrap();
    assert_eq!(stats.risk_count, 1);

    let written: Vec<Value> =
        serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0]["url"], "https://example.com/note/1");
}

#[test]
fn har_without_notes_is_an_error() {
    let dir = TempDir::new().unwrap();
    let har_path = dir.path().join("empty.har");
    fs::write(&har_path, json!({"log": {"entries": []}}).to_string()).unwrap();
    assert!(HarExtractor::default().extract_file(&har_path).is_err());
}

#[test]
fn batch_missing_input_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = batch::run_file(
        &classifier(1),
        &dir.path().join("nope.json"),
        &dir.path().join("out.json"),
    );
    assert!(result.is_err());
}

// ============================================================
// Note card -> classifier -> log -> review
// ============================================================

#[test]
fn flagged_notes_are_logged_and_reviewed() {
    let dir = TempDir::new().unwrap();
    let log = EventLog::new(dir.path().join("yuqing_log.jsonl"));
    let classifier = classifier(60);

    let notes = HarExtractor::default().extract(&capture());
    let mut ids = Vec::new();
    for note in &notes {
        let post = NoteCard::from_value(note).unwrap().to_post("");
        let result = classifier.classify(&post);
        if result.is_risk {
            let record = LogRecord::new(post, result);
            ids.push(record.id.clone());
            log.append(&record).unwrap();
        }
    }
    assert_eq!(ids.len(), 2);

    let store = VerificationStore::new(log.path());
    assert_eq!(store.list_pending_or_confirmed().unwrap().len(), 2);

    // Reviewer rejects the stale complaint by URL, confirms the other by id
    let outcome = store.update_by_url("https://example.com/note/2", Verdict::Rejected);
    assert_eq!(outcome.updated, 1);
    assert!(store.update_by_id(&ids[0], Verdict::Confirmed).success);

    let queue = store.list_pending_or_confirmed().unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].id, ids[0]);
    assert_eq!(queue[0].human_verified, Verification::Confirmed);
    assert_eq!(queue[0].post.user_nickname, "小王");
    assert_eq!(queue[0].post.liked_count, "1.2万");
    assert_eq!(queue[0].post.comment_count, "35");
    assert_eq!(queue[0].post.tags, vec!["维权".to_string()]);

    // Everything is still in the log, rejected record included
    assert_eq!(log.list_all(None).unwrap().len(), 2);
}

// ============================================================
// Output helpers
// ============================================================

#[test]
fn truncation_counts_characters_not_bytes() {
    let text = "这次活动很失望大家都在维权";
    let short = truncate_chars(text, 4);
    assert!(short.starts_with("这次活动"));
    assert!(!short.contains('失'));
    assert_eq!(truncate_chars("short", 10), "short");
}
