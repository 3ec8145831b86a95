// Colored terminal output for batch summaries, single classifications and
// the review queue. main.rs delegates all terminal formatting here.

use std::path::Path;

use colored::{ColoredString, Colorize};

use super::truncate_chars;
use crate::pipeline::batch::BatchStats;
use crate::sentiment::traits::{SentimentLabel, SentimentSource};
use crate::store::models::{ClassificationResult, LogRecord, Verification};

/// Print the aggregate counts of a batch run.
pub fn display_batch_summary(stats: &BatchStats, output: &Path) {
    println!("\n{}", "=== Batch complete ===".bold());
    println!("  Posts classified: {}", stats.total);
    println!(
        "  Risk posts:       {} ({:.2}%)",
        stats.risk_count.to_string().red().bold(),
        stats.risk_percentage()
    );
    println!(
        "  Sentiment:        {} positive, {} neutral, {} negative",
        stats.positive.to_string().green(),
        stats.neutral,
        stats.negative.to_string().red(),
    );
    if stats.defaulted > 0 {
        println!(
            "  {}",
            format!("{} posts fell back to neutral sentiment", stats.defaulted).dimmed()
        );
    }
    if stats.skipped > 0 {
        println!(
            "  {}",
            format!("{} entries skipped (no usable text)", stats.skipped).dimmed()
        );
    }
    println!("  Output file:      {}", output.display());
}

/// Print one classification, with the keywords that matched.
pub fn display_classification(result: &ClassificationResult, matched: &[&str]) {
    let verdict = if result.is_risk {
        "RISK".red().bold()
    } else {
        "ok".green()
    };
    println!("\n{} {}", "Verdict:".bold(), verdict);
    println!(
        "  Sentiment: {} ({:.3}{})",
        colorize_label(result.sentiment_label),
        result.sentiment_score,
        if result.sentiment_source == SentimentSource::Defaulted {
            ", defaulted"
        } else {
            ""
        }
    );
    if matched.is_empty() {
        println!("  Keywords:  {}", "none".dimmed());
    } else {
        println!("  Keywords:  {}", matched.join(", ").yellow());
    }
    println!(
        "  Posted:    {} ({})",
        result.parsed_time.as_deref().unwrap_or("unknown"),
        if result.is_recent { "recent" } else { "outside window" }
    );
    println!("  Text:      {}", truncate_chars(&result.cleaned_text, 120).dimmed());
}

/// Print the review queue.
pub fn display_review_list(records: &[LogRecord]) {
    if records.is_empty() {
        println!("No risk events awaiting review.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Risk events ({}) ===", records.len()).bold()
    );
    println!();

    for record in records {
        let title = if record.post.title.is_empty() {
            truncate_chars(&record.classification.cleaned_text, 40)
        } else {
            truncate_chars(&record.post.title, 40)
        };
        println!(
            "  {} {}  {}",
            colorize_verification(record.human_verified),
            record.id.dimmed(),
            title,
        );
        println!(
            "      {} · {} · {}",
            colorize_label(record.classification.sentiment_label),
            record.classification.parsed_time.as_deref().unwrap_or("unknown time"),
            if record.post.url.is_empty() {
                "(no url)"
            } else {
                record.post.url.as_str()
            },
        );
    }

    let confirmed = records
        .iter()
        .filter(|r| r.human_verified == Verification::Confirmed)
        .count();
    println!();
    println!(
        "  {} confirmed, {} pending",
        confirmed,
        records.len() - confirmed
    );
}

fn colorize_label(label: SentimentLabel) -> ColoredString {
    match label {
        SentimentLabel::Positive => label.as_str().green(),
        SentimentLabel::Neutral => label.as_str().normal(),
        SentimentLabel::Negative => label.as_str().red(),
    }
}

fn colorize_verification(state: Verification) -> ColoredString {
    match state {
        Verification::Unset => "[pending]  ".yellow(),
        Verification::Confirmed => "[confirmed]".red().bold(),
        Verification::Rejected => "[rejected] ".dimmed(),
    }
}
