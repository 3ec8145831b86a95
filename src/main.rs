use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;
use tracing::info;

use yuqing::config::Config;
use yuqing::ingest::har::{default_output_path, HarExtractor};
use yuqing::ingest::note_card::NoteCard;
use yuqing::store::{EventLog, LogRecord, Verdict, VerificationStore};

/// Yuqing: public-opinion risk monitoring for social media posts.
///
/// Flags posts that are negative, mention a risk keyword, and were
/// published recently, and keeps a reviewable log of them.
#[derive(Parser)]
#[command(name = "yuqing", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a JSON array of posts and write the risky ones to a file
    Analyze {
        /// Input JSON array (e.g. the output of `yuqing extract`)
        #[arg(short, long, default_value = "yq_monitor.json")]
        input: PathBuf,

        /// Where to write the flagged posts
        #[arg(short, long, default_value = "yuqing_posts.json")]
        output: PathBuf,

        /// Recency window in days (overrides YUQING_WINDOW_DAYS)
        #[arg(short, long)]
        days: Option<u32>,

        /// Positive sentiment threshold (default: 0.6)
        #[arg(long)]
        pos: Option<f64>,

        /// Negative sentiment threshold (default: 0.4)
        #[arg(long)]
        neg: Option<f64>,

        /// Skip sentiment scoring; every post is treated as neutral
        #[arg(long)]
        keywords_only: bool,
    },

    /// Classify a single post and log it if it is a risk event
    Classify {
        /// JSON file holding a note card (or a feed response with items[])
        file: PathBuf,

        /// Source URL, used when the post carries none
        #[arg(long, default_value = "")]
        url: String,

        /// Recency window in days (overrides YUQING_WINDOW_DAYS)
        #[arg(short, long)]
        days: Option<u32>,

        /// Print the verdict without writing to the event log
        #[arg(long)]
        no_log: bool,
    },

    /// List logged risk events that have not been rejected
    Review {
        /// Include rejected events as well
        #[arg(long)]
        all: bool,
    },

    /// Confirm or reject a logged risk event
    Verify {
        /// Record id (as shown by `yuqing review`)
        id: Option<String>,

        /// Apply to every record with this source URL instead
        #[arg(long, conflicts_with = "id")]
        url: Option<String>,

        /// Mark as not a risk (default is to confirm)
        #[arg(long)]
        reject: bool,
    },

    /// Extract note cards from a browser HAR capture
    Extract {
        /// The .har file to read
        har: PathBuf,

        /// Output file (default: <har name>_content.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the JSON API for the browser extension
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (overrides YUQING_PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (overrides YUQING_BIND)
        #[arg(long)]
        bind: Option<String>,

        /// Recency window in days (overrides YUQING_WINDOW_DAYS)
        #[arg(short, long)]
        days: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("yuqing=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            output,
            days,
            pos,
            neg,
            keywords_only,
        } => {
            let config = Config::load()?;
            let settings = config.classifier_settings(days, pos, neg)?;
            let classifier = config.build_classifier(settings, keywords_only)?;

            println!(
                "Classifying {} (window: {} days, thresholds: {}/{})...",
                input.display(),
                settings.window_days,
                settings.pos_thresh,
                settings.neg_thresh,
            );

            let stats = yuqing::pipeline::batch::run_file(&classifier, &input, &output)?;
            yuqing::output::terminal::display_batch_summary(&stats, &output);
        }

        Commands::Classify {
            file,
            url,
            days,
            no_log,
        } => {
            let config = Config::load()?;
            let settings = config.classifier_settings(days, None, None)?;
            let classifier = config.build_classifier(settings, false)?;

            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let value: Value = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not valid JSON", file.display()))?;
            let card = locate_note_card(&value)
                .with_context(|| format!("No note card found in {}", file.display()))?;

            let post = card.to_post(&url);
            let result = classifier.classify(&post);
            let matched = classifier.matcher().matched_keywords(&result.cleaned_text);
            yuqing::output::terminal::display_classification(&result, &matched);

            if result.is_risk && !no_log {
                let log = EventLog::new(&config.log_path);
                let record = LogRecord::new(post, result);
                log.append(&record)?;
                println!(
                    "\nLogged as {} in {}",
                    record.id.bold(),
                    config.log_path.display()
                );
            }
        }

        Commands::Review { all } => {
            let config = Config::load()?;
            let records = if all {
                EventLog::new(&config.log_path).list_all(None)?
            } else {
                VerificationStore::new(&config.log_path).list_pending_or_confirmed()?
            };
            yuqing::output::terminal::display_review_list(&records);
        }

        Commands::Verify { id, url, reject } => {
            let config = Config::load()?;
            let store = VerificationStore::new(&config.log_path);
            let verdict = Verdict::from(!reject);

            let outcome = match (id, url) {
                (Some(id), _) => store.update_by_id(&id, verdict),
                (None, Some(url)) => store.update_by_url(&url, verdict),
                (None, None) => anyhow::bail!("Pass a record id or --url <url>"),
            };

            if let Some(error) = outcome.error {
                anyhow::bail!("Verification failed: {error}");
            }
            if outcome.updated == 0 {
                println!("{}", "No matching records found.".yellow());
            } else {
                println!(
                    "Marked {} record(s) as {}.",
                    outcome.updated,
                    if reject { "rejected" } else { "confirmed" }
                );
            }
        }

        Commands::Extract { har, output } => {
            let config = Config::load()?;
            let gate = yuqing::temporal::TemporalGate::with_offset_hours(config.tz_offset_hours)?;
            let extractor = HarExtractor::new(gate.offset());

            let notes = extractor.extract_file(&har)?;
            let output = output.unwrap_or_else(|| default_output_path(&har));
            std::fs::write(&output, serde_json::to_string_pretty(&notes)?)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(count = notes.len(), output = %output.display(), "Wrote extracted note cards");

            println!(
                "Extracted {} note cards to {}",
                notes.len().to_string().bold(),
                output.display()
            );
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind, days } => {
            let config = Config::load()?;
            let settings = config.classifier_settings(days, None, None)?;
            let classifier = config.build_classifier(settings, false)?;

            let bind = bind.unwrap_or_else(|| config.bind.clone());
            let port = port.unwrap_or(config.port);
            info!(
                log = %config.log_path.display(),
                window_days = settings.window_days,
                "Starting web server"
            );

            let state = yuqing::web::AppState::new(classifier, EventLog::new(&config.log_path));
            yuqing::web::run_server(state, &bind, port).await?;
        }
    }

    Ok(())
}

/// Find the note card in a single-post JSON file. Accepts a feed response
/// (`items[0].note_card`, optionally under `data`), a `{ "note_card": .. }`
/// wrapper, or a bare note card.
fn locate_note_card(value: &Value) -> Option<NoteCard> {
    let candidate = value
        .pointer("/items/0/note_card")
        .or_else(|| value.pointer("/data/items/0/note_card"))
        .or_else(|| value.get("note_card"))
        .unwrap_or(value);
    NoteCard::from_value(candidate)
}
