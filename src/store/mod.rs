// Event storage: the JSON Lines risk log and its verification overlay.
//
// The log file lives wherever YUQING_LOG_PATH points (defaults to
// ./yuqing_log.jsonl). A sibling `.lock` file serializes writers across
// threads and processes.

pub mod event_log;
pub mod lock;
pub mod models;
pub mod verification;

pub use event_log::EventLog;
pub use models::{ClassificationResult, LogRecord, Post, Verdict, Verification};
pub use verification::{UpdateOutcome, VerificationStore};
