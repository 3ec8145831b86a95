// Sentiment scoring: trait-based abstraction for swappable scorers.
//
// The SentimentScorer trait defines the interface. LexiconScorer is the
// built-in implementation; a model-backed scorer can replace it without
// touching the classifier. Scorer failures never reach the classifier:
// `assess` turns them into an explicit Defaulted outcome.

pub mod lexicon;
pub mod traits;
