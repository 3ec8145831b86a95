// Tokenizer trait: the swap-ready segmentation abstraction.
//
// Unspaced Chinese text has to be segmented before tokens can be compared
// with keywords. The default implementation is a dictionary segmenter; a
// heavier statistical segmenter can be dropped in behind this trait.

use std::collections::HashSet;

use anyhow::Result;

/// Splits text into a set of word-like tokens.
pub trait Tokenizer: Send + Sync {
    /// Segment a piece of normalized text. May fail for unsupported input.
    fn segment(&self, text: &str) -> Result<HashSet<String>>;
}

/// Splits on whitespace only. Used as the fallback when segmentation fails.
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn segment(&self, text: &str) -> Result<HashSet<String>> {
        Ok(text.split_whitespace().map(str::to_string).collect())
    }
}
