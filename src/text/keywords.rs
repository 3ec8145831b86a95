// Risk-keyword matching.
//
// Two passes: exact token matches after segmentation, then a plain substring
// scan over the normalized text. The substring pass is a superset check that
// catches keywords the segmenter cut across token boundaries.

use std::collections::HashSet;

use tracing::debug;

use super::traits::{Tokenizer, WhitespaceTokenizer};

/// Complaint / exposure / crisis / anger vocabulary used when no keyword
/// list is configured.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "投诉", "失望", "问题", "曝光", "维权", "负面", "危机", "事件", "不满", "愤怒",
];

pub struct KeywordMatcher {
    keywords: Vec<String>,
    tokenizer: Box<dyn Tokenizer>,
}

impl KeywordMatcher {
    /// Create a matcher over an ordered keyword list. Blank entries are
    /// dropped, since an empty keyword would match every text.
    pub fn new(keywords: Vec<String>, tokenizer: Box<dyn Tokenizer>) -> Self {
        let keywords = keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            keywords,
            tokenizer,
        }
    }

    /// Matcher over [`DEFAULT_KEYWORDS`].
    pub fn with_default_keywords(tokenizer: Box<dyn Tokenizer>) -> Self {
        Self::new(
            DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            tokenizer,
        )
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Segment `text`, falling back to whitespace splitting if the
    /// tokenizer fails.
    pub fn tokens(&self, text: &str) -> HashSet<String> {
        match self.tokenizer.segment(text) {
            Ok(tokens) => tokens,
            Err(e) => {
                debug!(error = %e, "Segmentation failed, falling back to whitespace split");
                WhitespaceTokenizer.segment(text).unwrap_or_default()
            }
        }
    }

    /// Whether the normalized text contains any risk keyword.
    pub fn has_keywords(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let tokens = self.tokens(text);
        if self.keywords.iter().any(|kw| tokens.contains(kw)) {
            return true;
        }
        self.keywords.iter().any(|kw| text.contains(kw.as_str()))
    }

    /// The keywords present in `text`, in configured order.
    pub fn matched_keywords(&self, text: &str) -> Vec<&str> {
        if text.is_empty() {
            return Vec::new();
        }
        let tokens = self.tokens(text);
        self.keywords
            .iter()
            .filter(|kw| tokens.contains(*kw) || text.contains(kw.as_str()))
            .map(String::as_str)
            .collect()
    }
}
