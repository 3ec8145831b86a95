// Lexicon-based sentiment scorer.
//
// Counts polarity words and maps the counts to [0, 1] with add-one
// smoothing: (pos + 1) / (pos + neg + 2). Text with no polarity words
// scores exactly 0.5. Negative phrases are consumed before positives are
// counted, so "不满意" does not also count as "满意".

use anyhow::Result;

use super::traits::SentimentScorer;

pub const POSITIVE_WORDS: &[&str] = &[
    "满意", "喜欢", "推荐", "好用", "开心", "感谢", "点赞", "优秀", "惊喜", "值得", "超赞",
    "不错", "舒服", "放心", "靠谱", "好评", "good", "great", "love", "nice",
];

pub const NEGATIVE_WORDS: &[&str] = &[
    "不满意", "不推荐", "质量问题", "失望", "不满", "投诉", "维权", "愤怒", "生气", "垃圾",
    "骗子", "欺骗", "差评", "后悔", "恶心", "糟糕", "曝光", "难用", "不好", "危机", "bad",
    "terrible", "scam",
];

pub struct LexiconScorer {
    positive: Vec<String>,
    /// Sorted longest-first so compound phrases are consumed before their parts
    negative: Vec<String>,
}

impl LexiconScorer {
    pub fn new(positive: Vec<String>, mut negative: Vec<String>) -> Self {
        negative.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));
        Self { positive, negative }
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new(
            POSITIVE_WORDS.iter().map(|w| w.to_string()).collect(),
            NEGATIVE_WORDS.iter().map(|w| w.to_string()).collect(),
        )
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> Result<f64> {
        if text.trim().is_empty() {
            anyhow::bail!("Cannot score empty text");
        }

        let mut remaining = text.to_lowercase();
        let mut negative = 0usize;
        for word in &self.negative {
            let hits = remaining.matches(word.as_str()).count();
            if hits > 0 {
                negative += hits;
                remaining = remaining.replace(word.as_str(), " ");
            }
        }

        let positive: usize = self
            .positive
            .iter()
            .map(|w| remaining.matches(w.as_str()).count())
            .sum();

        Ok((positive as f64 + 1.0) / ((positive + negative) as f64 + 2.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_polarity_words_is_half() {
        let scorer = LexiconScorer::default();
        assert_eq!(scorer.score("今天去了公园").unwrap(), 0.5);
    }

    #[test]
    fn test_negative_text() {
        let scorer = LexiconScorer::default();
        // Two negative hits: (0 + 1) / (2 + 2)
        assert_eq!(scorer.score("这次活动很失望大家都在维权").unwrap(), 0.25);
    }

    #[test]
    fn test_negated_positive_counts_once() {
        let scorer = LexiconScorer::default();
        // "不满意" is negative only; "满意" must not be counted from inside it
        assert_eq!(scorer.score("服务不满意").unwrap(), 1.0 / 3.0);
    }

    #[test]
    fn test_positive_text() {
        let scorer = LexiconScorer::default();
        // Three positive hits: (3 + 1) / (3 + 2)
        assert_eq!(scorer.score("很喜欢 超赞 推荐").unwrap(), 0.8);
    }

    #[test]
    fn test_empty_text_fails() {
        assert!(LexiconScorer::default().score("  ").is_err());
    }
}
