// Dictionary segmenter: forward maximum matching over a word list.
//
// Runs of ASCII letters/digits become one token each. Runs of CJK text are
// cut greedily: at each position the longest dictionary word wins, and a
// character with no dictionary match becomes a single-character token.

use std::collections::HashSet;

use anyhow::Result;

use super::keywords::DEFAULT_KEYWORDS;
use super::traits::Tokenizer;
use crate::sentiment::lexicon::{NEGATIVE_WORDS, POSITIVE_WORDS};

/// Everyday words that would otherwise be glued to neighbouring keywords.
const COMMON_WORDS: &[&str] = &[
    "我们", "你们", "他们", "大家", "这次", "这个", "那个", "什么", "怎么", "为什么", "没有",
    "已经", "还是", "可以", "不能", "真的", "非常", "活动", "产品", "客服", "商家", "店铺",
    "售后", "退款", "质量", "价格", "服务", "消费者", "平台", "官方", "回复", "处理", "今天",
    "昨天", "现在", "时候", "朋友", "视频", "评论", "分享", "推荐", "体验", "东西", "快递",
];

pub struct DictionarySegmenter {
    words: HashSet<String>,
    /// Length in chars of the longest dictionary word
    max_word_chars: usize,
}

impl DictionarySegmenter {
    /// Build a segmenter from an explicit word list. Blank entries are ignored.
    pub fn with_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: HashSet<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        let max_word_chars = words.iter().map(|w| w.chars().count()).max().unwrap_or(0);
        Self {
            words,
            max_word_chars,
        }
    }

    /// Add extra words, e.g. deployment-specific keywords.
    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            let word = word.as_ref().trim();
            if word.is_empty() {
                continue;
            }
            self.max_word_chars = self.max_word_chars.max(word.chars().count());
            self.words.insert(word.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Cut a run of non-ASCII characters by forward maximum matching.
    fn cut_cjk(&self, run: &[char], tokens: &mut HashSet<String>) {
        let mut i = 0;
        while i < run.len() {
            let longest = self.max_word_chars.min(run.len() - i);
            let mut taken = 1;
            for len in (2..=longest).rev() {
                let candidate: String = run[i..i + len].iter().collect();
                if self.words.contains(&candidate) {
                    taken = len;
                    break;
                }
            }
            tokens.insert(run[i..i + taken].iter().collect());
            i += taken;
        }
    }
}

impl Default for DictionarySegmenter {
    fn default() -> Self {
        let words = DEFAULT_KEYWORDS
            .iter()
            .chain(POSITIVE_WORDS)
            .chain(NEGATIVE_WORDS)
            .chain(COMMON_WORDS);
        Self::with_words(words)
    }
}

impl Tokenizer for DictionarySegmenter {
    fn segment(&self, text: &str) -> Result<HashSet<String>> {
        if self.words.is_empty() {
            anyhow::bail!("Segmenter dictionary is empty");
        }

        let mut tokens = HashSet::new();
        for chunk in text.split_whitespace() {
            let chars: Vec<char> = chunk.chars().collect();
            let mut start = 0;
            while start < chars.len() {
                let ascii = chars[start].is_ascii_alphanumeric();
                let mut end = start + 1;
                while end < chars.len() && chars[end].is_ascii_alphanumeric() == ascii {
                    end += 1;
                }
                if ascii {
                    tokens.insert(chars[start..end].iter().collect());
                } else {
                    self.cut_cjk(&chars[start..end], &mut tokens);
                }
                start = end;
            }
        }

        Ok(tokens)
    }
}
