// Text normalization.
//
// Posts arrive with links, emoji, hashtags and full-width punctuation mixed
// into the prose. Everything downstream (segmentation, keyword matching,
// sentiment) works on the cleaned form produced here.

use std::sync::OnceLock;

use regex_lite::Regex;

fn url_scheme() -> &'static Regex {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    SCHEME.get_or_init(|| Regex::new(r"https?://").expect("URL scheme pattern is valid"))
}

/// Remove every `http(s)://` link. A link runs to the next Unicode
/// whitespace character, so a full-width space after it ends the link.
/// A bare scheme with nothing after it is left in place.
fn strip_urls(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(scheme) = url_scheme().find(rest) {
        out.push_str(&rest[..scheme.start()]);
        let tail = &rest[scheme.end()..];
        let end = tail.find(char::is_whitespace).unwrap_or(tail.len());
        if end == 0 {
            out.push_str(scheme.as_str());
        }
        rest = &tail[end..];
    }
    out.push_str(rest);
    out
}

/// CJK Unified Ideographs block as matched by the cleanup rule.
fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

fn is_kept(c: char) -> bool {
    is_cjk_ideograph(c) || c.is_ascii_alphanumeric() || c.is_whitespace()
}

/// Normalize a single piece of text.
///
/// Removes URLs, drops every character that is not a CJK ideograph, an ASCII
/// letter or digit, or whitespace, then collapses whitespace runs into a
/// single space and trims. Never fails; empty input yields an empty string.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let without_urls = strip_urls(text);
    let kept: String = without_urls.chars().filter(|c| is_kept(*c)).collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a post's title and body as one text.
pub fn normalize_post(title: &str, body: &str) -> String {
    normalize(&format!("{title} {body}"))
}
