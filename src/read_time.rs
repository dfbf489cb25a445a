use lazy_static::lazy_static;
use regex::Regex;

/// Reading speed used when a post does not state its own read time.
pub const DEFAULT_CHARS_PER_MINUTE: usize = 600;

const MINUTE_SUFFIX: &str = "분";

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"(?s)```.*?```").unwrap();
    static ref INLINE_CODE: Regex = Regex::new(r"`[^`]+`").unwrap();
    static ref HEADER_MARK: Regex = Regex::new(r"(?m)^#{1,6}\s+").unwrap();
    static ref EMPHASIS_MARK: Regex = Regex::new(r"\*\*|__|\*|_|~~").unwrap();
    static ref IMAGE: Regex = Regex::new(r"!\[.*?\]\(.*?\)").unwrap();
    static ref LINK: Regex = Regex::new(r"\[.*?\]\(.*?\)").unwrap();
    static ref QUOTE_MARK: Regex = Regex::new(r">\s?").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Counts the characters a reader actually reads: code, markup, link targets
/// and whitespace are not counted.
pub fn visible_char_count(markdown: &str) -> usize {
    let text = CODE_FENCE.replace_all(markdown, "");
    let text = INLINE_CODE.replace_all(&text, "");
    let text = HEADER_MARK.replace_all(&text, "");
    let text = EMPHASIS_MARK.replace_all(&text, "");
    let text = IMAGE.replace_all(&text, "");
    let text = LINK.replace_all(&text, "");
    let text = QUOTE_MARK.replace_all(&text, "");
    let text = WHITESPACE.replace_all(&text, "");
    text.chars().count()
}

/// Estimated reading time such as `3분`. Never less than one minute.
pub fn estimate_read_time(markdown: &str, chars_per_minute: usize) -> String {
    let cpm = if chars_per_minute == 0 { DEFAULT_CHARS_PER_MINUTE } else { chars_per_minute };
    let minutes = visible_char_count(markdown).div_ceil(cpm).max(1);
    format!("{}{}", minutes, MINUTE_SUFFIX)
}
