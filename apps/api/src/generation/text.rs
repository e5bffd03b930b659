//! Plain-text views over generated HTML. Tags are never counted as words.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static SENTENCE_END_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("valid sentence regex"));

/// Replaces every tag with a space and collapses whitespace runs.
pub fn strip_html(html: &str) -> String {
    TAG_REGEX
        .replace_all(html, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits plain text on runs of `.`, `!` or `?`, dropping blank segments.
pub fn sentences(text: &str) -> Vec<&str> {
    SENTENCE_END_REGEX
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Whitespace-delimited token count of the raw content, markup included.
///
/// This over-counts when tags sit between spaces; the length thresholds in
/// scoring are calibrated against this measure.
pub fn raw_word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_removes_tags_and_collapses_space() {
        let html = "<h2>Title</h2>\n<p>One <strong>two</strong>   three.</p>";
        assert_eq!(strip_html(html), "Title One two three.");
    }

    #[test]
    fn test_strip_html_separates_adjacent_blocks() {
        assert_eq!(strip_html("<p>a</p><p>b</p>"), "a b");
    }

    #[test]
    fn test_sentences_split_on_terminator_runs() {
        let s = sentences("First one. Second?! Third... ");
        assert_eq!(s, vec!["First one", "Second", "Third"]);
    }

    #[test]
    fn test_sentences_of_empty_text() {
        assert!(sentences("").is_empty());
        assert!(sentences(" ... ").is_empty());
    }

    #[test]
    fn test_raw_word_count_counts_tag_tokens() {
        // "<p>" glued to a word is one token; a free-standing tag is its own token.
        assert_eq!(raw_word_count("<p>Hello world</p>"), 2);
        assert_eq!(raw_word_count("<ul> <li>a</li> </ul>"), 3);
        assert_eq!(raw_word_count(""), 0);
    }
}
