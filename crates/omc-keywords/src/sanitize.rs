//! Strips quoted material from a prompt before keyword matching, so an
//! example embedded in a fenced code block doesn't trigger a false
//! positive on the word "ralph".

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FENCED_CODE_RE: Regex = Regex::new(r"(?s)```.*?```").unwrap();
    static ref INLINE_CODE_RE: Regex = Regex::new(r"`[^`\n]*`").unwrap();
    static ref PAIRED_TAG_RE: Regex = Regex::new(r"(?si)<([a-zA-Z][\w-]*)\b[^>]*>.*?</\1\s*>").unwrap();
    static ref SELF_CLOSING_TAG_RE: Regex = Regex::new(r"<[a-zA-Z][\w-]*\b[^>]*/>").unwrap();
    static ref URL_RE: Regex = Regex::new(r"https?://\S+").unwrap();
    static ref FILE_PATH_RE: Regex = Regex::new(r"\S+/\S+\.\w+").unwrap();
}

/// Strips fenced/inline code, paired and self-closing XML tags, URLs, and
/// file-path-like tokens, in that order, replacing each match with a
/// single space so word boundaries survive.
pub fn sanitize(prompt: &str) -> String {
    let mut text = prompt.to_string();
    text = FENCED_CODE_RE.replace_all(&text, " ").into_owned();
    text = PAIRED_TAG_RE.replace_all(&text, " ").into_owned();
    text = SELF_CLOSING_TAG_RE.replace_all(&text, " ").into_owned();
    text = INLINE_CODE_RE.replace_all(&text, " ").into_owned();
    text = URL_RE.replace_all(&text, " ").into_owned();
    text = FILE_PATH_RE.replace_all(&text, " ").into_owned();
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_fenced_code() {
        let out = sanitize("do this\n```\nralph fix it\n```\nplease");
        assert!(!out.contains("ralph"));
    }

    #[test]
    fn test_sanitize_strips_inline_code() {
        let out = sanitize("run `ralph` now");
        assert!(!out.contains("ralph"));
    }

    #[test]
    fn test_sanitize_strips_xml_tags() {
        let out = sanitize("<example>ralph mode</example> but do autopilot");
        assert!(!out.contains("ralph"));
        assert!(out.contains("autopilot"));
    }

    #[test]
    fn test_sanitize_strips_urls() {
        let out = sanitize("see https://example.com/ralph-docs for info");
        assert!(!out.contains("ralph"));
    }

    #[test]
    fn test_sanitize_strips_file_paths() {
        let out = sanitize("look at src/ralph/runner.ts closely");
        assert!(!out.contains("ralph"));
    }

    #[test]
    fn test_sanitize_preserves_plain_keyword() {
        let out = sanitize("please run ralph on this");
        assert!(out.contains("ralph"));
    }
}
