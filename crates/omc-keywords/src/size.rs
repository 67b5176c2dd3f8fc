//! Task-size classifier (spec.md §4.6).

use lazy_static::lazy_static;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSize {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeReason {
    EscapeHatch,
    LargeSignal,
    SmallSignal,
    WordCount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSizeResult {
    pub size: TaskSize,
    pub reason: SizeReason,
    pub word_count: usize,
    pub has_escape_hatch: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SizeThresholds {
    pub small_word_limit: usize,
    pub large_word_limit: usize,
}

impl Default for SizeThresholds {
    fn default() -> Self {
        Self {
            small_word_limit: 50,
            large_word_limit: 200,
        }
    }
}

const ESCAPE_HATCH_PREFIXES: &[&str] = &[
    "quick:", "simple:", "tiny:", "minor:", "small:", "just:", "only:",
];

const LARGE_SIGNAL_PHRASES: &[&str] = &[
    "architecture",
    "refactor",
    "redesign",
    "entire codebase",
    "all files",
    "multiple files",
    "migrate",
    "from scratch",
    "end-to-end",
    "overhaul",
    "comprehensive",
];

const SMALL_SIGNAL_PHRASES: &[&str] = &[
    "typo",
    "spelling",
    "rename",
    "single file",
    "in this file",
    "this function",
    "minor fix",
    "quick fix",
    "whitespace",
    "indentation",
    "add a comment",
    "bump version",
];

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"\S+").unwrap();
}

/// Number of maximal non-whitespace runs. `0` iff the trimmed input is
/// empty.
pub fn count_words(s: &str) -> usize {
    WORD_RE.find_iter(s).count()
}

fn has_escape_hatch(trimmed_lower: &str) -> bool {
    ESCAPE_HATCH_PREFIXES
        .iter()
        .any(|p| trimmed_lower.starts_with(p))
}

/// Classifies `text` by decision order: escape hatch, large-signal
/// phrase, small-signal phrase, then raw word count against the
/// thresholds.
pub fn classify_task_size(text: &str, thresholds: SizeThresholds) -> TaskSizeResult {
    let trimmed = text.trim();
    let lower = trimmed.to_ascii_lowercase();
    let escape_hatch = has_escape_hatch(&lower);
    let word_count = count_words(text);

    if escape_hatch {
        return TaskSizeResult {
            size: TaskSize::Small,
            reason: SizeReason::EscapeHatch,
            word_count,
            has_escape_hatch: true,
        };
    }

    if LARGE_SIGNAL_PHRASES.iter().any(|p| lower.contains(p)) {
        return TaskSizeResult {
            size: TaskSize::Large,
            reason: SizeReason::LargeSignal,
            word_count,
            has_escape_hatch: false,
        };
    }

    if SMALL_SIGNAL_PHRASES.iter().any(|p| lower.contains(p)) {
        return TaskSizeResult {
            size: TaskSize::Small,
            reason: SizeReason::SmallSignal,
            word_count,
            has_escape_hatch: false,
        };
    }

    let size = if word_count <= thresholds.small_word_limit {
        TaskSize::Small
    } else if word_count >= thresholds.large_word_limit {
        TaskSize::Large
    } else {
        TaskSize::Medium
    };

    TaskSizeResult {
        size,
        reason: SizeReason::WordCount,
        word_count,
        has_escape_hatch: false,
    }
}

/// Heavy modes are suppressed for small tasks and route underspecified
/// prompts through ralplan.
pub const HEAVY_MODES: &[&str] = &[
    "ralph",
    "autopilot",
    "team",
    "ultrawork",
    "ultrapilot",
    "swarm",
    "pipeline",
    "ralplan",
    "ccg",
];

pub fn is_heavy_mode(keyword: &str) -> bool {
    HEAVY_MODES.contains(&keyword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_hatch_wins_over_large_signal() {
        let result = classify_task_size("quick: refactor the entire codebase", SizeThresholds::default());
        assert_eq!(result.size, TaskSize::Small);
        assert_eq!(result.reason, SizeReason::EscapeHatch);
        assert!(result.has_escape_hatch);
    }

    #[test]
    fn test_large_signal_phrase() {
        let result = classify_task_size("please refactor this module", SizeThresholds::default());
        assert_eq!(result.size, TaskSize::Large);
        assert_eq!(result.reason, SizeReason::LargeSignal);
    }

    #[test]
    fn test_small_signal_phrase() {
        let result = classify_task_size("fix this typo in the readme", SizeThresholds::default());
        assert_eq!(result.size, TaskSize::Small);
        assert_eq!(result.reason, SizeReason::SmallSignal);
    }

    #[test]
    fn test_word_count_small() {
        let result = classify_task_size("fix it", SizeThresholds::default());
        assert_eq!(result.size, TaskSize::Small);
        assert_eq!(result.reason, SizeReason::WordCount);
    }

    #[test]
    fn test_word_count_large() {
        let long_text = "word ".repeat(250);
        let result = classify_task_size(&long_text, SizeThresholds::default());
        assert_eq!(result.size, TaskSize::Large);
    }

    #[test]
    fn test_word_count_medium() {
        let text = "word ".repeat(100);
        let result = classify_task_size(&text, SizeThresholds::default());
        assert_eq!(result.size, TaskSize::Medium);
    }

    #[test]
    fn test_count_words_empty_is_zero() {
        assert_eq!(count_words("   "), 0);
        assert_eq!(count_words(""), 0);
    }

    #[test]
    fn test_count_words_counts_runs() {
        assert_eq!(count_words("one   two\tthree\nfour"), 4);
    }

    #[test]
    fn test_is_heavy_mode() {
        assert!(is_heavy_mode("ralph"));
        assert!(is_heavy_mode("ccg"));
        assert!(!is_heavy_mode("cancel"));
        assert!(!is_heavy_mode("analyze"));
    }
}
