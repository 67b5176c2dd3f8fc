//! Prompt sanitization, task-size classification, and keyword detection
//! for user-prompt-submit handling.

pub mod detector;
pub mod sanitize;
pub mod size;

pub use detector::{
    apply_ralplan_gate, apply_size_guard, get_all_keywords, get_all_keywords_with_size_check,
    is_underspecified_for_execution, FeatureFlags, Keyword, KeywordResult,
};
pub use sanitize::sanitize;
pub use size::{classify_task_size, count_words, is_heavy_mode, SizeReason, SizeThresholds, TaskSize, TaskSizeResult, HEAVY_MODES};
