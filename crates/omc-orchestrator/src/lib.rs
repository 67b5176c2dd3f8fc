//! Orchestrator pre/post-tool hooks and recovery (spec.md §4.10, §4.11):
//! delegation guard, shell command safety, remember-tag capture, boulder
//! progress reminders, and token-limit recovery.

pub mod allowlist;
pub mod audit;
pub mod notepad;
pub mod posttool;
pub mod pretool;
pub mod recovery;
pub mod shell_safety;

pub use posttool::{check_boulder_continuation, process_post_tool};
pub use pretool::{process_pre_tool, PreToolDecision, PreToolInput};
pub use recovery::{detect_token_limit_error, format_recovery_message, try_increment_retry, HostErrorFields, TokenLimitInfo};
