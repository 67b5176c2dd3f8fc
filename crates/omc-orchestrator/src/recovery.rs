//! Token-limit recovery (spec.md §4.11): detect a host error caused by
//! hitting a token/context limit, distinguish it from an unrelated
//! "thinking block" structure error, and bound retries per session.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAX_RETRIES: u32 = 3;
const TTL_MS: i64 = 5 * 60 * 1000;

lazy_static! {
    static ref TOKEN_LIMIT_RE: Regex = Regex::new(
        r"(?i)(token limit|max_tokens|maximum context length|context_length_exceeded|context window|too many tokens|exceeds the model's maximum|input is too long|prompt is too long)"
    ).unwrap();

    // A structural complaint about thinking blocks can mention "tokens" in
    // passing; it is never itself a token-limit condition.
    static ref THINKING_BLOCK_RE: Regex = Regex::new(
        r"(?i)(thinking block|redacted_thinking|expected .?thinking.? (or|but))"
    ).unwrap();

    static ref TOKEN_COUNT_RE: Regex = Regex::new(r"(\d{2,7})\s*/\s*(\d{2,7})\s*tokens").unwrap();
}

/// Fields pulled from the host's error object; any may be absent.
#[derive(Debug, Clone, Default)]
pub struct HostErrorFields<'a> {
    pub message: Option<&'a str>,
    pub response_body: Option<&'a str>,
    pub nested_error_message: Option<&'a str>,
    pub reason: Option<&'a str>,
    pub description: Option<&'a str>,
    pub raw: Option<&'a Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenLimitInfo {
    pub current_tokens: Option<u64>,
    pub max_tokens: Option<u64>,
}

fn all_text(fields: &HostErrorFields) -> String {
    let mut parts: Vec<String> = vec![
        fields.message.unwrap_or("").to_string(),
        fields.response_body.unwrap_or("").to_string(),
        fields.nested_error_message.unwrap_or("").to_string(),
        fields.reason.unwrap_or("").to_string(),
        fields.description.unwrap_or("").to_string(),
    ];
    if let Some(raw) = fields.raw {
        parts.push(raw.to_string());
    }
    parts.join("\n")
}

/// Inspects every textual field for a token-limit signature. Returns
/// `None` if the error is a thinking-block structure error (even if it
/// happens to mention tokens) or if no signature matches anywhere.
pub fn detect_token_limit_error(fields: &HostErrorFields) -> Option<TokenLimitInfo> {
    let text = all_text(fields);
    if THINKING_BLOCK_RE.is_match(&text) {
        return None;
    }
    if !TOKEN_LIMIT_RE.is_match(&text) {
        return None;
    }

    let counts = TOKEN_COUNT_RE.captures(&text).map(|c| {
        let current = c.get(1).and_then(|m| m.as_str().parse().ok());
        let max = c.get(2).and_then(|m| m.as_str().parse().ok());
        (current, max)
    });

    Some(TokenLimitInfo {
        current_tokens: counts.and_then(|(c, _)| c),
        max_tokens: counts.and_then(|(_, m)| m),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RetryCounter {
    count: u32,
    updated_at: DateTime<Utc>,
}

fn is_expired(updated_at: DateTime<Utc>) -> bool {
    (Utc::now() - updated_at).num_milliseconds() >= TTL_MS
}

pub fn recovery_counter_path(omc_root: &Path, session_id: &str) -> PathBuf {
    omc_root.join(format!("recovery-{session_id}.json"))
}

/// Increments the per-session retry counter; returns `None` once the cap
/// is reached (caller should give up rather than retry again).
pub fn try_increment_retry(path: &Path) -> Option<u32> {
    let previous = match omc_store::read_json::<RetryCounter>(path) {
        Some(c) if !is_expired(c.updated_at) => c.count,
        _ => 0,
    };
    if previous >= MAX_RETRIES {
        return None;
    }
    let counter = RetryCounter { count: previous + 1, updated_at: Utc::now() };
    let _ = omc_store::write_json_atomic(path, &counter);
    Some(counter.count)
}

/// Builds the advisory message the bridge injects into context.
pub fn format_recovery_message(info: &TokenLimitInfo, attempt: u32) -> String {
    match (info.current_tokens, info.max_tokens) {
        (Some(current), Some(max)) => format!(
            "[OMC] Hit the model's token limit ({current}/{max} tokens). Retry {attempt}/{MAX_RETRIES}: shorten the request or run /compact first."
        ),
        _ => format!(
            "[OMC] Hit the model's token limit. Retry {attempt}/{MAX_RETRIES}: shorten the request or run /compact first."
        ),
    }
}
