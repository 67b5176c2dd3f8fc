//! Hook event kinds and canonical-key normalization.

use std::collections::HashMap;
use serde_json::Value;

/// The host lifecycle events the bridge may be invoked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    UserPromptSubmit,
    PreToolUse,
    PostToolUse,
    Stop,
    SessionEnd,
}

impl HookEvent {
    /// Parses the `hookType`/`hook_event_name` discriminant the host sends.
    /// Accepts both the canonical camelCase name and its snake_case form.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "UserPromptSubmit" | "user_prompt_submit" => Some(Self::UserPromptSubmit),
            "PreToolUse" | "pre_tool_use" => Some(Self::PreToolUse),
            "PostToolUse" | "post_tool_use" => Some(Self::PostToolUse),
            "Stop" | "stop" => Some(Self::Stop),
            "SessionEnd" | "session_end" => Some(Self::SessionEnd),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserPromptSubmit => "UserPromptSubmit",
            Self::PreToolUse => "PreToolUse",
            Self::PostToolUse => "PostToolUse",
            Self::Stop => "Stop",
            Self::SessionEnd => "SessionEnd",
        }
    }
}

/// Maps both snake_case and camelCase spellings of a field onto one
/// canonical camelCase key. The normalizer is the single place that
/// accepts both forms; every downstream consumer sees only the canonical
/// shape.
const KEY_ALIASES: &[(&str, &str)] = &[
    ("session_id", "sessionId"),
    ("sessionId", "sessionId"),
    ("cwd", "cwd"),
    ("directory", "cwd"),
    ("transcript_path", "transcriptPath"),
    ("transcriptPath", "transcriptPath"),
    ("prompt", "prompt"),
    ("tool_name", "toolName"),
    ("toolName", "toolName"),
    ("tool_input", "toolInput"),
    ("toolInput", "toolInput"),
    ("tool_output", "toolOutput"),
    ("toolOutput", "toolOutput"),
    ("stop_reason", "stopReason"),
    ("stopReason", "stopReason"),
    ("user_requested", "userRequested"),
    ("userRequested", "userRequested"),
    ("end_turn_reason", "endTurnReason"),
    ("endTurnReason", "endTurnReason"),
    ("parent_session_id", "parentSessionId"),
    ("parentSessionId", "parentSessionId"),
    ("hook_event_name", "hookEventName"),
    ("hookEventName", "hookEventName"),
];

/// Normalizes the raw stdin object's keys to their canonical camelCase
/// form. Unrecognized keys pass through unchanged so forward-compatible
/// fields are not silently dropped.
pub fn normalize_keys(raw: &Value) -> HashMap<String, Value> {
    let mut out = HashMap::new();
    let Some(obj) = raw.as_object() else {
        return out;
    };
    for (key, value) in obj {
        let canonical = KEY_ALIASES
            .iter()
            .find(|(alias, _)| alias == key)
            .map(|(_, canonical)| *canonical)
            .unwrap_or(key.as_str());
        out.insert(canonical.to_string(), value.clone());
    }
    out
}
