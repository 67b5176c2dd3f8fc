//! Canonical hook stdout shapes (spec.md §6).

use serde::Serialize;
use serde_json::{json, Value};

/// Exactly one of these is ever written, as a single JSON line, to stdout.
#[derive(Debug, Clone, PartialEq)]
pub enum HookOutput {
    /// `{"continue": true, "suppressOutput": true}`.
    PassThrough,
    /// `{"continue": true, "hookSpecificOutput": {"hookEventName": ..., "additionalContext": ...}}`.
    Advisory { hook_event_name: String, additional_context: String },
    /// `{"decision": "block", "reason": ...}`.
    Block { reason: String },
    /// PreToolUse only: advisory plus a replacement tool input.
    ModifiedInput { modified_input: Value },
}

impl HookOutput {
    pub fn to_json(&self) -> Value {
        match self {
            Self::PassThrough => json!({"continue": true, "suppressOutput": true}),
            Self::Advisory { hook_event_name, additional_context } => json!({
                "continue": true,
                "hookSpecificOutput": {
                    "hookEventName": hook_event_name,
                    "additionalContext": additional_context,
                }
            }),
            Self::Block { reason } => json!({"decision": "block", "reason": reason}),
            Self::ModifiedInput { modified_input } => json!({
                "continue": true,
                "suppressOutput": true,
                "modifiedInput": modified_input,
            }),
        }
    }

    /// Serializes to exactly one line of JSON, as the bridge writes to stdout.
    pub fn to_line(&self) -> String {
        serde_json::to_string(&self.to_json()).unwrap_or_else(|_| {
            serde_json::to_string(&HookOutput::PassThrough.to_json()).unwrap()
        })
    }
}

impl Serialize for HookOutput {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_json().serialize(serializer)
    }
}
