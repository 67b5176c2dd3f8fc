//! PreToolUse handling: delegation guard, expensive-tool hard block, and
//! shell command safety (spec.md §4.10).

use crate::allowlist::{is_allowed_path, is_source_file, is_write_edit_tool};
use crate::audit::{log_audit_entry, AuditDecision, AuditEntryInput, AuditReason};
use crate::shell_safety::is_safe_command;
use serde_json::Value;
use std::path::Path;

const SHELL_TOOLS: &[&str] = &["Bash", "bash", "Shell", "shell"];

const DELEGATION_REMINDER: &str = r#"<delegation-reminder>
You are an orchestrator, not an implementer. Direct writes to source files
outside `.omc/`/`.claude/` should be delegated to an executor subagent via
the Task tool instead of performed here.
</delegation-reminder>"#;

/// What the caller (the hub dispatcher) should do with this PreToolUse
/// invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum PreToolDecision {
    /// Nothing to say; let the tool run.
    Allow,
    /// Non-blocking advisory text to inject.
    Advisory(String),
    /// Exit code 2, message to stderr: the narrow expensive-tool path.
    HardBlock(String),
}

pub struct PreToolInput<'a> {
    pub tool_name: &'a str,
    pub tool_input: &'a Value,
    pub session_id: Option<&'a str>,
    pub parent_session_id: Option<&'a str>,
    pub context_percent: u32,
}

fn extract_file_path(tool_input: &Value) -> Option<String> {
    let obj = tool_input.as_object()?;
    for key in ["file_path", "filePath", "path", "file"] {
        if let Some(v) = obj.get(key).and_then(|v| v.as_str()) {
            return Some(v.to_string());
        }
    }
    None
}

fn extract_command(tool_input: &Value) -> Option<&str> {
    tool_input.get("command").and_then(|v| v.as_str())
}

/// Evaluates a PreToolUse event. Subagent-originated calls always pass
/// through unconditionally.
pub fn process_pre_tool(
    omc_root: &Path,
    input: &PreToolInput,
    hard_block_tools: &[String],
    context_safety_threshold: u32,
) -> PreToolDecision {
    if input.parent_session_id.is_some() {
        return PreToolDecision::Allow;
    }

    if hard_block_tools.iter().any(|t| t == input.tool_name)
        && input.context_percent >= context_safety_threshold
    {
        return PreToolDecision::HardBlock(format!(
            "[OMC] Context at {}%: {} is disabled until you /compact or start a fresh session.",
            input.context_percent, input.tool_name
        ));
    }

    if is_write_edit_tool(input.tool_name) {
        let file_path = extract_file_path(input.tool_input);
        let allowed = file_path.as_deref().map(is_allowed_path).unwrap_or(true);

        if let Some(fp) = file_path.as_deref() {
            let reason = if allowed {
                AuditReason::AllowedPath
            } else if is_source_file(fp) {
                AuditReason::SourceFile
            } else {
                AuditReason::Other
            };
            log_audit_entry(
                omc_root,
                AuditEntryInput {
                    tool: input.tool_name.to_string(),
                    file_path: fp.to_string(),
                    decision: if allowed { AuditDecision::Allowed } else { AuditDecision::Warned },
                    reason,
                    session_id: input.session_id.map(str::to_string),
                },
            );
        }

        if !allowed {
            return PreToolDecision::Advisory(DELEGATION_REMINDER.to_string());
        }
        return PreToolDecision::Allow;
    }

    if SHELL_TOOLS.contains(&input.tool_name) {
        if let Some(command) = extract_command(input.tool_input) {
            if !is_safe_command(command) {
                log_audit_entry(
                    omc_root,
                    AuditEntryInput {
                        tool: input.tool_name.to_string(),
                        file_path: command.to_string(),
                        decision: AuditDecision::Warned,
                        reason: AuditReason::Other,
                        session_id: input.session_id.map(str::to_string),
                    },
                );
            }
        }
    }

    PreToolDecision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn base_input<'a>(tool_name: &'a str, tool_input: &'a Value) -> PreToolInput<'a> {
        PreToolInput {
            tool_name,
            tool_input,
            session_id: Some("s1"),
            parent_session_id: None,
            context_percent: 0,
        }
    }

    #[test]
    fn test_subagent_call_passes_through_unconditionally() {
        let dir = tempdir().unwrap();
        let tool_input = json!({"file_path": "src/app.ts"});
        let mut input = base_input("Write", &tool_input);
        input.parent_session_id = Some("parent-1");

        let decision = process_pre_tool(dir.path(), &input, &["ExitPlanMode".to_string()], 55);
        assert_eq!(decision, PreToolDecision::Allow);
    }

    #[test]
    fn test_source_file_write_outside_allowlist_warns() {
        let dir = tempdir().unwrap();
        let tool_input = json!({"file_path": "src/app.ts"});
        let input = base_input("Write", &tool_input);

        let decision = process_pre_tool(dir.path(), &input, &["ExitPlanMode".to_string()], 55);
        match decision {
            PreToolDecision::Advisory(msg) => assert!(msg.contains("delegation-reminder")),
            other => panic!("expected Advisory, got {other:?}"),
        }
        let entries = crate::audit::read_audit_log(dir.path());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].decision, AuditDecision::Warned);
    }

    #[test]
    fn test_write_inside_omc_is_allowed() {
        let dir = tempdir().unwrap();
        let tool_input = json!({"file_path": ".omc/plans/a.md"});
        let input = base_input("Write", &tool_input);

        let decision = process_pre_tool(dir.path(), &input, &["ExitPlanMode".to_string()], 55);
        assert_eq!(decision, PreToolDecision::Allow);
        let entries = crate::audit::read_audit_log(dir.path());
        assert_eq!(entries[0].decision, AuditDecision::Allowed);
    }

    #[test]
    fn test_expensive_tool_hard_blocked_under_context_pressure() {
        let dir = tempdir().unwrap();
        let tool_input = json!({});
        let mut input = base_input("ExitPlanMode", &tool_input);
        input.context_percent = 80;

        let decision = process_pre_tool(dir.path(), &input, &["ExitPlanMode".to_string()], 55);
        assert!(matches!(decision, PreToolDecision::HardBlock(_)));
    }

    #[test]
    fn test_expensive_tool_allowed_under_threshold() {
        let dir = tempdir().unwrap();
        let tool_input = json!({});
        let mut input = base_input("ExitPlanMode", &tool_input);
        input.context_percent = 10;

        let decision = process_pre_tool(dir.path(), &input, &["ExitPlanMode".to_string()], 55);
        assert_eq!(decision, PreToolDecision::Allow);
    }

    #[test]
    fn test_unsafe_shell_command_is_audited() {
        let dir = tempdir().unwrap();
        let tool_input = json!({"command": "git status; rm -rf /"});
        let input = base_input("Bash", &tool_input);

        let decision = process_pre_tool(dir.path(), &input, &["ExitPlanMode".to_string()], 55);
        assert_eq!(decision, PreToolDecision::Allow);
        let entries = crate::audit::read_audit_log(dir.path());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].decision, AuditDecision::Warned);
    }
}
