//! Routes a normalized hook input to the matching handler (spec.md
//! §4.12 steps 4-5). Every handler is a pure function from the
//! normalized input to a [`HookOutput`]; unknown hook types and internal
//! errors both collapse to pass-through.

use omc_core::{get_omc_root, resolve_worktree_root};
use omc_hooks::{HookEvent, HookOutput};
use omc_keywords::{get_all_keywords_with_size_check, FeatureFlags, Keyword};
use omc_loop::{stop_gate, StopContext};
use omc_modes::registry::Mode;
use omc_orchestrator::{process_post_tool, process_pre_tool, PreToolDecision, PreToolInput};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

fn str_field<'a>(normalized: &'a HashMap<String, Value>, key: &str) -> Option<&'a str> {
    normalized.get(key).and_then(|v| v.as_str())
}

fn resolve_roots(normalized: &HashMap<String, Value>) -> PathBuf {
    let cwd = str_field(normalized, "cwd")
        .or_else(|| str_field(normalized, "directory"))
        .unwrap_or(".");
    let worktree_root = resolve_worktree_root(Path::new(cwd));
    get_omc_root(&worktree_root)
}

fn keyword_to_mode(keyword: Keyword) -> Option<Mode> {
    match keyword {
        Keyword::Ralph => Some(Mode::Ralph),
        Keyword::Autopilot => Some(Mode::Autopilot),
        Keyword::Ultrapilot => Some(Mode::Ultrapilot),
        Keyword::Team => Some(Mode::Team),
        Keyword::Swarm => Some(Mode::Swarm),
        Keyword::Ultrawork => Some(Mode::Ultrawork),
        Keyword::Pipeline => Some(Mode::Pipeline),
        Keyword::Tdd => Some(Mode::Tdd),
        Keyword::Cancel
        | Keyword::Ecomode
        | Keyword::Ralplan
        | Keyword::Ultrathink
        | Keyword::Deepsearch
        | Keyword::Analyze
        | Keyword::Codex
        | Keyword::Gemini => None,
    }
}

fn handle_user_prompt_submit(normalized: &HashMap<String, Value>) -> HookOutput {
    let Some(prompt) = str_field(normalized, "prompt") else {
        return HookOutput::PassThrough;
    };
    let omc_root = resolve_roots(normalized);
    let session_id = str_field(normalized, "sessionId").map(str::to_string);
    let config = omc_config::load_runtime_config(
        omc_config::global_config_path().as_deref(),
        Some(&omc_config::project_config_path(&omc_root)),
    );

    let result = get_all_keywords_with_size_check(
        prompt,
        FeatureFlags::default(),
        config.suppress_heavy_modes_for_small_tasks,
    );

    if result.keywords.contains(&Keyword::Cancel) {
        for mode in Mode::ALL {
            omc_modes::registry::stop(&omc_root, mode);
        }
        return HookOutput::PassThrough;
    }

    let mut activated = Vec::new();
    for keyword in &result.keywords {
        if let Some(mode) = keyword_to_mode(*keyword) {
            if omc_modes::registry::start(&omc_root, mode, session_id.clone()).is_ok() {
                activated.push(mode.as_str());
            }
        }
    }

    if activated.is_empty() {
        return HookOutput::PassThrough;
    }

    HookOutput::Advisory {
        hook_event_name: HookEvent::UserPromptSubmit.as_str().to_string(),
        additional_context: format!("[OMC] Activated mode(s): {}", activated.join(", ")),
    }
}

fn tool_context_percent(normalized: &HashMap<String, Value>) -> u32 {
    str_field(normalized, "transcriptPath")
        .map(|p| omc_context::estimate_context_percent(Path::new(p)))
        .unwrap_or(0)
}

fn handle_pre_tool_use(normalized: &HashMap<String, Value>) -> (HookOutput, Option<String>) {
    let omc_root = resolve_roots(normalized);
    let empty = Value::Object(Default::default());
    let tool_input = normalized.get("toolInput").unwrap_or(&empty);
    let config = omc_config::load_runtime_config(
        omc_config::global_config_path().as_deref(),
        Some(&omc_config::project_config_path(&omc_root)),
    );

    let input = PreToolInput {
        tool_name: str_field(normalized, "toolName").unwrap_or(""),
        tool_input,
        session_id: str_field(normalized, "sessionId"),
        parent_session_id: str_field(normalized, "parentSessionId"),
        context_percent: tool_context_percent(normalized),
    };

    match process_pre_tool(&omc_root, &input, &config.hard_block_tools, config.context_safety_threshold) {
        PreToolDecision::Allow => (HookOutput::PassThrough, None),
        PreToolDecision::Advisory(text) => (
            HookOutput::Advisory {
                hook_event_name: HookEvent::PreToolUse.as_str().to_string(),
                additional_context: text,
            },
            None,
        ),
        PreToolDecision::HardBlock(message) => (HookOutput::PassThrough, Some(message)),
    }
}

fn handle_post_tool_use(normalized: &HashMap<String, Value>) -> HookOutput {
    let omc_root = resolve_roots(normalized);
    let tool_name = str_field(normalized, "toolName").unwrap_or("");
    let tool_output = str_field(normalized, "toolOutput").unwrap_or("");

    match process_post_tool(&omc_root, tool_name, tool_output) {
        Some(text) => HookOutput::Advisory {
            hook_event_name: HookEvent::PostToolUse.as_str().to_string(),
            additional_context: text,
        },
        None => HookOutput::PassThrough,
    }
}

fn handle_stop(normalized: &HashMap<String, Value>) -> HookOutput {
    let omc_root = resolve_roots(normalized);
    let session_id = str_field(normalized, "sessionId").unwrap_or("unknown");
    let stop_reason = str_field(normalized, "stopReason").unwrap_or("");
    let transcript_path = str_field(normalized, "transcriptPath").map(Path::new);
    let todo_incomplete = normalized
        .get("hasIncompleteTodos")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let config = omc_config::load_runtime_config(
        omc_config::global_config_path().as_deref(),
        Some(&omc_config::project_config_path(&omc_root)),
    );

    let ctx = StopContext { omc_root: &omc_root, session_id, stop_reason, transcript_path, todo_incomplete };
    stop_gate(&ctx, &config)
}

/// Routes `event` to its handler. Returns the stdout payload plus an
/// optional stderr/exit-2 hard-block message (PreToolUse only).
pub fn dispatch(event: HookEvent, normalized: &HashMap<String, Value>) -> (HookOutput, Option<String>) {
    match event {
        HookEvent::UserPromptSubmit => (handle_user_prompt_submit(normalized), None),
        HookEvent::PreToolUse => handle_pre_tool_use(normalized),
        HookEvent::PostToolUse => (handle_post_tool_use(normalized), None),
        HookEvent::Stop => (handle_stop(normalized), None),
        HookEvent::SessionEnd => (HookOutput::PassThrough, None),
    }
}
