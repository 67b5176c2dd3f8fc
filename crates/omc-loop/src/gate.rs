//! The persistent-mode stop gate (spec.md §4.9): the single arbiter
//! invoked on every Stop event from the host.

use crate::controllers::{dispatch, StopAction};
use crate::retry_budget::{block_counter_path, increment_block_count, read_block_count};
use omc_config::RuntimeConfig;
use omc_context::estimate_context_percent;
use omc_hooks::HookOutput;
use omc_modes::registry::{is_active, read_state, stop, Mode};
use std::path::Path;

const CONTEXT_LIMIT_SIGNATURES: &[&str] = &[
    "context_limit",
    "context_window",
    "context_exceeded",
    "context_full",
    "max_context",
    "token_limit",
    "max_tokens",
    "conversation_too_long",
    "input_too_long",
];

const USER_ABORT_EXACT: &[&str] = &["aborted", "abort", "cancel", "interrupt"];
const USER_ABORT_CONTAINS: &[&str] =
    &["user_cancel", "user_interrupt", "ctrl_c", "manual_stop"];

/// Modes checked in arbitration order: ralph first, then the
/// autopilot/ultrapilot tier, then the ultrawork overlay last.
const ARBITRATION_ORDER: &[Mode] = &[
    Mode::Ralph,
    Mode::Autopilot,
    Mode::Ultrapilot,
    Mode::Team,
    Mode::Swarm,
    Mode::Pipeline,
    Mode::Ultraqa,
    Mode::Tdd,
    Mode::Ultrawork,
];

fn is_context_limit_stop(stop_reason: &str) -> bool {
    let lower = stop_reason.to_ascii_lowercase();
    CONTEXT_LIMIT_SIGNATURES.iter().any(|sig| lower.contains(sig))
}

fn is_user_abort(stop_reason: &str) -> bool {
    let lower = stop_reason.to_ascii_lowercase();
    USER_ABORT_EXACT.contains(&lower.as_str())
        || USER_ABORT_CONTAINS.iter().any(|sig| lower.contains(sig))
}

/// Input gathered by the hub before invoking the gate.
pub struct StopContext<'a> {
    pub omc_root: &'a Path,
    pub session_id: &'a str,
    pub stop_reason: &'a str,
    pub transcript_path: Option<&'a Path>,
    pub todo_incomplete: bool,
}

/// Runs the six-step decision procedure and returns the exactly-one
/// output shape the host expects.
pub fn stop_gate(ctx: &StopContext, config: &RuntimeConfig) -> HookOutput {
    // 1. Safety: never block a context-limit stop.
    if is_context_limit_stop(ctx.stop_reason) {
        return HookOutput::PassThrough;
    }

    // 2. User abort: respect it unconditionally.
    if is_user_abort(ctx.stop_reason) {
        return HookOutput::PassThrough;
    }

    let counter_path = block_counter_path(ctx.omc_root, ctx.session_id);

    // 3. Retry budget: stop blocking once the session has been blocked
    // `max_blocks` times within the TTL window.
    if read_block_count(&counter_path) >= config.max_blocks {
        return HookOutput::PassThrough;
    }

    // 4. Context safety threshold.
    if let Some(transcript_path) = ctx.transcript_path {
        let pct = estimate_context_percent(transcript_path);
        if pct >= config.context_guard_threshold {
            let count = increment_block_count(&counter_path);
            return HookOutput::Block {
                reason: format!(
                    "[OMC] Context at {pct}%. Run /compact or start a fresh session. (Block {count}/{})",
                    config.max_blocks
                ),
            };
        }
    }

    // 5. Mode arbitration.
    for mode in ARBITRATION_ORDER {
        if !is_active(ctx.omc_root, *mode) {
            continue;
        }
        let Some(mut state) = read_state(ctx.omc_root, *mode) else {
            continue;
        };
        match dispatch(*mode, ctx.omc_root, &mut state) {
            StopAction::Continue(message) => {
                omc_modes::registry::write_state(ctx.omc_root, *mode, &state);
                return HookOutput::Block { reason: message };
            }
            StopAction::Complete => {
                stop(ctx.omc_root, *mode);
            }
            StopAction::PassThrough => {}
        }
    }

    // 6. Todo continuation nudge, honoring the same retry budget.
    if ctx.todo_incomplete {
        if read_block_count(&counter_path) >= config.max_blocks {
            return HookOutput::PassThrough;
        }
        increment_block_count(&counter_path);
        return HookOutput::Block {
            reason: "[OMC] You have incomplete TODO items. Continue working through them."
                .to_string(),
        };
    }

    HookOutput::PassThrough
}

#[cfg(test)]
mod tests {
    use super::*;
    use omc_modes::registry::start;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn ctx<'a>(omc_root: &'a Path, session_id: &'a str, stop_reason: &'a str) -> StopContext<'a> {
        StopContext {
            omc_root,
            session_id,
            stop_reason,
            transcript_path: None,
            todo_incomplete: false,
        }
    }

    #[test]
    fn test_context_limit_stop_always_passes_through() {
        let dir = tempdir().unwrap();
        start(dir.path(), Mode::Ralph, None).unwrap();
        let out = stop_gate(&ctx(dir.path(), "s1", "context_limit_exceeded"), &RuntimeConfig::default());
        assert_eq!(out, HookOutput::PassThrough);
    }

    #[test]
    fn test_user_abort_passes_through() {
        let dir = tempdir().unwrap();
        let out = stop_gate(&ctx(dir.path(), "s1", "user_cancel_requested"), &RuntimeConfig::default());
        assert_eq!(out, HookOutput::PassThrough);
    }

    #[test]
    fn test_retry_budget_exhausted_passes_through() {
        let dir = tempdir().unwrap();
        let counter_path = block_counter_path(dir.path(), "s1");
        increment_block_count(&counter_path);
        increment_block_count(&counter_path);

        let out = stop_gate(&ctx(dir.path(), "s1", "end_turn"), &RuntimeConfig::default());
        assert_eq!(out, HookOutput::PassThrough);
    }

    #[test]
    fn test_context_safety_threshold_blocks() {
        let dir = tempdir().unwrap();
        let mut transcript = NamedTempFile::new().unwrap();
        writeln!(transcript, r#"{{"context_window":100,"input_tokens":90}}"#).unwrap();

        let mut context = ctx(dir.path(), "s1", "end_turn");
        context.transcript_path = Some(transcript.path());

        let out = stop_gate(&context, &RuntimeConfig::default());
        match out {
            HookOutput::Block { reason } => assert!(reason.contains("90%")),
            other => panic!("expected Block, got {other:?}"),
        }
    }

    #[test]
    fn test_ralph_wins_arbitration() {
        let dir = tempdir().unwrap();
        start(dir.path(), Mode::Ralph, None).unwrap();

        let out = stop_gate(&ctx(dir.path(), "s1", "end_turn"), &RuntimeConfig::default());
        match out {
            HookOutput::Block { reason } => assert!(reason.contains("RALPH")),
            other => panic!("expected Block, got {other:?}"),
        }
    }

    #[test]
    fn test_todo_nudge_when_no_mode_active() {
        let dir = tempdir().unwrap();
        let mut context = ctx(dir.path(), "s1", "end_turn");
        context.todo_incomplete = true;

        let out = stop_gate(&context, &RuntimeConfig::default());
        match out {
            HookOutput::Block { reason } => assert!(reason.contains("TODO")),
            other => panic!("expected Block, got {other:?}"),
        }
    }

    #[test]
    fn test_no_mode_no_todo_passes_through() {
        let dir = tempdir().unwrap();
        let out = stop_gate(&ctx(dir.path(), "s1", "end_turn"), &RuntimeConfig::default());
        assert_eq!(out, HookOutput::PassThrough);
    }
}
