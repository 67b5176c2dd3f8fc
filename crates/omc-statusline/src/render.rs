//! Builds the single ANSI-colored status line from HUD state, the
//! active mode, a git badge, and the context estimate (spec.md §13).

use crate::git::read_git_status;
use crate::hud_state::read_hud_state;
use omc_modes::registry::{active_primary, is_active, read_state, Mode};
use std::path::Path;

const RESET: &str = "\x1b[0m";
const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const MAGENTA: &str = "\x1b[35m";
const DIM: &str = "\x1b[2m";

fn color(code: &str, text: &str) -> String {
    format!("{code}{text}{RESET}")
}

fn context_color(pct: u32) -> &'static str {
    if pct >= 85 {
        RED
    } else if pct >= 60 {
        YELLOW
    } else {
        GREEN
    }
}

fn mode_badge(omc_root: &Path) -> Option<String> {
    let primary = active_primary(omc_root);
    let overlays: Vec<&str> = [Mode::Ultrawork, Mode::Tdd]
        .into_iter()
        .filter(|m| is_active(omc_root, *m))
        .map(|m| m.as_str())
        .collect();

    if primary.is_none() && overlays.is_empty() {
        return None;
    }

    let mut label = primary.map(|m| m.as_str().to_string()).unwrap_or_default();
    if let Some(mode) = primary {
        if let Some(state) = read_state(omc_root, mode) {
            if let Some(iteration) = state.extra.get("iteration").and_then(|v| v.as_u64()) {
                let max = state
                    .extra
                    .get("max_iterations")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(iteration);
                label.push_str(&format!(" {iteration}/{max}"));
            }
        }
    }
    if !overlays.is_empty() {
        if !label.is_empty() {
            label.push('+');
        }
        label.push_str(&overlays.join("+"));
    }
    Some(color(CYAN, &label))
}

fn git_badge(worktree_root: &Path) -> Option<String> {
    let status = read_git_status(worktree_root)?;
    let text = if status.dirty {
        format!("{}*", status.branch)
    } else {
        status.branch
    };
    Some(color(DIM, &text))
}

fn background_badge(running: u32, failed: u32) -> Option<String> {
    if running == 0 && failed == 0 {
        return None;
    }
    let mut parts = Vec::new();
    if running > 0 {
        parts.push(color(GREEN, &format!("{running} running")));
    }
    if failed > 0 {
        parts.push(color(RED, &format!("{failed} failed")));
    }
    Some(parts.join(" "))
}

fn rate_limit_badge() -> Option<String> {
    std::env::var("OMC_RATE_LIMIT_STATUS")
        .ok()
        .filter(|s| !s.is_empty())
        .map(|s| color(MAGENTA, &s))
}

/// Renders the full status line. `context_percent` comes from the
/// caller's own transcript-tail read via `omc-context`.
pub fn render_line(worktree_root: &Path, omc_root: &Path, context_percent: u32) -> String {
    let hud = read_hud_state(omc_root);

    let mut badges: Vec<String> = Vec::new();
    if let Some(mode) = mode_badge(omc_root) {
        badges.push(mode);
    }
    badges.push(color(context_color(context_percent), &format!("ctx {context_percent}%")));
    if let Some(git) = git_badge(worktree_root) {
        badges.push(git);
    }
    if let Some(bg) = background_badge(
        hud.background_task_counters.running,
        hud.background_task_counters.failed,
    ) {
        badges.push(bg);
    }
    if let Some(rate) = rate_limit_badge() {
        badges.push(rate);
    }

    badges.join(" | ")
}
