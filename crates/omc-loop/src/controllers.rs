//! Per-mode Stop controllers (spec.md §4.8). Each controller inspects
//! and mutates a mode's persisted state and decides whether the host's
//! Stop should be blocked (with a continuation message) or allowed
//! through.

use chrono::Utc;
use omc_modes::boulder::{find_planner_plans, get_plan_progress, read_boulder};
use omc_modes::registry::{Mode, ModeState};
use serde_json::{json, Value};
use std::path::Path;

/// What a controller decided for this Stop.
#[derive(Debug, Clone, PartialEq)]
pub enum StopAction {
    /// Block the host's stop, emitting `message` as a continuation.
    Continue(String),
    /// The mode completed; caller should mark it inactive.
    Complete,
    /// This controller has nothing to say; fall through to the next one.
    PassThrough,
}

const RALPH_INITIAL_MAX_ITERATIONS: u64 = 10;
const ULTRAWORK_MAX_REINFORCEMENTS: u64 = 3;

fn get_u64(extra: &serde_json::Map<String, Value>, key: &str, default: u64) -> u64 {
    extra.get(key).and_then(|v| v.as_u64()).unwrap_or(default)
}

fn set_u64(extra: &mut serde_json::Map<String, Value>, key: &str, value: u64) {
    extra.insert(key.to_string(), json!(value));
}

/// Ralph: bounded-iteration loop. On entry, if the iteration budget is
/// exhausted, it doubles rather than stopping silently (10 -> 20 -> 40).
pub fn ralph_controller(state: &mut ModeState) -> StopAction {
    let mut max_iterations = get_u64(&state.extra, "maxIterations", RALPH_INITIAL_MAX_ITERATIONS);
    let mut iteration = get_u64(&state.extra, "iteration", 0);

    if iteration >= max_iterations {
        max_iterations *= 2;
    }
    iteration += 1;

    set_u64(&mut state.extra, "maxIterations", max_iterations);
    set_u64(&mut state.extra, "iteration", iteration);
    state.updated_at = Utc::now();

    StopAction::Continue(format!(
        "[RALPH - ITERATION {iteration}/{max_iterations}] Keep iterating until the verifier signals completion."
    ))
}

fn boulder_progress(omc_root: &Path) -> omc_modes::boulder::PlanProgress {
    let active_plan = read_boulder(omc_root).and_then(|b| b.active_plan);
    let plan_path = active_plan
        .map(std::path::PathBuf::from)
        .or_else(|| find_planner_plans(omc_root).into_iter().next());

    match plan_path {
        Some(p) => get_plan_progress(&p),
        None => omc_modes::boulder::PlanProgress::default(),
    }
}

/// Shared shape for autopilot, ultraqa, and tdd: each Stop nudges toward
/// the next unchecked plan item until the plan is fully checked off.
fn plan_driven_controller(omc_root: &Path, label: &str) -> StopAction {
    let progress = boulder_progress(omc_root);
    if progress.total > 0 && progress.completed == progress.total {
        return StopAction::Complete;
    }
    StopAction::Continue(format!(
        "[{label}] Continue your plan ({}/{} tasks complete).",
        progress.completed, progress.total
    ))
}

pub fn autopilot_controller(omc_root: &Path) -> StopAction {
    plan_driven_controller(omc_root, "AUTOPILOT")
}

pub fn ultraqa_controller(omc_root: &Path) -> StopAction {
    plan_driven_controller(omc_root, "ULTRAQA")
}

pub fn tdd_controller(omc_root: &Path) -> StopAction {
    plan_driven_controller(omc_root, "TDD")
}

/// Ultrawork: a parallel-burst overlay. Reinforces a few times, then
/// defers to whichever primary mode is active.
pub fn ultrawork_controller(state: &mut ModeState) -> StopAction {
    let count = get_u64(&state.extra, "reinforcementCount", 0);
    if count >= ULTRAWORK_MAX_REINFORCEMENTS {
        return StopAction::Complete;
    }
    set_u64(&mut state.extra, "reinforcementCount", count + 1);
    state.updated_at = Utc::now();
    StopAction::Continue("[ULTRAWORK] Keep going.".to_string())
}

/// Pipeline: an explicit stage list persisted in state. Each Stop
/// advances the stage pointer and emits the next stage's instruction.
pub fn pipeline_controller(state: &mut ModeState) -> StopAction {
    let stages: Vec<String> = state
        .extra
        .get("stages")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();

    if stages.is_empty() {
        return StopAction::Complete;
    }

    let current = get_u64(&state.extra, "currentStage", 0) as usize;
    let next = current + 1;

    if next >= stages.len() {
        return StopAction::Complete;
    }

    set_u64(&mut state.extra, "currentStage", next as u64);
    state.updated_at = Utc::now();
    StopAction::Continue(format!(
        "[PIPELINE - STAGE {}/{}] {}",
        next + 1,
        stages.len(),
        stages[next]
    ))
}

/// Dispatches to the right controller for `mode`, given its current
/// state. Ralph, ultrawork, and pipeline mutate `state` in place; the
/// plan-driven controllers are stateless reads of the boulder store.
pub fn dispatch(mode: Mode, omc_root: &Path, state: &mut ModeState) -> StopAction {
    match mode {
        Mode::Ralph => ralph_controller(state),
        Mode::Autopilot | Mode::Ultrapilot | Mode::Swarm | Mode::Team => {
            autopilot_controller(omc_root)
        }
        Mode::Ultrawork => ultrawork_controller(state),
        Mode::Pipeline => pipeline_controller(state),
        Mode::Ultraqa => ultraqa_controller(omc_root),
        Mode::Tdd => tdd_controller(omc_root),
    }
}
