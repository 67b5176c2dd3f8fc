//! HUD state shape and read-only access (spec.md §3 "HUD state").
//!
//! Every hook that touches `.omc/state/hud-state.json` owns a write;
//! this crate only ever reads it, at render time.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackgroundTaskCounters {
    #[serde(default)]
    pub running: u32,
    #[serde(default)]
    pub completed: u32,
    #[serde(default)]
    pub failed: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HudState {
    #[serde(rename = "lastPromptTime", default, skip_serializing_if = "Option::is_none")]
    pub last_prompt_time: Option<String>,
    #[serde(rename = "lastToolInfo", default, skip_serializing_if = "Option::is_none")]
    pub last_tool_info: Option<String>,
    #[serde(rename = "activeAgentsSummary", default, skip_serializing_if = "Option::is_none")]
    pub active_agents_summary: Option<String>,
    #[serde(rename = "lastSkillInvocation", default, skip_serializing_if = "Option::is_none")]
    pub last_skill_invocation: Option<String>,
    #[serde(rename = "backgroundTaskCounters", default)]
    pub background_task_counters: BackgroundTaskCounters,
}

fn hud_state_path(omc_root: &Path) -> std::path::PathBuf {
    omc_root.join("state").join("hud-state.json")
}

/// Reads the HUD state file, defaulting to an empty state if it is
/// missing or unreadable — the HUD never fails to render for this.
pub fn read_hud_state(omc_root: &Path) -> HudState {
    omc_store::read_json(&hud_state_path(omc_root)).unwrap_or_default()
}
