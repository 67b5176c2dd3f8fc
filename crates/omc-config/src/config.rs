//! Runtime config: the numeric knobs named throughout the spec (context
//! thresholds, lock tuning, disabled tool categories), loaded once with a
//! 4-tier priority instead of scattered `env::var` calls.

use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_context_guard_threshold() -> u32 {
    75
}
fn default_context_safety_threshold() -> u32 {
    55
}
fn default_max_blocks() -> u32 {
    2
}
fn default_stale_lock_ms() -> u64 {
    10_000
}
fn default_timeout_ms() -> u64 {
    2_000
}
fn default_max_wait_ms() -> u64 {
    10_000
}
fn default_hard_block_tools() -> Vec<String> {
    vec!["ExitPlanMode".to_string()]
}

/// Partial config as read from one TOML layer. Every field is optional so
/// a layer can override just the knobs it cares about; `None` means "no
/// opinion from this layer", not "set to a falsy default".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfigLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_guard_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_safety_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_blocks: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_lock_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_wait_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_block_tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppress_heavy_modes_for_small_tasks: Option<bool>,
}

impl RuntimeConfigLayer {
    fn load_from_file(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(layer) => layer,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "malformed omc.toml, ignoring layer");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read omc.toml, ignoring layer");
                Self::default()
            }
        }
    }

    fn merge_over(&mut self, other: Self) {
        if other.context_guard_threshold.is_some() {
            self.context_guard_threshold = other.context_guard_threshold;
        }
        if other.context_safety_threshold.is_some() {
            self.context_safety_threshold = other.context_safety_threshold;
        }
        if other.max_blocks.is_some() {
            self.max_blocks = other.max_blocks;
        }
        if other.stale_lock_ms.is_some() {
            self.stale_lock_ms = other.stale_lock_ms;
        }
        if other.timeout_ms.is_some() {
            self.timeout_ms = other.timeout_ms;
        }
        if other.max_wait_ms.is_some() {
            self.max_wait_ms = other.max_wait_ms;
        }
        if other.disable_tools.is_some() {
            self.disable_tools = other.disable_tools;
        }
        if other.hard_block_tools.is_some() {
            self.hard_block_tools = other.hard_block_tools;
        }
        if other.suppress_heavy_modes_for_small_tasks.is_some() {
            self.suppress_heavy_modes_for_small_tasks = other.suppress_heavy_modes_for_small_tasks;
        }
    }

    fn from_env() -> Self {
        Self {
            context_guard_threshold: std::env::var("OMC_CONTEXT_GUARD_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok()),
            context_safety_threshold: std::env::var("OMC_CONTEXT_SAFETY_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok()),
            disable_tools: std::env::var("OMC_DISABLE_TOOLS").ok().map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
            ..Default::default()
        }
    }
}

/// Fully-resolved runtime config: every knob named in spec.md §6 in one
/// documented loading path.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub context_guard_threshold: u32,
    pub context_safety_threshold: u32,
    pub max_blocks: u32,
    pub stale_lock_ms: u64,
    pub timeout_ms: u64,
    pub max_wait_ms: u64,
    pub disable_tools: Vec<String>,
    pub hard_block_tools: Vec<String>,
    pub suppress_heavy_modes_for_small_tasks: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            context_guard_threshold: default_context_guard_threshold(),
            context_safety_threshold: default_context_safety_threshold(),
            max_blocks: default_max_blocks(),
            stale_lock_ms: default_stale_lock_ms(),
            timeout_ms: default_timeout_ms(),
            max_wait_ms: default_max_wait_ms(),
            disable_tools: Vec::new(),
            hard_block_tools: default_hard_block_tools(),
            suppress_heavy_modes_for_small_tasks: false,
        }
    }
}

impl From<RuntimeConfigLayer> for RuntimeConfig {
    fn from(layer: RuntimeConfigLayer) -> Self {
        let defaults = RuntimeConfig::default();
        Self {
            context_guard_threshold: layer
                .context_guard_threshold
                .unwrap_or(defaults.context_guard_threshold),
            context_safety_threshold: layer
                .context_safety_threshold
                .unwrap_or(defaults.context_safety_threshold),
            max_blocks: layer.max_blocks.unwrap_or(defaults.max_blocks),
            stale_lock_ms: layer.stale_lock_ms.unwrap_or(defaults.stale_lock_ms),
            timeout_ms: layer.timeout_ms.unwrap_or(defaults.timeout_ms),
            max_wait_ms: layer.max_wait_ms.unwrap_or(defaults.max_wait_ms),
            disable_tools: layer.disable_tools.unwrap_or(defaults.disable_tools),
            hard_block_tools: layer.hard_block_tools.unwrap_or(defaults.hard_block_tools),
            suppress_heavy_modes_for_small_tasks: layer
                .suppress_heavy_modes_for_small_tasks
                .unwrap_or(defaults.suppress_heavy_modes_for_small_tasks),
        }
    }
}

/// Loads with 4-tier priority: built-in defaults < global config < project
/// config < env overrides. The first three are TOML layers merged
/// low-to-high; env vars always win.
pub fn load_runtime_config(global_path: Option<&Path>, project_path: Option<&Path>) -> RuntimeConfig {
    let mut layer = RuntimeConfigLayer::default();

    if let Some(path) = global_path {
        layer.merge_over(RuntimeConfigLayer::load_from_file(path));
    }
    if let Some(path) = project_path {
        layer.merge_over(RuntimeConfigLayer::load_from_file(path));
    }
    layer.merge_over(RuntimeConfigLayer::from_env());

    layer.into()
}
