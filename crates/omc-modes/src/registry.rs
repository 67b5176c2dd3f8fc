//! Mode registry: tracks which modes are active. Controllers in
//! `omc-loop` implement the behaviors; this crate only tracks state.

use chrono::{DateTime, Utc};
use omc_core::CoreError;
use omc_store::LockOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// The full set of known modes. Each has a canonical `<mode>-state.json`
/// file under `<omcRoot>/state/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Autopilot,
    Ultrapilot,
    Swarm,
    Pipeline,
    Team,
    Ralph,
    Ultrawork,
    Ultraqa,
    Tdd,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Autopilot => "autopilot",
            Self::Ultrapilot => "ultrapilot",
            Self::Swarm => "swarm",
            Self::Pipeline => "pipeline",
            Self::Team => "team",
            Self::Ralph => "ralph",
            Self::Ultrawork => "ultrawork",
            Self::Ultraqa => "ultraqa",
            Self::Tdd => "tdd",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "autopilot" => Ok(Self::Autopilot),
            "ultrapilot" => Ok(Self::Ultrapilot),
            "swarm" => Ok(Self::Swarm),
            "pipeline" => Ok(Self::Pipeline),
            "team" => Ok(Self::Team),
            "ralph" => Ok(Self::Ralph),
            "ultrawork" => Ok(Self::Ultrawork),
            "ultraqa" => Ok(Self::Ultraqa),
            "tdd" => Ok(Self::Tdd),
            other => Err(CoreError::UnknownMode(other.to_string())),
        }
    }

    /// Primary modes are mutually exclusive with one another; overlays
    /// (ultrawork, tdd) may run alongside any primary.
    pub fn is_primary(&self) -> bool {
        matches!(
            self,
            Self::Ralph | Self::Autopilot | Self::Ultrapilot | Self::Pipeline | Self::Ultraqa
        )
    }

    pub const ALL: [Mode; 9] = [
        Self::Autopilot,
        Self::Ultrapilot,
        Self::Swarm,
        Self::Pipeline,
        Self::Team,
        Self::Ralph,
        Self::Ultrawork,
        Self::Ultraqa,
        Self::Tdd,
    ];

    fn state_file_name(&self) -> String {
        format!("{}-state.json", self.as_str())
    }
}

/// The on-disk shape of a mode state file (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeState {
    pub active: bool,
    #[serde(rename = "startedAt")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Mode-specific fields (iteration, max_iterations, reinforcementCount,
    /// prdPath, metadata, stage pointer, …) live here untyped; each
    /// controller in `omc-loop` knows its own shape.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ModeState {
    pub fn new(session_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            active: true,
            started_at: now,
            updated_at: now,
            session_id,
            extra: serde_json::Map::new(),
        }
    }
}

fn state_path(omc_root: &Path, mode: Mode) -> PathBuf {
    omc_root.join("state").join(mode.state_file_name())
}

/// True iff `mode`'s state file exists and has `active: true`.
pub fn is_active(omc_root: &Path, mode: Mode) -> bool {
    omc_store::read_json::<ModeState>(&state_path(omc_root, mode))
        .map(|s| s.active)
        .unwrap_or(false)
}

/// The currently active primary mode in this session, if any.
pub fn active_primary(omc_root: &Path) -> Option<Mode> {
    Mode::ALL
        .into_iter()
        .filter(|m| m.is_primary())
        .find(|m| is_active(omc_root, *m))
}

/// Starts `mode`. Fails with `ModeConflict` if `mode` is primary and a
/// different primary mode is already active.
pub fn start(omc_root: &Path, mode: Mode, session_id: Option<String>) -> Result<(), CoreError> {
    let path = state_path(omc_root, mode);
    let lock_opts = LockOptions::default();

    omc_store::with_lock(
        &path,
        lock_opts,
        || {
            if mode.is_primary() {
                if let Some(existing) = active_primary(omc_root) {
                    if existing.as_str() != mode.as_str() {
                        return Err(CoreError::ModeConflict {
                            existing: existing.as_str().to_string(),
                            requested: mode.as_str().to_string(),
                        });
                    }
                }
            }
            let state = ModeState::new(session_id.clone());
            let _ = omc_store::write_json_atomic(&path, &state);
            Ok(())
        },
        || {
            tracing::warn!(mode = mode.as_str(), "could not lock mode state, starting best-effort");
            let state = ModeState::new(session_id);
            let _ = omc_store::write_json_atomic(&path, &state);
            Ok(())
        },
    )
}

/// Marks `mode` inactive. A missing state file is treated as already
/// stopped.
pub fn stop(omc_root: &Path, mode: Mode) {
    let path = state_path(omc_root, mode);
    omc_store::with_lock(
        &path,
        LockOptions::default(),
        || {
            if let Some(mut state) = omc_store::read_json::<ModeState>(&path) {
                state.active = false;
                state.updated_at = Utc::now();
                let _ = omc_store::write_json_atomic(&path, &state);
            }
        },
        || {
            if let Some(mut state) = omc_store::read_json::<ModeState>(&path) {
                state.active = false;
                let _ = omc_store::write_json_atomic(&path, &state);
            }
        },
    );
}

/// Reads the raw state for `mode`, or `None` if absent/corrupt.
pub fn read_state(omc_root: &Path, mode: Mode) -> Option<ModeState> {
    omc_store::read_json(&state_path(omc_root, mode))
}

/// Persists a mode-controller's updated state (iteration bump, stage
/// advance, …).
pub fn write_state(omc_root: &Path, mode: Mode, state: &ModeState) {
    let _ = omc_store::write_json_atomic(&state_path(omc_root, mode), state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_start_then_is_active_then_stop() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        start(root, Mode::Ralph, Some("sess-1".into())).unwrap();
        assert!(is_active(root, Mode::Ralph));

        stop(root, Mode::Ralph);
        assert!(!is_active(root, Mode::Ralph));
    }

    #[test]
    fn test_primary_conflict_blocks_second_start() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        start(root, Mode::Ralph, None).unwrap();
        let err = start(root, Mode::Autopilot, None).unwrap_err();

        assert!(matches!(err, CoreError::ModeConflict { .. }));
        assert!(is_active(root, Mode::Ralph));
        assert!(!is_active(root, Mode::Autopilot));
    }

    #[test]
    fn test_overlay_may_run_alongside_primary() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        start(root, Mode::Ralph, None).unwrap();
        start(root, Mode::Ultrawork, None).unwrap();

        assert!(is_active(root, Mode::Ralph));
        assert!(is_active(root, Mode::Ultrawork));
    }

    #[test]
    fn test_restarting_same_primary_mode_is_not_a_conflict() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        start(root, Mode::Ralph, None).unwrap();
        start(root, Mode::Ralph, Some("sess-2".into())).unwrap();
        assert!(is_active(root, Mode::Ralph));
    }

    #[test]
    fn test_active_primary_returns_none_when_nothing_active() {
        let dir = tempdir().unwrap();
        assert!(active_primary(dir.path()).is_none());
    }

    #[test]
    fn test_mode_parse_round_trips() {
        for mode in Mode::ALL {
            assert_eq!(Mode::parse(mode.as_str()).unwrap().as_str(), mode.as_str());
        }
        assert!(Mode::parse("nonexistent").is_err());
    }

    #[test]
    fn test_stop_on_never_started_mode_is_noop() {
        let dir = tempdir().unwrap();
        stop(dir.path(), Mode::Tdd);
        assert!(!is_active(dir.path(), Mode::Tdd));
    }
}
