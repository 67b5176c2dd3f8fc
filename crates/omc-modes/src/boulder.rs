//! Boulder (plan) store: the active-plan pointer and its checkbox
//! progress.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Boulder {
    pub active: bool,
    #[serde(rename = "active_plan", skip_serializing_if = "Option::is_none")]
    pub active_plan: Option<String>,
    #[serde(default)]
    pub session_ids: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlanProgress {
    pub completed: u32,
    pub total: u32,
}

fn boulder_path(omc_root: &Path) -> PathBuf {
    omc_root.join("boulder.json")
}

/// Reads the boulder pointer. `None` on missing or corrupt file.
pub fn read_boulder(omc_root: &Path) -> Option<Boulder> {
    omc_store::read_json(&boulder_path(omc_root))
}

/// Atomic write of the boulder pointer.
pub fn write_boulder(omc_root: &Path, state: &Boulder) {
    let _ = omc_store::write_json_atomic(&boulder_path(omc_root), state);
}

fn is_pending_line(trimmed: &str) -> bool {
    trimmed.starts_with("- [ ] ") || trimmed == "- [ ]"
}

fn is_done_line(trimmed: &str) -> bool {
    let lower = trimmed.to_ascii_lowercase();
    lower.starts_with("- [x] ") || lower == "- [x]"
}

/// Counts `- [ ]` / `- [x]` task lines in `plan_path`. A missing file
/// yields `{0, 0}` rather than an error.
pub fn get_plan_progress(plan_path: &Path) -> PlanProgress {
    let Ok(content) = std::fs::read_to_string(plan_path) else {
        return PlanProgress::default();
    };

    let mut progress = PlanProgress::default();
    for line in content.lines() {
        let trimmed = line.trim_start();
        if is_pending_line(trimmed) {
            progress.total += 1;
        } else if is_done_line(trimmed) {
            progress.total += 1;
            progress.completed += 1;
        }
    }
    progress
}

/// Lists `*.md` files under `<omcRoot>/plans/`.
pub fn find_planner_plans(omc_root: &Path) -> Vec<PathBuf> {
    let plans_dir = omc_root.join("plans");
    let Ok(entries) = std::fs::read_dir(&plans_dir) else {
        return Vec::new();
    };
    let mut plans: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("md"))
        .collect();
    plans.sort();
    plans
}

/// Dedups `session_id` into the boulder's session set and writes it back.
pub fn append_session_id(omc_root: &Path, session_id: &str) {
    let mut boulder = read_boulder(omc_root).unwrap_or_default();
    boulder.session_ids.insert(session_id.to_string());
    write_boulder(omc_root, &boulder);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let boulder = Boulder {
            active: true,
            active_plan: Some("/tmp/plan.md".to_string()),
            session_ids: BTreeSet::from(["s1".to_string()]),
        };
        write_boulder(dir.path(), &boulder);
        assert_eq!(read_boulder(dir.path()).unwrap(), boulder);
    }

    #[test]
    fn test_read_boulder_missing_is_none() {
        let dir = tempdir().unwrap();
        assert!(read_boulder(dir.path()).is_none());
    }

    #[test]
    fn test_plan_progress_counts_pending_and_done() {
        let dir = tempdir().unwrap();
        let plan = dir.path().join("plan.md");
        std::fs::write(
            &plan,
            "# Plan\n- [ ] task one\n- [x] task two\n  - [X] nested done\nnot a task line\n",
        )
        .unwrap();

        let progress = get_plan_progress(&plan);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.completed, 2);
    }

    #[test]
    fn test_plan_progress_missing_file_is_zero() {
        let dir = tempdir().unwrap();
        let progress = get_plan_progress(&dir.path().join("absent.md"));
        assert_eq!(progress, PlanProgress::default());
    }

    #[test]
    fn test_find_planner_plans_lists_only_markdown() {
        let dir = tempdir().unwrap();
        let plans_dir = dir.path().join("plans");
        std::fs::create_dir_all(&plans_dir).unwrap();
        std::fs::write(plans_dir.join("a.md"), "").unwrap();
        std::fs::write(plans_dir.join("b.md"), "").unwrap();
        std::fs::write(plans_dir.join("notes.txt"), "").unwrap();

        let plans = find_planner_plans(dir.path());
        assert_eq!(plans.len(), 2);
    }

    #[test]
    fn test_append_session_id_dedups() {
        let dir = tempdir().unwrap();
        append_session_id(dir.path(), "s1");
        append_session_id(dir.path(), "s1");
        append_session_id(dir.path(), "s2");

        let boulder = read_boulder(dir.path()).unwrap();
        assert_eq!(boulder.session_ids.len(), 2);
    }
}
