//! PostToolUse handling: remember-tag capture and boulder progress
//! reminders after Task delegations (spec.md §4.10).

use crate::notepad::process_remember_tags;
use omc_modes::boulder::{find_planner_plans, get_plan_progress, read_boulder};
use std::path::{Path, PathBuf};

const TASK_TOOLS: &[&str] = &["Task", "task"];

fn active_plan_path(omc_root: &Path) -> Option<PathBuf> {
    let boulder = read_boulder(omc_root)?;
    if !boulder.active {
        return None;
    }
    boulder
        .active_plan
        .map(PathBuf::from)
        .or_else(|| find_planner_plans(omc_root).into_iter().next())
}

/// If a boulder plan is active and has pending tasks, returns a short
/// progress reminder.
pub fn check_boulder_continuation(omc_root: &Path) -> Option<String> {
    let plan_path = active_plan_path(omc_root)?;
    let progress = get_plan_progress(&plan_path);
    if progress.total == 0 || progress.completed >= progress.total {
        return None;
    }
    Some(format!(
        "[OMC] Active plan has {} of {} tasks remaining. Continue delegating until the plan is complete.",
        progress.total - progress.completed,
        progress.total
    ))
}

/// Evaluates a PostToolUse event. Returns additional context to append
/// to the tool output, if any.
pub fn process_post_tool(omc_root: &Path, tool_name: &str, tool_output: &str) -> Option<String> {
    if !TASK_TOOLS.contains(&tool_name) {
        return None;
    }

    process_remember_tags(omc_root, tool_output);
    check_boulder_continuation(omc_root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use omc_modes::boulder::{write_boulder, Boulder};
    use tempfile::tempdir;

    #[test]
    fn test_no_reminder_without_active_boulder() {
        let dir = tempdir().unwrap();
        assert!(check_boulder_continuation(dir.path()).is_none());
    }

    #[test]
    fn test_reminder_when_plan_has_pending_tasks() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("plans")).unwrap();
        let plan = dir.path().join("plans/a.md");
        std::fs::write(&plan, "- [x] one\n- [ ] two\n").unwrap();
        write_boulder(
            dir.path(),
            &Boulder {
                active: true,
                active_plan: Some(plan.to_string_lossy().to_string()),
                session_ids: Default::default(),
            },
        );

        let reminder = check_boulder_continuation(dir.path()).unwrap();
        assert!(reminder.contains("1 of 2"));
    }

    #[test]
    fn test_no_reminder_when_plan_complete() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("plans")).unwrap();
        let plan = dir.path().join("plans/a.md");
        std::fs::write(&plan, "- [x] one\n- [x] two\n").unwrap();
        write_boulder(
            dir.path(),
            &Boulder {
                active: true,
                active_plan: Some(plan.to_string_lossy().to_string()),
                session_ids: Default::default(),
            },
        );

        assert!(check_boulder_continuation(dir.path()).is_none());
    }

    #[test]
    fn test_process_post_tool_captures_remember_tags() {
        let dir = tempdir().unwrap();
        let output = "<remember>Found the bug in parser.rs</remember>";
        process_post_tool(dir.path(), "Task", output);

        let working = crate::notepad::read_working_memory(dir.path());
        assert_eq!(working, vec!["Found the bug in parser.rs"]);
    }

    #[test]
    fn test_non_task_tool_is_ignored() {
        let dir = tempdir().unwrap();
        let result = process_post_tool(dir.path(), "Write", "<remember>ignored</remember>");
        assert!(result.is_none());
        assert!(crate::notepad::read_working_memory(dir.path()).is_empty());
    }
}
