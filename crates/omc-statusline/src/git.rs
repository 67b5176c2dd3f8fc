//! Best-effort git badge: branch name plus a dirty marker. Shells out the
//! same way `omc-core`'s worktree resolver does; any failure (detached
//! HEAD, no repo, `git` missing) degrades to no badge rather than an error.

use std::path::Path;
use std::process::Command;

pub struct GitStatus {
    pub branch: String,
    pub dirty: bool,
}

pub fn read_git_status(worktree_root: &Path) -> Option<GitStatus> {
    let branch = Command::new("git")
        .arg("-C")
        .arg(worktree_root)
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;

    let dirty = Command::new("git")
        .arg("-C")
        .arg(worktree_root)
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| !out.stdout.is_empty())
        .unwrap_or(false);

    Some(GitStatus { branch, dirty })
}
