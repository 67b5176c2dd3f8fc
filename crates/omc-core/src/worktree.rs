//! Worktree and OMC-root resolution.
//!
//! Every write under `.omc/` begins here: the worktree root is the git
//! top-level of whatever directory a hook happens to receive as `cwd`,
//! never the subdirectory itself.

use crate::error::CoreError;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

use lazy_static::lazy_static;

lazy_static! {
    static ref WORKTREE_CACHE: Mutex<HashMap<PathBuf, PathBuf>> = Mutex::new(HashMap::new());
}

/// Clears the worktree-root cache. Exposed only for tests, which must not
/// leak cached roots across `tempdir()` fixtures.
pub fn reset_worktree_cache() {
    WORKTREE_CACHE.lock().unwrap().clear();
}

/// Resolves the git top-level directory for `dir`, falling back to `dir`
/// itself when `dir` is not inside a git working tree. Cached by input path.
pub fn resolve_worktree_root(dir: &Path) -> PathBuf {
    if let Some(hit) = WORKTREE_CACHE.lock().unwrap().get(dir) {
        return hit.clone();
    }

    let root = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| PathBuf::from(s.trim()))
        .unwrap_or_else(|| dir.to_path_buf());

    WORKTREE_CACHE
        .lock()
        .unwrap()
        .insert(dir.to_path_buf(), root.clone());
    root
}

/// `<basename>-<first-16-hex-of-SHA256(git-remote-url-or-worktree-path)>`.
pub fn project_identifier(worktree_root: &Path) -> String {
    let basename = worktree_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    let remote = Command::new("git")
        .arg("-C")
        .arg(worktree_root)
        .args(["remote", "get-url", "origin"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let hash_input = remote.unwrap_or_else(|| worktree_root.to_string_lossy().into_owned());
    let digest = Sha256::digest(hash_input.as_bytes());
    let hex = digest.iter().map(|b| format!("{b:02x}")).collect::<String>();

    format!("{basename}-{}", &hex[..16])
}

/// Returns `<root>/.omc` unless `OMC_STATE_DIR` is set, in which case the
/// OMC root is centralized at `<OMC_STATE_DIR>/<project-identifier>`. Never
/// creates the directory; callers create it lazily on first write.
pub fn get_omc_root(worktree_root: &Path) -> PathBuf {
    match std::env::var("OMC_STATE_DIR") {
        Ok(override_dir) if !override_dir.is_empty() => {
            PathBuf::from(override_dir).join(project_identifier(worktree_root))
        }
        _ => worktree_root.join(".omc"),
    }
}

/// Joins `relative` onto the OMC root, rejecting any path that would
/// escape it (`..` traversal or an absolute path).
pub fn resolve_omc_path(omc_root: &Path, relative: &str) -> Result<PathBuf, CoreError> {
    let rel_path = Path::new(relative);
    if rel_path.is_absolute() || rel_path.components().any(|c| c == std::path::Component::ParentDir) {
        return Err(CoreError::PathEscapesRoot(relative.to_string()));
    }
    Ok(omc_root.join(rel_path))
}

/// `^[A-Za-z0-9._-]+$`, non-empty.
pub fn validate_session_id(id: &str) -> Result<(), CoreError> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')) {
        return Err(CoreError::InvalidSessionId(id.to_string()));
    }
    Ok(())
}

/// Process-local fallback session id, minted when the host supplies none.
pub fn fallback_session_id(started_ms: u128) -> String {
    format!("pid-{}-{started_ms}", std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as Cmd;
    use tempfile::tempdir;

    fn init_repo(dir: &Path) {
        Cmd::new("git").arg("init").arg("-q").current_dir(dir).status().unwrap();
    }

    #[test]
    fn test_resolve_worktree_root_falls_back_outside_git() {
        reset_worktree_cache();
        let dir = tempdir().unwrap();
        let root = resolve_worktree_root(dir.path());
        assert_eq!(root, dir.path());
    }

    #[test]
    fn test_resolve_worktree_root_from_subdirectory() {
        reset_worktree_cache();
        let dir = tempdir().unwrap();
        init_repo(dir.path());
        let sub = dir.path().join("a/b/c");
        std::fs::create_dir_all(&sub).unwrap();

        let root = resolve_worktree_root(&sub);
        assert_eq!(std::fs::canonicalize(&root).unwrap(), std::fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn test_validate_session_id_rejects_traversal() {
        assert!(validate_session_id("../etc/passwd").is_err());
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("abc/def").is_err());
    }

    #[test]
    fn test_validate_session_id_accepts_normal_ids() {
        assert!(validate_session_id("abc-123_DEF.7").is_ok());
    }

    #[test]
    fn test_resolve_omc_path_rejects_parent_dir() {
        let root = PathBuf::from("/tmp/proj/.omc");
        assert!(resolve_omc_path(&root, "../outside").is_err());
        assert!(resolve_omc_path(&root, "/abs/path").is_err());
    }

    #[test]
    fn test_resolve_omc_path_accepts_relative() {
        let root = PathBuf::from("/tmp/proj/.omc");
        let p = resolve_omc_path(&root, "state/ralph-state.json").unwrap();
        assert_eq!(p, PathBuf::from("/tmp/proj/.omc/state/ralph-state.json"));
    }

    #[test]
    fn test_get_omc_root_default() {
        std::env::remove_var("OMC_STATE_DIR");
        let root = get_omc_root(Path::new("/tmp/proj"));
        assert_eq!(root, PathBuf::from("/tmp/proj/.omc"));
    }

    #[test]
    fn test_project_identifier_is_stable() {
        let root = Path::new("/tmp/my-project");
        let a = project_identifier(root);
        let b = project_identifier(root);
        assert_eq!(a, b);
        assert!(a.starts_with("my-project-"));
    }
}
