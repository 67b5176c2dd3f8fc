//! Resolution for the one human-edited config file (`omc.toml`) at its
//! global and project layers.

use std::path::PathBuf;

/// `CLAUDE_CONFIG_DIR`, defaulting to `~/.claude` — the host's config
/// directory, reused here so `omc.toml` lives alongside the host's own
/// config rather than inventing a second directory convention.
pub fn claude_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("CLAUDE_CONFIG_DIR") {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".claude"))
}

/// `<CLAUDE_CONFIG_DIR>/omc.toml`, or the `OMC_CONFIG` override if set.
pub fn global_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("OMC_CONFIG") {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    claude_config_dir().map(|dir| dir.join("omc.toml"))
}

/// `<omcRoot>/omc.toml` — a project may pin its own overrides.
pub fn project_config_path(omc_root: &std::path::Path) -> PathBuf {
    omc_root.join("omc.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_global_config_path_honors_claude_config_dir() {
        std::env::remove_var("OMC_CONFIG");
        std::env::set_var("CLAUDE_CONFIG_DIR", "/tmp/fake-claude-config");
        let path = global_config_path().unwrap();
        std::env::remove_var("CLAUDE_CONFIG_DIR");

        assert_eq!(path, PathBuf::from("/tmp/fake-claude-config/omc.toml"));
    }

    #[test]
    #[serial]
    fn test_global_config_path_honors_omc_config_override() {
        std::env::set_var("OMC_CONFIG", "/tmp/custom-omc.toml");
        let path = global_config_path().unwrap();
        std::env::remove_var("OMC_CONFIG");

        assert_eq!(path, PathBuf::from("/tmp/custom-omc.toml"));
    }

    #[test]
    fn test_project_config_path_joins_omc_root() {
        let root = PathBuf::from("/tmp/proj/.omc");
        assert_eq!(project_config_path(&root), PathBuf::from("/tmp/proj/.omc/omc.toml"));
    }
}
