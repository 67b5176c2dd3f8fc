//! Runtime config loading (`omc.toml`) with 4-tier priority.

pub mod config;
pub mod paths;

pub use config::{load_runtime_config, RuntimeConfig, RuntimeConfigLayer};
pub use paths::{claude_config_dir, global_config_path, project_config_path};
