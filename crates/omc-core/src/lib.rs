//! Path and worktree resolution shared by every hook handler.
//!
//! No internal omc dependencies; this is the crate every other crate in
//! the workspace builds on.

pub mod error;
pub mod worktree;

pub use error::CoreError;
pub use worktree::{
    fallback_session_id, get_omc_root, project_identifier, reset_worktree_cache,
    resolve_omc_path, resolve_worktree_root, validate_session_id,
};
