//! Core error taxonomy shared across the runtime.
//!
//! Every variant here is recoverable by a hook handler: callers catch,
//! log, and fall back to a pass-through response rather than propagate
//! a panic into the host process (see `omc-hub`'s dispatcher).

#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("invalid session id '{0}': must match ^[A-Za-z0-9._-]+$ and be non-empty")]
    InvalidSessionId(String),

    #[error("path '{0}' escapes the omc root")]
    PathEscapesRoot(String),

    #[error("mode conflict: '{existing}' is already the active primary mode, cannot start '{requested}'")]
    ModeConflict { existing: String, requested: String },

    #[error("unknown mode '{0}'")]
    UnknownMode(String),

    #[error("lock for '{0}' could not be acquired before the deadline")]
    LockTimeout(String),

    #[error("config at '{path}' is corrupt, treating as absent: {reason}")]
    ConfigCorrupt { path: String, reason: String },
}
