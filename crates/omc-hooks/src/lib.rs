//! Canonical hook wire protocol shared by the bridge and every handler.
//!
//! The host's stdin JSON varies between snake_case and camelCase across
//! hook kinds; [`event::normalize_keys`] is the single place that accepts
//! both. Every handler downstream, and every output shape it can return,
//! lives in this crate so `omc-hub` stays a thin dispatcher.

pub mod event;
pub mod protocol;

pub use event::{normalize_keys, HookEvent};
pub use protocol::HookOutput;
