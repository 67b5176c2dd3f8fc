//! Read-only, side-effect-free context-window usage estimation from a
//! host transcript file.

pub mod estimator;

pub use estimator::estimate_context_percent;
