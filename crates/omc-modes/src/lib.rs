//! Mode registry and boulder (plan) store.

pub mod boulder;
pub mod registry;

pub use boulder::{
    append_session_id, find_planner_plans, get_plan_progress, read_boulder, write_boulder,
    Boulder, PlanProgress,
};
pub use registry::{active_primary, is_active, read_state, start, stop, write_state, Mode, ModeState};
