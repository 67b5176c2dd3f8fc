//! Per-session block counter with a 5-minute TTL (spec.md §4.9 step 3).
//!
//! Backs the stop gate's "don't block forever" rule: once a session has
//! been blocked `max_blocks` times within the TTL window, the gate passes
//! everything through rather than risk deadlocking the host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const TTL_MS: i64 = 5 * 60 * 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BlockCounter {
    count: u32,
    updated_at: DateTime<Utc>,
}

pub fn block_counter_path(omc_root: &Path, session_id: &str) -> PathBuf {
    omc_root.join(format!("context-guard-{session_id}.json"))
}

fn is_expired(updated_at: DateTime<Utc>) -> bool {
    (Utc::now() - updated_at).num_milliseconds() >= TTL_MS
}

/// Current block count for this session, `0` if the file is missing,
/// corrupt, or past its TTL.
pub fn read_block_count(path: &Path) -> u32 {
    match omc_store::read_json::<BlockCounter>(path) {
        Some(c) if !is_expired(c.updated_at) => c.count,
        _ => 0,
    }
}

/// Increments (or starts fresh, if expired/missing) the block counter and
/// persists it. Returns the new count.
pub fn increment_block_count(path: &Path) -> u32 {
    let previous = match omc_store::read_json::<BlockCounter>(path) {
        Some(c) if !is_expired(c.updated_at) => c.count,
        _ => 0,
    };
    let counter = BlockCounter { count: previous + 1, updated_at: Utc::now() };
    let _ = omc_store::write_json_atomic(path, &counter);
    counter.count
}
