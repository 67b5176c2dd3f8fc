//! Atomic JSON state store: tmp-rename writes and O_EXCL locks with
//! stale-reap.
//!
//! Independent of `flock(2)`: the lock payload (which process, which
//! token, when acquired) must survive a stale-reap race, so the lock is a
//! plain file created with `O_EXCL` rather than an `flock` advisory lock.
//! Two reapers racing to clear the same stale lock is the failure mode
//! this is built to avoid — see `acquire_lock`.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const DEFAULT_STALE_LOCK_MS: u64 = 10_000;
pub const DEFAULT_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_MAX_WAIT_MS: u64 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LockPayload {
    pid: u32,
    token: String,
    #[serde(rename = "acquiredAt")]
    acquired_at: DateTime<Utc>,
}

/// Tuning knobs for `acquire_lock`/`with_lock`. Mirrors the three knobs
/// named in the runtime config (`staleLockMs`, `timeoutMs`, `maxWaitMs`).
#[derive(Debug, Clone, Copy)]
pub struct LockOptions {
    pub stale_lock_ms: u64,
    pub timeout_ms: u64,
    pub max_wait_ms: u64,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            stale_lock_ms: DEFAULT_STALE_LOCK_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_wait_ms: DEFAULT_MAX_WAIT_MS,
        }
    }
}

/// A held lock. Dropping without calling `release_lock` leaves the lock
/// file in place — callers must release explicitly.
pub struct LockHandle {
    lock_path: PathBuf,
    token: String,
}

impl LockHandle {
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut p = path.as_os_str().to_owned();
    p.push(".lock");
    PathBuf::from(p)
}

fn read_lock_payload(path: &Path) -> Option<(String, LockPayload)> {
    let raw = fs::read_to_string(path).ok()?;
    let payload = serde_json::from_str::<LockPayload>(&raw).ok()?;
    Some((raw, payload))
}

fn pid_is_alive(pid: u32) -> bool {
    // SAFETY: signal 0 performs no action beyond existence/permission checks.
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

/// Attempts an O_EXCL create of `<path>.lock`. If a stale lock is found
/// (dead PID, older than `stale_lock_ms`, content byte-identical to what
/// was just read), reaps it and retries until `timeout_ms` elapses.
pub fn acquire_lock(path: &Path, opts: LockOptions) -> Option<LockHandle> {
    let lock_path = lock_path_for(path);
    let deadline = Instant::now() + Duration::from_millis(opts.timeout_ms);
    let token = format!(
        "{}-{}",
        std::process::id(),
        Utc::now().timestamp_nanos_opt().unwrap_or(0)
    );

    loop {
        if let Some(parent) = lock_path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(&lock_path)
        {
            Ok(mut file) => {
                let payload = LockPayload {
                    pid: std::process::id(),
                    token: token.clone(),
                    acquired_at: Utc::now(),
                };
                if let Ok(json) = serde_json::to_string(&payload) {
                    let _ = file.write_all(json.as_bytes());
                    let _ = file.flush();
                }
                return Some(LockHandle { lock_path, token });
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if try_reap_stale(&lock_path, opts.stale_lock_ms) {
                    continue;
                }
            }
            Err(_) => {}
        }

        if Instant::now() >= deadline {
            return None;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

/// Like `acquire_lock` but retries up to `max_wait_ms` instead of
/// `timeout_ms`, for callers willing to block longer.
pub fn acquire_lock_blocking(path: &Path, opts: LockOptions) -> Option<LockHandle> {
    acquire_lock(
        path,
        LockOptions {
            timeout_ms: opts.max_wait_ms,
            ..opts
        },
    )
}

fn try_reap_stale(lock_path: &Path, stale_lock_ms: u64) -> bool {
    let Some((raw, payload)) = read_lock_payload(lock_path) else {
        return false;
    };
    let age_ms = (Utc::now() - payload.acquired_at).num_milliseconds();
    if age_ms < stale_lock_ms as i64 || pid_is_alive(payload.pid) {
        return false;
    }

    // Re-read immediately before unlinking: only reap if the bytes on disk
    // still match the snapshot that justified the liveness check. This is
    // what prevents two reapers from unlinking a fresh acquirer's lock in
    // sequence.
    match fs::read_to_string(lock_path) {
        Ok(current) if current == raw => {
            let _ = fs::remove_file(lock_path);
            true
        }
        _ => false,
    }
}

/// Closes and unlinks the lock file iff it still carries this handle's
/// token (another process may have already reaped and re-acquired it).
pub fn release_lock(handle: LockHandle) {
    if let Some((_, payload)) = read_lock_payload(&handle.lock_path) {
        if payload.token == handle.token {
            let _ = fs::remove_file(&handle.lock_path);
        }
    }
}

/// Scoped lock acquisition. `fallback` runs instead when the deadline
/// expires without the lock; never panics.
pub fn with_lock<T>(
    path: &Path,
    opts: LockOptions,
    f: impl FnOnce() -> T,
    fallback: impl FnOnce() -> T,
) -> T {
    match acquire_lock(path, opts) {
        Some(handle) => {
            let result = f();
            release_lock(handle);
            result
        }
        None => {
            tracing::warn!(path = %path.display(), "lock not acquired before deadline, using fallback");
            fallback()
        }
    }
}

/// Reads and deserializes JSON at `path`. Returns `None` on any failure —
/// missing file, unreadable, malformed — never propagates an error.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

/// Same as [`read_json`] but returns the raw `serde_json::Value`, useful
/// when the caller only needs to probe shape without a concrete type.
pub fn read_json_value(path: &Path) -> Option<Value> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

/// Writes `value` to `path` via a sibling temp file followed by `rename`,
/// so concurrent readers never observe a partial write. Creates the
/// parent directory (mode 0o700) if missing.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(parent, fs::Permissions::from_mode(0o700));
        }
    }

    let mut tmp_os = path.as_os_str().to_owned();
    tmp_os.push(format!(".tmp.{}", std::process::id()));
    let tmp_path = PathBuf::from(tmp_os);

    let json = serde_json::to_string_pretty(value)?;
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}
