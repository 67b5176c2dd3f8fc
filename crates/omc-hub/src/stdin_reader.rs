//! Bounded-timeout stdin read so a blocked pipe never hangs the host
//! (spec.md §4.12 step 1).

use std::io::Read;
use std::sync::mpsc;
use std::time::Duration;

const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Reads all of stdin on a background thread and waits up to
/// `DEFAULT_TIMEOUT_MS` for it to finish. Returns `None` on timeout or
/// I/O error; the caller treats that the same as a parse failure.
pub fn read_stdin_bounded() -> Option<String> {
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        let mut buf = String::new();
        let result = std::io::stdin().read_to_string(&mut buf);
        let _ = tx.send(result.map(|_| buf));
    });

    match rx.recv_timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS)) {
        Ok(Ok(content)) => Some(content),
        Ok(Err(_)) | Err(_) => None,
    }
}
