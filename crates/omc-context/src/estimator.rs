//! Context-window percentage estimator (spec.md §4.7).
//!
//! Reads only the tail of the transcript; never the whole file. Any
//! failure along the way yields `0` rather than propagating an error —
//! this runs on the hot path of every hook and must never block or
//! crash on a malformed or half-written transcript.

use lazy_static::lazy_static;
use regex::Regex;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

const TAIL_BYTES: u64 = 4096;

lazy_static! {
    // Bounded quantifiers: a context_window or input_tokens value is never
    // more than 20 digits, which also caps backtracking cost.
    static ref CONTEXT_WINDOW_RE: Regex =
        Regex::new(r#""context_window"\s*:\s*(\d{1,20})"#).unwrap();
    static ref INPUT_TOKENS_RE: Regex =
        Regex::new(r#""input_tokens"\s*:\s*(\d{1,20})"#).unwrap();
}

fn read_tail(path: &Path) -> Option<String> {
    let mut file = File::open(path).ok()?;
    let len = file.metadata().ok()?.len();
    let start = len.saturating_sub(TAIL_BYTES);
    file.seek(SeekFrom::Start(start)).ok()?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).ok()?;
    Some(String::from_utf8_lossy(&buf).into_owned())
}

fn last_match(re: &Regex, text: &str) -> Option<u64> {
    re.captures_iter(text)
        .last()
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Estimates context usage as a percentage (0-100) from the tail of the
/// transcript at `transcript_path`. Returns `0` on any I/O error, missing
/// fields, or a zero-sized window.
pub fn estimate_context_percent(transcript_path: &Path) -> u32 {
    let tail = match read_tail(transcript_path) {
        Some(t) => t,
        None => return 0,
    };

    let window = match last_match(&CONTEXT_WINDOW_RE, &tail) {
        Some(w) if w > 0 => w,
        _ => return 0,
    };
    let input = match last_match(&INPUT_TOKENS_RE, &tail) {
        Some(i) => i,
        None => return 0,
    };

    ((input as f64 / window as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_transcript(lines: &[&str]) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        for l in lines {
            writeln!(f, "{l}").unwrap();
        }
        f
    }

    #[test]
    fn test_basic_percentage() {
        let f = write_transcript(&[
            r#"{"usage":{"input_tokens":1000},"context_window":2000}"#,
        ]);
        assert_eq!(estimate_context_percent(f.path()), 50);
    }

    #[test]
    fn test_takes_last_occurrence() {
        let f = write_transcript(&[
            r#"{"context_window":1000,"input_tokens":100}"#,
            r#"{"context_window":2000,"input_tokens":1000}"#,
        ]);
        assert_eq!(estimate_context_percent(f.path()), 50);
    }

    #[test]
    fn test_missing_file_yields_zero() {
        assert_eq!(estimate_context_percent(Path::new("/nonexistent/path.jsonl")), 0);
    }

    #[test]
    fn test_missing_fields_yield_zero() {
        let f = write_transcript(&[r#"{"hello":"world"}"#]);
        assert_eq!(estimate_context_percent(f.path()), 0);
    }

    #[test]
    fn test_zero_window_yields_zero() {
        let f = write_transcript(&[r#"{"context_window":0,"input_tokens":100}"#]);
        assert_eq!(estimate_context_percent(f.path()), 0);
    }

    #[test]
    fn test_rounds_to_nearest() {
        let f = write_transcript(&[r#"{"context_window":3,"input_tokens":1}"#]);
        // 1/3 * 100 = 33.33... -> rounds to 33
        assert_eq!(estimate_context_percent(f.path()), 33);
    }

    #[test]
    fn test_only_tail_is_scanned() {
        let mut f = NamedTempFile::new().unwrap();
        // Pad past the tail window with a decoy value, then the real one.
        writeln!(f, r#"{{"context_window":999,"input_tokens":999}}"#).unwrap();
        let padding = "x".repeat(TAIL_BYTES as usize + 100);
        writeln!(f, "{padding}").unwrap();
        writeln!(f, r#"{{"context_window":100,"input_tokens":50}}"#).unwrap();
        assert_eq!(estimate_context_percent(f.path()), 50);
    }
}
