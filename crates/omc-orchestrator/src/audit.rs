//! Append-only audit log for delegation decisions (spec.md §6 state file
//! layout: `logs/orchestrator-audit.jsonl`).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write as _;
use std::path::Path;

const LOG_FILE: &str = "orchestrator-audit.jsonl";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuditDecision {
    Allowed,
    Warned,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditReason {
    AllowedPath,
    SourceFile,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: String,
    pub tool: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    pub decision: AuditDecision,
    pub reason: AuditReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

pub struct AuditEntryInput {
    pub tool: String,
    pub file_path: String,
    pub decision: AuditDecision,
    pub reason: AuditReason,
    pub session_id: Option<String>,
}

fn log_path(omc_root: &Path) -> std::path::PathBuf {
    omc_root.join("logs").join(LOG_FILE)
}

/// Appends one audit entry. Never surfaces an error: a broken audit log
/// must not interrupt the hook it's auditing.
pub fn log_audit_entry(omc_root: &Path, entry: AuditEntryInput) {
    let full = AuditEntry {
        timestamp: Utc::now().to_rfc3339(),
        tool: entry.tool,
        file_path: entry.file_path,
        decision: entry.decision,
        reason: entry.reason,
        session_id: entry.session_id,
    };

    let path = log_path(omc_root);
    let Some(dir) = path.parent() else { return };
    let _ = fs::create_dir_all(dir);

    let Ok(line) = serde_json::to_string(&full) else { return };
    let _ = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut f| writeln!(f, "{line}"));
}

pub fn read_audit_log(omc_root: &Path) -> Vec<AuditEntry> {
    let Ok(content) = fs::read_to_string(log_path(omc_root)) else {
        return Vec::new();
    };
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect()
}
