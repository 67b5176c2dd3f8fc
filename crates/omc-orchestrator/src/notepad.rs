//! The remember notepad (spec.md §3): a human-readable file with three
//! sections. "Priority Context" is overwritten by priority tags,
//! "Working Memory" accumulates entries, and "MANUAL" is never touched
//! by the runtime. Every update is one read, one structural edit, one
//! write.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};

const PRIORITY_HEADER: &str = "## Priority Context";
const WORKING_HEADER: &str = "## Working Memory";
const MANUAL_HEADER: &str = "## MANUAL";

lazy_static! {
    pub static ref REMEMBER_PRIORITY_RE: Regex =
        Regex::new(r"(?si)<remember\s+priority>(.*?)</remember>").unwrap();
    pub static ref REMEMBER_RE: Regex = Regex::new(r"(?si)<remember>(.*?)</remember>").unwrap();
}

fn notepad_path(omc_root: &Path) -> PathBuf {
    omc_root.join("notepad.md")
}

struct Sections {
    priority: String,
    working: Vec<String>,
    manual: String,
}

fn section_body(content: &str, header: &str, next_headers: &[&str]) -> String {
    let Some(start) = content.find(header) else { return String::new() };
    let after_header = &content[start + header.len()..];
    let end = next_headers
        .iter()
        .filter_map(|h| after_header.find(h))
        .min()
        .unwrap_or(after_header.len());
    after_header[..end].trim().to_string()
}

fn parse(content: &str) -> Sections {
    let priority = section_body(content, PRIORITY_HEADER, &[WORKING_HEADER, MANUAL_HEADER]);
    let working_body = section_body(content, WORKING_HEADER, &[MANUAL_HEADER]);
    let working = working_body
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("- "))
        .map(|l| l.trim_start_matches("- ").to_string())
        .collect();
    let manual = section_body(content, MANUAL_HEADER, &[]);
    Sections { priority, working, manual }
}

fn render(sections: &Sections) -> String {
    let mut out = String::new();
    out.push_str(PRIORITY_HEADER);
    out.push('\n');
    if sections.priority.is_empty() {
        out.push('\n');
    } else {
        out.push_str(&sections.priority);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(WORKING_HEADER);
    out.push('\n');
    for entry in &sections.working {
        out.push_str("- ");
        out.push_str(entry);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(MANUAL_HEADER);
    out.push('\n');
    out.push_str(&sections.manual);
    out.push('\n');
    out
}

fn read_sections(omc_root: &Path) -> Sections {
    match std::fs::read_to_string(notepad_path(omc_root)) {
        Ok(content) => parse(&content),
        Err(_) => Sections { priority: String::new(), working: Vec::new(), manual: String::new() },
    }
}

fn write_sections(omc_root: &Path, sections: &Sections) {
    let _ = std::fs::write(notepad_path(omc_root), render(sections));
}

/// Overwrites the Priority Context section.
pub fn set_priority_context(omc_root: &Path, content: &str) {
    let mut sections = read_sections(omc_root);
    sections.priority = content.trim().to_string();
    write_sections(omc_root, &sections);
}

/// Appends one entry to Working Memory.
pub fn add_working_memory_entry(omc_root: &Path, content: &str) {
    let mut sections = read_sections(omc_root);
    sections.working.push(content.trim().to_string());
    write_sections(omc_root, &sections);
}

pub fn read_priority_context(omc_root: &Path) -> String {
    read_sections(omc_root).priority
}

pub fn read_working_memory(omc_root: &Path) -> Vec<String> {
    read_sections(omc_root).working
}

/// Scans tool output for `<remember priority>` and `<remember>` tags and
/// applies them to the notepad in one read-edit-write cycle each.
pub fn process_remember_tags(omc_root: &Path, output: &str) {
    for cap in REMEMBER_PRIORITY_RE.captures_iter(output) {
        let content = cap.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        if !content.is_empty() {
            set_priority_context(omc_root, content);
        }
    }
    for cap in REMEMBER_RE.captures_iter(output) {
        let content = cap.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        if !content.is_empty() {
            add_working_memory_entry(omc_root, content);
        }
    }
}
