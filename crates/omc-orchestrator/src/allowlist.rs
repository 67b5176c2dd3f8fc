//! Path classification for the delegation guard (spec.md §4.10).

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    /// Paths the orchestrator is allowed to write directly.
    static ref ALLOWED_PATH_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"^\.omc/").unwrap(),
        Regex::new(r"^\.claude/").unwrap(),
        Regex::new(r"^~?/\.claude/").unwrap(),
        Regex::new(r"/\.claude/").unwrap(),
        Regex::new(r"CLAUDE\.md$").unwrap(),
        Regex::new(r"AGENTS\.md$").unwrap(),
        Regex::new(r"\.mcp\.json$").unwrap(),
    ];

    static ref WRITE_EDIT_TOOLS: Vec<&'static str> = vec!["Write", "Edit", "write", "edit"];

    static ref SOURCE_EXTENSIONS: Vec<&'static str> = vec![
        ".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs",
        ".py", ".pyw",
        ".go",
        ".rs",
        ".java", ".kt", ".scala",
        ".c", ".cpp", ".cc", ".h", ".hpp",
        ".rb",
        ".php",
        ".swift",
        ".svelte", ".vue",
        ".graphql", ".gql",
        ".sh", ".bash", ".zsh",
    ];
}

/// An empty path is treated as allowed: there's nothing to delegate.
pub fn is_allowed_path(file_path: &str) -> bool {
    if file_path.is_empty() {
        return true;
    }
    ALLOWED_PATH_PATTERNS.iter().any(|p| p.is_match(file_path))
}

pub fn is_source_file(file_path: &str) -> bool {
    if file_path.is_empty() {
        return false;
    }
    let ext = Path::new(file_path)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    if ext.is_empty() {
        return false;
    }
    SOURCE_EXTENSIONS.iter().any(|e| *e == format!(".{ext}"))
}

pub fn is_write_edit_tool(tool_name: &str) -> bool {
    WRITE_EDIT_TOOLS.contains(&tool_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_paths() {
        assert!(is_allowed_path(".omc/plans/a.md"));
        assert!(is_allowed_path(".claude/rules/a.md"));
        assert!(is_allowed_path("/home/me/.claude/rules/a.md"));
        assert!(is_allowed_path("CLAUDE.md"));
        assert!(is_allowed_path("AGENTS.md"));
        assert!(is_allowed_path(".mcp.json"));
        assert!(is_allowed_path(""));
    }

    #[test]
    fn test_disallowed_paths() {
        assert!(!is_allowed_path("src/main.rs"));
        assert!(!is_allowed_path("README.md"));
    }

    #[test]
    fn test_source_file_detection() {
        assert!(is_source_file("src/main.rs"));
        assert!(is_source_file("app.tsx"));
        assert!(!is_source_file("README.md"));
        assert!(!is_source_file(""));
    }

    #[test]
    fn test_write_edit_tool_detection() {
        assert!(is_write_edit_tool("Write"));
        assert!(is_write_edit_tool("edit"));
        assert!(!is_write_edit_tool("Bash"));
    }
}
