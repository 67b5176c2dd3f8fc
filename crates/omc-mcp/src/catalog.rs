//! Tool catalog negotiation. Tool *execution* is out of scope (spec.md
//! §1: "the runtime does not model its internals") — this module only
//! advertises names and schemas, filtered by `OMC_DISABLE_TOOLS`.

use serde::Serialize;
use serde_json::{json, Value};

pub const CATEGORIES: &[&str] =
    &["lsp", "ast", "python", "trace", "state", "notepad", "memory", "skills", "interop"];

#[derive(Debug, Serialize)]
pub struct McpToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

struct ToolSpec {
    category: &'static str,
    name: &'static str,
    description: &'static str,
    input_schema: fn() -> Value,
}

const TOOL_SPECS: &[ToolSpec] = &[
    ToolSpec {
        category: "lsp",
        name: "lsp_definition",
        description: "Resolve a symbol's definition location via the language server",
        input_schema: || json!({"type": "object", "properties": {"path": {"type": "string"}, "symbol": {"type": "string"}}, "required": ["path", "symbol"]}),
    },
    ToolSpec {
        category: "ast",
        name: "ast_parse",
        description: "Parse a source file and return its syntax tree",
        input_schema: || json!({"type": "object", "properties": {"path": {"type": "string"}}, "required": ["path"]}),
    },
    ToolSpec {
        category: "python",
        name: "python_eval",
        description: "Evaluate an expression in the sandboxed Python REPL",
        input_schema: || json!({"type": "object", "properties": {"code": {"type": "string"}}, "required": ["code"]}),
    },
    ToolSpec {
        category: "trace",
        name: "trace_capture",
        description: "Capture a stack trace from the running target process",
        input_schema: || json!({"type": "object", "properties": {"pid": {"type": "number"}}}),
    },
    ToolSpec {
        category: "state",
        name: "state_read",
        description: "Read a runtime state file under the worktree's .omc directory",
        input_schema: || json!({"type": "object", "properties": {"relative_path": {"type": "string"}}, "required": ["relative_path"]}),
    },
    ToolSpec {
        category: "notepad",
        name: "notepad_append",
        description: "Append an entry to the Working Memory section of the notepad",
        input_schema: || json!({"type": "object", "properties": {"content": {"type": "string"}}, "required": ["content"]}),
    },
    ToolSpec {
        category: "memory",
        name: "memory_search",
        description: "Search prior session memory for related context",
        input_schema: || json!({"type": "object", "properties": {"query": {"type": "string"}}, "required": ["query"]}),
    },
    ToolSpec {
        category: "skills",
        name: "skills_list",
        description: "List skills available in the current project",
        input_schema: || json!({"type": "object", "properties": {}}),
    },
    ToolSpec {
        category: "interop",
        name: "interop_bridge",
        description: "Forward a request to an external-LLM bridge",
        input_schema: || json!({"type": "object", "properties": {"target": {"type": "string"}, "payload": {"type": "string"}}, "required": ["target", "payload"]}),
    },
];

/// Parses `OMC_DISABLE_TOOLS` into the set of excluded categories.
/// Unrecognized category names are ignored rather than rejected.
pub fn disabled_categories(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// The full catalog minus any category named in `disabled`, with every
/// tool name prefixed `mcp__t__` per the wire protocol.
pub fn build_catalog(disabled: &[String]) -> Vec<McpToolDef> {
    TOOL_SPECS
        .iter()
        .filter(|spec| !disabled.iter().any(|c| c == spec.category))
        .map(|spec| McpToolDef {
            name: format!("mcp__t__{}", spec.name),
            description: spec.description.to_string(),
            input_schema: (spec.input_schema)(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_catalog_has_one_tool_per_category() {
        let catalog = build_catalog(&[]);
        assert_eq!(catalog.len(), CATEGORIES.len());
        assert!(catalog.iter().all(|t| t.name.starts_with("mcp__t__")));
    }

    #[test]
    fn test_disabled_category_is_excluded() {
        let disabled = disabled_categories(Some("python,trace"));
        let catalog = build_catalog(&disabled);
        assert!(!catalog.iter().any(|t| t.name.contains("python_eval")));
        assert!(!catalog.iter().any(|t| t.name.contains("trace_capture")));
        assert_eq!(catalog.len(), CATEGORIES.len() - 2);
    }

    #[test]
    fn test_unset_env_disables_nothing() {
        assert!(disabled_categories(None).is_empty());
    }
}
