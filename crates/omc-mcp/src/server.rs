//! The stdio request loop. Catalog negotiation only: `initialize`,
//! `tools/list`, and `shutdown` are fully handled here; `tools/call`
//! always errors, since tool execution is modeled as an external
//! collaborator (spec.md §1).

use crate::catalog::build_catalog;
use crate::rpc::{JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, METHOD_NOT_FOUND, PARSE_ERROR};
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::{debug, error, info};

const PROTOCOL_VERSION: &str = "2024-11-05";

fn handle_request(request: JsonRpcRequest, disabled: &[String]) -> Option<JsonRpcResponse> {
    let id = request.id.clone();

    match request.method.as_str() {
        "initialize" => Some(JsonRpcResponse::ok(
            id,
            serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {"tools": {}},
                "serverInfo": {"name": "omc-mcp", "version": env!("CARGO_PKG_VERSION")},
            }),
        )),
        "notifications/initialized" => None,
        "tools/list" => {
            let tools = build_catalog(disabled);
            Some(JsonRpcResponse::ok(id, serde_json::json!({"tools": tools})))
        }
        "tools/call" => Some(JsonRpcResponse::err(
            id,
            INTERNAL_ERROR,
            "tool execution is out of scope for this catalog server",
        )),
        "shutdown" => Some(JsonRpcResponse::ok(id, serde_json::json!({}))),
        other => Some(JsonRpcResponse::err(id, METHOD_NOT_FOUND, format!("Method not found: {other}"))),
    }
}

fn write_response(out: &mut impl Write, response: &JsonRpcResponse) -> std::io::Result<()> {
    let line = serde_json::to_string(response).unwrap_or_else(|_| {
        r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"serialization failure"},"id":null}"#
            .to_string()
    });
    writeln!(out, "{line}")?;
    out.flush()
}

/// Runs the request loop until stdin closes. `omc_root` is accepted so a
/// future per-session lock check has somewhere to look, per spec.md §5's
/// "validates a per-session lock before executing" — catalog negotiation
/// itself needs no lock since it never touches shared state.
pub fn run(disabled: &[String], _omc_root: &Path) -> std::io::Result<()> {
    info!("omc-mcp catalog server starting on stdio");
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        debug!(request = trimmed, "received");

        let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
            Ok(req) => req,
            Err(e) => {
                error!(error = %e, "failed to parse JSON-RPC request");
                write_response(&mut stdout, &JsonRpcResponse::err(None, PARSE_ERROR, format!("Parse error: {e}")))?;
                continue;
            }
        };

        let is_shutdown = request.method == "shutdown";
        if let Some(response) = handle_request(request, disabled) {
            write_response(&mut stdout, &response)?;
        }
        if is_shutdown {
            break;
        }
    }

    info!("omc-mcp catalog server shutting down");
    Ok(())
}
