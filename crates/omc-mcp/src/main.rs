//! `omc-mcp`: long-lived MCP catalog server, launched as a child process
//! by the host and talked to over stdio.

use omc_core::{get_omc_root, resolve_worktree_root};
use omc_mcp::{disabled_categories, run};
use std::path::PathBuf;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let worktree_root = resolve_worktree_root(&cwd);
    let omc_root = get_omc_root(&worktree_root);

    let disabled = disabled_categories(std::env::var("OMC_DISABLE_TOOLS").ok().as_deref());

    if let Err(e) = run(&disabled, &omc_root) {
        tracing::error!(error = %e, "omc-mcp server exited with error");
        std::process::exit(1);
    }
}
