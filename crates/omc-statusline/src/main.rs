//! `omc-statusline --cwd <path>`: one status line to stdout, read-only.

use clap::Parser;
use omc_core::{get_omc_root, resolve_worktree_root};
use omc_statusline::render_line;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "omc-statusline", about = "Multi-agent orchestration HUD renderer")]
struct Cli {
    #[arg(long)]
    cwd: PathBuf,
}

/// The host's statusline protocol feeds the transcript path on stdin as
/// JSON (the same shape hook events use); a missing or unparsable body
/// just means no context estimate is shown.
fn transcript_path_from_stdin() -> Option<PathBuf> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf).ok()?;
    let value: serde_json::Value = serde_json::from_str(&buf).ok()?;
    let normalized = omc_hooks::normalize_keys(&value);
    normalized
        .get("transcriptPath")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
}

fn main() {
    let cli = Cli::parse();
    let worktree_root = resolve_worktree_root(&cli.cwd);
    let omc_root = get_omc_root(&worktree_root);

    let context_percent = transcript_path_from_stdin()
        .map(|p| omc_context::estimate_context_percent(&p))
        .unwrap_or(0);

    println!("{}", render_line(&worktree_root, &omc_root, context_percent));
}
