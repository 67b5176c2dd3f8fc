//! Single-shot hook bridge binary (spec.md §4.12). Invoked once per host
//! lifecycle event; reads stdin, dispatches, writes exactly one line of
//! JSON to stdout, and never lets a panic or internal error escape
//! without a pass-through.

use clap::Parser;
use omc_hooks::{normalize_keys, HookEvent, HookOutput};

mod dispatch;
mod stdin_reader;

#[derive(Parser)]
#[command(name = "omc-hub", about = "Multi-agent orchestration hook bridge")]
struct Cli {
    /// The lifecycle event this invocation was triggered for, e.g.
    /// `UserPromptSubmit` or `user_prompt_submit`.
    hook_type: String,
}

fn run(hook_type: &str) -> (HookOutput, Option<String>) {
    let Some(event) = HookEvent::parse(hook_type) else {
        return (HookOutput::PassThrough, None);
    };

    let Some(raw) = stdin_reader::read_stdin_bounded() else {
        return (HookOutput::PassThrough, None);
    };

    let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&raw) else {
        return (HookOutput::PassThrough, None);
    };

    let normalized = normalize_keys(&parsed);
    dispatch::dispatch(event, &normalized)
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();

    let (output, hard_block) = std::panic::catch_unwind(|| run(&cli.hook_type))
        .unwrap_or((HookOutput::PassThrough, None));

    if let Some(message) = hard_block {
        eprintln!("{message}");
        println!("{}", HookOutput::PassThrough.to_line());
        std::process::exit(2);
    }

    println!("{}", output.to_line());
}
