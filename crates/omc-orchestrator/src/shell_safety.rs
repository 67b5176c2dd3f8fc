//! Shell-command safety classification for Bash-like tools (spec.md
//! §4.10 "Command safety").

const SAFE_COMMAND_PREFIXES: &[&str] = &[
    "git status",
    "git diff",
    "git log",
    "git show",
    "git branch",
    "git remote",
    "npm test",
    "npm run test",
    "tsc",
    "pytest",
    "cargo test",
    "cargo check",
    "cargo build",
    "go test",
    "go vet",
    "ls",
    "pwd",
    "cat",
    "wc",
    "grep",
];

const REJECTED_CHARS: &[char] =
    &[';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r', '\t', '*', '?', '[', ']', '{', '}', '~', '!', '#'];

fn matches_safe_prefix(command: &str) -> bool {
    let trimmed = command.trim();
    SAFE_COMMAND_PREFIXES
        .iter()
        .any(|p| trimmed == *p || trimmed.starts_with(&format!("{p} ")))
}

fn has_rejected_char(command: &str) -> bool {
    command.chars().any(|c| REJECTED_CHARS.contains(&c))
}

/// Heredoc form: `base_command <<'EOF' ... EOF`. Safe only when the base
/// command (everything before the first `<<`) is itself a safe prefix;
/// the heredoc body is exempt from the metacharacter rejection, since
/// it's quoted data, not shell syntax.
fn is_safe_heredoc(command: &str) -> bool {
    let Some(idx) = command.find("<<") else { return false };
    let base = command[..idx].trim();
    !base.is_empty() && matches_safe_prefix(base) && !has_rejected_char(base)
}

/// True if `command` is safe to run without confirmation: either it
/// matches a known-safe prefix with no shell metacharacters, or it is a
/// heredoc whose base command is itself safe.
pub fn is_safe_command(command: &str) -> bool {
    if command.contains("<<") {
        return is_safe_heredoc(command);
    }
    matches_safe_prefix(command) && !has_rejected_char(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_prefixes_pass() {
        assert!(is_safe_command("git status"));
        assert!(is_safe_command("npm test"));
        assert!(is_safe_command("pytest tests/"));
        assert!(is_safe_command("ls -la"));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(!is_safe_command("rm -rf /"));
        assert!(!is_safe_command("curl http://example.com"));
    }

    #[test]
    fn test_metacharacters_reject_even_safe_prefix() {
        assert!(!is_safe_command("git status; rm -rf /"));
        assert!(!is_safe_command("git status && rm -rf /"));
        assert!(!is_safe_command("npm test $(rm -rf /)"));
        assert!(!is_safe_command("ls `whoami`"));
    }

    #[test]
    fn test_safe_heredoc_with_safe_base() {
        assert!(is_safe_command("cat <<'EOF'\nrm -rf /\nEOF"));
    }

    #[test]
    fn test_heredoc_with_unsafe_base_rejected() {
        assert!(!is_safe_command("rm <<'EOF'\nstuff\nEOF"));
    }
}
