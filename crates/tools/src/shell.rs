//! Allowlisted shell execution inside the workspace root.

use crate::sandbox::WorkspaceGuard;
use neural_desk_core::ToolError;
use serde::Deserialize;
use serde_json::{json, Value};

const WHITELIST: &[&str] = &["ls", "pwd", "cat", "grep", "echo", "git", "head", "tail", "wc", "find"];
const BLACKLIST: &[&str] = &["sudo", "rm", "chmod", "chown", "curl", "wget", "nc", "netcat"];
const DANGEROUS_CHARS: &[char] = &['|', '&', ';', '>', '<', '`', '$', '\n', '\r', '\0'];
const GIT_ALLOWED_SUBCOMMANDS: &[&str] = &["status", "diff", "log", "show"];
const SENSITIVE_PATHS: &[&str] = &["/etc/", "/proc/", "/sys/", "/dev/"];

pub struct CommandGuard;

impl CommandGuard {
    pub fn validate(cmd: &[String]) -> Result<(), ToolError> {
        let Some(program) = cmd.first() else {
            return Err(ToolError::Validation("empty command".into()));
        };

        if BLACKLIST.iter().any(|b| program.contains(b)) {
            return Err(ToolError::SandboxViolation(format!(
                "blocked command: {program}"
            )));
        }

        let base = program.split('/').next_back().unwrap_or(program);
        if !WHITELIST.contains(&base) {
            return Err(ToolError::SandboxViolation(format!(
                "command not allowlisted: {base}"
            )));
        }

        for (idx, arg) in cmd.iter().enumerate() {
            Self::validate_argument(arg, idx == 0)?;
        }

        if base == "git" && cmd.len() > 1 {
            Self::validate_git(&cmd[1..])?;
        }

        Ok(())
    }

    fn validate_argument(arg: &str, is_program: bool) -> Result<(), ToolError> {
        for &ch in DANGEROUS_CHARS {
            if arg.contains(ch) {
                return Err(ToolError::SandboxViolation(format!(
                    "shell metacharacter in argument: {ch:?}"
                )));
            }
        }
        if arg.chars().any(|c| c.is_control() && c != '\t') {
            return Err(ToolError::SandboxViolation(
                "control character in argument".into(),
            ));
        }
        if is_program {
            return Ok(());
        }

        if arg.contains("..") {
            return Err(ToolError::SandboxViolation(
                "path traversal in argument".into(),
            ));
        }
        for &sensitive in SENSITIVE_PATHS {
            if arg.starts_with(sensitive) {
                return Err(ToolError::SandboxViolation(format!(
                    "access to sensitive path: {sensitive}"
                )));
            }
        }
        if arg.starts_with('/') {
            return Err(ToolError::SandboxViolation(
                "absolute path arguments are not allowed".into(),
            ));
        }
        if arg.starts_with("--global") || arg.starts_with("--system") || arg == "-C" {
            return Err(ToolError::SandboxViolation(format!(
                "argument not allowed: {arg}"
            )));
        }

        Ok(())
    }

    fn validate_git(args: &[String]) -> Result<(), ToolError> {
        let Some(subcommand) = args.first() else {
            return Ok(());
        };
        if !GIT_ALLOWED_SUBCOMMANDS.iter().any(|a| subcommand == a) {
            return Err(ToolError::SandboxViolation(format!(
                "git subcommand not allowed: {subcommand}"
            )));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RunShellInput {
    command: String,
}

/// Execute an allowlisted command with the workspace default root as
/// the working directory. No shell interpretation: the command line is
/// tokenized on whitespace and passed as argv.
pub async fn run_shell(guard: &WorkspaceGuard, args: &Value) -> Result<Value, ToolError> {
    let input: RunShellInput =
        serde_json::from_value(args.clone()).map_err(|e| ToolError::Validation(e.to_string()))?;

    let tokens: Vec<String> = input
        .command
        .split_whitespace()
        .map(str::to_string)
        .collect();
    CommandGuard::validate(&tokens)?;

    let output = tokio::process::Command::new(&tokens[0])
        .args(&tokens[1..])
        .current_dir(guard.default_root())
        .output()
        .await
        .map_err(|e| ToolError::Execution(format!("spawn {}: {e}", tokens[0])))?;

    Ok(json!({
        "stdout": String::from_utf8_lossy(&output.stdout),
        "stderr": String::from_utf8_lossy(&output.stderr),
        "exit_code": output.status.code().unwrap_or(-1),
    }))
}
