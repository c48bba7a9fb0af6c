use serde::Serialize;

use crate::error::ErrorKind;
use crate::executor::ExecutionResult;

pub const SHELL_ACTION: &str = "Shell Command";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellFailure {
    pub kind: ErrorKind,
    pub message: String,
}

/// Raw result of one subprocess attempt, before it is turned into an [`ExecutionResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellOutcome {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
    pub failure: Option<ShellFailure>,
}

impl ShellOutcome {
    pub fn success(stdout: String, stderr: String, duration_ms: u64) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration_ms,
            failure: None,
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            duration_ms: 0,
            failure: Some(ShellFailure {
                kind,
                message: message.into(),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Renders the outcome for humans and TTS: timeouts and missing commands
    /// read differently, not just carry different codes.
    pub fn into_result(self, command: &str) -> ExecutionResult {
        let Some(failure) = self.failure else {
            let out = self.stdout.trim_end();
            let text = if out.trim().is_empty() {
                "Command executed successfully".to_string()
            } else {
                out.to_string()
            };
            return ExecutionResult::ok(SHELL_ACTION, text);
        };

        let stderr = self.stderr.trim();
        let detail = if stderr.is_empty() {
            failure.message.as_str()
        } else {
            stderr
        };
        let text = match failure.kind {
            ErrorKind::CommandTimeout => format!("Command timed out: {}", failure.message),
            ErrorKind::CommandNotFound => {
                let base = command.split_whitespace().next().unwrap_or(command);
                format!("Command not found: {base}")
            }
            ErrorKind::PermissionDenied => format!("Permission denied: {detail}"),
            _ => detail.to_string(),
        };
        ExecutionResult::failed(SHELL_ACTION, text, failure.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stdout_gets_generic_message() {
        let r = ShellOutcome::success(String::new(), String::new(), 3).into_result("touch x");
        assert!(r.success);
        assert_eq!(r.result_text, "Command executed successfully");
        assert_eq!(r.action, SHELL_ACTION);
    }

    #[test]
    fn failures_prefer_stderr() {
        let mut o = ShellOutcome::failure(ErrorKind::CommandFailed, "exit status 2");
        o.stderr = "ls: cannot access 'nope'\n".into();
        assert_eq!(o.clone().into_result("ls nope").result_text, "ls: cannot access 'nope'");

        o.stderr.clear();
        assert_eq!(o.into_result("ls nope").result_text, "exit status 2");
    }

    #[test]
    fn timeout_and_not_found_read_differently() {
        let t = ShellOutcome::failure(ErrorKind::CommandTimeout, "no output after 10s")
            .into_result("ping example.com");
        let n = ShellOutcome::failure(ErrorKind::CommandNotFound, "exit status 127")
            .into_result("frobnicate --all");
        assert!(t.result_text.contains("timed out"));
        assert_eq!(n.result_text, "Command not found: frobnicate");
        assert_eq!(t.error_code, Some(ErrorKind::CommandTimeout));
        assert_eq!(n.error_code, Some(ErrorKind::CommandNotFound));
    }
}
