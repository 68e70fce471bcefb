//! Command executor trait and types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ExecRequest;
use crate::error::RunnerResult;

/// Result of a command execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Identifier for correlating log lines of one invocation
    pub invocation_id: String,
    /// Exit code of the process (-1 if killed by a signal)
    pub exit_code: i32,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Execution start time
    pub started_at: DateTime<Utc>,
    /// Execution end time
    pub finished_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Value returned by the completion hook, if one was installed
    pub callback_output: Option<serde_json::Value>,
}

impl ExecutionResult {
    /// Check if execution was successful (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Duration in fractional seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }

    /// Get combined output (stdout + stderr).
    pub fn combined_output(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Output stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl std::fmt::Display for OutputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// A single line of process output.
#[derive(Debug, Clone)]
pub struct OutputLine {
    pub timestamp: DateTime<Utc>,
    pub stream: OutputStream,
    pub message: String,
}

impl OutputLine {
    pub fn stdout(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            stream: OutputStream::Stdout,
            message: message.into(),
        }
    }

    pub fn stderr(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            stream: OutputStream::Stderr,
            message: message.into(),
        }
    }
}

/// Hooks invoked by an executor while a command runs.
///
/// `on_line` is called once per output line, synchronously and in the order
/// the lines were read. `on_complete` is called exactly once after the process
/// exits; its return value ends up in [`ExecutionResult::callback_output`].
pub trait ExecHooks: Send {
    fn on_line(&mut self, _line: &OutputLine) {}

    fn on_complete(&mut self, _stdout: &str, _stderr: &str) -> Option<serde_json::Value> {
        None
    }
}

/// Executes external commands.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run the request to completion, feeding output lines to `hooks`.
    async fn execute(
        &self,
        request: &ExecRequest,
        hooks: Option<&mut dyn ExecHooks>,
    ) -> RunnerResult<ExecutionResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(exit_code: i32, stdout: &str, stderr: &str) -> ExecutionResult {
        ExecutionResult {
            invocation_id: "test".to_string(),
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            duration_ms: 1500,
            callback_output: None,
        }
    }

    #[test]
    fn test_success_and_duration() {
        let ok = result(0, "out", "");
        assert!(ok.success());
        assert!((ok.duration_secs() - 1.5).abs() < f64::EPSILON);

        let failed = result(1, "", "boom");
        assert!(!failed.success());
    }

    #[test]
    fn test_combined_output() {
        assert_eq!(result(0, "a", "").combined_output(), "a");
        assert_eq!(result(0, "", "b").combined_output(), "b");
        assert_eq!(result(0, "a", "b").combined_output(), "a\nb");
    }
}
