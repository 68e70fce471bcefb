//! Mock command executor for testing.
//!
//! Provides a configurable mock implementation of the CommandExecutor trait
//! for use in tests without requiring the real engine binary.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::config::ExecRequest;
use crate::error::{RunnerError, RunnerResult};
use crate::executor::{CommandExecutor, ExecHooks, ExecutionResult, OutputLine};

/// Predefined mock response for a command execution.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl MockResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
            duration_ms: 100,
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
            duration_ms: 100,
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }
}

/// Captured call information for verification.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub title: Option<String>,
    pub env: BTreeMap<String, String>,
    pub echo_output: bool,
    pub interactive: bool,
    pub had_hooks: bool,
}

impl CapturedCall {
    /// First argument, i.e. the subcommand.
    pub fn subcommand(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

/// Mock command executor for testing.
///
/// Captures every request and replays predefined responses in order (cycling
/// when exhausted). Stdout of a response is fed line by line to the hooks, so
/// streaming consumers see the same sequence they would from a real process.
#[derive(Clone, Default)]
pub struct MockExecutor {
    responses: Arc<RwLock<Vec<MockResponse>>>,
    response_index: Arc<AtomicUsize>,
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
    simulate_failure: Arc<RwLock<Option<String>>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mock response for the next execute call.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.write().push(response);
        self
    }

    /// Set multiple responses.
    pub fn with_responses(self, responses: Vec<MockResponse>) -> Self {
        *self.responses.write() = responses;
        self
    }

    /// Make every execute call fail before producing a result.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        *self.simulate_failure.write() = Some(message.into());
        self
    }

    pub fn clear_calls(&self) {
        self.captured_calls.write().clear();
    }

    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    pub fn last_call(&self) -> Option<CapturedCall> {
        self.captured_calls.read().last().cloned()
    }

    /// Get calls for a specific subcommand.
    pub fn get_subcommand_calls(&self, subcommand: &str) -> Vec<CapturedCall> {
        self.captured_calls
            .read()
            .iter()
            .filter(|c| c.subcommand() == Some(subcommand))
            .cloned()
            .collect()
    }

    fn next_response(&self) -> MockResponse {
        let responses = self.responses.read();
        if responses.is_empty() {
            return MockResponse::success("");
        }
        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        responses
            .get(index % responses.len())
            .cloned()
            .unwrap_or_else(|| MockResponse::success(""))
    }

    fn check_failure(&self) -> RunnerResult<()> {
        if let Some(msg) = self.simulate_failure.read().clone() {
            return Err(RunnerError::ExecutionFailed(msg));
        }
        Ok(())
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn execute(
        &self,
        request: &ExecRequest,
        mut hooks: Option<&mut dyn ExecHooks>,
    ) -> RunnerResult<ExecutionResult> {
        self.captured_calls.write().push(CapturedCall {
            program: request.program.clone(),
            args: request.args.clone(),
            cwd: request.cwd.clone(),
            title: request.title.clone(),
            env: request.env.clone(),
            echo_output: request.echo_output,
            interactive: request.interactive,
            had_hooks: hooks.is_some(),
        });

        self.check_failure()?;

        let response = self.next_response();
        let started_at = Utc::now();
        let finished_at = started_at + chrono::Duration::milliseconds(response.duration_ms as i64);

        let mut callback_output = None;
        if let Some(hooks) = hooks.as_mut() {
            for line in response.stdout.lines() {
                hooks.on_line(&OutputLine::stdout(line));
            }
            for line in response.stderr.lines() {
                hooks.on_line(&OutputLine::stderr(line));
            }
            callback_output = hooks.on_complete(&response.stdout, &response.stderr);
        }

        Ok(ExecutionResult {
            invocation_id: format!("mock-{}", uuid::Uuid::new_v4()),
            exit_code: response.exit_code,
            stdout: response.stdout,
            stderr: response.stderr,
            started_at,
            finished_at,
            duration_ms: response.duration_ms,
            callback_output,
        })
    }
}
