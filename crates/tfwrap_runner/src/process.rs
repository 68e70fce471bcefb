//! Subprocess executor built on `tokio::process`.
//!
//! Stdout and stderr are read line by line from a single task, so hook
//! callbacks observe lines in the order they were read and never run
//! concurrently with each other. Lines are decoded lossily: invalid UTF-8
//! becomes U+FFFD and never aborts the run.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::config::{ExecRequest, ExecutorOptions};
use crate::error::{RunnerError, RunnerResult};
use crate::executor::{CommandExecutor, ExecHooks, ExecutionResult, OutputLine, OutputStream};

/// Executor that spawns real processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    options: ExecutorOptions,
}

impl ProcessExecutor {
    pub fn new(options: ExecutorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    /// Echo a line to the terminal, CI-formatted if enabled.
    fn echo_line(&self, line: &OutputLine) {
        if self.options.ci_mode {
            println!(
                "[{}] [{}] {}",
                line.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                line.stream,
                line.message
            );
        } else {
            match line.stream {
                OutputStream::Stdout => println!("{}", line.message),
                OutputStream::Stderr => eprintln!("{}", line.message),
            }
        }
    }

    fn spawn(&self, request: &ExecRequest) -> RunnerResult<Child> {
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args)
            .envs(&request.env)
            .stdin(if request.interactive {
                Stdio::inherit()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(cwd) = &request.cwd {
            cmd.current_dir(cwd);
        }

        cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RunnerError::ProgramNotFound(request.program.clone())
            } else {
                RunnerError::ExecutionFailed(format!("Failed to spawn {}: {}", request.program, e))
            }
        })
    }

    /// Read both output streams to the end, then wait for the exit status.
    async fn drive(
        &self,
        child: &mut Child,
        request: &ExecRequest,
        hooks: &mut Option<&mut dyn ExecHooks>,
    ) -> RunnerResult<(i32, String, String)> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RunnerError::ExecutionFailed("stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RunnerError::ExecutionFailed("stderr was not captured".to_string()))?;

        let mut stdout_lines = BufReader::new(stdout).split(b'\n');
        let mut stderr_lines = BufReader::new(stderr).split(b'\n');
        let mut stdout_buf = String::new();
        let mut stderr_buf = String::new();
        let mut stdout_done = false;
        let mut stderr_done = false;

        while !(stdout_done && stderr_done) {
            let (stream, next) = tokio::select! {
                res = stdout_lines.next_segment(), if !stdout_done => (OutputStream::Stdout, res?),
                res = stderr_lines.next_segment(), if !stderr_done => (OutputStream::Stderr, res?),
            };

            let Some(message) = next.map(decode_line) else {
                match stream {
                    OutputStream::Stdout => stdout_done = true,
                    OutputStream::Stderr => stderr_done = true,
                }
                continue;
            };

            let buf = match stream {
                OutputStream::Stdout => &mut stdout_buf,
                OutputStream::Stderr => &mut stderr_buf,
            };
            buf.push_str(&message);
            buf.push('\n');

            let line = OutputLine {
                timestamp: Utc::now(),
                stream,
                message,
            };
            if request.echo_output {
                self.echo_line(&line);
            }
            if let Some(hooks) = hooks.as_mut() {
                hooks.on_line(&line);
            }
        }

        let status = child.wait().await.map_err(|e| {
            RunnerError::ExecutionFailed(format!("Failed to wait for process: {}", e))
        })?;

        Ok((status.code().unwrap_or(-1), stdout_buf, stderr_buf))
    }
}

/// Decode one raw line, replacing invalid UTF-8 and dropping a trailing `\r`.
fn decode_line(raw: Vec<u8>) -> String {
    let mut line = match String::from_utf8(raw) {
        Ok(line) => line,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };
    if line.ends_with('\r') {
        line.pop();
    }
    line
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(
        &self,
        request: &ExecRequest,
        mut hooks: Option<&mut dyn ExecHooks>,
    ) -> RunnerResult<ExecutionResult> {
        let invocation_id = uuid::Uuid::new_v4().to_string();
        let title = request.title.as_deref().unwrap_or(&request.program);

        info!(invocation = %invocation_id, "Running {}", title);
        debug!("Command: {}", request.command_line());

        let started_at = Utc::now();
        let mut child = self.spawn(request)?;

        let (exit_code, stdout, stderr) = if self.options.timeout_seconds > 0 {
            let limit = Duration::from_secs(self.options.timeout_seconds);
            match tokio::time::timeout(limit, self.drive(&mut child, request, &mut hooks)).await {
                Ok(outcome) => outcome?,
                Err(_) => {
                    warn!("{} timed out after {}s, killing process", title, self.options.timeout_seconds);
                    let _ = child.kill().await;
                    return Err(RunnerError::Timeout(self.options.timeout_seconds));
                }
            }
        } else {
            self.drive(&mut child, request, &mut hooks).await?
        };

        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;

        if exit_code == 0 {
            debug!("{} exited successfully in {}ms", title, duration_ms);
        } else {
            debug!("{} exited with code {} after {}ms", title, exit_code, duration_ms);
        }

        let callback_output = match hooks.as_mut() {
            Some(hooks) => hooks.on_complete(&stdout, &stderr),
            None => None,
        };

        Ok(ExecutionResult {
            invocation_id,
            exit_code,
            stdout,
            stderr,
            started_at,
            finished_at,
            duration_ms,
            callback_output,
        })
    }
}
