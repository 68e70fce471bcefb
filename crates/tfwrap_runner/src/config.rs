//! Execution request and executor configuration types.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single command invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecRequest {
    /// Program to run (e.g. `terraform`)
    pub program: String,
    /// Arguments passed to the program, in order
    pub args: Vec<String>,
    /// Working directory for the process
    pub cwd: Option<PathBuf>,
    /// Human-readable title used in logs
    pub title: Option<String>,
    /// Extra environment variables for the child process only
    pub env: BTreeMap<String, String>,
    /// Whether to echo output lines to the terminal as they arrive
    pub echo_output: bool,
    /// Inherit stdin so the program can prompt; otherwise stdin is `/dev/null`
    #[serde(default)]
    pub interactive: bool,
}

impl ExecRequest {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            title: None,
            env: BTreeMap::new(),
            echo_output: true,
            interactive: false,
        }
    }

    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn echo_output(mut self, echo: bool) -> Self {
        self.echo_output = echo;
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Render the request as a single command line for logging.
    pub fn command_line(&self) -> String {
        let mut cmd = self.program.clone();
        for arg in &self.args {
            if arg.contains(' ') {
                cmd.push_str(&format!(" '{}'", arg));
            } else {
                cmd.push(' ');
                cmd.push_str(arg);
            }
        }
        cmd
    }
}

/// Process executor options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorOptions {
    /// Timeout in seconds (0 = no timeout)
    pub timeout_seconds: u64,
    /// CI mode (prefix echoed lines with timestamp and stream)
    pub ci_mode: bool,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 0,
            ci_mode: std::env::var("CI").is_ok(),
        }
    }
}

impl ExecutorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn ci_mode(mut self) -> Self {
        self.ci_mode = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_request_builder() {
        let request = ExecRequest::new("terraform")
            .arg("plan")
            .arg("-out=plan.tfplan")
            .cwd("/work")
            .title("Terraform plan")
            .env("TF_IN_AUTOMATION", "1")
            .echo_output(false);

        assert_eq!(request.args, vec!["plan", "-out=plan.tfplan"]);
        assert_eq!(request.cwd, Some(PathBuf::from("/work")));
        assert_eq!(request.title.as_deref(), Some("Terraform plan"));
        assert_eq!(request.env.get("TF_IN_AUTOMATION"), Some(&"1".to_string()));
        assert!(!request.echo_output);
        assert!(!request.interactive);
        assert!(request.clone().interactive(true).interactive);
    }

    #[test]
    fn test_command_line_quotes_spaces() {
        let request = ExecRequest::new("terraform")
            .arg("-var")
            .arg("name=\"two words\"");

        assert_eq!(
            request.command_line(),
            "terraform -var 'name=\"two words\"'"
        );
    }

    #[test]
    fn test_executor_options() {
        let options = ExecutorOptions::new().timeout(30).ci_mode();
        assert_eq!(options.timeout_seconds, 30);
        assert!(options.ci_mode);
    }
}
