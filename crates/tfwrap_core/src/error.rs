//! Error types for the wrapper.

use std::fmt;

use thiserror::Error;

use crate::commands::Subcommand;

/// Result type alias for wrapper operations.
pub type IacResult<T> = Result<T, IacError>;

/// Details of a failed engine invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandFailure {
    /// Subcommand name, e.g. `plan`
    pub command: String,
    /// Captured stderr of the engine
    pub stderr: String,
    /// Elapsed time in seconds
    pub duration: f64,
}

impl CommandFailure {
    pub fn new(command: impl Into<String>, stderr: impl Into<String>, duration: f64) -> Self {
        Self {
            command: command.into(),
            stderr: stderr.into(),
            duration,
        }
    }
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            write!(f, "`{}` failed after {:.2}s", self.command, self.duration)
        } else {
            write!(f, "`{}` failed after {:.2}s: {}", self.command, self.duration, stderr)
        }
    }
}

/// Errors that can occur while driving the engine.
#[derive(Error, Debug)]
pub enum IacError {
    #[error("Terraform version query failed: {0}")]
    VersionQueryFailed(CommandFailure),

    #[error("Terraform init failed: {0}")]
    InitFailed(CommandFailure),

    #[error("Terraform get failed: {0}")]
    GetFailed(CommandFailure),

    #[error("Terraform plan failed: {0}")]
    PlanFailed(CommandFailure),

    #[error("Terraform apply failed: {0}")]
    ApplyFailed(CommandFailure),

    #[error("Terraform destroy failed: {0}")]
    DestroyFailed(CommandFailure),

    #[error("Terraform fmt failed: {0}")]
    FormatFailed(CommandFailure),

    #[error("Terraform validate failed: {0}")]
    ValidateFailed(CommandFailure),

    #[error("Terraform output failed: {0}")]
    OutputFailed(CommandFailure),

    #[error("Terraform login failed: {0}")]
    LoginFailed(CommandFailure),

    #[error("Terraform logout failed: {0}")]
    LogoutFailed(CommandFailure),

    #[error("Terraform command failed: {0}")]
    CommandFailed(CommandFailure),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Runner error: {0}")]
    Runner(#[from] tfwrap_runner::RunnerError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl IacError {
    /// Build the failure kind belonging to `subcommand`.
    pub fn from_failure(subcommand: Subcommand, failure: CommandFailure) -> Self {
        match subcommand {
            Subcommand::Version => Self::VersionQueryFailed(failure),
            Subcommand::Init => Self::InitFailed(failure),
            Subcommand::Get => Self::GetFailed(failure),
            Subcommand::Plan => Self::PlanFailed(failure),
            Subcommand::Apply => Self::ApplyFailed(failure),
            Subcommand::Destroy => Self::DestroyFailed(failure),
            Subcommand::Fmt => Self::FormatFailed(failure),
            Subcommand::Validate => Self::ValidateFailed(failure),
            Subcommand::Output => Self::OutputFailed(failure),
            Subcommand::Login => Self::LoginFailed(failure),
            Subcommand::Logout => Self::LogoutFailed(failure),
            Subcommand::Show => Self::CommandFailed(failure),
        }
    }

    /// The engine failure carried by this error, if any.
    pub fn failure(&self) -> Option<&CommandFailure> {
        match self {
            Self::VersionQueryFailed(f)
            | Self::InitFailed(f)
            | Self::GetFailed(f)
            | Self::PlanFailed(f)
            | Self::ApplyFailed(f)
            | Self::DestroyFailed(f)
            | Self::FormatFailed(f)
            | Self::ValidateFailed(f)
            | Self::OutputFailed(f)
            | Self::LoginFailed(f)
            | Self::LogoutFailed(f)
            | Self::CommandFailed(f) => Some(f),
            _ => None,
        }
    }
}
