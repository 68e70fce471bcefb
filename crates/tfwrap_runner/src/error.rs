//! Error types for the runner module.

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur while executing a command.
///
/// A non-zero exit code is not an error at this layer; it is reported through
/// [`ExecutionResult::exit_code`](crate::ExecutionResult) and interpreted by
/// the caller.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Program not found: {0}")]
    ProgramNotFound(String),

    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Command timeout after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
