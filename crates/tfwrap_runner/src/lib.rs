//! # tfwrap_runner
//!
//! Subprocess execution layer for tfwrap.
//!
//! The engine wrapper never spawns processes itself; it hands an
//! [`ExecRequest`] to a [`CommandExecutor`] and receives an
//! [`ExecutionResult`] back.
//!
//! # Features
//!
//! - **Process Executor**: tokio-based subprocess execution with line streaming
//! - **Hooks**: per-line and completion callbacks, invoked in stream order
//! - **Timeouts**: optional kill after a configured number of seconds
//! - **CI Integration**: timestamped output echo for CI logs
//! - **Mock Executor**: for testing without the real binary
//!
//! # Example
//!
//! ```rust,no_run
//! use tfwrap_runner::{CommandExecutor, ExecRequest, ExecutorOptions, ProcessExecutor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let executor = ProcessExecutor::new(ExecutorOptions::default());
//!
//!     let request = ExecRequest::new("terraform")
//!         .arg("version")
//!         .arg("-json")
//!         .echo_output(false);
//!
//!     let result = executor.execute(&request, None).await?;
//!     println!("Exit code: {}", result.exit_code);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod mock;
pub mod process;

pub use config::{ExecRequest, ExecutorOptions};
pub use error::{RunnerError, RunnerResult};
pub use executor::{CommandExecutor, ExecHooks, ExecutionResult, OutputLine, OutputStream};
pub use mock::{CapturedCall, MockExecutor, MockResponse};
pub use process::ProcessExecutor;
