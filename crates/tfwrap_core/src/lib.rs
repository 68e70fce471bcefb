//! # tfwrap_core
//!
//! Typed wrapper around the Terraform CLI.
//!
//! This crate turns typed option structs into engine argument vectors,
//! gates flags on the detected engine version, runs the engine through a
//! [`tfwrap_runner::CommandExecutor`] and interprets the result.
//!
//! ## Features
//!
//! - Closed registry of engine flags with a single argument builder
//! - Per-instance defaults for color, locking and input, overridable per call
//! - Version detection with feature gating (`plan -json`, `-refresh-only`)
//! - Aggregation of the `apply -json` event stream
//! - YAML configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tfwrap_core::{ApplyOptions, PlanOptions, Terraform, WrapperConfig};
//! use tfwrap_runner::ProcessExecutor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WrapperConfig::new().with_working_dir("./infra");
//!     let tf = Terraform::new(Arc::new(ProcessExecutor::default()), config).await?;
//!
//!     tf.plan(&PlanOptions::default().var("bucket_name", "test_bucket")).await?;
//!     let applied = tf.apply(&ApplyOptions::default().auto_approve().json()).await?;
//!     println!("{:?}", applied);
//!
//!     Ok(())
//! }
//! ```

pub mod args;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod options;
pub mod terraform;
pub mod vars;
pub mod version;

pub use args::{shell_quote, ArgumentVector};
pub use commands::{
    ApplyOptions, DefaultFlags, DestroyOptions, FmtOptions, GetOptions, InitOptions, LoginOptions,
    OutputOptions, PlanOptions, ShowOptions, Subcommand, ValidateOptions,
};
pub use config::WrapperConfig;
pub use error::{CommandFailure, IacError, IacResult};
pub use events::{AggregatedApplyResult, AggregatorState, ApplyEventAggregator};
pub use options::{build_arg, ArgValue, FlagKind, TfOption};
pub use terraform::{ApplyOutput, QueryOutput, Terraform};
pub use vars::Variables;
pub use version::{EngineVersion, Feature, MinVersion, VersionGate};
