//! CLI command definitions.
//!
//! Each subcommand maps to one wrapper operation. Global options build the
//! [`WrapperConfig`] shared by every command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use tfwrap_core::{DefaultFlags, Terraform, Variables, WrapperConfig};
use tfwrap_runner::{ExecutorOptions, ProcessExecutor};

pub mod apply;
pub mod destroy;
pub mod fmt;
pub mod get;
pub mod init;
pub mod login;
pub mod output;
pub mod plan;
pub mod show;
pub mod validate;
pub mod version;

/// tfwrap - typed Terraform CLI wrapper
#[derive(Parser)]
#[command(name = "tfwrap")]
#[command(version, about = "tfwrap - typed Terraform CLI wrapper")]
#[command(long_about = r#"
tfwrap drives the Terraform CLI with consistent defaults: non-interactive
input, a fixed plan file, version-gated flags and structured apply results.

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  5 - Terraform failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// YAML configuration file
    #[arg(short, long, global = true, env = "TFWRAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Terraform working directory
    #[arg(long, global = true)]
    pub chdir: Option<PathBuf>,

    /// Workspace name attached to log records
    #[arg(long, global = true)]
    pub workspace: Option<String>,

    /// Terraform binary
    #[arg(long, global = true, env = "TFWRAP_TERRAFORM")]
    pub binary: Option<String>,

    /// Disable colored Terraform output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Do not hold the state lock
    #[arg(long, global = true)]
    pub no_lock: bool,

    /// Seconds to retry acquiring the state lock
    #[arg(long, global = true)]
    pub lock_timeout: Option<u64>,

    /// Kill Terraform after this many seconds
    #[arg(long, global = true, default_value_t = 0)]
    pub timeout: u64,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Configuration file merged with command-line overrides.
    pub fn wrapper_config(&self) -> Result<WrapperConfig> {
        let mut config = match &self.config {
            Some(path) => WrapperConfig::from_yaml_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => WrapperConfig::default(),
        };

        if let Some(dir) = &self.chdir {
            config.working_dir = Some(dir.clone());
        }
        if let Some(workspace) = &self.workspace {
            config.workspace = workspace.clone();
        }
        if let Some(binary) = &self.binary {
            config.binary = binary.clone();
        }
        if self.no_color {
            config.color = false;
        }
        if self.no_lock {
            config.lock = false;
        }
        if let Some(seconds) = self.lock_timeout {
            config.lock_timeout = seconds;
        }
        Ok(config)
    }

    /// Build a wrapper backed by real processes.
    pub async fn connect(&self) -> Result<Terraform> {
        let config = self.wrapper_config()?;
        debug!("Using configuration: {:?}", config);

        let executor = ProcessExecutor::new(ExecutorOptions::new().timeout(self.timeout));
        Terraform::new(Arc::new(executor), config)
            .await
            .context("Failed to detect the Terraform version")
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the detected Terraform version
    Version,

    /// Initialize a working directory
    Init(init::InitArgs),

    /// Download modules
    Get(get::GetArgs),

    /// Create an execution plan
    Plan(plan::PlanArgs),

    /// Apply a saved plan
    Apply(apply::ApplyArgs),

    /// Destroy managed infrastructure
    Destroy(destroy::DestroyArgs),

    /// Show a plan or state file
    Show(show::ShowArgs),

    /// Format configuration files
    Fmt(fmt::FmtArgs),

    /// Validate the configuration
    Validate(validate::ValidateArgs),

    /// Read output values
    Output(output::OutputArgs),

    /// Obtain an API token for a remote host
    Login(login::LoginArgs),

    /// Remove a stored API token
    Logout(login::LoginArgs),
}

/// Per-call overrides of the shared default flags.
#[derive(Args, Debug, Clone, Default)]
pub struct DefaultFlagArgs {
    /// Allow interactive prompts
    #[arg(long)]
    pub input: bool,
}

impl DefaultFlagArgs {
    pub fn to_flags(&self) -> DefaultFlags {
        DefaultFlags {
            input: self.input.then_some(true),
            ..DefaultFlags::default()
        }
    }
}

/// Error for a malformed `--var` argument.
#[derive(Debug, thiserror::Error)]
#[error("invalid variable '{0}', expected KEY=VALUE")]
pub struct VarParseError(pub String);

/// Parse `KEY=VALUE`; the value is read as JSON when it parses, else as a string.
pub fn parse_var(raw: &str) -> Result<(String, Value), VarParseError> {
    let (key, value) = raw
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| VarParseError(raw.to_string()))?;

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

pub fn collect_vars(vars: Vec<(String, Value)>) -> Variables {
    vars.into_iter().collect()
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
