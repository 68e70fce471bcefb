//! tfwrap CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 5: Terraform failure

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tfwrap_core::IacError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const ENGINE_FAILURE: u8 = 5;
}

const DEFAULT_LOG_FILTER: &str = "tfwrap=info,warn";

fn init_logging(json: bool, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tfwrap=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    // Logging may already be initialized
    let _ = tracing_subscriber::registry()
        .with(json.then(|| fmt::layer().json().with_current_span(true)))
        .with((!json).then(|| fmt::layer().with_target(false)))
        .with(filter)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.json_logs, cli.global.verbose);

    let global = cli.global;
    let result = match cli.command {
        Commands::Version => commands::version::execute(&global).await,
        Commands::Init(args) => commands::init::execute(&global, args).await,
        Commands::Get(args) => commands::get::execute(&global, args).await,
        Commands::Plan(args) => commands::plan::execute(&global, args).await,
        Commands::Apply(args) => commands::apply::execute(&global, args).await,
        Commands::Destroy(args) => commands::destroy::execute(&global, args).await,
        Commands::Show(args) => commands::show::execute(&global, args).await,
        Commands::Fmt(args) => commands::fmt::execute(&global, args).await,
        Commands::Validate(args) => commands::validate::execute(&global, args).await,
        Commands::Output(args) => commands::output::execute(&global, args).await,
        Commands::Login(args) => commands::login::login(&global, args).await,
        Commands::Logout(args) => commands::login::logout(&global, args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<IacError>() {
        Some(IacError::UnknownOption(_)) => ExitCodes::INVALID_ARGS,
        Some(err) if err.failure().is_some() => ExitCodes::ENGINE_FAILURE,
        _ => ExitCodes::GENERAL_ERROR,
    }
}
