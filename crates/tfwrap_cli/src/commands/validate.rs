//! Validate command - Validate the configuration.

use anyhow::Result;
use clap::Args;
use tracing::info;

use tfwrap_core::ValidateOptions;

use super::GlobalArgs;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Machine-readable output
    #[arg(long)]
    json: bool,
}

pub async fn execute(global: &GlobalArgs, args: ValidateArgs) -> Result<()> {
    let tf = global.connect().await?;
    let opts = ValidateOptions {
        json: args.json,
        ..ValidateOptions::default()
    };
    tf.validate(&opts).await?;
    info!("Configuration is valid");
    Ok(())
}
