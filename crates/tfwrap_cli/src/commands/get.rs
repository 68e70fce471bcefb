//! Get command - Download modules.

use anyhow::Result;
use clap::Args;

use tfwrap_core::GetOptions;

use super::GlobalArgs;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Check already-downloaded modules for updates
    #[arg(long)]
    update: bool,
}

pub async fn execute(global: &GlobalArgs, args: GetArgs) -> Result<()> {
    let tf = global.connect().await?;
    let opts = GetOptions {
        update: args.update,
        ..GetOptions::default()
    };
    tf.get(&opts).await?;
    Ok(())
}
