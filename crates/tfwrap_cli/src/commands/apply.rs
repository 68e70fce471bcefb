//! Apply command - Apply a saved plan.

use anyhow::Result;
use clap::Args;
use tracing::info;

use tfwrap_core::{ApplyOptions, ApplyOutput};

use super::{print_json, DefaultFlagArgs, GlobalArgs};

#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    defaults: DefaultFlagArgs,

    /// Plan file to apply (configured plan file when omitted)
    plan_file: Option<String>,

    /// Skip interactive approval
    #[arg(long)]
    auto_approve: bool,

    /// Stream JSON events and print the aggregated result
    #[arg(long)]
    json: bool,

    /// Concurrent operations
    #[arg(long)]
    parallelism: Option<u32>,

    /// Compact warning output
    #[arg(long)]
    compact_warnings: bool,

    /// Legacy local state file
    #[arg(long)]
    state: Option<String>,

    /// Write updated state to this path
    #[arg(long)]
    state_out: Option<String>,

    /// Backup path for the legacy local state
    #[arg(long)]
    backup: Option<String>,
}

pub async fn execute(global: &GlobalArgs, args: ApplyArgs) -> Result<()> {
    let tf = global.connect().await?;
    let opts = ApplyOptions {
        defaults: args.defaults.to_flags(),
        plan_file: args.plan_file,
        auto_approve: args.auto_approve,
        compact_warnings: args.compact_warnings,
        json: args.json,
        parallelism: args.parallelism,
        state: args.state,
        state_out: args.state_out,
        backup: args.backup,
        chdir: None,
    };

    match tf.apply(&opts).await? {
        ApplyOutput::Events(result) => print_json(&result)?,
        ApplyOutput::Applied => info!("Apply complete"),
    }
    Ok(())
}
