//! Destroy command - Destroy managed infrastructure.

use anyhow::Result;
use clap::Args;
use serde_json::Value;

use tfwrap_core::DestroyOptions;

use super::{collect_vars, parse_var, DefaultFlagArgs, GlobalArgs};

#[derive(Args, Debug)]
pub struct DestroyArgs {
    #[command(flatten)]
    defaults: DefaultFlagArgs,

    /// Skip interactive approval
    #[arg(long)]
    auto_approve: bool,

    /// Limit destruction to a resource, repeatable
    #[arg(long)]
    target: Vec<String>,

    /// Input variable as KEY=VALUE, repeatable
    #[arg(long, value_parser = parse_var)]
    var: Vec<(String, Value)>,

    /// Variable file
    #[arg(long)]
    var_file: Option<String>,

    /// Concurrent operations
    #[arg(long)]
    parallelism: Option<u32>,
}

pub async fn execute(global: &GlobalArgs, args: DestroyArgs) -> Result<()> {
    let tf = global.connect().await?;
    let opts = DestroyOptions {
        defaults: args.defaults.to_flags(),
        target: args.target,
        vars: collect_vars(args.var),
        var_file: args.var_file,
        auto_approve: args.auto_approve,
        parallelism: args.parallelism,
        chdir: None,
    };
    tf.destroy(&opts).await?;
    Ok(())
}
