//! Fmt command - Format configuration files.

use anyhow::Result;
use clap::Args;

use tfwrap_core::FmtOptions;

use super::GlobalArgs;

#[derive(Args, Debug)]
pub struct FmtArgs {
    /// Only check formatting; fail if files need changes
    #[arg(long)]
    check: bool,

    /// Show formatting differences
    #[arg(long)]
    diff: bool,

    /// Process subdirectories too
    #[arg(long)]
    recursive: bool,

    /// Do not list reformatted files
    #[arg(long)]
    no_list: bool,

    /// Do not write changes to files
    #[arg(long)]
    no_write: bool,
}

pub async fn execute(global: &GlobalArgs, args: FmtArgs) -> Result<()> {
    let tf = global.connect().await?;
    let opts = FmtOptions {
        list: !args.no_list,
        diff: args.diff,
        write: !args.no_write,
        check: args.check,
        recursive: args.recursive,
        chdir: None,
    };
    tf.fmt(&opts).await?;
    Ok(())
}
