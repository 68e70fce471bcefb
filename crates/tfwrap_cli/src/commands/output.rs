//! Output command - Read output values.

use anyhow::Result;
use clap::Args;

use tfwrap_core::{OutputOptions, QueryOutput};

use super::{print_json, GlobalArgs};

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Single output to read
    name: Option<String>,

    /// Print human-readable output instead of JSON
    #[arg(long)]
    no_json: bool,

    /// Print a string output without quotes
    #[arg(long, requires = "name")]
    raw: bool,

    /// Legacy local state file
    #[arg(long)]
    state: Option<String>,
}

pub async fn execute(global: &GlobalArgs, args: OutputArgs) -> Result<()> {
    let tf = global.connect().await?;
    let opts = OutputOptions {
        name: args.name,
        json: !args.no_json && !args.raw,
        raw: args.raw,
        state: args.state,
        ..OutputOptions::default()
    };

    match tf.output(&opts).await? {
        QueryOutput::Json(value) => print_json(&value)?,
        // Echoed while running
        QueryOutput::Text(_) => {}
    }
    Ok(())
}
