//! Show command - Inspect a plan or state file.

use anyhow::Result;
use clap::Args;

use tfwrap_core::{QueryOutput, ShowOptions};

use super::{print_json, GlobalArgs};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Plan or state file (configured plan file when omitted)
    file: Option<String>,

    /// Print human-readable output instead of JSON
    #[arg(long)]
    no_json: bool,
}

pub async fn execute(global: &GlobalArgs, args: ShowArgs) -> Result<()> {
    let tf = global.connect().await?;
    let opts = ShowOptions {
        file: args.file,
        json: !args.no_json,
        ..ShowOptions::default()
    };

    match tf.show(&opts).await? {
        QueryOutput::Json(value) => print_json(&value)?,
        QueryOutput::Text(text) => print!("{}", text),
    }
    Ok(())
}
