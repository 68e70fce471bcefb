//! Plan command - Create an execution plan.

use anyhow::Result;
use clap::Args;
use serde_json::Value;
use tracing::info;

use tfwrap_core::PlanOptions;

use super::{collect_vars, parse_var, DefaultFlagArgs, GlobalArgs};

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub defaults: DefaultFlagArgs,

    /// Plan file to write
    #[arg(long)]
    pub out: Option<String>,

    /// Plan the destruction of all resources
    #[arg(long)]
    pub destroy: bool,

    /// Only reconcile state with remote objects
    #[arg(long)]
    pub refresh_only: bool,

    /// Skip refreshing state before planning
    #[arg(long)]
    pub no_refresh: bool,

    /// Force replacement of a resource, repeatable
    #[arg(long)]
    pub replace: Vec<String>,

    /// Limit planning to a resource, repeatable
    #[arg(long)]
    pub target: Vec<String>,

    /// Input variable as KEY=VALUE, repeatable
    #[arg(long, value_parser = parse_var)]
    pub var: Vec<(String, Value)>,

    /// Variable file
    #[arg(long)]
    pub var_file: Option<String>,

    /// Machine-readable output
    #[arg(long)]
    pub json: bool,

    /// Concurrent operations
    #[arg(long)]
    pub parallelism: Option<u32>,

    /// Compact warning output
    #[arg(long)]
    pub compact_warnings: bool,

    /// Legacy local state file
    #[arg(long)]
    pub state: Option<String>,
}

impl PlanArgs {
    fn into_options(self) -> PlanOptions {
        PlanOptions {
            defaults: self.defaults.to_flags(),
            out: self.out,
            destroy: self.destroy,
            refresh: self.no_refresh.then_some(false),
            refresh_only: self.refresh_only,
            replace: self.replace,
            target: self.target,
            vars: collect_vars(self.var),
            var_file: self.var_file,
            compact_warnings: self.compact_warnings,
            json: self.json,
            parallelism: self.parallelism,
            state: self.state,
            chdir: None,
        }
    }
}

pub async fn execute(global: &GlobalArgs, args: PlanArgs) -> Result<()> {
    let tf = global.connect().await?;
    let opts = args.into_options();
    tf.plan(&opts).await?;

    let plan_file = opts.out.as_deref().unwrap_or(&tf.config().plan_file);
    info!("Plan saved to {}", plan_file);
    Ok(())
}
