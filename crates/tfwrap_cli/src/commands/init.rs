//! Init command - Initialize a working directory.

use anyhow::Result;
use clap::Args;
use tracing::info;

use tfwrap_core::InitOptions;

use super::{DefaultFlagArgs, GlobalArgs};

#[derive(Args, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    defaults: DefaultFlagArgs,

    /// Upgrade modules and providers
    #[arg(long)]
    upgrade: bool,

    /// Ignore any saved backend configuration
    #[arg(long)]
    reconfigure: bool,

    /// Migrate state to a changed backend
    #[arg(long)]
    migrate_state: bool,

    /// Answer yes to state migration prompts
    #[arg(long)]
    force_copy: bool,

    /// Backend configuration (file or KEY=VALUE), repeatable
    #[arg(long)]
    backend_config: Vec<String>,

    /// Skip backend initialization
    #[arg(long)]
    no_backend: bool,

    /// Skip module downloads
    #[arg(long)]
    no_get: bool,

    /// Directory containing provider plugins
    #[arg(long)]
    plugin_dir: Option<String>,

    /// Copy a module into the empty working directory first
    #[arg(long)]
    from_module: Option<String>,

    /// Do not update the dependency lock file
    #[arg(long)]
    readonly: bool,
}

impl InitArgs {
    fn to_options(&self) -> InitOptions {
        InitOptions {
            defaults: self.defaults.to_flags(),
            upgrade: self.upgrade,
            reconfigure: self.reconfigure,
            migrate_state: self.migrate_state,
            force_copy: self.force_copy,
            backend: !self.no_backend,
            backend_config: self.backend_config.clone(),
            get: !self.no_get,
            plugin_dir: self.plugin_dir.clone(),
            from_module: self.from_module.clone(),
            readonly: self.readonly,
            ..InitOptions::default()
        }
    }
}

pub async fn execute(global: &GlobalArgs, args: InitArgs) -> Result<()> {
    let tf = global.connect().await?;
    tf.init(&args.to_options()).await?;
    info!("Working directory initialized");
    Ok(())
}
