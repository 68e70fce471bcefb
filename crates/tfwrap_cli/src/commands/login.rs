//! Login and logout commands - Manage remote host credentials.

use anyhow::Result;
use clap::Args;

use tfwrap_core::LoginOptions;

use super::GlobalArgs;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Remote host (app.terraform.io when omitted)
    hostname: Option<String>,
}

impl LoginArgs {
    fn to_options(&self) -> LoginOptions {
        LoginOptions {
            hostname: self.hostname.clone(),
            chdir: None,
        }
    }
}

pub async fn login(global: &GlobalArgs, args: LoginArgs) -> Result<()> {
    let tf = global.connect().await?;
    tf.login(&args.to_options()).await?;
    Ok(())
}

pub async fn logout(global: &GlobalArgs, args: LoginArgs) -> Result<()> {
    let tf = global.connect().await?;
    tf.logout(&args.to_options()).await?;
    Ok(())
}
