//! Version command - Show the detected Terraform version.

use anyhow::Result;

use super::{print_json, GlobalArgs};

pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let tf = global.connect().await?;
    let version = tf.version_info();

    print_json(version)?;
    if !version.is_latest() {
        eprintln!("A newer Terraform release is available");
    }
    Ok(())
}
