// src/commands/install.rs

//! `install` command

use anyhow::Result;
use extup::client::InstallOptions;

use super::{require_root, Context};

pub fn cmd_install(ctx: &Context, url: &str, component: &str, no_refresh: bool) -> Result<u8> {
    require_root()?;

    let client = ctx.client();
    let result = client.install(
        url,
        &InstallOptions {
            component: component.to_string(),
            no_refresh,
        },
    )?;

    if ctx.json {
        ctx.output_json(&result)?;
        return Ok(0);
    }

    println!("Installed transfer file: {}", result.transfer_file);
    if !result.version.is_empty() {
        println!("Installed {} version {}", result.component, result.version);
    }
    if let Some(next) = &result.next_action {
        println!("{next}");
    }
    Ok(0)
}
