// src/commands/update.rs

//! `update` command

use anyhow::Result;
use extup::client::UpdateOptions;

use super::{require_root, Context};

pub fn cmd_update(
    ctx: &Context,
    component: Option<String>,
    version: Option<String>,
    no_vacuum: bool,
    no_refresh: bool,
) -> Result<u8> {
    require_root()?;

    let client = ctx.client();
    let results = client.update(&UpdateOptions {
        component,
        version,
        no_vacuum,
        no_refresh,
    })?;

    if ctx.json {
        ctx.output_json(&results)?;
    } else {
        if results.is_empty() {
            println!("No enabled transfers found.");
        }
        for r in &results {
            match &r.error {
                Some(e) => println!("{}: failed: {e}", r.component),
                None if r.downloaded => println!("{}: updated to {}", r.component, r.version),
                None => println!("{}: up to date ({})", r.component, r.version),
            }
            for w in &r.warnings {
                println!("{}: warning: {w}", r.component);
            }
        }
        if results.iter().any(|r| r.downloaded && r.error.is_none()) {
            println!("Reboot required to activate changes.");
        }
    }

    if results.iter().any(|r| r.failed()) {
        Ok(1)
    } else {
        Ok(0)
    }
}
