// src/commands/remove.rs

//! `remove` command

use anyhow::Result;
use extup::client::RemoveOptions;

use super::{require_root, Context};

pub fn cmd_remove(ctx: &Context, component: &str, now: bool, no_refresh: bool) -> Result<u8> {
    require_root()?;

    let client = ctx.client();
    let result = client.remove(component, &RemoveOptions { now, no_refresh })?;

    if ctx.json {
        ctx.output_json(&result)?;
        return Ok(0);
    }

    if result.removed_files.is_empty() {
        println!("{}: no files found to remove", result.component);
    } else {
        for path in &result.removed_files {
            println!("removed {path}");
        }
    }
    if let Some(next) = &result.next_action {
        println!("{next}");
    }
    Ok(0)
}
