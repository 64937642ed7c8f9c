// src/commands/discover.rs

//! `discover` command

use anyhow::Result;

use super::Context;

pub fn cmd_discover(ctx: &Context, url: &str) -> Result<u8> {
    let client = ctx.client();
    let result = client.discover(url)?;

    if ctx.json {
        ctx.output_json(&result)?;
        return Ok(0);
    }

    if result.extensions.is_empty() {
        println!("No extensions found at {}", result.url);
        return Ok(0);
    }

    println!("Extensions at {}:", result.url);
    for ext in &result.extensions {
        match &ext.error {
            Some(e) => println!("  {} (error: {e})", ext.name),
            None if ext.versions.is_empty() => println!("  {} (no versions)", ext.name),
            None => println!("  {} ({})", ext.name, ext.versions.join(", ")),
        }
    }
    Ok(0)
}
