// src/commands/features.rs

//! `features list|enable|disable` commands

use anyhow::Result;
use extup::client::{DisableFeatureOptions, EnableFeatureOptions};

use super::{require_root, Context};

pub fn cmd_features_list(ctx: &Context) -> Result<u8> {
    let client = ctx.client();
    let features = client.features()?;

    if ctx.json {
        ctx.output_json(&features)?;
        return Ok(0);
    }

    if features.is_empty() {
        println!("No features configured.");
        return Ok(0);
    }

    for f in &features {
        let state = if f.masked {
            "masked"
        } else if f.enabled {
            "enabled"
        } else {
            "disabled"
        };
        println!("{} [{}]", f.name, state);
        if !f.description.is_empty() {
            println!("  {}", f.description);
        }
        if !f.transfers.is_empty() {
            println!("  Transfers: {}", f.transfers.join(", "));
        }
    }
    Ok(0)
}

pub fn cmd_feature_enable(
    ctx: &Context,
    name: &str,
    now: bool,
    dry_run: bool,
    retry: bool,
    no_refresh: bool,
) -> Result<u8> {
    if !dry_run {
        require_root()?;
    }

    let client = ctx.client();
    let result = client.enable_feature(
        name,
        &EnableFeatureOptions {
            now,
            dry_run,
            retry,
            retry_count: 0,
            no_refresh,
        },
    )?;

    if ctx.json {
        ctx.output_json(&result)?;
        return Ok(0);
    }

    for file in &result.downloaded_files {
        println!("updated {file}");
    }
    if let Some(next) = &result.next_action {
        println!("{next}");
    }
    Ok(0)
}

pub fn cmd_feature_disable(
    ctx: &Context,
    name: &str,
    now: bool,
    force: bool,
    dry_run: bool,
    no_refresh: bool,
) -> Result<u8> {
    if !dry_run {
        require_root()?;
    }

    let client = ctx.client();
    let result = client.disable_feature(
        name,
        &DisableFeatureOptions {
            remove: false,
            now,
            force,
            dry_run,
            no_refresh,
        },
    )?;

    if ctx.json {
        ctx.output_json(&result)?;
        return Ok(0);
    }

    for file in &result.removed_files {
        println!("removed {file}");
    }
    if let Some(next) = &result.next_action {
        println!("{next}");
    }
    Ok(0)
}
