// src/commands/status.rs

//! `check-new`, `pending` and `vacuum` commands

use anyhow::Result;
use extup::client::{CheckOptions, PendingOptions, VacuumOptions};

use super::{require_root, Context};

pub fn cmd_check_new(ctx: &Context, component: Option<String>) -> Result<u8> {
    let client = ctx.client();
    let results = client.check_new(&CheckOptions { component })?;

    if ctx.json {
        ctx.output_json(&results)?;
    } else {
        for r in &results {
            if r.update_available {
                if r.current_version.is_empty() {
                    println!("{}: new version available: {}", r.component, r.newest_version);
                } else {
                    println!(
                        "{}: update available: {} -> {}",
                        r.component, r.current_version, r.newest_version
                    );
                }
            } else {
                println!("{}: up to date ({})", r.component, r.current_version);
            }
        }
    }

    if results.iter().any(|r| r.update_available) {
        Ok(0)
    } else {
        Ok(2)
    }
}

pub fn cmd_pending(ctx: &Context, component: Option<String>) -> Result<u8> {
    let client = ctx.client();
    let results = client.pending(&PendingOptions { component })?;

    if ctx.json {
        ctx.output_json(&results)?;
    } else {
        for r in &results {
            if r.pending {
                if r.active_version.is_empty() {
                    println!("{}: pending activation of {}", r.component, r.installed_version);
                } else {
                    println!(
                        "{}: pending update: {} -> {}",
                        r.component, r.active_version, r.installed_version
                    );
                }
            } else {
                println!("{}: no pending update (active: {})", r.component, r.active_version);
            }
        }
    }

    if results.iter().any(|r| r.pending) {
        Ok(0)
    } else {
        Ok(2)
    }
}

pub fn cmd_vacuum(ctx: &Context, component: Option<String>) -> Result<u8> {
    require_root()?;

    let client = ctx.client();
    let results = client.vacuum(&VacuumOptions { component })?;

    if ctx.json {
        ctx.output_json(&results)?;
    } else {
        for r in &results {
            match &r.error {
                Some(e) => println!("{}: vacuum failed: {e}", r.component),
                None if r.removed.is_empty() => println!("{}: nothing to remove", r.component),
                None => println!(
                    "{}: removed {} ({} kept)",
                    r.component,
                    r.removed.join(", "),
                    r.kept.len()
                ),
            }
        }
    }

    if results.iter().any(|r| r.error.is_some()) {
        Ok(1)
    } else {
        Ok(0)
    }
}
