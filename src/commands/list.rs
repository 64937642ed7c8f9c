// src/commands/list.rs

//! `list` and `components` commands

use anyhow::Result;
use extup::client::{ListOptions, VersionInfo};

use super::Context;

pub fn cmd_list(ctx: &Context, component: Option<String>, version: Option<String>) -> Result<u8> {
    let client = ctx.client();
    let versions = client.list(&ListOptions { component, version })?;

    if ctx.json {
        ctx.output_json(&versions)?;
        return Ok(0);
    }

    if versions.is_empty() {
        println!("No versions found.");
        return Ok(0);
    }

    println!("{:<20} {:<24} STATUS", "COMPONENT", "VERSION");
    for info in &versions {
        println!("{:<20} {:<24} {}", info.component, info.version, flags(info));
    }
    Ok(0)
}

fn flags(info: &VersionInfo) -> String {
    let mut parts = Vec::new();
    if info.available {
        parts.push("available");
    }
    if info.installed {
        parts.push("installed");
    }
    if info.current {
        parts.push("current");
    }
    if info.protected {
        parts.push("protected");
    }
    parts.join(",")
}

pub fn cmd_components(ctx: &Context) -> Result<u8> {
    let client = ctx.client();
    let components = client.components()?;

    if ctx.json {
        ctx.output_json(&components)?;
        return Ok(0);
    }

    if components.is_empty() {
        println!("No components configured.");
        return Ok(0);
    }

    for c in &components {
        println!("{}", c.name);
        println!("  Source: {} ({})", c.source, c.source_type);
        println!("  Target: {}", c.target_path);
        println!("  InstancesMax: {}", c.instances_max);
    }
    Ok(0)
}
