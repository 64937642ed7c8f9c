// src/commands/daemon.rs

//! `daemon enable|disable|status` commands
//!
//! The daemon is a systemd timer/service pair that runs `extup update` on a
//! schedule. Updates are staged but not activated until the next reboot.

use anyhow::{bail, Context as _, Result};
use serde::Serialize;

use extup::systemd::{Manager, ServiceConfig, TimerConfig};

use super::{require_root, Context};

/// Unit name (without extension) for the timer/service pair
const UNIT_NAME: &str = "extup-update";

/// State of the auto-update daemon, all derived from the supervisor
#[derive(Debug, Serialize)]
struct DaemonStatus {
    installed: bool,
    enabled: bool,
    active: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    schedule: String,
}

pub fn cmd_daemon_enable(ctx: &Context) -> Result<u8> {
    require_root()?;

    let mgr = Manager::new();
    if mgr.exists(UNIT_NAME) {
        bail!("timer already installed; run 'extup daemon disable' first to reinstall");
    }

    let timer = TimerConfig {
        name: UNIT_NAME.to_string(),
        description: "Automatic sysext updates".to_string(),
        on_calendar: "daily".to_string(),
        persistent: true,
        randomized_delay_seconds: 3600,
    };
    let service = ServiceConfig {
        name: UNIT_NAME.to_string(),
        description: "Automatic sysext update service".to_string(),
        exec_start: "/usr/bin/extup update --no-refresh".to_string(),
        service_type: "oneshot".to_string(),
    };

    mgr.install(&timer, &service)
        .context("failed to install timer")?;

    let timer_unit = format!("{UNIT_NAME}.timer");
    mgr.runner()
        .enable(&timer_unit)
        .context("failed to enable timer")?;
    mgr.runner()
        .start(&timer_unit)
        .context("failed to start timer")?;

    if ctx.json {
        ctx.output_json(&serde_json::json!({
            "success": true,
            "message": "Auto-update daemon enabled"
        }))?;
        return Ok(0);
    }

    println!("Auto-update daemon enabled.");
    println!("Updates will run daily and download new versions.");
    println!("Reboot required to activate downloaded extensions.");
    Ok(0)
}

pub fn cmd_daemon_disable(ctx: &Context) -> Result<u8> {
    require_root()?;

    let mgr = Manager::new();
    if !mgr.exists(UNIT_NAME) {
        bail!("timer not installed; nothing to disable");
    }

    mgr.remove(UNIT_NAME).context("failed to remove timer")?;

    if ctx.json {
        ctx.output_json(&serde_json::json!({
            "success": true,
            "message": "Auto-update daemon disabled"
        }))?;
        return Ok(0);
    }

    println!("Auto-update daemon disabled.");
    println!("Automatic updates will no longer run.");
    Ok(0)
}

pub fn cmd_daemon_status(ctx: &Context) -> Result<u8> {
    let mgr = Manager::new();
    let timer_unit = format!("{UNIT_NAME}.timer");

    let installed = mgr.exists(UNIT_NAME);
    let status = DaemonStatus {
        installed,
        enabled: installed && mgr.runner().is_enabled(&timer_unit).unwrap_or(false),
        active: installed && mgr.runner().is_active(&timer_unit).unwrap_or(false),
        schedule: if installed { "daily".to_string() } else { String::new() },
    };

    if ctx.json {
        ctx.output_json(&status)?;
        return Ok(0);
    }

    if !status.installed {
        println!("Auto-update daemon: not installed");
        println!("Run 'extup daemon enable' to enable automatic updates.");
        return Ok(0);
    }

    println!("Auto-update daemon: installed");
    println!("  Enabled: {}", status.enabled);
    println!("  Active: {}", status.active);
    println!("  Schedule: {}", status.schedule);
    Ok(0)
}
