// src/systemd/runner.rs

//! Injectable runner for supervisor control verbs

use std::process::Command;
use std::sync::Mutex;

use tracing::debug;

use crate::error::{Error, Result};

/// Executes supervisor verbs against units
pub trait SystemctlRunner: Send + Sync {
    fn daemon_reload(&self) -> Result<()>;
    fn enable(&self, unit: &str) -> Result<()>;
    fn disable(&self, unit: &str) -> Result<()>;
    fn start(&self, unit: &str) -> Result<()>;
    fn stop(&self, unit: &str) -> Result<()>;
    /// A non-zero exit status means "not active", not a failure
    fn is_active(&self, unit: &str) -> Result<bool>;
    /// A non-zero exit status means "not enabled", not a failure
    fn is_enabled(&self, unit: &str) -> Result<bool>;
}

/// Default runner: executes `systemctl`
pub struct CommandSystemctl;

impl CommandSystemctl {
    fn run(&self, args: &[&str]) -> Result<()> {
        debug!("running systemctl {}", args.join(" "));
        let status = Command::new("systemctl")
            .args(args)
            .status()
            .map_err(|e| Error::System(format!("failed to run systemctl: {e}")))?;
        if !status.success() {
            return Err(Error::System(format!(
                "systemctl {} failed: {status}",
                args.first().unwrap_or(&"")
            )));
        }
        Ok(())
    }

    fn query(&self, verb: &str, unit: &str) -> Result<bool> {
        let status = Command::new("systemctl")
            .args([verb, unit])
            .status()
            .map_err(|e| Error::System(format!("failed to run systemctl {verb}: {e}")))?;
        Ok(status.success())
    }
}

impl SystemctlRunner for CommandSystemctl {
    fn daemon_reload(&self) -> Result<()> {
        self.run(&["daemon-reload"])
    }

    fn enable(&self, unit: &str) -> Result<()> {
        self.run(&["enable", unit])
    }

    fn disable(&self, unit: &str) -> Result<()> {
        self.run(&["disable", unit])
    }

    fn start(&self, unit: &str) -> Result<()> {
        self.run(&["start", unit])
    }

    fn stop(&self, unit: &str) -> Result<()> {
        self.run(&["stop", unit])
    }

    fn is_active(&self, unit: &str) -> Result<bool> {
        self.query("is-active", unit)
    }

    fn is_enabled(&self, unit: &str) -> Result<bool> {
        self.query("is-enabled", unit)
    }
}

/// Test double recording verbs; queries answer from preset state
#[derive(Default)]
pub struct RecordingSystemctl {
    calls: Mutex<Vec<String>>,
    pub active_units: Mutex<Vec<String>>,
    pub enabled_units: Mutex<Vec<String>>,
}

impl RecordingSystemctl {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, call: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| c == call)
    }
}

impl SystemctlRunner for RecordingSystemctl {
    fn daemon_reload(&self) -> Result<()> {
        self.record("daemon-reload".to_string())
    }

    fn enable(&self, unit: &str) -> Result<()> {
        self.record(format!("enable {unit}"))
    }

    fn disable(&self, unit: &str) -> Result<()> {
        self.record(format!("disable {unit}"))
    }

    fn start(&self, unit: &str) -> Result<()> {
        self.record(format!("start {unit}"))
    }

    fn stop(&self, unit: &str) -> Result<()> {
        self.record(format!("stop {unit}"))
    }

    fn is_active(&self, unit: &str) -> Result<bool> {
        Ok(self.active_units.lock().unwrap().iter().any(|u| u == unit))
    }

    fn is_enabled(&self, unit: &str) -> Result<bool> {
        Ok(self.enabled_units.lock().unwrap().iter().any(|u| u == unit))
    }
}
