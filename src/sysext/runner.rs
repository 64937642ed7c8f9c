// src/sysext/runner.rs

//! Injectable runner for the external activation utility

use std::process::Command;
use std::sync::Mutex;

use tracing::debug;

use crate::error::{Error, Result};

/// Executes activation verbs (`refresh`, `merge`, `unmerge`)
pub trait SysextRunner: Send + Sync {
    fn refresh(&self) -> Result<()>;
    fn merge(&self) -> Result<()>;
    fn unmerge(&self) -> Result<()>;
}

/// Default runner: executes `systemd-sysext <verb>`
pub struct CommandRunner;

impl CommandRunner {
    fn run(&self, verb: &str) -> Result<()> {
        debug!("running systemd-sysext {}", verb);
        let status = Command::new("systemd-sysext")
            .arg(verb)
            .status()
            .map_err(|e| Error::System(format!("failed to run systemd-sysext {verb}: {e}")))?;
        if !status.success() {
            return Err(Error::System(format!(
                "systemd-sysext {verb} failed: {status}"
            )));
        }
        Ok(())
    }
}

impl SysextRunner for CommandRunner {
    fn refresh(&self) -> Result<()> {
        self.run("refresh")
    }

    fn merge(&self) -> Result<()> {
        self.run("merge")
    }

    fn unmerge(&self) -> Result<()> {
        self.run("unmerge")
    }
}

/// Test double that records invoked verbs instead of spawning processes
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<String>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, verb: &str) -> Result<()> {
        self.calls.lock().unwrap().push(verb.to_string());
        Ok(())
    }

    /// Verbs invoked so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, verb: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| c == verb)
    }

    pub fn count(&self, verb: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == verb).count()
    }
}

impl SysextRunner for RecordingRunner {
    fn refresh(&self) -> Result<()> {
        self.record("refresh")
    }

    fn merge(&self) -> Result<()> {
        self.record("merge")
    }

    fn unmerge(&self) -> Result<()> {
        self.record("unmerge")
    }
}
