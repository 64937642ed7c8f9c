// src/systemd/manager.rs

//! Unit file installation and removal

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::runner::{CommandSystemctl, SystemctlRunner};
use super::unit::{generate_service, generate_timer, ServiceConfig, TimerConfig};
use super::UNIT_DIR;

/// Installs and removes the timer/service pair under a unit directory
pub struct Manager {
    unit_dir: PathBuf,
    runner: Box<dyn SystemctlRunner>,
}

impl Manager {
    /// Manager over the default unit directory with the real supervisor
    pub fn new() -> Self {
        Self {
            unit_dir: PathBuf::from(UNIT_DIR),
            runner: Box::new(CommandSystemctl),
        }
    }

    /// Manager with explicit unit directory and runner
    pub fn with_runner(unit_dir: PathBuf, runner: Box<dyn SystemctlRunner>) -> Self {
        Self { unit_dir, runner }
    }

    pub fn runner(&self) -> &dyn SystemctlRunner {
        self.runner.as_ref()
    }

    fn timer_path(&self, name: &str) -> PathBuf {
        self.unit_dir.join(format!("{name}.timer"))
    }

    fn service_path(&self, name: &str) -> PathBuf {
        self.unit_dir.join(format!("{name}.service"))
    }

    /// Write both unit files and reload the supervisor.
    ///
    /// Refuses to overwrite: a pre-existing timer or service of the same name
    /// is a conflict. On partial failure the timer file is rolled back.
    pub fn install(&self, timer: &TimerConfig, service: &ServiceConfig) -> Result<()> {
        let timer_path = self.timer_path(&timer.name);
        let service_path = self.service_path(&service.name);

        if timer_path.exists() {
            return Err(Error::Conflict(format!(
                "timer file already exists: {}",
                timer_path.display()
            )));
        }
        if service_path.exists() {
            return Err(Error::Conflict(format!(
                "service file already exists: {}",
                service_path.display()
            )));
        }

        fs::write(&timer_path, generate_timer(timer)).map_err(|e| {
            Error::System(format!("failed to write {}: {e}", timer_path.display()))
        })?;

        if let Err(e) = fs::write(&service_path, generate_service(service)) {
            let _ = fs::remove_file(&timer_path);
            return Err(Error::System(format!(
                "failed to write {}: {e}",
                service_path.display()
            )));
        }

        debug!("installed {} and {}", timer_path.display(), service_path.display());
        self.runner.daemon_reload()
    }

    /// Stop and disable the timer (errors swallowed; it may not be running),
    /// delete both unit files tolerating absence, and reload the supervisor.
    /// Aggregates failures of the steps that are expected to succeed.
    pub fn remove(&self, name: &str) -> Result<()> {
        let timer_unit = format!("{name}.timer");
        if let Err(e) = self.runner.stop(&timer_unit) {
            warn!("stop {timer_unit}: {e}");
        }
        if let Err(e) = self.runner.disable(&timer_unit) {
            warn!("disable {timer_unit}: {e}");
        }

        let mut failures = Vec::new();

        for path in [self.timer_path(name), self.service_path(name)] {
            if let Err(e) = fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    failures.push(format!("remove {}: {e}", path.display()));
                }
            }
        }

        if let Err(e) = self.runner.daemon_reload() {
            failures.push(format!("daemon-reload: {e}"));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::System(format!(
                "errors during removal: {}",
                failures.join("; ")
            )))
        }
    }

    /// Whether either unit file is present
    pub fn exists(&self, name: &str) -> bool {
        self.timer_path(name).exists() || self.service_path(name).exists()
    }

    /// Unit file paths for reporting
    pub fn unit_dir(&self) -> &Path {
        &self.unit_dir
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systemd::RecordingSystemctl;
    use std::sync::Arc;

    fn configs() -> (TimerConfig, ServiceConfig) {
        (
            TimerConfig {
                name: "extup-update".into(),
                description: "Automatic sysext updates".into(),
                on_calendar: "daily".into(),
                persistent: true,
                randomized_delay_seconds: 3600,
            },
            ServiceConfig {
                name: "extup-update".into(),
                description: "Automatic sysext update service".into(),
                exec_start: "/usr/bin/extup update --no-refresh".into(),
                service_type: "oneshot".into(),
            },
        )
    }

    fn manager(dir: &Path) -> (Manager, Arc<RecordingSystemctl>) {
        // A second handle onto the same recording state would need Arc; the
        // manager owns a Box, so keep a shared probe through a thin wrapper.
        struct Shared(Arc<RecordingSystemctl>);
        impl SystemctlRunner for Shared {
            fn daemon_reload(&self) -> crate::error::Result<()> {
                self.0.daemon_reload()
            }
            fn enable(&self, unit: &str) -> crate::error::Result<()> {
                self.0.enable(unit)
            }
            fn disable(&self, unit: &str) -> crate::error::Result<()> {
                self.0.disable(unit)
            }
            fn start(&self, unit: &str) -> crate::error::Result<()> {
                self.0.start(unit)
            }
            fn stop(&self, unit: &str) -> crate::error::Result<()> {
                self.0.stop(unit)
            }
            fn is_active(&self, unit: &str) -> crate::error::Result<bool> {
                self.0.is_active(unit)
            }
            fn is_enabled(&self, unit: &str) -> crate::error::Result<bool> {
                self.0.is_enabled(unit)
            }
        }

        let recorder = Arc::new(RecordingSystemctl::new());
        let mgr = Manager::with_runner(dir.to_path_buf(), Box::new(Shared(recorder.clone())));
        (mgr, recorder)
    }

    #[test]
    fn test_install_writes_both_files_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let (mgr, recorder) = manager(dir.path());
        let (timer, service) = configs();

        mgr.install(&timer, &service).unwrap();

        assert!(dir.path().join("extup-update.timer").exists());
        assert!(dir.path().join("extup-update.service").exists());
        assert!(recorder.called("daemon-reload"));
        assert!(mgr.exists("extup-update"));
    }

    #[test]
    fn test_install_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let (mgr, _) = manager(dir.path());
        let (timer, service) = configs();

        fs::write(dir.path().join("extup-update.timer"), "").unwrap();
        let err = mgr.install(&timer, &service).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_remove_stops_disables_and_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let (mgr, recorder) = manager(dir.path());
        let (timer, service) = configs();

        mgr.install(&timer, &service).unwrap();
        mgr.remove("extup-update").unwrap();

        assert!(!mgr.exists("extup-update"));
        assert!(recorder.called("stop extup-update.timer"));
        assert!(recorder.called("disable extup-update.timer"));
        // One reload for install, one for remove
        assert_eq!(
            recorder.calls().iter().filter(|c| *c == "daemon-reload").count(),
            2
        );
    }

    #[test]
    fn test_remove_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let (mgr, _) = manager(dir.path());
        assert!(mgr.remove("never-installed").is_ok());
    }

    #[test]
    fn test_exists_with_only_service_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mgr, _) = manager(dir.path());
        fs::write(dir.path().join("extup-update.service"), "").unwrap();
        assert!(mgr.exists("extup-update"));
    }
}
