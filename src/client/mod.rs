// src/client/mod.rs

//! Programmatic client for extup operations
//!
//! The [`Client`] is the stable API surface: every CLI verb maps onto one of
//! its methods, taking a typed options struct and returning typed,
//! serializable results. External-process seams (activation runner, host
//! identity, signature verifier, progress) are injected through
//! [`ClientConfig`]; production defaults are used when not overridden.
//!
//! ```no_run
//! use extup::client::{Client, ClientConfig, UpdateOptions};
//!
//! let client = Client::new(ClientConfig::default());
//! let results = client.update(&UpdateOptions::default())?;
//! # Ok::<(), extup::Error>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{self, HostIdentity, OsReleaseIdentity, Transfer};
use crate::error::{Error, Result};
use crate::manifest::{GpgVerifier, SignatureVerifier};
use crate::progress::{ProgressTracker, SilentProgress};
use crate::sysext::{CommandRunner, SysextRunner, RUN_EXTENSIONS_DIR, SYSEXT_DIR};
use crate::version;

mod check;
mod components;
mod discover;
mod features;
mod install;
mod list;
mod options;
mod pending;
mod remove;
mod results;
mod sysext_ops;
mod update;
mod vacuum;

pub use options::{
    CheckOptions, DisableFeatureOptions, EnableFeatureOptions, InstallOptions, ListOptions,
    PendingOptions, RemoveOptions, UpdateOptions, VacuumOptions,
};
pub use results::{
    CheckResult, ComponentInfo, DiscoverResult, ExtensionInfo, FeatureActionResult, FeatureInfo,
    InstallResult, PendingResult, RemoveResult, UpdateResult, VacuumResult, VersionInfo,
};

/// Timeout for index and transfer-file fetches
const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the [`Client`]
pub struct ClientConfig {
    /// Override for the definition search paths. When set, only this
    /// directory is consulted, and installed transfer files and feature
    /// drop-ins are written here.
    pub definitions: Option<PathBuf>,

    /// Force manifest signature verification for every transfer
    pub verify: bool,

    /// Activation directory the external activator reads from
    pub sysext_dir: PathBuf,

    /// Runtime directory the activator populates with merged extensions
    pub run_extensions_dir: PathBuf,

    /// Progress reporting for downloads
    pub progress: Arc<dyn ProgressTracker>,

    /// Runner for activation verbs; substitute a recording double in tests
    pub sysext_runner: Arc<dyn SysextRunner>,

    /// Host identity for specifier expansion
    pub host: Arc<dyn HostIdentity>,

    /// Verifier for detached manifest signatures
    pub signature_verifier: Arc<dyn SignatureVerifier>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            definitions: None,
            verify: false,
            sysext_dir: PathBuf::from(SYSEXT_DIR),
            run_extensions_dir: PathBuf::from(RUN_EXTENSIONS_DIR),
            progress: Arc::new(SilentProgress::new()),
            sysext_runner: Arc::new(CommandRunner),
            host: Arc::new(OsReleaseIdentity::new()),
            signature_verifier: Arc::new(GpgVerifier::new()),
        }
    }
}

/// Programmatic access to extup operations
pub struct Client {
    config: ClientConfig,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    fn definitions(&self) -> Option<&Path> {
        self.config.definitions.as_deref()
    }

    /// Directory where enable/disable drop-ins and installed transfer files
    /// are written
    fn config_write_dir(&self) -> PathBuf {
        self.config
            .definitions
            .clone()
            .unwrap_or_else(|| PathBuf::from(config::ETC_SYSUPDATE_DIR))
    }

    /// Load transfers, optionally narrowed to one component, filtered by
    /// enabled features.
    fn load_transfers(&self, component: Option<&str>) -> Result<Vec<Transfer>> {
        let transfers = self.load_transfers_unfiltered(component)?;
        let features = config::load_features(self.definitions())?;
        Ok(config::filter_transfers_by_features(transfers, &features))
    }

    /// Load transfers without feature filtering. Used by operations that act
    /// on configured state regardless of gating (vacuum, remove).
    fn load_transfers_unfiltered(&self, component: Option<&str>) -> Result<Vec<Transfer>> {
        let mut transfers = config::load_transfers(self.definitions(), self.config.host.as_ref())?;

        if let Some(component) = component {
            transfers.retain(|t| t.component == component);
            if transfers.is_empty() {
                return Err(Error::NotFound(format!(
                    "no transfer configuration found for component: {component}"
                )));
            }
        }

        Ok(transfers)
    }

    /// The signature verifier to use for a transfer, or `None` when neither
    /// the client nor the transfer requires verification.
    fn verifier_for(&self, t: &Transfer) -> Option<&dyn SignatureVerifier> {
        (self.config.verify || t.transfer.verify).then(|| self.config.signature_verifier.as_ref())
    }

    /// Candidate versions available from a transfer's source, with the
    /// `MinVersion` lower bound applied.
    fn available_versions(&self, t: &Transfer) -> Result<Vec<String>> {
        if t.source.source_type != "url-file" {
            return Err(Error::Config(format!(
                "{}: unsupported source type: {}",
                t.component, t.source.source_type
            )));
        }

        let manifest = crate::manifest::fetch(&t.source.path, self.verifier_for(t))?;

        let mut versions: Vec<String> = Vec::new();
        for filename in manifest.entries.keys() {
            let Some((v, _)) = version::extract_version_multi(filename, &t.source.match_patterns)
            else {
                continue;
            };
            if !t.transfer.min_version.is_empty()
                && version::compare(&v, &t.transfer.min_version) == std::cmp::Ordering::Less
            {
                continue;
            }
            versions.push(v);
        }
        versions.sort();
        versions.dedup();
        Ok(versions)
    }

    /// GET a small text resource (index, transfer file) with the metadata
    /// timeout.
    fn fetch_text(&self, url: &str) -> Result<String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(METADATA_TIMEOUT)
            .build()
            .map_err(|e| Error::Network(format!("failed to create HTTP client: {e}")))?;

        let response = client
            .get(url)
            .send()
            .map_err(|e| Error::Network(format!("failed to fetch {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "HTTP {} from {url}",
                response.status()
            )));
        }

        response
            .text()
            .map_err(|e| Error::Network(format!("failed to read response from {url}: {e}")))
    }

    /// Fetch and parse `{base}/ext/index`: one extension name per line,
    /// blanks and `#` comments discarded.
    fn fetch_index(&self, base_url: &str) -> Result<Vec<String>> {
        let index_url = format!("{}/ext/index", base_url.trim_end_matches('/'));
        let content = self.fetch_text(&index_url)?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect())
    }
}
