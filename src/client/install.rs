// src/client/install.rs

//! Installing an extension straight from a repository
//!
//! Validates the extension against the repository index, fetches its transfer
//! file into the definitions directory (comment lines stripped), then runs
//! the transfer engine for that component.

use std::fs;

use tracing::info;

use crate::config;
use crate::error::{Error, Result};

use super::{Client, InstallOptions, InstallResult, UpdateResult};

impl Client {
    /// Fetch the transfer file for `opts.component` from the repository at
    /// `url` and install the newest available version.
    pub fn install(&self, url: &str, opts: &InstallOptions) -> Result<InstallResult> {
        if opts.component.is_empty() {
            return Err(Error::NotFound("component name is required".to_string()));
        }

        let base_url = url.trim_end_matches('/');
        let mut result = InstallResult {
            component: opts.component.clone(),
            ..InstallResult::default()
        };

        let extensions = self.fetch_index(base_url)?;
        if !extensions.iter().any(|e| *e == opts.component) {
            return Err(Error::NotFound(format!(
                "extension '{}' not found in repository index",
                opts.component
            )));
        }
        info!("extension {} found in repository", opts.component);

        let transfer_url = format!("{base_url}/ext/{0}/{0}.transfer", opts.component);
        let transfer_path = self
            .config_write_dir()
            .join(format!("{}.transfer", opts.component));

        let content = self.fetch_text(&transfer_url)?;
        let sanitized = strip_comment_lines(&content);

        if let Some(parent) = transfer_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::System(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        fs::write(&transfer_path, sanitized).map_err(|e| {
            Error::System(format!("failed to write {}: {e}", transfer_path.display()))
        })?;
        result.transfer_file = transfer_path.display().to_string();
        info!("installed transfer file {}", transfer_path.display());

        // Reload through the normal search so drop-ins and validation apply
        let transfers = self.load_transfers_unfiltered(Some(&opts.component))?;
        let transfer = &transfers[0];

        // A feature-gated transfer must have its gate open before install
        if !transfer.transfer.features.is_empty() || !transfer.transfer.requisite_features.is_empty()
        {
            let features = config::load_features(self.definitions())?;
            let active =
                config::filter_transfers_by_features(vec![transfer.clone()], &features);
            if active.is_empty() {
                return Err(Error::Config(format!(
                    "{}: transfer requires features that are not enabled",
                    opts.component
                )));
            }
        }

        let mut update_result = UpdateResult::new(&opts.component);
        self.run_transfer(transfer, None, false, 1, &mut update_result)?;
        result.version = update_result.version;
        result.installed = true;
        result.next_action = Some("Reboot required to activate changes".to_string());

        if !opts.no_refresh {
            if let Err(e) = self.config.sysext_runner.refresh() {
                tracing::warn!("activation refresh failed: {e}");
            }
        }

        Ok(result)
    }
}

/// Drop comment-only lines (`#` or `;`) from a fetched transfer file
fn strip_comment_lines(content: &str) -> String {
    let mut out: String = content
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            trimmed.is_empty() || (!trimmed.starts_with('#') && !trimmed.starts_with(';'))
        })
        .collect::<Vec<_>>()
        .join("\n");
    out.push('\n');
    out
}
