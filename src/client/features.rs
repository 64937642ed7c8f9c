// src/client/features.rs

//! Feature operations: listing, enable, disable
//!
//! Enabling and disabling go through drop-in files; the base definitions are
//! never edited. The destructive disable path checks merge state before
//! touching anything.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{self, Feature};
use crate::error::{Error, Result};
use crate::sysext;

use super::{
    Client, DisableFeatureOptions, EnableFeatureOptions, FeatureActionResult, FeatureInfo,
    UpdateResult,
};

/// Drop-in filename used for enable/disable state
const DROPIN_NAME: &str = "00-extup.conf";

/// Default retry attempts when `EnableFeatureOptions::retry` is set
const DEFAULT_RETRY_COUNT: u32 = 3;

impl Client {
    /// List all configured features with their transfers.
    pub fn features(&self) -> Result<Vec<FeatureInfo>> {
        let features = config::load_features(self.definitions())?;
        if features.is_empty() {
            return Ok(Vec::new());
        }

        let transfers = config::load_transfers(self.definitions(), self.config.host.as_ref())?;

        Ok(features
            .iter()
            .map(|f| {
                let members = config::get_transfers_for_feature(&transfers, &f.name)
                    .iter()
                    .map(|t| t.component.clone())
                    .collect();
                FeatureInfo {
                    name: f.name.clone(),
                    description: f.description.clone(),
                    documentation: f.documentation.clone(),
                    enabled: f.enabled,
                    masked: f.masked,
                    source: f.file_path.display().to_string(),
                    transfers: members,
                }
            })
            .collect())
    }

    /// Enable a feature via a drop-in; with `now`, run the transfer engine
    /// over the feature's transfers immediately.
    pub fn enable_feature(
        &self,
        name: &str,
        opts: &EnableFeatureOptions,
    ) -> Result<FeatureActionResult> {
        let mut result = FeatureActionResult {
            feature: name.to_string(),
            action: "enable".to_string(),
            dry_run: opts.dry_run,
            ..FeatureActionResult::default()
        };

        self.resolve_feature(name)?;

        let dropin_file = self.dropin_path(name);
        if opts.dry_run {
            info!("would create drop-in {}", dropin_file.display());
        } else {
            self.write_dropin(&dropin_file, true)?;
            result.drop_in = dropin_file.display().to_string();
            info!("created drop-in {}", dropin_file.display());
        }

        if opts.now {
            let transfers =
                config::load_transfers(self.definitions(), self.config.host.as_ref())?;
            let members = config::get_transfers_for_feature(&transfers, name);

            if members.is_empty() {
                info!("no transfers associated with feature '{name}'");
            } else {
                let retries = if opts.retry {
                    if opts.retry_count == 0 {
                        DEFAULT_RETRY_COUNT
                    } else {
                        opts.retry_count
                    }
                } else {
                    1
                };

                for transfer in &members {
                    if opts.dry_run {
                        info!("would update {}", transfer.component);
                        result
                            .downloaded_files
                            .push(format!("{} (would update)", transfer.component));
                        continue;
                    }

                    let mut update_result = UpdateResult::new(&transfer.component);
                    if let Err(e) =
                        self.run_transfer(transfer, None, false, retries, &mut update_result)
                    {
                        result.error = Some(format!("failed to update {}: {e}", transfer.component));
                        return Err(e);
                    }
                    result.downloaded_files.push(transfer.component.clone());
                    info!("updated {}", transfer.component);
                }

                if !opts.no_refresh && !opts.dry_run {
                    if let Err(e) = self.config.sysext_runner.refresh() {
                        warn!("activation refresh failed: {e}");
                    }
                }
            }
        }

        result.success = true;
        result.next_action = Some(if opts.dry_run {
            format!("Dry run complete. Would enable feature '{name}'")
        } else if opts.now && !result.downloaded_files.is_empty() {
            format!(
                "Feature '{name}' enabled and {} extension(s) updated",
                result.downloaded_files.len()
            )
        } else {
            format!("Feature '{name}' enabled. Run 'extup update' to download extensions.")
        });

        Ok(result)
    }

    /// Disable a feature via a drop-in; with `now` (or the legacy `remove`
    /// flag), unmerge and delete the feature's staged artifacts.
    ///
    /// The merge-state guard runs before anything destructive: when any of
    /// the feature's extensions is active and `force` is not given, the
    /// operation fails without writing the drop-in.
    pub fn disable_feature(
        &self,
        name: &str,
        opts: &DisableFeatureOptions,
    ) -> Result<FeatureActionResult> {
        let mut result = FeatureActionResult {
            feature: name.to_string(),
            action: "disable".to_string(),
            dry_run: opts.dry_run,
            ..FeatureActionResult::default()
        };

        self.resolve_feature(name)?;

        let destructive = opts.now || opts.remove;

        let transfers = config::load_transfers(self.definitions(), self.config.host.as_ref())?;
        let members = config::get_transfers_for_feature(&transfers, name);

        if destructive && !members.is_empty() {
            let mut active = Vec::new();
            for transfer in &members {
                let (is_active, link_name) = sysext::is_extension_active(transfer);
                if is_active {
                    active.push(format!("{} ({link_name})", transfer.component));
                }
            }

            if !active.is_empty() && !opts.force {
                let message = if active.len() == 1 {
                    format!(
                        "Extension {} is active. Removing requires --force and a reboot to take effect.",
                        active[0]
                    )
                } else {
                    format!(
                        "Extensions are active: {}. Removing requires --force and a reboot to take effect.",
                        active.join(", ")
                    )
                };
                return Err(Error::Active(message));
            }

            if !active.is_empty() {
                warn!("extensions are currently active; changes take effect after reboot");
            }
        }

        let dropin_file = self.dropin_path(name);
        if opts.dry_run {
            info!("would create drop-in {}", dropin_file.display());
        } else {
            self.write_dropin(&dropin_file, false)?;
            result.drop_in = dropin_file.display().to_string();
            info!("created drop-in {}", dropin_file.display());
        }

        if destructive && !members.is_empty() {
            if opts.dry_run {
                info!("would unmerge extensions");
            } else {
                self.config.sysext_runner.unmerge()?;
                result.unmerged = true;
            }

            for transfer in &members {
                if opts.dry_run {
                    info!("would remove files for {}", transfer.component);
                    result
                        .removed_files
                        .push(format!("{} (would remove)", transfer.component));
                    continue;
                }

                if let Err(e) = sysext::unlink_from_sysext(transfer, &self.config.sysext_dir) {
                    warn!("{}: failed to remove activation symlink: {e}", transfer.component);
                }

                let removed = sysext::remove_matching_files(transfer)?;
                result.removed_files.extend(removed);
            }

            if !opts.dry_run {
                info!("removed {} file(s)", result.removed_files.len());
            }

            if !opts.no_refresh && !opts.dry_run {
                if let Err(e) = self.config.sysext_runner.refresh() {
                    warn!("activation refresh failed: {e}");
                }
            }
        }

        result.success = true;
        result.next_action = Some(if opts.dry_run {
            format!("Dry run complete. Would disable feature '{name}'")
        } else if destructive && opts.force {
            format!(
                "Feature '{name}' disabled and files removed. Reboot required for changes to take effect."
            )
        } else if destructive {
            format!(
                "Feature '{name}' disabled and {} extension file(s) removed.",
                result.removed_files.len()
            )
        } else {
            format!("Feature '{name}' disabled. Run 'extup update' to apply changes.")
        });

        Ok(result)
    }

    /// Find a feature by name; masked features cannot be toggled.
    fn resolve_feature(&self, name: &str) -> Result<Feature> {
        let features = config::load_features(self.definitions())?;
        let feature = features
            .into_iter()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::NotFound(format!("feature '{name}' not found")))?;

        if feature.masked {
            return Err(Error::Config(format!(
                "feature '{name}' is masked and cannot be changed"
            )));
        }
        Ok(feature)
    }

    fn dropin_path(&self, name: &str) -> PathBuf {
        self.config_write_dir()
            .join(format!("{name}.feature.d"))
            .join(DROPIN_NAME)
    }

    fn write_dropin(&self, path: &Path, enabled: bool) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| Error::System(format!("failed to create {}: {e}", dir.display())))?;
            fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).map_err(|e| {
                Error::System(format!("failed to set mode on {}: {e}", dir.display()))
            })?;
        }
        let content = format!("[Feature]\nEnabled={}\n", enabled);
        fs::write(path, content)
            .map_err(|e| Error::System(format!("failed to write {}: {e}", path.display())))?;
        fs::set_permissions(path, fs::Permissions::from_mode(0o644))
            .map_err(|e| Error::System(format!("failed to set mode on {}: {e}", path.display())))
    }
}
