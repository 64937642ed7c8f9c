// src/client/remove.rs

//! Destructive removal of a component's staged artifacts

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::sysext;

use super::{Client, RemoveOptions, RemoveResult};

impl Client {
    /// Remove every staged file and symlink for a component.
    ///
    /// Loads the transfer without feature filtering so disabled components
    /// can still be cleaned up. `--now` unmerges first and refreshes after.
    pub fn remove(&self, component: &str, opts: &RemoveOptions) -> Result<RemoveResult> {
        if component.is_empty() {
            return Err(Error::NotFound("component name is required".to_string()));
        }

        let transfers = self.load_transfers_unfiltered(Some(component))?;
        let transfer = &transfers[0];

        let mut result = RemoveResult {
            component: component.to_string(),
            ..RemoveResult::default()
        };

        if opts.now {
            info!("unmerging extensions");
            self.config.sysext_runner.unmerge()?;
            result.unmerged = true;
        }

        match sysext::unlink_from_sysext(transfer, &self.config.sysext_dir) {
            Ok(()) => result.removed_symlink = true,
            Err(e) => warn!("{component}: failed to remove activation symlink: {e}"),
        }

        result.removed_files = sysext::remove_matching_files(transfer)?;
        result.success = true;

        if result.removed_files.is_empty() {
            result.next_action = Some("No files found to remove".to_string());
            return Ok(result);
        }

        info!("removed {} file(s)", result.removed_files.len());

        if opts.now && !opts.no_refresh {
            if let Err(e) = self.config.sysext_runner.refresh() {
                warn!("activation refresh failed: {e}");
            }
        }

        result.next_action = Some(if opts.now {
            "Extension removed and unmerged".to_string()
        } else {
            "Extension removed. Changes will take effect after reboot.".to_string()
        });

        Ok(result)
    }
}
