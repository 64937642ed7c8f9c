// src/client/pending.rs

//! Staged-but-not-active detection

use tracing::{info, warn};

use crate::error::Result;
use crate::sysext;
use crate::version;

use super::{Client, PendingOptions, PendingResult};

impl Client {
    /// Report components whose newest staged version is not yet active.
    pub fn pending(&self, opts: &PendingOptions) -> Result<Vec<PendingResult>> {
        let transfers = self.load_transfers(opts.component.as_deref())?;

        let mut results = Vec::new();
        for transfer in &transfers {
            let (mut installed, _) = match sysext::get_installed_versions(transfer) {
                Ok(state) => state,
                Err(e) => {
                    warn!("{}: failed to get installed versions: {e}", transfer.component);
                    continue;
                }
            };
            if installed.is_empty() {
                continue;
            }

            let active =
                match sysext::get_active_version(transfer, &self.config.run_extensions_dir) {
                    Ok(active) => active,
                    Err(e) => {
                        warn!("{}: failed to get active version: {e}", transfer.component);
                        String::new()
                    }
                };

            version::sort_descending(&mut installed);
            let newest = installed[0].clone();

            let pending = active.is_empty()
                || version::compare(&newest, &active) == std::cmp::Ordering::Greater;

            if pending {
                info!("{}: pending activation of {newest}", transfer.component);
            }

            results.push(PendingResult {
                component: transfer.component.clone(),
                installed_version: newest,
                active_version: active,
                pending,
            });
        }

        Ok(results)
    }
}
