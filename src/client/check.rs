// src/client/check.rs

//! Update-availability checks

use tracing::{info, warn};

use crate::error::Result;
use crate::sysext;
use crate::version;

use super::{CheckOptions, CheckResult, Client};

impl Client {
    /// Report whether newer versions are available for each active transfer.
    ///
    /// Components whose source cannot be reached are skipped with a warning,
    /// matching the per-component propagation policy.
    pub fn check_new(&self, opts: &CheckOptions) -> Result<Vec<CheckResult>> {
        let transfers = self.load_transfers(opts.component.as_deref())?;

        let mut results = Vec::new();
        for transfer in &transfers {
            let mut available = match self.available_versions(transfer) {
                Ok(available) => available,
                Err(e) => {
                    warn!("{}: failed to get available versions: {e}", transfer.component);
                    continue;
                }
            };
            if available.is_empty() {
                continue;
            }

            version::sort_descending(&mut available);
            let newest = available[0].clone();

            let (installed, current) = match sysext::get_installed_versions(transfer) {
                Ok(state) => state,
                Err(e) => {
                    warn!("{}: failed to get installed versions: {e}", transfer.component);
                    (Vec::new(), String::new())
                }
            };

            let update_available = installed.is_empty()
                || version::compare(&newest, &current) == std::cmp::Ordering::Greater;

            if update_available {
                info!("{}: update available: {newest}", transfer.component);
            } else {
                info!("{}: up to date ({current})", transfer.component);
            }

            results.push(CheckResult {
                component: transfer.component.clone(),
                current_version: current,
                newest_version: newest,
                update_available,
            });
        }

        Ok(results)
    }
}
