// src/client/vacuum.rs

//! Retention sweep over configured transfers

use tracing::{info, warn};

use crate::error::Result;
use crate::sysext;

use super::{Client, VacuumOptions, VacuumResult};

impl Client {
    /// Run retention for every configured transfer (feature gating does not
    /// apply; on-disk state is cleaned regardless).
    pub fn vacuum(&self, opts: &VacuumOptions) -> Result<Vec<VacuumResult>> {
        let transfers = self.load_transfers_unfiltered(opts.component.as_deref())?;

        let mut results = Vec::new();
        for transfer in &transfers {
            let mut result = VacuumResult {
                component: transfer.component.clone(),
                ..VacuumResult::default()
            };

            match sysext::vacuum_with_details(transfer) {
                Ok((removed, kept)) => {
                    if removed.is_empty() {
                        info!("{}: nothing to remove", transfer.component);
                    } else {
                        info!("{}: removed {} version(s)", transfer.component, removed.len());
                    }
                    result.removed = removed;
                    result.kept = kept;
                }
                Err(e) => {
                    warn!("{}: vacuum failed: {e}", transfer.component);
                    result.error = Some(e.to_string());
                }
            }

            results.push(result);
        }

        Ok(results)
    }
}
