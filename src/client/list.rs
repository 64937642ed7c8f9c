// src/client/list.rs

//! Version listing across remote and installed state

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::Result;
use crate::sysext;
use crate::version;

use super::{Client, ListOptions, VersionInfo};

impl Client {
    /// Merge available and installed versions per component, newest first.
    pub fn list(&self, opts: &ListOptions) -> Result<Vec<VersionInfo>> {
        let transfers = self.load_transfers(opts.component.as_deref())?;

        let mut all = Vec::new();
        for transfer in &transfers {
            let available = match self.available_versions(transfer) {
                Ok(available) => available,
                Err(e) => {
                    warn!("{}: failed to get available versions: {e}", transfer.component);
                    Vec::new()
                }
            };

            let (installed, current) = match sysext::get_installed_versions(transfer) {
                Ok(state) => state,
                Err(e) => {
                    warn!("{}: failed to get installed versions: {e}", transfer.component);
                    (Vec::new(), String::new())
                }
            };

            let mut merged: BTreeMap<String, VersionInfo> = BTreeMap::new();
            for v in available {
                merged.insert(
                    v.clone(),
                    VersionInfo {
                        component: transfer.component.clone(),
                        version: v,
                        available: true,
                        installed: false,
                        current: false,
                        protected: false,
                    },
                );
            }
            for v in installed {
                let entry = merged.entry(v.clone()).or_insert_with(|| VersionInfo {
                    component: transfer.component.clone(),
                    version: v.clone(),
                    available: false,
                    installed: false,
                    current: false,
                    protected: false,
                });
                entry.installed = true;
                entry.current = v == current;
            }

            let protect = &transfer.transfer.protect_version;
            if !protect.is_empty() {
                if let Some(entry) = merged.get_mut(protect) {
                    entry.protected = true;
                }
            }

            let mut versions: Vec<String> = merged.keys().cloned().collect();
            version::sort_descending(&mut versions);
            for v in versions {
                if let Some(info) = merged.remove(&v) {
                    all.push(info);
                }
            }
        }

        if let Some(wanted) = &opts.version {
            all.retain(|info| info.version == *wanted);
        }

        Ok(all)
    }
}
