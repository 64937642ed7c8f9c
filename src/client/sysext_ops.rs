// src/client/sysext_ops.rs

//! Activation verbs exposed on the client

use tracing::info;

use crate::error::Result;

use super::Client;

impl Client {
    /// Ask the activator to re-read the activation directory
    pub fn refresh(&self) -> Result<()> {
        info!("refreshing extensions");
        self.config.sysext_runner.refresh()
    }

    /// Merge staged extensions into the live tree
    pub fn merge(&self) -> Result<()> {
        info!("merging extensions");
        self.config.sysext_runner.merge()
    }

    /// Unmerge all extensions from the live tree
    pub fn unmerge(&self) -> Result<()> {
        info!("unmerging extensions");
        self.config.sysext_runner.unmerge()
    }
}
