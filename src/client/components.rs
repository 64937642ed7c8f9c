// src/client/components.rs

//! Configured component listing

use crate::error::Result;

use super::{Client, ComponentInfo};

impl Client {
    /// List every configured transfer, gated or not.
    pub fn components(&self) -> Result<Vec<ComponentInfo>> {
        let transfers = self.load_transfers_unfiltered(None)?;

        Ok(transfers
            .iter()
            .map(|t| ComponentInfo {
                name: t.component.clone(),
                source: t.source.path.clone(),
                source_type: t.source.source_type.clone(),
                target_path: t.target.path.display().to_string(),
                instances_max: t.transfer.instances_max,
            })
            .collect())
    }
}
