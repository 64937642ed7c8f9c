// src/commands/mod.rs

//! Command implementations for the CLI binary
//!
//! Thin adapters over the client API: build a client from the global flags,
//! call one operation, render text or JSON, map the outcome to an exit code.
//! Exit codes follow the query convention where it applies: 0 means "yes"
//! (updates available / pending work), 2 means "no", 1 means error.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use extup::{Client, ClientConfig, CliProgress, Error, SilentProgress};

mod daemon;
mod discover;
mod features;
mod install;
mod list;
mod remove;
mod status;
mod update;

pub use daemon::{cmd_daemon_disable, cmd_daemon_enable, cmd_daemon_status};
pub use discover::cmd_discover;
pub use features::{cmd_feature_disable, cmd_feature_enable, cmd_features_list};
pub use install::cmd_install;
pub use list::{cmd_components, cmd_list};
pub use remove::cmd_remove;
pub use status::{cmd_check_new, cmd_pending, cmd_vacuum};
pub use update::cmd_update;

/// Global CLI flags shared by every command
pub struct Context {
    pub definitions: Option<PathBuf>,
    pub json: bool,
    pub verify: bool,
}

impl Context {
    /// Build a client from the global flags. JSON mode keeps progress silent
    /// so stdout stays machine-readable.
    fn client(&self) -> Client {
        let mut config = ClientConfig {
            definitions: self.definitions.clone(),
            verify: self.verify,
            ..ClientConfig::default()
        };
        if self.json {
            config.progress = Arc::new(SilentProgress::new());
        } else {
            config.progress = Arc::new(CliProgress::new());
        }
        Client::new(config)
    }

    /// Print a value as pretty JSON on stdout
    fn output_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Fail unless running as root; mutating commands require it
fn require_root() -> Result<()> {
    if !nix::unistd::Uid::effective().is_root() {
        return Err(Error::Privilege("run this command as root".to_string()).into());
    }
    Ok(())
}
