// src/sysext/mod.rs

//! Staged extension state and the activation bridge
//!
//! The manager owns everything under a transfer's target directory: version
//! enumeration, the current symlink, the activation-directory link, retention
//! and removal. The runner wraps the external activation utility behind an
//! injectable seam.

mod manager;
mod runner;

pub use manager::{
    get_active_version, get_installed_versions, is_extension_active, link_to_sysext,
    remove_matching_files, unlink_from_sysext, update_symlink, vacuum_with_details,
};
pub use runner::{CommandRunner, RecordingRunner, SysextRunner};

/// Directory the activator reads extensions from
pub const SYSEXT_DIR: &str = "/var/lib/extensions";

/// Runtime directory the activator populates with merged extensions
pub const RUN_EXTENSIONS_DIR: &str = "/run/extensions";
