// src/config/mod.rs

//! Transfer and feature configuration
//!
//! Definitions are INI-style files discovered across a prioritized path list.
//! For each suffix the earliest path containing a given stem wins; later
//! paths are shadowed. Base files take drop-in overrides from
//! `<stem>.<type>.d/*.conf` directories collected from every search path.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

mod feature;
mod host;
mod ini;
mod transfer;

pub use feature::{enabled_feature_names, is_feature_enabled, load_features, Feature};
pub use host::{expand_specifiers, HostIdentity, OsReleaseIdentity, StaticIdentity};
pub use ini::Document;
pub use transfer::{
    filter_transfers_by_features, get_transfers_for_feature, load_transfers, SourceSection,
    TargetSection, Transfer, TransferSection,
};

/// Definition search paths, in priority order
pub const DEFAULT_SEARCH_PATHS: [&str; 4] = [
    "/etc/sysupdate.d",
    "/run/sysupdate.d",
    "/usr/local/lib/sysupdate.d",
    "/usr/lib/sysupdate.d",
];

/// Directory where enable/disable drop-ins and installed transfer files land
pub const ETC_SYSUPDATE_DIR: &str = "/etc/sysupdate.d";

/// Default staging directory for transfer targets
pub const DEFAULT_TARGET_PATH: &str = "/var/lib/extensions";

/// Resolve the effective search paths for a load operation
fn search_paths(custom: Option<&Path>) -> Vec<PathBuf> {
    match custom {
        Some(path) => vec![path.to_path_buf()],
        None => DEFAULT_SEARCH_PATHS.iter().map(PathBuf::from).collect(),
    }
}

/// Collect `<stem><suffix>` files across the search paths.
///
/// Returns stem -> path; the earliest path containing a stem wins.
fn collect_config_files(paths: &[PathBuf], suffix: &str) -> Result<BTreeMap<String, PathBuf>> {
    let mut files = BTreeMap::new();

    for dir in paths {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(Error::System(format!(
                    "failed to read directory {}: {e}",
                    dir.display()
                )))
            }
        };

        for entry in entries {
            let entry = entry
                .map_err(|e| Error::System(format!("failed to read directory entry: {e}")))?;
            let name = entry.file_name().to_string_lossy().to_string();
            let Some(stem) = name.strip_suffix(suffix) else {
                continue;
            };
            if entry.path().is_dir() {
                continue;
            }
            files
                .entry(stem.to_string())
                .or_insert_with(|| dir.join(&name));
        }
    }

    Ok(files)
}

/// Collect drop-in `*.conf` files from `<dropin_dir_name>/` under every
/// search path, earliest path winning per filename, sorted lexicographically.
fn collect_dropins(paths: &[PathBuf], dropin_dir_name: &str) -> Result<Vec<PathBuf>> {
    let mut dropins: BTreeMap<String, PathBuf> = BTreeMap::new();

    for dir in paths {
        let dropin_dir = dir.join(dropin_dir_name);
        let entries = match fs::read_dir(&dropin_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(Error::System(format!(
                    "failed to read drop-in directory {}: {e}",
                    dropin_dir.display()
                )))
            }
        };

        for entry in entries {
            let entry = entry
                .map_err(|e| Error::System(format!("failed to read directory entry: {e}")))?;
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.ends_with(".conf") || entry.path().is_dir() {
                continue;
            }
            dropins.entry(name.clone()).or_insert(dropin_dir.join(name));
        }
    }

    // BTreeMap iteration gives the lexicographic application order
    Ok(dropins.into_values().collect())
}
