// src/client/discover.rs

//! Remote repository discovery
//!
//! Lists the extensions a repository advertises in `{base}/ext/index` and the
//! versions present in each extension's manifest. Version extraction here
//! assumes the repository filename convention
//! `<name>_<version>_<arch>.raw[.<compression>]`; this is a listing aid only,
//! the transfer engine works from configured match patterns.

use tracing::{info, warn};

use crate::error::Result;
use crate::version;

use super::{Client, DiscoverResult, ExtensionInfo};

impl Client {
    /// List remote extensions and their versions.
    pub fn discover(&self, url: &str) -> Result<DiscoverResult> {
        let base_url = url.trim_end_matches('/').to_string();

        let extensions = self.fetch_index(&base_url)?;
        info!("found {} extension(s)", extensions.len());

        let mut results = Vec::with_capacity(extensions.len());
        for name in extensions {
            let ext_url = format!("{base_url}/ext/{name}");
            let mut info = ExtensionInfo {
                name: name.clone(),
                versions: Vec::new(),
                error: None,
            };
            match self.fetch_manifest_versions(&ext_url) {
                Ok(versions) => info.versions = versions,
                Err(e) => {
                    warn!("{name}: {e}");
                    info.error = Some(e.to_string());
                }
            }
            results.push(info);
        }

        Ok(DiscoverResult {
            url: base_url,
            extensions: results,
        })
    }

    /// Fetch an extension's SHA256SUMS and collect the versions its
    /// filenames carry, newest first.
    fn fetch_manifest_versions(&self, base_url: &str) -> Result<Vec<String>> {
        let manifest_url = format!("{}/SHA256SUMS", base_url.trim_end_matches('/'));
        let content = self.fetch_text(&manifest_url)?;

        let mut versions = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (Some(_digest), Some(filename)) = (fields.next(), fields.next()) else {
                continue;
            };
            let filename = filename.trim_start_matches('*');
            if let Some(v) = version_from_filename(filename) {
                versions.push(v);
            }
        }

        versions.sort();
        versions.dedup();
        version::sort_descending(&mut versions);
        Ok(versions)
    }
}

/// Extract the version segment from `<name>_<version>_<arch>.raw[.<comp>]`.
///
/// Filenames outside this convention yield nothing.
fn version_from_filename(filename: &str) -> Option<String> {
    let mut name = filename;
    for ext in [".xz", ".gz", ".zst", ".zstd"] {
        name = name.strip_suffix(ext).unwrap_or(name);
    }
    name = name.strip_suffix(".raw").unwrap_or(name);

    let parts: Vec<&str> = name.split('_').collect();
    if parts.len() < 3 {
        return None;
    }
    Some(parts[1].to_string())
}
