// src/client/update.rs

//! The transfer engine: select a version, fetch, publish, link, retain

use std::cmp::Ordering;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Transfer;
use crate::download;
use crate::error::{Error, Result};
use crate::manifest;
use crate::sysext;
use crate::version::{self, extract_version_multi, Pattern};

use super::{Client, UpdateOptions, UpdateResult};

/// Base delay for the retry backoff; the delay grows linearly with attempts
const RETRY_DELAY: Duration = Duration::from_millis(1000);

impl Client {
    /// Run the transfer engine over the active transfers (or one component).
    ///
    /// Per-component failures are recorded on that component's result and the
    /// loop continues. The activation refresh is issued once after the whole
    /// batch, and is not suppressed by partial failures.
    pub fn update(&self, opts: &UpdateOptions) -> Result<Vec<UpdateResult>> {
        let transfers = self.load_transfers(opts.component.as_deref())?;
        if transfers.is_empty() {
            info!("no enabled transfers found");
            return Ok(Vec::new());
        }

        let mut results = Vec::with_capacity(transfers.len());
        for transfer in &transfers {
            let mut result = UpdateResult::new(&transfer.component);
            match self.run_transfer(
                transfer,
                opts.version.as_deref(),
                opts.no_vacuum,
                1,
                &mut result,
            ) {
                Ok(()) => {
                    if result.downloaded {
                        info!("updated {} to {}", transfer.component, result.version);
                        result.next_action =
                            Some("Reboot required to activate changes".to_string());
                    } else {
                        info!("{} is up to date ({})", transfer.component, result.version);
                    }
                }
                Err(e) => {
                    warn!("update of {} failed: {e}", transfer.component);
                    result.error = Some(e.to_string());
                }
            }
            results.push(result);
        }

        if !opts.no_refresh {
            if let Err(e) = self.config.sysext_runner.refresh() {
                warn!("activation refresh failed: {e}");
            }
        }

        Ok(results)
    }

    /// One pass of the per-component pipeline. `retries` > 1 wraps the
    /// network steps in a fixed-count backoff.
    pub(super) fn run_transfer(
        &self,
        t: &Transfer,
        requested_version: Option<&str>,
        no_vacuum: bool,
        retries: u32,
        result: &mut UpdateResult,
    ) -> Result<()> {
        if t.source.source_type != "url-file" {
            return Err(Error::Config(format!(
                "{}: unsupported source type: {}",
                t.component, t.source.source_type
            )));
        }

        let manifest = with_retry(retries, || {
            manifest::fetch(&t.source.path, self.verifier_for(t))
        })?;

        // Candidate set: every manifest filename that matches a source
        // pattern, bounded below by MinVersion
        let mut candidates: Vec<String> = Vec::new();
        for filename in manifest.entries.keys() {
            let Some((v, _)) = extract_version_multi(filename, &t.source.match_patterns) else {
                continue;
            };
            if !t.transfer.min_version.is_empty()
                && version::compare(&v, &t.transfer.min_version) == Ordering::Less
            {
                continue;
            }
            candidates.push(v);
        }
        candidates.sort();
        candidates.dedup();

        if candidates.is_empty() {
            return Err(Error::NotFound(format!(
                "{}: no candidate versions in manifest",
                t.component
            )));
        }

        let selected = match requested_version {
            Some(v) => {
                if !candidates.iter().any(|c| c == v) {
                    return Err(Error::NotFound(format!(
                        "{}: version {v} not available",
                        t.component
                    )));
                }
                v.to_string()
            }
            None => {
                version::sort_descending(&mut candidates);
                candidates[0].clone()
            }
        };
        result.version = selected.clone();

        // Fast path: selected version already on disk and current
        let (installed, current) = sysext::get_installed_versions(t)?;
        if installed.iter().any(|v| *v == selected) && current == selected {
            result.installed = true;
            return Ok(());
        }

        // Locate the manifest entry for the selected version
        let (source_file, expected_digest) = manifest
            .entries
            .iter()
            .find(|(filename, _)| {
                extract_version_multi(filename, &t.source.match_patterns)
                    .is_some_and(|(v, _)| v == selected)
            })
            .map(|(filename, digest)| (filename.clone(), digest.clone()))
            .ok_or_else(|| {
                Error::NotFound(format!("{}: no file found for version {selected}", t.component))
            })?;

        let target_pattern = Pattern::parse(&t.target.match_patterns[0])?;
        let target_file = target_pattern.build_filename(&selected);
        let target_path = t.target.path.join(&target_file);

        let url = format!("{}/{}", t.source.path, source_file);
        with_retry(retries, || {
            download::download(
                &url,
                &target_path,
                &expected_digest,
                t.target.mode,
                self.config.progress.as_ref(),
            )
        })?;
        result.downloaded = true;
        result.installed = true;

        // Everything past the publish is non-fatal for the component
        if !t.target.current_symlink.is_empty() {
            if let Err(e) =
                sysext::update_symlink(&t.target.path, &t.target.current_symlink, &target_file)
            {
                warn!("{}: failed to update symlink: {e}", t.component);
                result.warnings.push(format!("failed to update symlink: {e}"));
            }
            if let Err(e) = sysext::link_to_sysext(t, &self.config.sysext_dir) {
                warn!("{}: failed to link into activation directory: {e}", t.component);
                result
                    .warnings
                    .push(format!("failed to link into activation directory: {e}"));
            }
        }

        if !no_vacuum {
            if let Err(e) = sysext::vacuum_with_details(t) {
                warn!("{}: retention failed: {e}", t.component);
                result.warnings.push(format!("retention failed: {e}"));
            }
        }

        Ok(())
    }
}

/// Run `f`, retrying network failures up to `attempts` times with a linearly
/// growing delay. Other failure kinds are returned immediately.
fn with_retry<T>(attempts: u32, mut f: impl FnMut() -> Result<T>) -> Result<T> {
    let attempts = attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f() {
            Ok(value) => return Ok(value),
            Err(e @ Error::Network(_)) if attempt < attempts => {
                warn!("attempt {attempt} failed: {e}, retrying...");
                std::thread::sleep(RETRY_DELAY * attempt);
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

    #[test]
    fn test_with_retry_retries_network_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<u32> = with_retry(3, || {
            let n = calls.fetch_add(1, AtomicOrdering::SeqCst) + 1;
            if n < 3 {
                Err(Error::Network("transient".into()))
            } else {
                Ok(n)
            }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_with_retry_does_not_retry_integrity_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_retry(3, || {
            calls.fetch_add(1, AtomicOrdering::SeqCst);
            Err(Error::Integrity {
                expected: "a".into(),
                actual: "b".into(),
            })
        });
        assert!(result.is_err());
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_with_retry_gives_up_after_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_retry(2, || {
            calls.fetch_add(1, AtomicOrdering::SeqCst);
            Err(Error::Network("down".into()))
        });
        assert!(result.is_err());
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 2);
    }
}
