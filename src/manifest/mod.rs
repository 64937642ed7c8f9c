// src/manifest/mod.rs

//! SHA256SUMS manifest fetching and parsing
//!
//! A repository publishes one manifest per extension pairing artifact
//! filenames with their SHA-256 digests, optionally signed with a detached
//! OpenPGP signature (`SHA256SUMS.gpg`).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};

mod gpg;

pub use gpg::{GpgVerifier, SignatureVerifier, KEYRING_PATHS};

/// Timeout for manifest and signature fetches
const MANIFEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A parsed SHA256SUMS manifest
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Base URL the manifest was fetched from
    pub base_url: String,
    /// filename -> lowercase hex SHA-256 digest
    pub entries: BTreeMap<String, String>,
}

/// Fetch and parse `{base_url}/SHA256SUMS`.
///
/// When a verifier is supplied, the detached signature at
/// `{base_url}/SHA256SUMS.gpg` is fetched and checked over the raw manifest
/// bytes before parsing; a failed check discards the manifest.
pub fn fetch(base_url: &str, verifier: Option<&dyn SignatureVerifier>) -> Result<Manifest> {
    let base = base_url.trim_end_matches('/');
    let manifest_url = format!("{base}/SHA256SUMS");

    debug!("fetching manifest from {}", manifest_url);
    let content = http_get(&manifest_url)?;

    if let Some(verifier) = verifier {
        let sig_url = format!("{manifest_url}.gpg");
        let signature = http_get(&sig_url)?;
        verifier.verify_detached(&content, &signature)?;
        debug!("manifest signature verified");
    }

    let mut manifest = parse(&content);
    manifest.base_url = base.to_string();
    Ok(manifest)
}

fn http_get(url: &str) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(MANIFEST_TIMEOUT)
        .build()
        .map_err(|e| Error::Network(format!("failed to create HTTP client: {e}")))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| Error::Network(format!("failed to fetch {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(Error::Network(format!(
            "HTTP {} from {url}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .map_err(|e| Error::Network(format!("failed to read response from {url}: {e}")))?;
    Ok(bytes.to_vec())
}

/// Parse SHA256SUMS content.
///
/// Lines that are blank, comments, have fewer than two fields, or whose first
/// field is not a 64-character hex digest are ignored. A leading `*` on the
/// filename (binary-mode marker) is stripped.
fn parse(content: &[u8]) -> Manifest {
    let mut entries = BTreeMap::new();

    for line in String::from_utf8_lossy(content).lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(digest), Some(filename)) = (fields.next(), fields.next()) else {
            continue;
        };

        if digest.len() != 64 || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            continue;
        }

        let filename = filename.trim_start_matches('*');
        if filename.is_empty() {
            continue;
        }

        entries.insert(filename.to_string(), digest.to_ascii_lowercase());
    }

    Manifest {
        base_url: String::new(),
        entries,
    }
}

/// Verify that a file's SHA-256 digest matches the expected value
pub fn verify_hash(path: &Path, expected: &str) -> Result<()> {
    let mut file = File::open(path)
        .map_err(|e| Error::System(format!("failed to open {}: {e}", path.display())))?;

    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .map_err(|e| Error::System(format!("failed to read {}: {e}", path.display())))?;

    let actual = format!("{:x}", hasher.finalize());
    let expected = expected.to_ascii_lowercase();
    if actual != expected {
        return Err(Error::Integrity { expected, actual });
    }
    Ok(())
}

/// A reader that computes a SHA-256 digest of everything read through it.
///
/// [`HashingReader::verify`] reports a mismatch, and also fails if the
/// underlying stream was not read to end-of-input.
pub struct HashingReader<R> {
    inner: R,
    hasher: Sha256,
    actual: Option<String>,
    expected: String,
}

impl<R: Read> HashingReader<R> {
    pub fn new(inner: R, expected: &str) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            actual: None,
            expected: expected.to_ascii_lowercase(),
        }
    }

    /// Check the digest after the stream has been fully consumed
    pub fn verify(&self) -> Result<()> {
        let Some(actual) = &self.actual else {
            return Err(Error::Integrity {
                expected: self.expected.clone(),
                actual: "(stream not fully read)".to_string(),
            });
        };
        if *actual != self.expected {
            return Err(Error::Integrity {
                expected: self.expected.clone(),
                actual: actual.clone(),
            });
        }
        Ok(())
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
        } else if self.actual.is_none() {
            self.actual = Some(format!("{:x}", self.hasher.clone().finalize()));
        }
        Ok(n)
    }
}
