// src/manifest/gpg.rs

//! Detached signature verification for manifests
//!
//! Verification is isolated behind the [`SignatureVerifier`] trait so callers
//! never see the OpenPGP implementation. The default verifier loads the first
//! readable keyring from a fixed search list and checks detached signatures
//! with sequoia-openpgp under its standard policy.

use std::fs;
use std::path::PathBuf;

use sequoia_openpgp as openpgp;

use openpgp::cert::CertParser;
use openpgp::parse::Parse;
use openpgp::policy::StandardPolicy;
use openpgp::{Cert, Packet, PacketPile};
use tracing::debug;

use crate::error::{Error, Result};

/// Keyring search paths, in priority order
pub const KEYRING_PATHS: [&str; 2] = [
    "/etc/systemd/import-pubring.gpg",
    "/usr/lib/systemd/import-pubring.gpg",
];

/// Checks a detached signature over raw manifest bytes
pub trait SignatureVerifier: Send + Sync {
    fn verify_detached(&self, data: &[u8], signature: &[u8]) -> Result<()>;
}

/// OpenPGP-backed verifier reading certificates from an on-disk keyring
pub struct GpgVerifier {
    keyring_paths: Vec<PathBuf>,
    policy: StandardPolicy<'static>,
}

impl GpgVerifier {
    /// Create a verifier using the default keyring search list
    pub fn new() -> Self {
        Self::with_paths(KEYRING_PATHS.iter().map(PathBuf::from).collect())
    }

    /// Create a verifier with explicit keyring paths
    pub fn with_paths(keyring_paths: Vec<PathBuf>) -> Self {
        Self {
            keyring_paths,
            policy: StandardPolicy::new(),
        }
    }

    /// Load certificates from the first readable keyring.
    ///
    /// The parser accepts both binary and armored encodings.
    fn load_keyring(&self) -> Result<Vec<Cert>> {
        for path in &self.keyring_paths {
            let data = match fs::read(path) {
                Ok(data) => data,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(Error::Verify(format!(
                        "failed to read keyring {}: {e}",
                        path.display()
                    )))
                }
            };

            let parser = CertParser::from_bytes(&data).map_err(|e| {
                Error::Verify(format!("failed to parse keyring {}: {e}", path.display()))
            })?;

            let mut certs = Vec::new();
            for cert in parser {
                let cert = cert.map_err(|e| {
                    Error::Verify(format!(
                        "failed to parse certificate in {}: {e}",
                        path.display()
                    ))
                })?;
                certs.push(cert);
            }

            if certs.is_empty() {
                return Err(Error::Verify(format!(
                    "keyring {} contains no certificates",
                    path.display()
                )));
            }

            debug!("loaded {} certificate(s) from {}", certs.len(), path.display());
            return Ok(certs);
        }

        Err(Error::Verify(format!(
            "no keyring found in {:?}",
            self.keyring_paths
        )))
    }
}

impl Default for GpgVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureVerifier for GpgVerifier {
    fn verify_detached(&self, data: &[u8], signature: &[u8]) -> Result<()> {
        let certs = self.load_keyring()?;

        let pile = PacketPile::from_bytes(signature)
            .map_err(|e| Error::Verify(format!("failed to parse signature: {e}")))?;

        for packet in pile.descendants() {
            let Packet::Signature(sig) = packet else {
                continue;
            };
            for cert in &certs {
                for key in cert.keys().with_policy(&self.policy, None).for_signing() {
                    if sig.verify_message(key.key(), data).is_ok() {
                        return Ok(());
                    }
                }
            }
        }

        Err(Error::Verify(
            "no valid signature found for manifest".to_string(),
        ))
    }
}
