// src/error.rs

//! Crate-wide error type.
//!
//! Every fallible library operation returns [`Result`]. Variants map to the
//! failure classes the engine distinguishes: configuration problems are fatal
//! to the file that carries them, network and integrity failures are surfaced
//! per component, and privilege/conflict/active states guard destructive
//! operations.

use thiserror::Error;

/// Errors produced by the extup library
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or incomplete transfer/feature file, or an invalid match pattern
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport failure or non-success HTTP status
    #[error("network error: {0}")]
    Network(String),

    /// Downloaded artifact does not hash to the manifest digest
    #[error("hash mismatch: expected {expected}, got {actual}")]
    Integrity { expected: String, actual: String },

    /// Signature verification failed, or no keyring was available when one was required
    #[error("signature verification failed: {0}")]
    Verify(String),

    /// Requested component or version does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// A unit of the same name is already installed
    #[error("conflict: {0}")]
    Conflict(String),

    /// Refusing to remove artifacts that are currently merged
    #[error("{0}")]
    Active(String),

    /// Root-required operation invoked without root
    #[error("operation requires root privileges: {0}")]
    Privilege(String),

    /// Filesystem or external-process failure
    #[error("{0}")]
    System(String),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;
