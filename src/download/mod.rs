// src/download/mod.rs

//! Artifact download pipeline
//!
//! Fetches a URL into an exclusive temporary file next to the target (so the
//! final rename stays on one filesystem), hashing the bytes as they stream.
//! The digest applies to the compressed form as delivered; decompression
//! happens afterwards into a second temporary file. Publishing is an atomic
//! rename. On any failure the temporaries are removed and the target path is
//! left untouched.

use std::fs;
use std::io::{Read, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, warn};

use crate::compression::{self, CompressionFormat};
use crate::error::{Error, Result};
use crate::progress::ProgressTracker;

/// Timeout for artifact downloads; images can be large
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Prefix for temporary files created next to the target
const TMP_PREFIX: &str = ".extup-download-";

/// Buffer size for streaming downloads
const STREAM_BUFFER_SIZE: usize = 8192;

/// Download `url` to `target_path`, verifying the SHA-256 digest of the
/// delivered bytes, decompressing when the URL suffix indicates compression,
/// applying `mode` (0 means 0644), and publishing atomically.
pub fn download(
    url: &str,
    target_path: &Path,
    expected_digest: &str,
    mode: u32,
    progress: &dyn ProgressTracker,
) -> Result<()> {
    let target_dir = target_path
        .parent()
        .ok_or_else(|| Error::System(format!("target {} has no parent", target_path.display())))?;

    fs::create_dir_all(target_dir).map_err(|e| {
        Error::System(format!(
            "failed to create target directory {}: {e}",
            target_dir.display()
        ))
    })?;
    fs::set_permissions(target_dir, fs::Permissions::from_mode(0o755)).map_err(|e| {
        Error::System(format!(
            "failed to set mode on {}: {e}",
            target_dir.display()
        ))
    })?;

    let mut tmp = new_tempfile(target_dir)?;

    let client = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|e| Error::Network(format!("failed to create HTTP client: {e}")))?;

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| Error::Network(format!("failed to fetch {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(Error::Network(format!(
            "HTTP {} from {url}",
            response.status()
        )));
    }

    let display_name = url.rsplit('/').next().unwrap_or(url);
    progress.set_message(display_name);
    if let Some(total) = response.content_length() {
        progress.set_length(total);
    }

    // Tee the body through the hasher while writing to the temp file
    let mut hasher = Sha256::new();
    let mut downloaded: u64 = 0;
    let mut buffer = [0u8; STREAM_BUFFER_SIZE];
    loop {
        let n = response
            .read(&mut buffer)
            .map_err(|e| Error::Network(format!("failed to read response: {e}")))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
        tmp.write_all(&buffer[..n])
            .map_err(|e| Error::System(format!("failed to write download data: {e}")))?;
        downloaded += n as u64;
        progress.set_position(downloaded);
    }

    let actual = format!("{:x}", hasher.finalize());
    let expected = expected_digest.to_ascii_lowercase();
    if actual != expected {
        progress.finish_with_error("hash mismatch");
        return Err(Error::Integrity { expected, actual });
    }
    debug!("downloaded {} bytes from {}, digest verified", downloaded, url);

    // Decompress into a second temporary file when the URL says so
    let format = CompressionFormat::from_extension(url);
    let staged = if format == CompressionFormat::None {
        tmp
    } else {
        let mut decompressed = new_tempfile(target_dir)?;
        compression::decompress_file(tmp.path(), decompressed.as_file_mut(), format)?;
        decompressed
    };

    let mode = if mode == 0 { 0o644 } else { mode };
    fs::set_permissions(staged.path(), fs::Permissions::from_mode(mode))
        .map_err(|e| Error::System(format!("failed to set file mode: {e}")))?;

    // Atomic publish; fall back to copy-then-remove on cross-device rename
    if let Err(persist_err) = staged.persist(target_path) {
        warn!(
            "rename to {} failed ({}), copying instead",
            target_path.display(),
            persist_err.error
        );
        fs::copy(persist_err.file.path(), target_path).map_err(|e| {
            Error::System(format!(
                "failed to copy download to {}: {e}",
                target_path.display()
            ))
        })?;
    }

    progress.finish_with_message("done");
    Ok(())
}

fn new_tempfile(dir: &Path) -> Result<NamedTempFile> {
    Builder::new()
        .prefix(TMP_PREFIX)
        .tempfile_in(dir)
        .map_err(|e| Error::System(format!("failed to create temp file in {}: {e}", dir.display())))
}
