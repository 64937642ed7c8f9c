// src/compression/mod.rs

//! Decompression for downloaded artifacts
//!
//! Extension images travel compressed (gzip, xz, zstd) and are staged
//! decompressed. The format is detected from the URL suffix; detection is
//! case-insensitive.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{Error, Result};

/// Supported compression formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// No compression (raw data)
    None,
    /// Gzip compression (.gz)
    Gzip,
    /// XZ/LZMA compression (.xz)
    Xz,
    /// Zstandard compression (.zst, .zstd)
    Zstd,
}

impl CompressionFormat {
    /// Detect the compression format from a filename or URL suffix
    pub fn from_extension(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".gz") {
            Self::Gzip
        } else if lower.ends_with(".xz") {
            Self::Xz
        } else if lower.ends_with(".zst") || lower.ends_with(".zstd") {
            Self::Zstd
        } else {
            Self::None
        }
    }

    /// Human-readable name for this format
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Xz => "xz",
            Self::Zstd => "zstd",
        }
    }
}

impl std::fmt::Display for CompressionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Create a decompressing reader for the given format.
///
/// For [`CompressionFormat::None`] the reader is returned unchanged.
pub fn create_decoder<'a, R: Read + 'a>(
    reader: R,
    format: CompressionFormat,
) -> Result<Box<dyn Read + 'a>> {
    match format {
        CompressionFormat::None => Ok(Box::new(reader)),
        CompressionFormat::Gzip => Ok(Box::new(flate2::read::GzDecoder::new(reader))),
        CompressionFormat::Xz => Ok(Box::new(xz2::read::XzDecoder::new(reader))),
        CompressionFormat::Zstd => {
            let decoder = zstd::Decoder::new(reader)
                .map_err(|e| Error::System(format!("failed to create zstd decoder: {e}")))?;
            Ok(Box::new(decoder))
        }
    }
}

/// Decompress `src` into the open `dst` file using the given format
pub fn decompress_file(src: &Path, dst: &mut File, format: CompressionFormat) -> Result<()> {
    let file = File::open(src)
        .map_err(|e| Error::System(format!("failed to open {}: {e}", src.display())))?;
    let mut decoder = create_decoder(file, format)?;
    io::copy(&mut decoder, dst)
        .map_err(|e| Error::System(format!("failed to decompress {} data: {e}", format.name())))?;
    Ok(())
}
