//! Diagnostic snapshot of a provisioned asset

use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Number of leading bytes captured
pub const HEADER_BYTES: usize = 16;

/// Paths, sizes and header bytes kept for offline analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDiagnostics {
    pub path: PathBuf,
    pub size: u64,
    /// Unix mode bits, if the platform has them
    pub mode: Option<u32>,
    pub header_hex: String,
    pub sha1: String,
}

impl AssetDiagnostics {
    /// Read the whole file once, hashing it and keeping the first bytes
    pub fn capture(path: &Path) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let metadata = file.metadata()?;

        let mut hasher = Sha1::new();
        let mut header = Vec::with_capacity(HEADER_BYTES);
        let mut buf = [0u8; 8192];
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            if header.len() < HEADER_BYTES {
                let take = (HEADER_BYTES - header.len()).min(n);
                header.extend_from_slice(&buf[..take]);
            }
            hasher.update(&buf[..n]);
        }

        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            mode: mode_bits(&metadata),
            header_hex: hex::encode(&header),
            sha1: hex::encode(hasher.finalize()),
        })
    }

    pub fn log(&self) {
        debug!(
            path = %self.path.display(),
            size = self.size,
            mode = ?self.mode.map(|m| format!("{:o}", m & 0o7777)),
            header = %self.header_hex,
            sha1 = %self.sha1,
            "Asset diagnostics"
        );
    }
}

#[cfg(unix)]
fn mode_bits(metadata: &std::fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn mode_bits(_metadata: &std::fs::Metadata) -> Option<u32> {
    None
}
