//! Header signatures and the raw inspector

use crate::elf::{ModuleIdent, ELF_IDENT_LEN, ELF_MAGIC};
use ox_core::config::RomFormat;
use ox_core::error::InspectError;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, trace};

/// What a signature identifies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureKind {
    Rom(RomFormat),
    ExecutableModule,
}

/// Expected magic bytes at a fixed window of a file.
///
/// `length` bytes are read starting at `offset`; `magic` is compared
/// against the start of that window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSignature {
    pub kind: SignatureKind,
    pub magic: &'static [u8],
    pub offset: u64,
    pub length: usize,
}

impl HeaderSignature {
    /// ELF ident plus e_type and e_machine
    pub const fn executable_module() -> Self {
        Self {
            kind: SignatureKind::ExecutableModule,
            magic: &ELF_MAGIC,
            offset: 0,
            length: ELF_IDENT_LEN,
        }
    }

    /// Signature for a ROM container format
    pub const fn rom(format: RomFormat) -> Self {
        crate::rom::signature(format)
    }

    /// First byte past the inspected window
    pub fn end(&self) -> u64 {
        self.offset + self.length as u64
    }
}

/// Result of inspecting a header window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderReport {
    pub raw: Vec<u8>,
    pub magic_matches: bool,
    /// Decoded ident fields, only for executable-module signatures
    pub module: Option<ModuleIdent>,
}

impl HeaderReport {
    /// Space separated upper-case hex of the raw window
    pub fn raw_hex(&self) -> String {
        format_bytes(&self.raw)
    }
}

/// Read and classify the header window of a file.
///
/// A magic mismatch is reported, not raised; only I/O problems fail.
pub fn inspect(path: &Path, signature: &HeaderSignature) -> Result<HeaderReport, InspectError> {
    let mut file = File::open(path).map_err(|source| InspectError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let file_size = file
        .metadata()
        .map_err(|source| InspectError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .len();

    debug!(
        "Inspecting {} ({} bytes) for {:?} at offset 0x{:x}",
        path.display(),
        file_size,
        signature.kind,
        signature.offset
    );

    if file_size < signature.end() {
        return Err(InspectError::TooShort {
            path: path.to_path_buf(),
            required: signature.end(),
            actual: file_size,
        });
    }

    let read_err = |source| InspectError::Read {
        path: path.to_path_buf(),
        source,
    };

    file.seek(SeekFrom::Start(signature.offset)).map_err(read_err)?;
    let mut raw = vec![0u8; signature.length];
    file.read_exact(&mut raw).map_err(read_err)?;

    Ok(classify(raw, signature))
}

/// Same as [`inspect`] over an in-memory buffer.
///
/// Returns `None` when the buffer does not cover the signature window.
pub fn inspect_bytes(data: &[u8], signature: &HeaderSignature) -> Option<HeaderReport> {
    let start = usize::try_from(signature.offset).ok()?;
    let window = data.get(start..start.checked_add(signature.length)?)?;
    Some(classify(window.to_vec(), signature))
}

fn classify(raw: Vec<u8>, signature: &HeaderSignature) -> HeaderReport {
    let magic_matches = raw.len() >= signature.magic.len()
        && raw[..signature.magic.len()] == *signature.magic;

    let module = match signature.kind {
        SignatureKind::ExecutableModule => ModuleIdent::decode(&raw),
        SignatureKind::Rom(_) => None,
    };

    trace!(
        "Header window [{}], magic_matches={}",
        format_bytes(&raw),
        magic_matches
    );

    HeaderReport {
        raw,
        magic_matches,
        module,
    }
}

pub(crate) fn format_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
