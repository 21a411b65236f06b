//! ELF ident decoding for the bundled native module

use crate::header::{format_bytes, inspect, HeaderSignature};
use ox_core::error::{LauncherError, ValidationError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// ELF magic bytes
pub const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];

/// Bytes read for an executable-module signature: e_ident (16), e_type (2), e_machine (2)
pub const ELF_IDENT_LEN: usize = 20;

/// e_ident indices
pub mod ei {
    pub const CLASS: usize = 4;
    pub const DATA: usize = 5;
    pub const VERSION: usize = 6;
    pub const OSABI: usize = 7;
    pub const MACHINE_LO: usize = 18;
    pub const MACHINE_HI: usize = 19;
}

/// Machine types
pub mod em {
    pub const I386: u16 = 3;
    pub const ARM: u16 = 40;
    pub const X86_64: u16 = 62;
    pub const AARCH64: u16 = 183;
}

/// ELF class (word size)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfClass {
    Elf32,
    Elf64,
    Unknown(u8),
}

impl From<u8> for ElfClass {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Elf32,
            2 => Self::Elf64,
            other => Self::Unknown(other),
        }
    }
}

/// ELF data encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
    Unknown(u8),
}

impl From<u8> for Endianness {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Little,
            2 => Self::Big,
            other => Self::Unknown(other),
        }
    }
}

/// Decoded identification fields of an executable module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleIdent {
    pub class: ElfClass,
    pub endianness: Endianness,
    pub version: u8,
    pub os_abi: u8,
    /// e_machine read as little-endian from bytes 18 and 19
    pub machine: u16,
}

impl ModuleIdent {
    /// Decode from a raw header window, `None` if it is shorter than [`ELF_IDENT_LEN`]
    pub fn decode(raw: &[u8]) -> Option<Self> {
        if raw.len() < ELF_IDENT_LEN {
            return None;
        }

        Some(Self {
            class: ElfClass::from(raw[ei::CLASS]),
            endianness: Endianness::from(raw[ei::DATA]),
            version: raw[ei::VERSION],
            os_abi: raw[ei::OSABI],
            machine: u16::from_le_bytes([raw[ei::MACHINE_LO], raw[ei::MACHINE_HI]]),
        })
    }

    pub fn machine_name(&self) -> &'static str {
        match self.machine {
            em::I386 => "x86",
            em::ARM => "arm",
            em::X86_64 => "x86_64",
            em::AARCH64 => "aarch64",
            _ => "unknown",
        }
    }
}

/// A native module whose header passed the executable-module check.
///
/// Only [`require_executable_module`] creates one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedModule {
    path: PathBuf,
    ident: ModuleIdent,
}

impl ValidatedModule {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ident(&self) -> &ModuleIdent {
        &self.ident
    }
}

/// Inspect `path` as an executable module and reject a magic mismatch
pub fn require_executable_module(path: &Path) -> Result<ValidatedModule, LauncherError> {
    let report = inspect(path, &HeaderSignature::executable_module())?;

    if !report.magic_matches {
        return Err(ValidationError::BadMagic {
            path: path.to_path_buf(),
            found: format_bytes(&report.raw[..ELF_MAGIC.len()]),
        }
        .into());
    }

    // The signature window always covers the ident, so decode cannot fail here.
    let ident = report.module.ok_or_else(|| ValidationError::BadMagic {
        path: path.to_path_buf(),
        found: report.raw_hex(),
    })?;

    debug!(
        "Module ident: class={:?}, data={:?}, version={}, osabi={}",
        ident.class, ident.endianness, ident.version, ident.os_abi
    );
    info!(
        "Native module {} is {:?} {} (e_machine=0x{:04x})",
        path.display(),
        ident.class,
        ident.machine_name(),
        ident.machine
    );

    Ok(ValidatedModule {
        path: path.to_path_buf(),
        ident,
    })
}
