//! Binary header inspection for oxide-launcher

pub mod elf;
pub mod header;
pub mod rom;

// Re-export main types
pub use elf::{require_executable_module, ElfClass, Endianness, ModuleIdent, ValidatedModule};
pub use header::{inspect, inspect_bytes, HeaderReport, HeaderSignature, SignatureKind};
