//! Architecture selection
//!
//! Maps the host's ordered list of supported ABIs onto the native module
//! variants that were bundled with the application.

use crate::resources::ResourceId;
use ox_core::config::CoreVariant;
use ox_core::error::UnsupportedArchitecture;
use std::fmt;
use tracing::{debug, info, warn};

/// Instruction-set variants a native module can be built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchitectureTag {
    Arm64V8a,
    ArmeabiV7a,
    Armeabi,
    X86,
    X86_64,
}

impl ArchitectureTag {
    pub const ALL: [ArchitectureTag; 5] = [
        Self::Arm64V8a,
        Self::ArmeabiV7a,
        Self::Armeabi,
        Self::X86,
        Self::X86_64,
    ];

    /// ABI name as reported by the host
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arm64V8a => "arm64-v8a",
            Self::ArmeabiV7a => "armeabi-v7a",
            Self::Armeabi => "armeabi",
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
        }
    }

    /// Parse a host ABI name, `None` if unrecognized
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == name.trim())
    }
}

impl fmt::Display for ArchitectureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a bundled native module variant
pub type VariantId = ResourceId;

/// Bundled variants keyed by tag.
///
/// A single resource may back several tags when only one native build ships.
#[derive(Debug, Clone, Default)]
pub struct VariantTable {
    entries: Vec<(ArchitectureTag, VariantId)>,
}

impl VariantTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a variant, replacing any previous one for the same tag
    pub fn insert(&mut self, tag: ArchitectureTag, variant: VariantId) {
        if let Some(entry) = self.entries.iter_mut().find(|(t, _)| *t == tag) {
            entry.1 = variant;
        } else {
            self.entries.push((tag, variant));
        }
    }

    /// Same resource for every tag
    pub fn shared(variant: VariantId, tags: &[ArchitectureTag]) -> Self {
        let mut table = Self::new();
        for &tag in tags {
            table.insert(tag, variant.clone());
        }
        table
    }

    /// Build from configuration, skipping entries with an unknown ABI name
    pub fn from_config(variants: &[CoreVariant]) -> Self {
        let mut table = Self::new();
        for variant in variants {
            match ArchitectureTag::parse(&variant.abi) {
                Some(tag) => table.insert(tag, ResourceId::new(&variant.resource)),
                None => warn!("Ignoring core variant for unknown ABI '{}'", variant.abi),
            }
        }
        table
    }

    pub fn get(&self, tag: ArchitectureTag) -> Option<&VariantId> {
        self.entries
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, variant)| variant)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pick the first host ABI, in host preference order, that has a bundled variant
pub fn select_variant<S: AsRef<str>>(
    host_abis: &[S],
    available: &VariantTable,
) -> Result<(ArchitectureTag, VariantId), UnsupportedArchitecture> {
    for abi in host_abis {
        let abi = abi.as_ref();
        let Some(tag) = ArchitectureTag::parse(abi) else {
            debug!("Skipping unrecognized host ABI '{}'", abi);
            continue;
        };

        if let Some(variant) = available.get(tag) {
            info!("Selected native module variant '{}' for ABI {}", variant, tag);
            return Ok((tag, variant.clone()));
        }

        debug!("No bundled variant for host ABI {}", tag);
    }

    Err(UnsupportedArchitecture {
        host: host_abis.iter().map(|abi| abi.as_ref().to_string()).collect(),
    })
}

/// Source of the host's supported ABI list
pub trait HostPlatform {
    /// Supported ABIs, most preferred first
    fn supported_abis(&self) -> Vec<String>;
}

/// ABI list derived from the architecture this binary was built for
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeHost;

impl HostPlatform for NativeHost {
    fn supported_abis(&self) -> Vec<String> {
        let tags: &[ArchitectureTag] = match std::env::consts::ARCH {
            "aarch64" => &[
                ArchitectureTag::Arm64V8a,
                ArchitectureTag::ArmeabiV7a,
                ArchitectureTag::Armeabi,
            ],
            "arm" => &[ArchitectureTag::ArmeabiV7a, ArchitectureTag::Armeabi],
            "x86_64" => &[ArchitectureTag::X86_64, ArchitectureTag::X86],
            "x86" => &[ArchitectureTag::X86],
            _ => &[],
        };
        tags.iter().map(|tag| tag.as_str().to_string()).collect()
    }
}

/// Fixed ABI list, e.g. from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    abis: Vec<String>,
}

impl StaticHost {
    pub fn new(abis: Vec<String>) -> Self {
        Self { abis }
    }
}

impl HostPlatform for StaticHost {
    fn supported_abis(&self) -> Vec<String> {
        self.abis.clone()
    }
}
