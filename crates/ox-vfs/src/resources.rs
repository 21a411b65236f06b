//! Packaged resources
//!
//! Read-only blobs bundled with the application, addressed by a stable
//! identifier and opened once per provisioning call.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

/// Stable identifier of a packaged resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opened resource
pub struct PackagedStream {
    pub reader: Box<dyn Read + Send>,
    /// Length the package declares for the resource, if known
    pub declared_len: Option<u64>,
}

impl fmt::Debug for PackagedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackagedStream")
            .field("declared_len", &self.declared_len)
            .finish_non_exhaustive()
    }
}

/// Where packaged resources come from
pub trait ResourceSource {
    fn open(&self, id: &ResourceId) -> io::Result<PackagedStream>;
}

impl<T: ResourceSource + ?Sized> ResourceSource for Arc<T> {
    fn open(&self, id: &ResourceId) -> io::Result<PackagedStream> {
        (**self).open(id)
    }
}

/// Resources stored as files in a bundle directory, one file per identifier
#[derive(Debug, Clone)]
pub struct BundleDirectory {
    root: PathBuf,
}

impl BundleDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, id: &ResourceId) -> io::Result<PathBuf> {
        let name = id.as_str();
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid resource identifier '{}'", name),
            ));
        }
        Ok(self.root.join(name))
    }
}

impl ResourceSource for BundleDirectory {
    fn open(&self, id: &ResourceId) -> io::Result<PackagedStream> {
        let path = self.resolve(id)?;
        let file = File::open(&path)?;
        let declared_len = file.metadata()?.len();
        trace!("Opened resource '{}' at {} ({} bytes)", id, path.display(), declared_len);

        Ok(PackagedStream {
            reader: Box::new(BufReader::new(file)),
            declared_len: Some(declared_len),
        })
    }
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    data: Arc<[u8]>,
    declared_len: Option<u64>,
}

/// In-memory resources, e.g. blobs compiled into the binary
#[derive(Debug, Default)]
pub struct MemoryResources {
    entries: HashMap<ResourceId, MemoryEntry>,
    opens: Mutex<HashMap<ResourceId, usize>>,
}

impl MemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource whose declared length matches its content
    pub fn insert(&mut self, id: impl Into<String>, data: impl Into<Vec<u8>>) {
        let data: Vec<u8> = data.into();
        let declared_len = Some(data.len() as u64);
        self.entries.insert(
            ResourceId::new(id),
            MemoryEntry {
                data: data.into(),
                declared_len,
            },
        );
    }

    /// Add a resource with an explicit declared length.
    ///
    /// A declared length larger than `data` models a package whose stream
    /// ends early.
    pub fn insert_with_len(
        &mut self,
        id: impl Into<String>,
        data: impl Into<Vec<u8>>,
        declared_len: Option<u64>,
    ) {
        let data: Vec<u8> = data.into();
        self.entries.insert(
            ResourceId::new(id),
            MemoryEntry {
                data: data.into(),
                declared_len,
            },
        );
    }

    /// How many times `id` has been opened
    pub fn open_count(&self, id: &str) -> usize {
        self.opens
            .lock()
            .get(&ResourceId::new(id))
            .copied()
            .unwrap_or(0)
    }
}

impl ResourceSource for MemoryResources {
    fn open(&self, id: &ResourceId) -> io::Result<PackagedStream> {
        let entry = self.entries.get(id).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no packaged resource '{}'", id))
        })?;

        *self.opens.lock().entry(id.clone()).or_insert(0) += 1;

        Ok(PackagedStream {
            reader: Box::new(Cursor::new(ArcBytes(entry.data.clone()))),
            declared_len: entry.declared_len,
        })
    }
}

struct ArcBytes(Arc<[u8]>);

impl AsRef<[u8]> for ArcBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
