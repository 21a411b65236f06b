//! Asset provisioning
//!
//! Materializes packaged resources into private storage with a
//! copy-then-validate sequence:
//!
//! 1. skip the copy when the destination already exists
//! 2. stream the resource into a uniquely named `.part` sibling and rename
//!    it into place
//! 3. apply the requested permission bits
//! 4. verify existence, readability, size and executability independently
//!    of what the write calls reported
//!
//! A destination that fails verification is removed so the next launch
//! copies it again. Callers that reject an asset after provisioning (for
//! example on its header) hand it back through [`Provisioner::discard`].

use crate::abi::ArchitectureTag;
use crate::diagnostics::AssetDiagnostics;
use crate::permissions::{AssetPermissions, HostPermissions, PermissionOps};
use crate::resources::{ResourceId, ResourceSource};
use ox_core::error::{LauncherError, ProvisionError, ValidationError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A packaged resource and where it must end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedAsset {
    pub name: String,
    pub resource: ResourceId,
    pub destination: PathBuf,
    pub permissions: AssetPermissions,
    pub variant: Option<ArchitectureTag>,
}

impl PackagedAsset {
    /// Readable data asset, e.g. the game image
    pub fn data(name: impl Into<String>, resource: ResourceId, destination: PathBuf) -> Self {
        Self {
            name: name.into(),
            resource,
            destination,
            permissions: AssetPermissions::READ,
            variant: None,
        }
    }

    /// Readable and executable native module built for `variant`
    pub fn native_module(
        name: impl Into<String>,
        resource: ResourceId,
        destination: PathBuf,
        variant: ArchitectureTag,
    ) -> Self {
        Self {
            name: name.into(),
            resource,
            destination,
            permissions: AssetPermissions::READ | AssetPermissions::EXECUTE,
            variant: Some(variant),
        }
    }
}

/// Canonical path of an asset that passed every post-condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedPath(PathBuf);

impl ProvisionedPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for ProvisionedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Copies packaged resources into place and validates them.
///
/// The per-destination lock only serializes callers sharing this instance.
/// Separate instances over the same directory each copy into their own
/// temporary file, and the last rename wins.
pub struct Provisioner<S, P = HostPermissions> {
    source: S,
    permissions: P,
    capture_diagnostics: bool,
    /// One lock per destination, held for the whole provision sequence
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl<S: ResourceSource> Provisioner<S, HostPermissions> {
    pub fn new(source: S) -> Self {
        Self::with_permissions(source, HostPermissions)
    }
}

impl<S: ResourceSource, P: PermissionOps> Provisioner<S, P> {
    pub fn with_permissions(source: S, permissions: P) -> Self {
        Self {
            source,
            permissions,
            capture_diagnostics: false,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Log a hash and header dump of every provisioned asset
    pub fn capture_diagnostics(mut self, enabled: bool) -> Self {
        self.capture_diagnostics = enabled;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Materialize `asset`, idempotently
    pub fn provision(&self, asset: &PackagedAsset) -> Result<ProvisionedPath, LauncherError> {
        let lock = self.lock_for(&asset.destination);
        let _guard = lock.lock();

        let dest = &asset.destination;
        let declared_len = if dest.exists() {
            debug!(
                "Asset '{}' already present at {}, skipping copy",
                asset.name,
                dest.display()
            );
            None
        } else {
            self.copy(asset)?
        };

        if let Err(e) = self.permissions.apply(dest, asset.permissions) {
            // A silently ineffective chmod is caught by verify; a failing one is reported here.
            warn!("Failed to set permissions on {}: {}", dest.display(), e);
        }

        if let Err(e) = self.verify(asset, declared_len) {
            warn!("Asset '{}' failed validation: {}", asset.name, e);
            remove_invalid(dest);
            return Err(e.into());
        }

        let canonical = fs::canonicalize(dest).map_err(|cause| ProvisionError {
            asset: asset.name.clone(),
            cause,
        })?;

        if self.capture_diagnostics {
            match AssetDiagnostics::capture(&canonical) {
                Ok(diag) => diag.log(),
                Err(e) => warn!("Could not capture diagnostics for {}: {}", canonical.display(), e),
            }
        }

        info!("Provisioned asset '{}' at {}", asset.name, canonical.display());
        Ok(ProvisionedPath(canonical))
    }

    fn lock_for(&self, destination: &Path) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .entry(destination.to_path_buf())
            .or_default()
            .clone()
    }

    /// Stream the resource into place. Returns the declared length when the
    /// package reports one, for the truncation check.
    fn copy(&self, asset: &PackagedAsset) -> Result<Option<u64>, ProvisionError> {
        let dest = &asset.destination;
        let provision_err = |cause| ProvisionError {
            asset: asset.name.clone(),
            cause,
        };

        let mut stream = self.source.open(&asset.resource).map_err(provision_err)?;

        let parent = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(provision_err)?;

        // The temporary file removes itself if anything below fails.
        let copied = (|| -> io::Result<u64> {
            let mut part = tempfile::Builder::new()
                .prefix(&part_prefix(dest))
                .suffix(".part")
                .tempfile_in(parent)?;
            let copied = {
                let mut writer = BufWriter::new(part.as_file_mut());
                let copied = io::copy(&mut stream.reader, &mut writer)?;
                writer.flush()?;
                copied
            };
            part.as_file().sync_all()?;
            part.persist(dest).map_err(|e| e.error)?;
            Ok(copied)
        })()
        .map_err(provision_err)?;

        debug!(
            "Copied resource '{}' to {} ({} bytes, declared {:?})",
            asset.resource,
            dest.display(),
            copied,
            stream.declared_len
        );
        Ok(stream.declared_len)
    }

    fn verify(
        &self,
        asset: &PackagedAsset,
        declared_len: Option<u64>,
    ) -> Result<(), ValidationError> {
        let path = asset.destination.clone();

        let metadata = match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => return Err(ValidationError::Missing { path }),
        };

        if !self.permissions.is_readable(&path) {
            return Err(ValidationError::Unreadable { path });
        }

        let size = metadata.len();
        if size == 0 {
            return Err(ValidationError::Empty { path });
        }

        if let Some(expected) = declared_len {
            if size != expected {
                return Err(ValidationError::Truncated {
                    path,
                    expected,
                    actual: size,
                });
            }
        }

        if asset.permissions.contains(AssetPermissions::EXECUTE)
            && !self.permissions.is_executable(&path)
        {
            warn!(
                "{} is not executable after chmod, re-applying once",
                path.display()
            );
            if let Err(e) = self.permissions.apply(&path, asset.permissions) {
                warn!("Failed to re-apply permissions on {}: {}", path.display(), e);
            }
            if !self.permissions.is_executable(&path) {
                return Err(ValidationError::NotExecutable { path });
            }
        }

        Ok(())
    }

    /// Remove a provisioned asset that was rejected after provisioning, so
    /// the next launch copies it again
    pub fn discard(&self, asset: &PackagedAsset) {
        let lock = self.lock_for(&asset.destination);
        let _guard = lock.lock();
        info!(
            "Discarding rejected asset '{}' at {}",
            asset.name,
            asset.destination.display()
        );
        remove_invalid(&asset.destination);
    }
}

fn remove_invalid(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!("Failed to remove invalid asset {}: {}", path.display(), e);
        }
    }
}

/// Hidden name prefix for the temporary copy of `dest`
fn part_prefix(dest: &Path) -> OsString {
    let mut prefix = OsString::from(".");
    prefix.push(dest.file_name().unwrap_or_else(|| OsStr::new("asset")));
    prefix.push(".");
    prefix
}
