//! Permission bits for provisioned assets

use bitflags::bitflags;
use std::io;
use std::path::Path;

bitflags! {
    /// Access an asset must grant once provisioned
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AssetPermissions: u8 {
        const READ    = 0b01;
        const EXECUTE = 0b10;
    }
}

impl AssetPermissions {
    /// Unix mode bits for this set. Readable is always granted.
    pub fn mode(&self) -> u32 {
        if self.contains(Self::EXECUTE) {
            0o755
        } else {
            0o644
        }
    }
}

/// Filesystem permission operations used by the provisioner
pub trait PermissionOps {
    fn apply(&self, path: &Path, permissions: AssetPermissions) -> io::Result<()>;
    fn is_readable(&self, path: &Path) -> bool;
    fn is_executable(&self, path: &Path) -> bool;
}

/// Permissions of the real host filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct HostPermissions;

#[cfg(unix)]
impl PermissionOps for HostPermissions {
    fn apply(&self, path: &Path, permissions: AssetPermissions) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(permissions.mode()))
    }

    fn is_readable(&self, path: &Path) -> bool {
        access(path, libc::R_OK)
    }

    fn is_executable(&self, path: &Path) -> bool {
        access(path, libc::X_OK)
    }
}

#[cfg(not(unix))]
impl PermissionOps for HostPermissions {
    fn apply(&self, path: &Path, _permissions: AssetPermissions) -> io::Result<()> {
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_readonly(false);
        std::fs::set_permissions(path, perms)
    }

    fn is_readable(&self, path: &Path) -> bool {
        std::fs::File::open(path).is_ok()
    }

    fn is_executable(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Ask the kernel whether this process may access `path` with `mode`
#[cfg(unix)]
fn access(path: &Path, mode: libc::c_int) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: c_path is a valid NUL-terminated string for the duration of the call
    unsafe { libc::access(c_path.as_ptr(), mode) == 0 }
}
