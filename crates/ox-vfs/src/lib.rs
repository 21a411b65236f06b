//! Packaged asset provisioning for oxide-launcher

pub mod abi;
pub mod diagnostics;
pub mod permissions;
pub mod provision;
pub mod resources;

pub use abi::{select_variant, ArchitectureTag, HostPlatform, NativeHost, StaticHost, VariantId, VariantTable};
pub use diagnostics::AssetDiagnostics;
pub use permissions::{AssetPermissions, HostPermissions, PermissionOps};
pub use provision::{PackagedAsset, ProvisionedPath, Provisioner};
pub use resources::{BundleDirectory, MemoryResources, PackagedStream, ResourceId, ResourceSource};
