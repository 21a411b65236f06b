//! Launch pipeline
//!
//! Runs synchronously on the calling thread:
//! - select the native module variant for the host
//! - provision the core and the game image
//! - inspect both headers, discarding an asset whose header is rejected
//! - build the launch configuration
//!
//! Engine construction is then posted to the UI-affinity dispatcher.

use crate::dispatcher::UiHandle;
use crate::engine::EmulationEngine;
use crate::launch_config::{self, EngineLaunchConfig};
use crate::session::EngineSession;
use ox_core::config::Config;
use ox_core::error::{EngineError, Result};
use ox_loader::{inspect, rom, HeaderSignature, ValidatedModule};
use ox_vfs::{
    select_variant, ArchitectureTag, HostPermissions, HostPlatform, PackagedAsset,
    PermissionOps, ProvisionedPath, Provisioner, ResourceId, ResourceSource, VariantTable,
};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Everything needed to start the engine
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub variant: ArchitectureTag,
    pub core: ValidatedModule,
    pub rom: ProvisionedPath,
    /// Whether the ROM header carried the configured format's magic
    pub rom_magic_matches: bool,
    pub config: EngineLaunchConfig,
}

impl LaunchPlan {
    /// Game to attach after start, for a deferred-load launch
    pub fn deferred_game(&self) -> Option<PathBuf> {
        if self.config.game_path().is_none() {
            Some(self.rom.as_path().to_path_buf())
        } else {
            None
        }
    }
}

pub struct Launcher<S, H, P = HostPermissions> {
    config: Config,
    host: H,
    provisioner: Provisioner<S, P>,
}

impl<S: ResourceSource, H: HostPlatform> Launcher<S, H, HostPermissions> {
    pub fn new(config: Config, source: S, host: H) -> Self {
        let provisioner = Provisioner::new(source).capture_diagnostics(config.debug.capture_diagnostics);
        Self::with_provisioner(config, host, provisioner)
    }
}

impl<S: ResourceSource, H: HostPlatform, P: PermissionOps> Launcher<S, H, P> {
    pub fn with_provisioner(config: Config, host: H, provisioner: Provisioner<S, P>) -> Self {
        Self {
            config,
            host,
            provisioner,
        }
    }

    pub fn provisioner(&self) -> &Provisioner<S, P> {
        &self.provisioner
    }

    /// Provision, validate and describe the launch. Any error is fatal.
    pub fn prepare(&self) -> Result<LaunchPlan> {
        let assets = &self.config.assets;
        let private_dir = &self.config.paths.private_dir;

        let variants = VariantTable::from_config(&assets.core_variants);
        let host_abis = self.host.supported_abis();
        info!("Host ABIs: {:?}", host_abis);
        let (variant, core_resource) = select_variant(host_abis.as_slice(), &variants)?;

        let core_asset = PackagedAsset::native_module(
            "core",
            core_resource,
            private_dir.join(&assets.core_filename),
            variant,
        );
        let rom_asset = PackagedAsset::data(
            "rom",
            ResourceId::new(&assets.rom_resource),
            private_dir.join(&assets.rom_filename),
        );

        let core_path = self.provisioner.provision(&core_asset)?;
        let rom_path = self.provisioner.provision(&rom_asset)?;

        // A rejected header must not survive to short-circuit the next launch.
        let core = match ox_loader::require_executable_module(core_path.as_path()) {
            Ok(core) => core,
            Err(e) => {
                self.provisioner.discard(&core_asset);
                return Err(e);
            }
        };

        let rom_signature = HeaderSignature::rom(assets.rom_format);
        let rom_report = match inspect(rom_path.as_path(), &rom_signature) {
            Ok(report) => report,
            Err(e) => {
                self.provisioner.discard(&rom_asset);
                return Err(e.into());
            }
        };
        if !rom_report.magic_matches {
            warn!(
                "ROM {} does not carry the {:?} signature (header: {})",
                rom_path.as_path().display(),
                assets.rom_format,
                rom_report.raw_hex()
            );
        }
        let expected_ext = rom::extension(assets.rom_format);
        if rom_path.as_path().extension().and_then(|e| e.to_str()) != Some(expected_ext) {
            warn!(
                "ROM file name {} does not use the .{} extension",
                assets.rom_filename, expected_ext
            );
        }

        let engine = &self.config.engine;
        let game_path = if engine.defer_game_load {
            None
        } else {
            Some(rom_path.as_path())
        };
        let config = launch_config::build(
            &core,
            game_path,
            engine.shader,
            engine
                .options
                .iter()
                .map(|opt| (opt.key.clone(), opt.value.clone())),
        )?;

        Ok(LaunchPlan {
            variant,
            core,
            rom: rom_path,
            rom_magic_matches: rom_report.magic_matches,
            config,
        })
    }
}

/// Post engine construction to the UI-affinity thread.
///
/// The callback builds the engine, assigns it to the session, and attaches a
/// deferred game. Any failure terminates the session.
pub fn schedule_start<F>(plan: LaunchPlan, ui: &UiHandle<EngineSession>, factory: F)
where
    F: FnOnce() -> std::result::Result<Box<dyn EmulationEngine>, EngineError> + Send + 'static,
{
    ui.post(move |session: &mut EngineSession| {
        let engine = match factory() {
            Ok(engine) => engine,
            Err(e) => {
                session.terminate(&format!("engine construction failed: {}", e));
                return;
            }
        };

        if let Err(e) = session.attach(engine, &plan.config) {
            error!("Launch aborted: {}", e);
            return;
        }

        if let Some(game) = plan.deferred_game() {
            if let Err(e) = session.attach_game(&game) {
                error!("Launch aborted: {}", e);
            }
        }
    });
}
