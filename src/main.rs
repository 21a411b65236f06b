//! oxide-launcher
//!
//! Headless entry point: provisions the bundled core and game into private
//! storage, validates them, and starts them on the null engine.

use anyhow::{bail, Context};
use ox_core::{logging, Config};
use ox_integration::{
    schedule_start, EmulationEngine, EngineSession, Launcher, NullEngine, UiDispatcher,
};
use ox_vfs::{BundleDirectory, HostPlatform, NativeHost, StaticHost};

fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;
    logging::init(config.debug.log_level);

    tracing::info!("Starting oxide-launcher");

    let abis = if config.host.abis.is_empty() {
        NativeHost.supported_abis()
    } else {
        config.host.abis.clone()
    };
    let source = BundleDirectory::new(&config.paths.bundle_dir);
    let launcher = Launcher::new(config, source, StaticHost::new(abis));

    let plan = launcher.prepare().context("preparing launch")?;
    tracing::info!(
        "Launching {} with core {} ({})",
        plan.rom.as_path().display(),
        plan.core.path().display(),
        plan.variant
    );

    let dispatcher = UiDispatcher::new();
    schedule_start(plan, &dispatcher.handle(), || {
        Ok(Box::new(NullEngine::new()) as Box<dyn EmulationEngine>)
    });

    let mut session = EngineSession::new();
    dispatcher.run_pending(&mut session);
    if !session.is_alive() {
        bail!("engine session ended during startup");
    }

    session.pause();
    session.resume();
    session.destroy();

    tracing::info!("Session finished");
    Ok(())
}
