//! Engine launch descriptor

use ox_core::config::ShaderPreset;
use ox_core::error::ConfigError;
use ox_loader::ValidatedModule;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key/value option passed to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOption {
    pub key: String,
    pub value: String,
}

/// Immutable launch configuration consumed by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineLaunchConfig {
    core_path: PathBuf,
    game_path: Option<PathBuf>,
    shader: ShaderPreset,
    options: Vec<EngineOption>,
    warnings: Vec<String>,
}

impl EngineLaunchConfig {
    pub fn core_path(&self) -> &Path {
        &self.core_path
    }

    /// `None` for a deferred-load launch
    pub fn game_path(&self) -> Option<&Path> {
        self.game_path.as_deref()
    }

    pub fn shader(&self) -> ShaderPreset {
        self.shader
    }

    /// Options in declaration order, duplicate keys already collapsed
    pub fn options(&self) -> &[EngineOption] {
        &self.options
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|opt| opt.key == key)
            .map(|opt| opt.value.as_str())
    }

    /// Non-fatal problems found while building
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Build the launch configuration.
///
/// Only a [`ValidatedModule`] can supply the core path. A repeated option
/// key keeps its first position and takes the last value, with a warning.
pub fn build<I, K, V>(
    core: &ValidatedModule,
    game_path: Option<&Path>,
    shader: ShaderPreset,
    options: I,
) -> Result<EngineLaunchConfig, ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut collected: Vec<EngineOption> = Vec::new();
    let mut warnings = Vec::new();

    for (position, (key, value)) in options.into_iter().enumerate() {
        let key = key.into();
        let value = value.into();

        if key.trim().is_empty() {
            return Err(ConfigError::EmptyOptionKey(position));
        }

        match collected.iter_mut().find(|opt| opt.key == key) {
            Some(existing) => {
                let message = format!(
                    "Duplicate engine option '{}': '{}' replaces '{}'",
                    key, value, existing.value
                );
                warn!("{}", message);
                warnings.push(message);
                existing.value = value;
            }
            None => collected.push(EngineOption { key, value }),
        }
    }

    debug!(
        "Launch config: core={}, game={:?}, shader={}, {} options",
        core.path().display(),
        game_path,
        shader.engine_name(),
        collected.len()
    );

    Ok(EngineLaunchConfig {
        core_path: core.path().to_path_buf(),
        game_path: game_path.map(Path::to_path_buf),
        shader,
        options: collected,
        warnings,
    })
}
