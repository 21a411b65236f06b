//! Configuration system for oxide-launcher

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub paths: PathConfig,
    pub assets: AssetConfig,
    pub host: HostConfig,
    pub engine: EngineConfig,
    pub debug: DebugConfig,
}

/// Storage locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// App-private directory the assets are materialized into
    pub private_dir: PathBuf,
    /// Directory holding the packaged resources
    pub bundle_dir: PathBuf,
}

/// Packaged asset layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub rom_resource: String,
    pub rom_filename: String,
    pub rom_format: RomFormat,
    pub core_filename: String,
    /// Bundled core variants, one entry per recognized ABI tag.
    /// Several tags may share a resource.
    pub core_variants: Vec<CoreVariant>,
}

/// One bundled native module variant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoreVariant {
    pub abi: String,
    pub resource: String,
}

/// Known ROM container formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum RomFormat {
    #[default]
    Ines,
    GameBoy,
    GameBoyAdvance,
}

/// Host platform overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HostConfig {
    /// Supported ABIs in preference order. Empty means ask the running host.
    pub abis: Vec<String>,
}

/// Engine launch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub shader: ShaderPreset,
    /// Start the engine before the game is attached
    pub defer_game_load: bool,
    pub options: Vec<EngineOptionEntry>,
}

/// Key/value option passed to the engine, in declaration order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineOptionEntry {
    pub key: String,
    pub value: String,
}

/// Post-processing shader selector
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum ShaderPreset {
    None,
    #[default]
    Sharp,
    Crt,
    Scanlines,
}

impl ShaderPreset {
    /// Name understood by the engine
    pub fn engine_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Sharp => "sharp-bilinear",
            Self::Crt => "crt-easymode",
            Self::Scanlines => "scanlines",
        }
    }
}

/// Debug settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub log_level: LogLevel,
    /// Hash and dump headers of provisioned assets
    pub capture_diagnostics: bool,
}

/// Logging level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive string for `tracing_subscriber::EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        let base = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("oxide-launcher");

        Self {
            private_dir: base.join("files"),
            bundle_dir: base.join("bundle"),
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        // One native build shared by every ABI tag.
        let core_variants = ["arm64-v8a", "armeabi-v7a", "x86_64", "x86"]
            .iter()
            .map(|abi| CoreVariant {
                abi: abi.to_string(),
                resource: "core".to_string(),
            })
            .collect();

        Self {
            rom_resource: "rom".to_string(),
            rom_filename: "game.nes".to_string(),
            rom_format: RomFormat::default(),
            core_filename: "core_libretro_android.so".to_string(),
            core_variants,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shader: ShaderPreset::default(),
            defer_game_load: false,
            options: Vec::new(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            capture_diagnostics: true,
        }
    }
}

impl Config {
    /// Load configuration from the default location, or create it if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Self::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io_err)?;
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("oxide-launcher")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.assets.rom_format, RomFormat::Ines);
        assert_eq!(config.assets.core_variants.len(), 4);
        assert!(config
            .assets
            .core_variants
            .iter()
            .all(|v| v.resource == "core"));
        assert!(config.host.abis.is_empty());
        assert!(!config.engine.defer_game_load);
        assert_eq!(config.engine.shader.engine_name(), "sharp-bilinear");
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.engine.options.push(EngineOptionEntry {
            key: "video_scale".to_string(),
            value: "3".to_string(),
        });
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.engine.options, config.engine.options);
        assert_eq!(parsed.assets.core_filename, config.assets.core_filename);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [assets]
            rom_filename = "tetris.gb"
            rom_format = "GameBoy"

            [host]
            abis = ["x86_64"]
            "#,
        )
        .unwrap();
        assert_eq!(parsed.assets.rom_filename, "tetris.gb");
        assert_eq!(parsed.assets.rom_format, RomFormat::GameBoy);
        assert_eq!(parsed.assets.rom_resource, "rom");
        assert_eq!(parsed.host.abis, vec!["x86_64".to_string()]);
        assert_eq!(parsed.debug.log_level, LogLevel::Info);
    }

    #[test]
    fn test_save_and_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.debug.log_level = LogLevel::Debug;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.debug.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
