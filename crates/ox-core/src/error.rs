//! Error types for oxide-launcher

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for a launch attempt
///
/// Every variant is fatal to the current launch. Nothing here is retried
/// automatically.
#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Inspect error: {0}")]
    Inspect(#[from] InspectError),

    #[error("Provision error: {0}")]
    Provision(#[from] ProvisionError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    UnsupportedArchitecture(#[from] UnsupportedArchitecture),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Header inspection failures (the I/O error family)
#[derive(Error, Debug)]
pub enum InspectError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is too short: need {required} bytes, file has {actual}")]
    TooShort {
        path: PathBuf,
        required: u64,
        actual: u64,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Copy failure while materializing a packaged resource
#[derive(Error, Debug)]
#[error("Failed to provision asset '{asset}': {cause}")]
pub struct ProvisionError {
    pub asset: String,
    #[source]
    pub cause: std::io::Error,
}

/// Post-condition failures on a provisioned or inspected asset
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{path} does not exist")]
    Missing { path: PathBuf },

    #[error("{path} is not readable")]
    Unreadable { path: PathBuf },

    #[error("{path} is empty")]
    Empty { path: PathBuf },

    #[error("{path} is truncated: expected {expected} bytes, copied {actual}")]
    Truncated {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("{path} is not executable")]
    NotExecutable { path: PathBuf },

    #[error("{path} has unexpected header bytes: {found}")]
    BadMagic { path: PathBuf, found: String },
}

/// No host ABI resolves to a bundled native module
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported architecture: no bundled module for host ABIs [{}]", .host.join(", "))]
pub struct UnsupportedArchitecture {
    pub host: Vec<String>,
}

/// Configuration errors (launch descriptor or configuration file)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Engine option at position {0} has an empty key")]
    EmptyOptionKey(usize),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Engine boundary errors
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine construction failed: {0}")]
    Construction(String),

    #[error("Engine failed to start: {0}")]
    Start(String),

    #[error("Engine session is not alive")]
    NotAlive,
}

/// Result type alias for launcher operations
pub type Result<T> = std::result::Result<T, LauncherError>;
