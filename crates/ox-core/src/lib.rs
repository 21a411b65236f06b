//! Core types for oxide-launcher
//!
//! This crate provides the error taxonomy, configuration, and logging
//! setup shared by the provisioning pipeline and the input layer.

pub mod config;
pub mod error;
pub mod logging;

pub use config::Config;
pub use error::{
    ConfigError, EngineError, InspectError, LauncherError, ProvisionError, Result,
    UnsupportedArchitecture, ValidationError,
};
