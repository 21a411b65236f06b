//! Launch pipeline for oxide-launcher
//!
//! Ties provisioning, header validation and launch configuration together,
//! and owns the engine session that input is forwarded through.

pub mod dispatcher;
pub mod engine;
pub mod launch_config;
pub mod launcher;
pub mod session;

pub use dispatcher::{UiDispatcher, UiHandle};
pub use engine::{EmulationEngine, EngineState, NullEngine};
pub use launch_config::{EngineLaunchConfig, EngineOption};
pub use launcher::{schedule_start, LaunchPlan, Launcher};
pub use session::{EngineSession, SessionState};
