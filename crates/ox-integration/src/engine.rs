//! Emulation engine boundary
//!
//! The engine owns emulation, rendering and audio. The launcher only hands
//! it a launch configuration, drives its lifecycle, and forwards input.

use crate::launch_config::EngineLaunchConfig;
use ox_core::error::EngineError;
use ox_input::ButtonAction;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

/// Engine execution state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Stopped,
    Running,
    Paused,
}

/// External emulation engine
pub trait EmulationEngine {
    /// Load the core (and the game, unless deferred) and begin running
    fn start(&mut self, config: &EngineLaunchConfig) -> Result<(), EngineError>;

    /// Attach the game image after a deferred start
    fn attach_game(&mut self, path: &Path) -> Result<(), EngineError>;

    fn pause(&mut self);

    fn resume(&mut self);

    fn destroy(&mut self);

    fn send_button_event(&mut self, action: ButtonAction, index: u8);

    fn send_motion_event(&mut self, group: u8, x: f32, y: f32);
}

/// Engine that only logs what it is asked to do
#[derive(Debug)]
pub struct NullEngine {
    state: EngineState,
    game: Option<PathBuf>,
    button_events: u64,
    motion_events: u64,
}

impl NullEngine {
    pub fn new() -> Self {
        Self {
            state: EngineState::Stopped,
            game: None,
            button_events: 0,
            motion_events: 0,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }
}

impl Default for NullEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EmulationEngine for NullEngine {
    fn start(&mut self, config: &EngineLaunchConfig) -> Result<(), EngineError> {
        info!(
            "Null engine starting: core={}, game={:?}, shader={}",
            config.core_path().display(),
            config.game_path(),
            config.shader().engine_name()
        );
        for option in config.options() {
            debug!("  {} = {}", option.key, option.value);
        }
        self.game = config.game_path().map(Path::to_path_buf);
        self.state = EngineState::Running;
        Ok(())
    }

    fn attach_game(&mut self, path: &Path) -> Result<(), EngineError> {
        info!("Null engine attaching game {}", path.display());
        self.game = Some(path.to_path_buf());
        Ok(())
    }

    fn pause(&mut self) {
        self.state = EngineState::Paused;
    }

    fn resume(&mut self) {
        self.state = EngineState::Running;
    }

    fn destroy(&mut self) {
        info!(
            "Null engine destroyed after {} button and {} motion events",
            self.button_events, self.motion_events
        );
        self.state = EngineState::Stopped;
    }

    fn send_button_event(&mut self, action: ButtonAction, index: u8) {
        trace!("button {:?} {}", action, index);
        self.button_events += 1;
    }

    fn send_motion_event(&mut self, group: u8, x: f32, y: f32) {
        trace!("motion {} ({}, {})", group, x, y);
        self.motion_events += 1;
    }
}
