//! Engine session
//!
//! Owns the engine handle for the lifetime of one launch. Lifecycle
//! callbacks and input go through the session, which checks liveness before
//! touching the engine.

use crate::engine::EmulationEngine;
use crate::launch_config::EngineLaunchConfig;
use ox_core::error::{EngineError, LauncherError};
use ox_input::{translate_key, translate_motion, ControllerEvent, MotionSample};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No engine assigned yet
    Pending,
    Running,
    Paused,
    /// Engine failed or was destroyed; terminal
    Terminated,
}

pub struct EngineSession {
    engine: Option<Box<dyn EmulationEngine>>,
    state: SessionState,
}

impl EngineSession {
    pub fn new() -> Self {
        Self {
            engine: None,
            state: SessionState::Pending,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// An engine is assigned and has not been torn down
    pub fn is_alive(&self) -> bool {
        self.engine.is_some() && matches!(self.state, SessionState::Running | SessionState::Paused)
    }

    /// Assign and start the engine. On failure the session terminates and
    /// the engine is dropped.
    pub fn attach(
        &mut self,
        mut engine: Box<dyn EmulationEngine>,
        config: &EngineLaunchConfig,
    ) -> Result<(), LauncherError> {
        if self.state != SessionState::Pending {
            warn!("Ignoring engine attach in state {:?}", self.state);
            return Err(EngineError::Construction(format!(
                "session is {:?}, not pending",
                self.state
            ))
            .into());
        }

        if let Err(e) = engine.start(config) {
            error!("Engine failed to start: {}", e);
            engine.destroy();
            self.state = SessionState::Terminated;
            return Err(e.into());
        }

        self.engine = Some(engine);
        self.state = SessionState::Running;
        info!("Engine session running");
        Ok(())
    }

    /// Attach the game image to a session started without one
    pub fn attach_game(&mut self, path: &Path) -> Result<(), LauncherError> {
        if !self.is_alive() {
            return Err(EngineError::NotAlive.into());
        }
        let Some(engine) = self.engine.as_mut() else {
            return Err(EngineError::NotAlive.into());
        };

        if let Err(e) = engine.attach_game(path) {
            self.terminate(&format!("attaching game failed: {}", e));
            return Err(e.into());
        }
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.state == SessionState::Running {
            if let Some(engine) = self.engine.as_mut() {
                engine.pause();
                self.state = SessionState::Paused;
            }
        }
    }

    pub fn resume(&mut self) {
        if self.state == SessionState::Paused {
            if let Some(engine) = self.engine.as_mut() {
                engine.resume();
                self.state = SessionState::Running;
            }
        }
    }

    /// Tear the engine down; the session stays terminated
    pub fn destroy(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
        self.state = SessionState::Terminated;
    }

    /// End the session after a fatal error
    pub fn terminate(&mut self, reason: &str) {
        error!("Terminating session: {}", reason);
        self.destroy();
    }

    /// Handle a key event. Returns `false` when the caller should fall through
    /// to default handling.
    pub fn on_key(&mut self, code: i32, action: i32) -> bool {
        match translate_key(code, action) {
            Some(event) => self.forward(event),
            None => false,
        }
    }

    /// Handle a motion event. Returns `true` if anything was forwarded.
    pub fn on_motion(&mut self, sample: &MotionSample) -> bool {
        let mut forwarded = false;
        for event in translate_motion(sample) {
            forwarded |= self.forward(event);
        }
        forwarded
    }

    /// Send one translated event to the engine if the session is alive
    pub fn forward(&mut self, event: ControllerEvent) -> bool {
        if !self.is_alive() {
            debug!("Dropping {:?}, session not alive", event);
            return false;
        }
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };

        match event {
            ControllerEvent::Button { button, .. } => {
                if let Some(action) = event.button_action() {
                    engine.send_button_event(action, button.index());
                }
            }
            ControllerEvent::Axis { group, x, y } => engine.send_motion_event(group.id(), x, y),
        }
        true
    }
}

impl Default for EngineSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NullEngine;
    use ox_core::config::ShaderPreset;
    use ox_input::mapping::{key_action, keycode};
    use std::io::Write;

    fn launch_config() -> (tempfile::NamedTempFile, EngineLaunchConfig) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[
            0x7F, 0x45, 0x4C, 0x46, 0x02, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x03, 0x00, 0x3E, 0x00,
        ])
        .unwrap();
        let core = ox_loader::require_executable_module(file.path()).unwrap();
        let options: [(&str, &str); 0] = [];
        let config = crate::launch_config::build(&core, None, ShaderPreset::None, options).unwrap();
        (file, config)
    }

    struct FailingEngine;

    impl EmulationEngine for FailingEngine {
        fn start(&mut self, _config: &EngineLaunchConfig) -> Result<(), EngineError> {
            Err(EngineError::Start("no GL context".to_string()))
        }
        fn attach_game(&mut self, _path: &Path) -> Result<(), EngineError> {
            Ok(())
        }
        fn pause(&mut self) {}
        fn resume(&mut self) {}
        fn destroy(&mut self) {}
        fn send_button_event(&mut self, _action: ox_input::ButtonAction, _index: u8) {
            panic!("input reached a failed engine");
        }
        fn send_motion_event(&mut self, _group: u8, _x: f32, _y: f32) {
            panic!("input reached a failed engine");
        }
    }

    #[test]
    fn test_pending_session_drops_input() {
        let mut session = EngineSession::new();
        assert!(!session.is_alive());
        assert!(!session.on_key(keycode::BUTTON_A, key_action::DOWN));
    }

    #[test]
    fn test_lifecycle() {
        let (_file, config) = launch_config();
        let mut session = EngineSession::new();
        session.attach(Box::new(NullEngine::new()), &config).unwrap();
        assert!(session.is_alive());

        session.pause();
        assert_eq!(session.state(), SessionState::Paused);
        assert!(session.is_alive());
        session.resume();
        assert_eq!(session.state(), SessionState::Running);

        assert!(session.on_key(keycode::BUTTON_START, key_action::DOWN));
        assert!(!session.on_key(24, key_action::DOWN));

        session.destroy();
        assert!(!session.is_alive());
        assert!(!session.on_key(keycode::BUTTON_START, key_action::UP));
    }

    #[test]
    fn test_failed_start_terminates() {
        let (_file, config) = launch_config();
        let mut session = EngineSession::new();
        let err = session.attach(Box::new(FailingEngine), &config).unwrap_err();
        assert!(matches!(err, LauncherError::Engine(EngineError::Start(_))));
        assert_eq!(session.state(), SessionState::Terminated);
        assert!(!session.on_key(keycode::BUTTON_A, key_action::DOWN));
    }

    #[test]
    fn test_second_attach_rejected() {
        let (_file, config) = launch_config();
        let mut session = EngineSession::new();
        session.attach(Box::new(NullEngine::new()), &config).unwrap();
        assert!(session.attach(Box::new(NullEngine::new()), &config).is_err());
        assert!(session.is_alive());
    }

    #[test]
    fn test_attach_game_requires_live_session() {
        let mut session = EngineSession::new();
        let err = session.attach_game(Path::new("/data/game.nes")).unwrap_err();
        assert!(matches!(err, LauncherError::Engine(EngineError::NotAlive)));
    }
}
