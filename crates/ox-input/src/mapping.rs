//! Key code mapping
//!
//! Maps host key codes to the engine's logical button indices through a
//! fixed table.

use crate::event::{ControllerEvent, LogicalButton};
use tracing::trace;

/// Host key codes
pub mod keycode {
    pub const DPAD_UP: i32 = 19;
    pub const DPAD_DOWN: i32 = 20;
    pub const DPAD_LEFT: i32 = 21;
    pub const DPAD_RIGHT: i32 = 22;
    pub const BUTTON_A: i32 = 96;
    pub const BUTTON_B: i32 = 97;
    pub const BUTTON_X: i32 = 99;
    pub const BUTTON_Y: i32 = 100;
    pub const BUTTON_L1: i32 = 102;
    pub const BUTTON_R1: i32 = 103;
    pub const BUTTON_L2: i32 = 104;
    pub const BUTTON_R2: i32 = 105;
    pub const BUTTON_START: i32 = 108;
    pub const BUTTON_SELECT: i32 = 109;
}

/// Host key actions
pub mod key_action {
    pub const DOWN: i32 = 0;
    pub const UP: i32 = 1;
}

/// Key code to logical button bindings
pub static KEY_BINDINGS: [(i32, LogicalButton); 14] = [
    (keycode::BUTTON_A, LogicalButton::Confirm),
    (keycode::BUTTON_B, LogicalButton::Cancel),
    (keycode::BUTTON_X, LogicalButton::Auxiliary1),
    (keycode::BUTTON_Y, LogicalButton::Auxiliary2),
    (keycode::BUTTON_L1, LogicalButton::ShoulderLeft),
    (keycode::BUTTON_R1, LogicalButton::ShoulderRight),
    (keycode::BUTTON_L2, LogicalButton::TriggerLeft),
    (keycode::BUTTON_R2, LogicalButton::TriggerRight),
    (keycode::BUTTON_START, LogicalButton::Start),
    (keycode::BUTTON_SELECT, LogicalButton::Select),
    (keycode::DPAD_UP, LogicalButton::DpadUp),
    (keycode::DPAD_DOWN, LogicalButton::DpadDown),
    (keycode::DPAD_LEFT, LogicalButton::DpadLeft),
    (keycode::DPAD_RIGHT, LogicalButton::DpadRight),
];

/// Look up the logical button for a key code
pub fn map_key(code: i32) -> Option<LogicalButton> {
    KEY_BINDINGS
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, button)| *button)
}

/// Translate a key event.
///
/// `None` means not handled: the caller falls through to the platform's
/// default handling.
pub fn translate_key(code: i32, action: i32) -> Option<ControllerEvent> {
    let button = map_key(code)?;
    let pressed = match action {
        key_action::DOWN => true,
        key_action::UP => false,
        _ => return None,
    };

    trace!("Key {} -> button {} pressed={}", code, button.index(), pressed);
    Some(ControllerEvent::Button { button, pressed })
}
