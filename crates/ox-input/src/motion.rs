//! Analog motion mapping

use crate::event::{AxisGroup, ControllerEvent};
use bitflags::bitflags;
use tracing::trace;

bitflags! {
    /// Input source bits reported with a motion event
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InputSource: u32 {
        const CLASS_BUTTON    = 0x0000_0001;
        const CLASS_POINTER   = 0x0000_0002;
        const CLASS_POSITION  = 0x0000_0008;
        const CLASS_JOYSTICK  = 0x0000_0010;
        const KEYBOARD        = 0x0000_0101;
        const DPAD            = 0x0000_0201;
        const GAMEPAD         = 0x0000_0401;
        const TOUCHSCREEN     = 0x0000_1002;
        const JOYSTICK        = 0x0100_0010;
    }
}

/// Host motion actions
pub mod motion_action {
    pub const DOWN: i32 = 0;
    pub const UP: i32 = 1;
    pub const MOVE: i32 = 2;
}

/// Host axis identifiers
pub mod axis {
    pub const X: u32 = 0;
    pub const Y: u32 = 1;
    pub const Z: u32 = 11;
    pub const RZ: u32 = 14;
    pub const HAT_X: u32 = 15;
    pub const HAT_Y: u32 = 16;
}

/// Axis pairs read for each analog group
pub static AXIS_GROUPS: [(AxisGroup, u32, u32); 3] = [
    (AxisGroup::Primary, axis::X, axis::Y),
    (AxisGroup::Secondary, axis::Z, axis::RZ),
    (AxisGroup::DirectionalPad, axis::HAT_X, axis::HAT_Y),
];

/// One motion event as delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub struct MotionSample {
    pub source: InputSource,
    pub action: i32,
    axes: Vec<(u32, f32)>,
}

impl MotionSample {
    pub fn new(source: InputSource, action: i32) -> Self {
        Self {
            source,
            action,
            axes: Vec::new(),
        }
    }

    pub fn with_axis(mut self, id: u32, value: f32) -> Self {
        self.set_axis(id, value);
        self
    }

    pub fn set_axis(&mut self, id: u32, value: f32) {
        match self.axes.iter_mut().find(|(axis, _)| *axis == id) {
            Some(entry) => entry.1 = value,
            None => self.axes.push((id, value)),
        }
    }

    /// Axis value, 0.0 when the device does not report it
    pub fn axis(&self, id: u32) -> f32 {
        self.axes
            .iter()
            .find(|(axis, _)| *axis == id)
            .map(|(_, value)| *value)
            .unwrap_or(0.0)
    }

    /// Joystick-class source and a move action
    pub fn is_joystick_move(&self) -> bool {
        self.source.contains(InputSource::CLASS_JOYSTICK) && self.action == motion_action::MOVE
    }
}

/// Translate a motion sample into axis events.
///
/// Both sticks are always forwarded. The hat group is forwarded only when one
/// of its components is non-zero. Values pass through unclamped.
pub fn translate_motion(sample: &MotionSample) -> Vec<ControllerEvent> {
    if !sample.is_joystick_move() {
        return Vec::new();
    }

    AXIS_GROUPS
        .iter()
        .filter_map(|&(group, x_axis, y_axis)| {
            let x = sample.axis(x_axis);
            let y = sample.axis(y_axis);
            if group == AxisGroup::DirectionalPad && x == 0.0 && y == 0.0 {
                return None;
            }
            trace!("Axis group {} -> ({}, {})", group.id(), x, y);
            Some(ControllerEvent::Axis { group, x, y })
        })
        .collect()
}
