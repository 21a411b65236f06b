//! Events handed to the engine

/// Logical button indices understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LogicalButton {
    Cancel = 0,
    Confirm = 1,
    Auxiliary2 = 2,
    Auxiliary1 = 3,
    DpadUp = 4,
    DpadDown = 5,
    DpadLeft = 6,
    DpadRight = 7,
    Start = 8,
    Select = 9,
    ShoulderLeft = 10,
    ShoulderRight = 11,
    TriggerLeft = 12,
    TriggerRight = 13,
}

impl LogicalButton {
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Analog groups understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AxisGroup {
    /// Left stick (AXIS_X / AXIS_Y)
    Primary = 0,
    /// Right stick (AXIS_Z / AXIS_RZ)
    Secondary = 1,
    /// Hat switch reported as analog
    DirectionalPad = 2,
}

impl AxisGroup {
    pub fn id(self) -> u8 {
        self as u8
    }
}

/// Press state of a discrete button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Press,
    Release,
}

/// One translated controller event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerEvent {
    Button { button: LogicalButton, pressed: bool },
    Axis { group: AxisGroup, x: f32, y: f32 },
}

impl ControllerEvent {
    pub fn button_action(&self) -> Option<ButtonAction> {
        match self {
            Self::Button { pressed: true, .. } => Some(ButtonAction::Press),
            Self::Button { pressed: false, .. } => Some(ButtonAction::Release),
            Self::Axis { .. } => None,
        }
    }
}
