//! Controller input mapping for oxide-launcher
//!
//! Stateless translation of host key codes and motion samples into the
//! engine's button-index and axis-group vocabulary.

pub mod event;
pub mod mapping;
pub mod motion;

pub use event::{AxisGroup, ButtonAction, ControllerEvent, LogicalButton};
pub use mapping::{map_key, translate_key, KEY_BINDINGS};
pub use motion::{translate_motion, InputSource, MotionSample};
