//! Gesture-to-animation core for a two-state switch control.
//!
//! The host feeds pointer events, hold-timer callbacks and frame ticks into a
//! [`ToggleController`]; every entry point returns a [`ControllerOutput`]
//! listing the effects the host must perform (redraw, feedback, timers).

pub mod config;
pub mod controller;
pub mod geometry;
pub mod host;
pub mod palette;
pub mod spring;
pub mod state;
pub mod touch;

pub use config::{ConfigError, SwitchConfig};
pub use controller::ToggleController;
pub use geometry::{SwitchGeometry, ThumbBounds};
pub use host::{ControllerOutput, HoldToken, HostEffect, HostEnvironment, SwitchHost};
pub use palette::Argb;
pub use spring::{SpringEngine, SpringFrame, SpringParams};
pub use state::{HoldSide, Press, Substate, ThumbPosition, ToggleState};
pub use touch::{Intent, PointerEvent, PointerKind, TouchMode};
