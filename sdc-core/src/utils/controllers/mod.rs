//! Module Exports
//!
//! This file exports the controllers used by the startup sequencer.
//!
//! - `steering`: homes the steering motor against its mechanical end stops
//!   and derives the safe travel limits.
//! - `display`: routes status lines to the LCD and the debug log.

pub mod display;
pub mod steering;

pub use display::{output_text, DisplayModule, DISPLAY_CHANNEL};
pub use steering::{home_steer, SteeringLimits};
