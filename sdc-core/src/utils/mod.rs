//! Utility re-exports and helper macros for the Self-Driving Challenge bot.
//!
//! This module re-exports the hardware trait boundary, the controllers, and the
//! startup sequencer:
//!
//! - `hardware`: traits for the motors, sensors, speaker, and display drivers
//! - `controllers`: steering calibration and the display line channel
//! - `sequence`: the startup/vehicle sequencer and its settings
//!
//! The `mk_static!` macro simplifies static initialization in no-std contexts.

pub mod controllers;
pub mod hardware;
pub mod sequence;

pub use controllers::display::output_text;
pub use controllers::steering::{home_steer, SteeringLimits};
pub use embassy_time::*;
pub use sequence::VehicleSequencer;

#[macro_export]
/// Initialize a no-std static cell and write the given value into it.
///
/// This macro creates a `static_cell::StaticCell` for type `$t` and initializes
/// it with `$val`, returning a mutable reference to the stored value.
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        STATIC_CELL.uninit().write($val)
    }};
}
