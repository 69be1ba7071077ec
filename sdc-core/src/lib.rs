//! Steering calibration and startup sequencing for the Self-Driving Challenge bot
//! on no-std embedded platforms.
//!
//! For a runnable host simulation, see the `mock-brick` application.
#![no_std]

pub mod utils;
