//! Simulated brick hardware for running the startup sequence on a host.
//!
//! The steering motor models its mechanical end stops, the drivebase feeds
//! the simulated distance sensor (backing up opens clearance), and every
//! motion is logged as a JSON-tagged command. Motion durations are derived
//! from the commanded speeds so the run feels like the real vehicle.

use std::cell::RefCell;
use std::convert::Infallible;

use embassy_time::Timer;
use sdc_core::utils::hardware::{
    DisplayDriver, DistanceSensor, DriveBase, DriveSettings, Speaker, SteeringMotor, StopAction,
    TouchSensor,
};
use serde::Serialize;
use tracing::{debug, info};

/// Motion command as executed by the simulated hardware.
///
/// Serialized as JSON with tag `"mc"`.
#[derive(Debug, Serialize, Clone, Copy)]
#[serde(tag = "mc", rename_all = "snake_case")]
pub enum MotionCommand {
    /// Stall-seeking steering sweep.
    Stall { speed: i32, duty_limit: i32 },
    /// Steering move to an absolute target.
    Steer { speed: i32, target: i32 },
    /// Straight drivebase segment.
    Straight { mm: i32 },
}

fn log_command(cmd: MotionCommand) {
    match serde_json::to_string(&cmd) {
        Ok(json) => info!("{}", json),
        Err(e) => info!("command {:?} (serialize failed: {})", cmd, e),
    }
}

/// World state shared between the drivebase and the distance sensor.
pub struct SimState {
    /// Clearance in front of the vehicle, in distance-sensor units.
    pub clearance: i32,
}

impl SimState {
    pub fn new(clearance: i32) -> Self {
        Self { clearance }
    }
}

/// Steering motor with mechanical end stops at fixed physical angles.
pub struct SimSteer {
    angle: i32,
    left_stop: i32,
    right_stop: i32,
}

impl SimSteer {
    pub fn new(left_stop: i32, right_stop: i32) -> Self {
        Self {
            angle: 0,
            left_stop,
            right_stop,
        }
    }

    async fn travel_to(&mut self, target: i32, speed: i32) {
        let travel = (target - self.angle).unsigned_abs() as u64;
        Timer::after_millis(travel * 1000 / speed.unsigned_abs().max(1) as u64).await;
        self.angle = target;
    }
}

impl SteeringMotor for SimSteer {
    type Error = Infallible;

    fn angle(&mut self) -> i32 {
        self.angle
    }

    fn reset_angle(&mut self, angle: i32) {
        let shift = angle - self.angle;
        self.left_stop += shift;
        self.right_stop += shift;
        self.angle = angle;
    }

    async fn run_until_stalled(
        &mut self,
        speed: i32,
        _then: StopAction,
        duty_limit: i32,
    ) -> Result<i32, Self::Error> {
        log_command(MotionCommand::Stall { speed, duty_limit });
        let stop = if speed < 0 {
            self.left_stop
        } else {
            self.right_stop
        };
        self.travel_to(stop, speed).await;
        Ok(self.angle)
    }

    async fn run_target(
        &mut self,
        speed: i32,
        target: i32,
        _then: StopAction,
    ) -> Result<(), Self::Error> {
        log_command(MotionCommand::Steer { speed, target });
        self.travel_to(target.clamp(self.left_stop, self.right_stop), speed)
            .await;
        Ok(())
    }
}

/// Drivebase that updates the shared world state as it moves.
pub struct SimDriveBase {
    state: &'static RefCell<SimState>,
    straight_speed: i32,
}

impl SimDriveBase {
    pub fn new(state: &'static RefCell<SimState>) -> Self {
        Self {
            state,
            straight_speed: 200,
        }
    }
}

impl DriveBase for SimDriveBase {
    type Error = Infallible;

    fn configure(&mut self, settings: &DriveSettings) -> Result<(), Self::Error> {
        self.straight_speed = settings.straight_speed.max(1);
        info!("drivebase configured: {:?}", settings);
        Ok(())
    }

    async fn straight(&mut self, distance_mm: i32) -> Result<(), Self::Error> {
        log_command(MotionCommand::Straight { mm: distance_mm });
        Timer::after_millis(distance_mm.unsigned_abs() as u64 * 1000 / self.straight_speed as u64)
            .await;
        if distance_mm < 0 {
            // Backing up opens clearance in front of the vehicle.
            self.state.borrow_mut().clearance += -distance_mm / 10;
        }
        Ok(())
    }
}

/// Bumper that reports pressed after a configured number of polls.
pub struct SimBumper {
    press_after: usize,
    polls: usize,
}

impl SimBumper {
    pub fn new(press_after: usize) -> Self {
        Self {
            press_after,
            polls: 0,
        }
    }
}

impl TouchSensor for SimBumper {
    fn pressed(&mut self) -> bool {
        self.polls += 1;
        self.polls > self.press_after
    }
}

/// Distance sensor reading the shared world state.
pub struct SimRange {
    state: &'static RefCell<SimState>,
}

impl SimRange {
    pub fn new(state: &'static RefCell<SimState>) -> Self {
        Self { state }
    }
}

impl DistanceSensor for SimRange {
    fn distance(&mut self) -> i32 {
        self.state.borrow().clearance
    }
}

/// Speaker that logs to the console and sleeps for the playback duration.
pub struct ConsoleSpeaker;

impl Speaker for ConsoleSpeaker {
    async fn beep(&mut self, frequency_hz: u16, duration_ms: u16) {
        info!("beep {} Hz for {} ms", frequency_hz, duration_ms);
        Timer::after_millis(duration_ms as u64).await;
    }

    async fn say(&mut self, phrase: &str) {
        info!("say: {}", phrase);
    }

    async fn play_notes(&mut self, notes: &[&str], tempo: u16) {
        info!("playing {} notes at tempo {}", notes.len(), tempo);
        for note in notes {
            debug!("note {}", note);
            // Quarter notes at `tempo` beats per minute.
            Timer::after_millis(60_000 / tempo.max(1) as u64).await;
        }
    }
}

/// LCD stand-in that prints status lines to the console.
pub struct ConsoleDisplay;

impl DisplayDriver for ConsoleDisplay {
    fn clear(&mut self) {
        debug!("[lcd] cleared");
    }

    fn set_font_height(&mut self, px: u8) {
        debug!("[lcd] font height {} px", px);
    }

    fn print_line(&mut self, text: &str) {
        info!("[lcd] {}", text);
    }
}
