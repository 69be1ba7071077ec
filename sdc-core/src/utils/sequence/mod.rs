//! Startup and motion sequencing for the Self-Driving Challenge bot.
//!
//! The sequencer owns the hardware handles and runs the fixed startup
//! sequence: home the steering, configure the drivetrain, back up until there
//! is room, wait for the bumper press, then run the demo dance script forever.

use core::convert::Infallible;
use core::fmt::Debug;

use embassy_time::Timer;
use serde::{Deserialize, Serialize};

use crate::utils::controllers::display::output_text;
use crate::utils::controllers::steering::{home_steer, SteeringLimits};
use crate::utils::hardware::{
    DistanceSensor, DriveBase, DriveSettings, Speaker, SteeringMotor, StopAction, TouchSensor,
};

/// Minimum clear distance (sensor units) required before the start wait.
pub const RETREAT_CLEARANCE: i32 = 50;
/// Backward step (mm) driven while clearance is insufficient.
pub const RETREAT_STEP_MM: i32 = -100;
/// Interval between bumper polls while waiting for the start press.
pub const START_POLL_INTERVAL_MS: u64 = 100;
/// Start-signal beep, required for lap timing.
const START_BEEP_HZ: u16 = 500;
const START_BEEP_MS: u16 = 250;
/// Distance (mm) of the initial nudge after the start beep.
const GO_NUDGE_MM: i32 = 10;

/// Phrase spoken before the dance script starts.
const DANCE_PHRASE: &str = "Dancing the Self Driving Challenge Dance!";
/// Melody played before the dance script, in quarter notes.
pub const DANCE_NOTES: [&str; 12] = [
    "E4/4", "C4/4", "D4/4", "E4/4", "D4/4", "C4/4", "C4/4", "E4/4", "B4/4", "B4/4", "A4/4",
    "A4/4",
];
/// Tempo of the dance melody, quarter notes per minute.
pub const DANCE_TEMPO: u16 = 240;

/// Vehicle geometry and motion-profile settings.
///
/// Serialized as JSON by the host tooling; missing fields fall back to the
/// defaults below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleSettings {
    /// Drive wheel diameter in mm.
    pub wheel_diameter_mm: i32,
    /// Distance between the drive wheels in mm.
    pub wheel_track_mm: i32,
    /// Drivebase straight-line speed in mm/s.
    pub straight_speed: i32,
    /// Drivebase straight-line acceleration in mm/s².
    pub straight_acceleration: i32,
    /// Nominal steering speed (deg/s) for the dance script.
    pub steer_speed: i32,
    /// Duty ceiling (percent) for the homing sweeps.
    pub steer_duty_limit: i32,
    /// Angular speed (deg/s) for the homing sweeps.
    pub steer_homing_speed: i32,
}

impl Default for VehicleSettings {
    fn default() -> Self {
        Self {
            wheel_diameter_mm: 40,
            wheel_track_mm: 120,
            straight_speed: 200,
            straight_acceleration: 250,
            steer_speed: 250,
            steer_duty_limit: 60,
            steer_homing_speed: 100,
        }
    }
}

impl VehicleSettings {
    /// Wheel geometry and motion-profile settings applied to the drivebase at
    /// configuration. Turning is done with the steering motor, so the turn
    /// profile is zeroed.
    pub fn drive_settings(&self) -> DriveSettings {
        DriveSettings {
            wheel_diameter_mm: self.wheel_diameter_mm,
            wheel_track_mm: self.wheel_track_mm,
            straight_speed: self.straight_speed,
            straight_acceleration: self.straight_acceleration,
            turn_rate: 0,
            turn_acceleration: 0,
        }
    }
}

/// Errors surfaced by the sequencer, wrapping the failing subsystem's error.
#[derive(Debug)]
pub enum VehicleError<SE: Debug, DE: Debug> {
    /// Steering motor command failed.
    Steer(SE),
    /// Drivebase command failed.
    Drive(DE),
}

/// Owns the hardware handles and runs the startup sequence.
pub struct VehicleSequencer<S, D, T, R, A> {
    steer: S,
    drive: D,
    bumper: T,
    range: R,
    speaker: A,
    settings: VehicleSettings,
}

impl<S, D, T, R, A> VehicleSequencer<S, D, T, R, A>
where
    S: SteeringMotor,
    D: DriveBase,
    T: TouchSensor,
    R: DistanceSensor,
    A: Speaker,
{
    /// Create a sequencer over the given hardware handles.
    pub fn new(
        steer: S,
        drive: D,
        bumper: T,
        range: R,
        speaker: A,
        settings: VehicleSettings,
    ) -> Self {
        Self {
            steer,
            drive,
            bumper,
            range,
            speaker,
            settings,
        }
    }

    /// Run the full startup sequence, then the dance script forever.
    ///
    /// Never returns `Ok`: the dance loop has no exit. Termination is
    /// external (power-off or host interrupt) or a hardware error.
    pub async fn run(mut self) -> Result<Infallible, VehicleError<S::Error, D::Error>> {
        output_text("RDW Lego");
        output_text("Self Driving Challenge");

        output_text("Homing steering wheels...");
        let limits = home_steer(
            &mut self.steer,
            self.settings.steer_duty_limit,
            self.settings.steer_homing_speed,
        )
        .await
        .map_err(VehicleError::Steer)?;
        output_text("Done!");

        output_text("Configuring drivetrain...");
        self.drive
            .configure(&self.settings.drive_settings())
            .map_err(VehicleError::Drive)?;
        output_text("Done!");

        self.make_room().await?;

        output_text("Ready.... Set....");
        output_text("(waiting for bumper press)");
        self.wait_for_start().await;
        // The beep marks the start for lap timing.
        self.speaker.beep(START_BEEP_HZ, START_BEEP_MS).await;

        output_text("GO!");
        self.drive_straight(GO_NUDGE_MM).await?;

        output_text("Starting dancing...");
        self.speaker.say(DANCE_PHRASE).await;
        self.speaker.play_notes(&DANCE_NOTES, DANCE_TEMPO).await;
        loop {
            self.dance_cycle(&limits).await?;
        }
    }

    /// Back up until the distance sensor reports enough clearance.
    ///
    /// Retreats only while the reading is strictly below
    /// [`RETREAT_CLEARANCE`]; a reading of exactly 50 is already clear.
    pub async fn make_room(&mut self) -> Result<(), VehicleError<S::Error, D::Error>> {
        while self.range.distance() < RETREAT_CLEARANCE {
            output_text("Too little space, moving backwards...");
            self.drive_straight(RETREAT_STEP_MM).await?;
        }
        Ok(())
    }

    /// Sleep-poll the bumper at [`START_POLL_INTERVAL_MS`] until pressed.
    pub async fn wait_for_start(&mut self) {
        while !self.bumper.pressed() {
            Timer::after_millis(START_POLL_INTERVAL_MS).await;
        }
    }

    /// One iteration of the demo dance script.
    ///
    /// Three steer-sweep pairs (half, double, double speed) with rest
    /// returns, six straight segments, then four steer-and-drive
    /// combinations at the full travel limits.
    pub async fn dance_cycle(
        &mut self,
        limits: &SteeringLimits,
    ) -> Result<(), VehicleError<S::Error, D::Error>> {
        let steer_speed = self.settings.steer_speed;
        // Floor division keeps the halved targets inside the travel limits
        // for negative angles.
        let half_left = limits.max_left_angle.div_euclid(2);
        let half_right = limits.max_right_angle.div_euclid(2);

        self.steer_to(steer_speed.div_euclid(2), half_left).await?;
        self.steer_to(steer_speed.div_euclid(2), half_right).await?;
        self.steer_to(steer_speed.div_euclid(2), 0).await?;

        self.steer_to(steer_speed * 2, half_left).await?;
        self.steer_to(steer_speed * 2, half_right).await?;
        self.steer_to(steer_speed * 2, 0).await?;

        self.steer_to(steer_speed * 2, half_left).await?;
        self.steer_to(steer_speed * 2, half_right).await?;
        self.steer_to(steer_speed * 2, 0).await?;

        self.drive_straight(100).await?;
        self.drive_straight(-100).await?;

        self.drive_straight(50).await?;
        self.drive_straight(-50).await?;

        self.drive_straight(50).await?;
        self.drive_straight(-50).await?;

        self.steer_to(steer_speed, limits.max_left_angle).await?;
        self.drive_straight(100).await?;
        self.steer_to(steer_speed, limits.max_right_angle).await?;
        self.drive_straight(100).await?;
        self.steer_to(steer_speed, 0).await?;

        self.steer_to(steer_speed, limits.max_left_angle).await?;
        self.drive_straight(-100).await?;
        self.steer_to(steer_speed, limits.max_right_angle).await?;
        self.drive_straight(-100).await?;
        self.steer_to(steer_speed, 0).await?;

        self.steer_to(steer_speed, limits.max_right_angle).await?;
        self.drive_straight(100).await?;
        self.steer_to(steer_speed, limits.max_left_angle).await?;
        self.drive_straight(100).await?;
        self.steer_to(steer_speed, 0).await?;

        self.steer_to(steer_speed, limits.max_right_angle).await?;
        self.drive_straight(-100).await?;
        self.steer_to(steer_speed, limits.max_left_angle).await?;
        self.drive_straight(-100).await?;
        self.steer_to(steer_speed, 0).await?;

        Ok(())
    }

    async fn steer_to(
        &mut self,
        speed: i32,
        target: i32,
    ) -> Result<(), VehicleError<S::Error, D::Error>> {
        self.steer
            .run_target(speed, target, StopAction::Hold)
            .await
            .map_err(VehicleError::Steer)
    }

    async fn drive_straight(
        &mut self,
        distance_mm: i32,
    ) -> Result<(), VehicleError<S::Error, D::Error>> {
        self.drive
            .straight(distance_mm)
            .await
            .map_err(VehicleError::Drive)
    }
}
