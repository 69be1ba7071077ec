//! Hardware trait boundary for the Self-Driving Challenge bot.
//!
//! The motor, sensor, speaker, and display drivers are existing
//! hardware-abstraction services; this module only defines the traits the
//! calibrator and sequencer call into. The EV3 brick provides the real
//! implementations, `mock-brick` provides simulated ones.

use core::fmt::Debug;

/// Post-motion behavior of a motor command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopAction {
    /// Release the motor and let it coast to rest.
    Coast,
    /// Passively brake the motor.
    Brake,
    /// Actively hold the stop position.
    Hold,
}

/// A single rotational actuator with angle feedback.
///
/// Angles are signed degrees relative to the motor's current zero reference,
/// which `reset_angle` redefines.
#[allow(async_fn_in_trait)]
pub trait SteeringMotor {
    type Error: Debug;

    /// Current angle in degrees.
    fn angle(&mut self) -> i32;

    /// Redefine the current physical position as `angle`.
    fn reset_angle(&mut self, angle: i32);

    /// Rotate at `speed` (deg/s, sign gives direction) until mechanical
    /// resistance exceeds `duty_limit` percent, then stop per `then`.
    ///
    /// Resolves to the angle at which the motor came to rest. If the motor
    /// never meets resistance this future never resolves; there is no
    /// timeout.
    async fn run_until_stalled(
        &mut self,
        speed: i32,
        then: StopAction,
        duty_limit: i32,
    ) -> Result<i32, Self::Error>;

    /// Rotate to the absolute angle `target` at `speed` (deg/s), then stop
    /// per `then`. Resolves when the motion profile completes.
    async fn run_target(
        &mut self,
        speed: i32,
        target: i32,
        then: StopAction,
    ) -> Result<(), Self::Error>;
}

/// Wheel geometry and motion-profile settings applied to a drivebase once at
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DriveSettings {
    /// Drive wheel diameter in mm.
    pub wheel_diameter_mm: i32,
    /// Distance between the drive wheels in mm.
    pub wheel_track_mm: i32,
    /// Straight-line speed in mm/s.
    pub straight_speed: i32,
    /// Straight-line acceleration in mm/s².
    pub straight_acceleration: i32,
    /// Turn rate in deg/s.
    pub turn_rate: i32,
    /// Turn acceleration in deg/s².
    pub turn_acceleration: i32,
}

/// A differential drivebase composed from two drive motors and wheel
/// geometry, providing straight-line motion.
#[allow(async_fn_in_trait)]
pub trait DriveBase {
    type Error: Debug;

    /// Apply motion-profile settings. Called once before any motion.
    fn configure(&mut self, settings: &DriveSettings) -> Result<(), Self::Error>;

    /// Drive straight for `distance_mm` (negative is backwards). Resolves
    /// when the motion profile completes.
    async fn straight(&mut self, distance_mm: i32) -> Result<(), Self::Error>;
}

/// Bumper touch sensor.
pub trait TouchSensor {
    /// Whether the bumper is currently pressed.
    fn pressed(&mut self) -> bool;
}

/// Forward-facing distance sensor.
pub trait DistanceSensor {
    /// Current proximity reading (driver units, larger is clearer).
    fn distance(&mut self) -> i32;
}

/// Speaker subsystem: beeps, speech, and note playback.
#[allow(async_fn_in_trait)]
pub trait Speaker {
    /// Play a tone at `frequency_hz` for `duration_ms`.
    async fn beep(&mut self, frequency_hz: u16, duration_ms: u16);

    /// Speak a phrase via text-to-speech.
    async fn say(&mut self, phrase: &str);

    /// Play a melody of `"NoteOctave/length"` strings at `tempo` quarter
    /// notes per minute.
    async fn play_notes(&mut self, notes: &[&str], tempo: u16);
}

/// LCD text surface.
pub trait DisplayDriver {
    /// Clear the screen.
    fn clear(&mut self);

    /// Select a font by pixel height.
    fn set_font_height(&mut self, px: u8);

    /// Print one line of text, scrolling as needed.
    fn print_line(&mut self, text: &str);
}
