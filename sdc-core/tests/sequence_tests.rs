use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use embassy_futures::block_on;
use sdc_core::utils::controllers::steering::{home_steer, SteeringLimits};
use sdc_core::utils::hardware::{
    DistanceSensor, DriveBase, DriveSettings, Speaker, SteeringMotor, StopAction, TouchSensor,
};
use sdc_core::utils::sequence::{VehicleSequencer, VehicleSettings};

/// Hardware command as recorded by the bench mocks, in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Stall { speed: i32, duty_limit: i32 },
    Steer { speed: i32, target: i32, then: StopAction },
    ResetAngle(i32),
    Straight(i32),
}

type Log = Rc<RefCell<Vec<Command>>>;

/// Steering motor with simulated mechanical end stops. Stall-seeking runs to
/// the stop on the commanded side; target moves land exactly on target.
struct BenchSteer {
    angle: i32,
    left_stop: i32,
    right_stop: i32,
    log: Log,
}

impl BenchSteer {
    fn new(left_stop: i32, right_stop: i32, log: Log) -> Self {
        Self {
            angle: 0,
            left_stop,
            right_stop,
            log,
        }
    }
}

impl SteeringMotor for BenchSteer {
    type Error = Infallible;

    fn angle(&mut self) -> i32 {
        self.angle
    }

    fn reset_angle(&mut self, angle: i32) {
        self.log.borrow_mut().push(Command::ResetAngle(angle));
        self.angle = angle;
    }

    async fn run_until_stalled(
        &mut self,
        speed: i32,
        _then: StopAction,
        duty_limit: i32,
    ) -> Result<i32, Self::Error> {
        self.log.borrow_mut().push(Command::Stall { speed, duty_limit });
        self.angle = if speed < 0 {
            self.left_stop
        } else {
            self.right_stop
        };
        Ok(self.angle)
    }

    async fn run_target(
        &mut self,
        speed: i32,
        target: i32,
        then: StopAction,
    ) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Command::Steer { speed, target, then });
        self.angle = target;
        Ok(())
    }
}

struct BenchDrive {
    log: Log,
}

impl BenchDrive {
    fn new(log: Log) -> Self {
        Self { log }
    }
}

impl DriveBase for BenchDrive {
    type Error = Infallible;

    fn configure(&mut self, _settings: &DriveSettings) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn straight(&mut self, distance_mm: i32) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Command::Straight(distance_mm));
        Ok(())
    }
}

/// Distance sensor fed a fixed sequence of readings; repeats the last one.
struct ScriptedRange {
    readings: Vec<i32>,
    next: usize,
}

impl ScriptedRange {
    fn new(readings: &[i32]) -> Self {
        Self {
            readings: readings.to_vec(),
            next: 0,
        }
    }
}

impl DistanceSensor for ScriptedRange {
    fn distance(&mut self) -> i32 {
        let i = self.next.min(self.readings.len() - 1);
        self.next += 1;
        self.readings[i]
    }
}

/// Bumper that reports pressed on the n-th poll, counting polls.
struct BenchBumper {
    pressed_on_poll: usize,
    polls: Rc<Cell<usize>>,
}

impl TouchSensor for BenchBumper {
    fn pressed(&mut self) -> bool {
        self.polls.set(self.polls.get() + 1);
        self.polls.get() >= self.pressed_on_poll
    }
}

struct NullSpeaker;

impl Speaker for NullSpeaker {
    async fn beep(&mut self, _frequency_hz: u16, _duration_ms: u16) {}
    async fn say(&mut self, _phrase: &str) {}
    async fn play_notes(&mut self, _notes: &[&str], _tempo: u16) {}
}

fn sequencer(
    left_stop: i32,
    right_stop: i32,
    range: &[i32],
    pressed_on_poll: usize,
    log: &Log,
    polls: &Rc<Cell<usize>>,
) -> VehicleSequencer<BenchSteer, BenchDrive, BenchBumper, ScriptedRange, NullSpeaker> {
    VehicleSequencer::new(
        BenchSteer::new(left_stop, right_stop, log.clone()),
        BenchDrive::new(log.clone()),
        BenchBumper {
            pressed_on_poll,
            polls: polls.clone(),
        },
        ScriptedRange::new(range),
        NullSpeaker,
        VehicleSettings::default(),
    )
}

#[test]
fn homing_symmetric_stops() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut steer = BenchSteer::new(-100, 100, log.clone());

    let limits = block_on(home_steer(&mut steer, 60, 100)).unwrap();

    assert_eq!(limits.max_left_angle, -90);
    assert_eq!(limits.max_right_angle, 90);
    // The zero reference was reset at the centered position.
    assert_eq!(steer.angle(), 0);
}

#[test]
fn homing_asymmetric_stops() {
    // Reference scenario: stops at -120/60, center -30, limits +/-81.
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut steer = BenchSteer::new(-120, 60, log.clone());

    let limits = block_on(home_steer(&mut steer, 60, 100)).unwrap();

    assert_eq!(limits.max_left_angle, -81);
    assert_eq!(limits.max_right_angle, 81);
    assert_eq!(steer.angle(), 0);
    assert_eq!(
        log.borrow().as_slice(),
        &[
            Command::Stall { speed: -100, duty_limit: 60 },
            Command::Stall { speed: 100, duty_limit: 60 },
            Command::Steer { speed: 150, target: -30, then: StopAction::Coast },
            Command::ResetAngle(0),
        ]
    );
}

#[test]
fn homing_floors_odd_negative_center() {
    // Sum -3 floors to center -2, not -1.
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut steer = BenchSteer::new(-101, 98, log.clone());

    let limits = block_on(home_steer(&mut steer, 60, 100)).unwrap();

    assert!(log
        .borrow()
        .contains(&Command::Steer { speed: 150, target: -2, then: StopAction::Coast }));
    // Travel -99/+100, margined and truncated toward zero.
    assert_eq!(limits.max_left_angle, -89);
    assert_eq!(limits.max_right_angle, 90);
}

#[test]
fn make_room_retreats_while_too_close() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let polls = Rc::new(Cell::new(0));
    let mut seq = sequencer(-120, 60, &[10, 30, 49, 50], 1, &log, &polls);

    block_on(seq.make_room()).unwrap();

    assert_eq!(
        log.borrow().as_slice(),
        &[
            Command::Straight(-100),
            Command::Straight(-100),
            Command::Straight(-100),
        ]
    );
}

#[test]
fn make_room_boundary_is_exclusive() {
    // A reading of exactly 50 is already clear: no retreat issued.
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let polls = Rc::new(Cell::new(0));
    let mut seq = sequencer(-120, 60, &[50], 1, &log, &polls);

    block_on(seq.make_room()).unwrap();

    assert!(log.borrow().is_empty());
}

#[test]
fn wait_for_start_exits_on_first_pressed_poll() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let polls = Rc::new(Cell::new(0));
    let mut seq = sequencer(-120, 60, &[100], 3, &log, &polls);

    block_on(seq.wait_for_start());

    assert_eq!(polls.get(), 3);
}

#[test]
fn dance_cycle_command_sequence() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let polls = Rc::new(Cell::new(0));
    let mut seq = sequencer(-120, 60, &[100], 1, &log, &polls);

    // Limits as homing computes them for -120/60 stops.
    let limits = SteeringLimits {
        max_left_angle: -81,
        max_right_angle: 81,
    };
    block_on(seq.dance_cycle(&limits)).unwrap();

    let hold = StopAction::Hold;
    let steer = |speed, target| Command::Steer { speed, target, then: hold };
    let expected = vec![
        // Half-speed sweeps; halved targets floor toward negative infinity.
        steer(125, -41),
        steer(125, 40),
        steer(125, 0),
        // Double-speed sweeps, twice.
        steer(500, -41),
        steer(500, 40),
        steer(500, 0),
        steer(500, -41),
        steer(500, 40),
        steer(500, 0),
        // Straight segments.
        Command::Straight(100),
        Command::Straight(-100),
        Command::Straight(50),
        Command::Straight(-50),
        Command::Straight(50),
        Command::Straight(-50),
        // Full-lock figures, forward then backward, both directions.
        steer(250, -81),
        Command::Straight(100),
        steer(250, 81),
        Command::Straight(100),
        steer(250, 0),
        steer(250, -81),
        Command::Straight(-100),
        steer(250, 81),
        Command::Straight(-100),
        steer(250, 0),
        steer(250, 81),
        Command::Straight(100),
        steer(250, -81),
        Command::Straight(100),
        steer(250, 0),
        steer(250, 81),
        Command::Straight(-100),
        steer(250, -81),
        Command::Straight(-100),
        steer(250, 0),
    ];
    assert_eq!(log.borrow().as_slice(), expected.as_slice());
}

#[test]
fn drive_settings_carry_geometry_and_zero_turn_profile() {
    let d = VehicleSettings::default().drive_settings();
    assert_eq!(
        d,
        DriveSettings {
            wheel_diameter_mm: 40,
            wheel_track_mm: 120,
            straight_speed: 200,
            straight_acceleration: 250,
            turn_rate: 0,
            turn_acceleration: 0,
        }
    );
}

#[test]
fn settings_parse_with_defaults() {
    let settings: VehicleSettings = serde_json::from_str(r#"{"straight_speed": 300}"#).unwrap();
    assert_eq!(settings.straight_speed, 300);
    assert_eq!(settings.wheel_diameter_mm, 40);
    assert_eq!(settings.steer_speed, 250);
    assert_eq!(settings.steer_duty_limit, 60);
}
