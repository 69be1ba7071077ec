//! Steering calibration for the Self-Driving Challenge bot.
//!
//! The steering linkage has no pre-known mechanical limits, so at startup the
//! steering motor is driven against each end stop to find them. The midpoint
//! becomes the new zero angle and the returned travel limits keep a margin so
//! commanded targets never re-trigger the physical stops.

use crate::utils::hardware::{SteeringMotor, StopAction};

/// Default duty/torque ceiling (percent) for the stall-seeking sweeps.
pub const DEFAULT_DUTY_LIMIT: i32 = 60;
/// Default angular speed (deg/s) for the stall-seeking sweeps.
pub const DEFAULT_HOMING_SPEED: i32 = 100;
/// Speed (deg/s) of the re-centering move after both limits are known.
const RECENTER_SPEED: i32 = 150;
/// Fraction of the one-sided physical range kept as commandable travel.
/// f64: the f32 rounding of 0.9 lands below 0.9 and shifts the truncated
/// limits by a degree on exact multiples of ten.
const TRAVEL_MARGIN: f64 = 0.9;

/// Safe steering travel limits, in degrees relative to the re-zeroed center.
///
/// Under normal mechanical geometry `max_left_angle <= 0 <= max_right_angle`;
/// the sign is a consequence of motor orientation, not enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SteeringLimits {
    /// Leftmost commandable angle (normally negative).
    pub max_left_angle: i32,
    /// Rightmost commandable angle (normally positive).
    pub max_right_angle: i32,
}

/// Home the steering motor.
///
/// Drives the motor to each mechanical end stop under the given duty ceiling,
/// re-centers on the midpoint of the two recorded limit angles, redefines that
/// position as zero, and returns the margined travel limits. Both returned
/// magnitudes are at most 90% of the true one-sided range.
///
/// The motor's zero reference is permanently changed; the motor is left
/// coasting at the new zero.
///
/// If the motor is unconstrained and never stalls, the first sweep never
/// resolves (see [`SteeringMotor::run_until_stalled`]).
pub async fn home_steer<M: SteeringMotor>(
    motor: &mut M,
    duty_limit: i32,
    speed: i32,
) -> Result<SteeringLimits, M::Error> {
    // Sweep to the left end stop and record the angle it rests at.
    motor
        .run_until_stalled(-speed, StopAction::Coast, duty_limit)
        .await?;
    let negative_limit = motor.angle();

    // Same for the right end stop.
    motor
        .run_until_stalled(speed, StopAction::Coast, duty_limit)
        .await?;
    let positive_limit = motor.angle();

    let center_angle = center_of(negative_limit, positive_limit);
    tracing::debug!(negative_limit, positive_limit, center_angle, "steering limits found");

    // Straighten the wheels and make this the zero angle.
    motor
        .run_target(RECENTER_SPEED, center_angle, StopAction::Coast)
        .await?;
    motor.reset_angle(0);

    Ok(SteeringLimits {
        max_left_angle: margined(negative_limit - center_angle),
        max_right_angle: margined(positive_limit - center_angle),
    })
}

/// Midpoint of the two limit angles, floored toward negative infinity.
fn center_of(negative_limit: i32, positive_limit: i32) -> i32 {
    (negative_limit + positive_limit).div_euclid(2)
}

/// One-sided travel with the safety margin applied, truncated toward zero.
fn margined(travel: i32) -> i32 {
    (travel as f64 * TRAVEL_MARGIN) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_floors_toward_negative_infinity() {
        assert_eq!(center_of(-100, 100), 0);
        assert_eq!(center_of(-120, 60), -30);
        // Odd negative sum: -3 / 2 floors to -2, not -1.
        assert_eq!(center_of(-101, 98), -2);
        assert_eq!(center_of(-99, 100), 0);
        assert_eq!(center_of(-100, 99), -1);
    }

    #[test]
    fn margin_truncates_toward_zero() {
        assert_eq!(margined(-90), -81);
        assert_eq!(margined(90), 81);
        assert_eq!(margined(-99), -89);
        assert_eq!(margined(100), 90);
        assert_eq!(margined(0), 0);
    }
}
