//! Resistance-to-temperature calibration for the Pt1000 sensor
//!
//! The conversion is the closed-form inverse of the sensor's quadratic
//! resistance curve, with coefficients fitted for the probe wired to the
//! 2636A. The constants are sensor-specific and must not be "corrected":
//! they are part of the lab's calibration record.

use crate::error::{MonitorError, Result};

/// Coefficient multiplying the resistance inside the square root
const RADICAND_SLOPE: f64 = -0.00232;
/// Constant term inside the square root
const RADICAND_OFFSET: f64 = 17.59246;
/// Offset subtracted from the square root
const SQRT_OFFSET: f64 = 3.908;
/// Final linear scale
const SCALE: f64 = 0.00116;

/// The largest resistance the calibration accepts, in ohms.
///
/// Above this the radicand goes negative and the formula has no real
/// solution.
pub const MAX_RESISTANCE_OHM: f64 = -RADICAND_OFFSET / RADICAND_SLOPE;

/// Convert a resistance reading in ohms to a temperature in °C.
///
/// Fails with [`MonitorError::Domain`] when the resistance is outside
/// the calibrated range (radicand negative). `NaN` readings are
/// rejected the same way.
pub fn resistance_to_celsius(resistance_ohm: f64) -> Result<f64> {
    let radicand = RADICAND_SLOPE * resistance_ohm + RADICAND_OFFSET;
    if !(radicand >= 0.0) {
        return Err(MonitorError::Domain {
            resistance: resistance_ohm,
        });
    }
    Ok(-(radicand.sqrt() - SQRT_OFFSET) / SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_celsius_near_1000_ohm() {
        // Pt1000: 1000 Ohm is 0 °C to within the fit accuracy
        let t = resistance_to_celsius(1000.0).unwrap();
        assert!(t.abs() < 0.1, "T(1000 Ohm) = {}", t);
    }

    #[test]
    fn test_room_temperature() {
        let t = resistance_to_celsius(1100.0).unwrap();
        assert!((t - 25.58).abs() < 0.05, "T(1100 Ohm) = {}", t);
    }

    #[test]
    fn test_monotonically_increasing() {
        let t1 = resistance_to_celsius(1000.0).unwrap();
        let t2 = resistance_to_celsius(1500.0).unwrap();
        let t3 = resistance_to_celsius(5000.0).unwrap();
        assert!(t1 < t2 && t2 < t3);
    }

    #[test]
    fn test_domain_error_above_max() {
        let err = resistance_to_celsius(MAX_RESISTANCE_OHM + 1.0).unwrap_err();
        assert!(matches!(err, MonitorError::Domain { .. }));
    }

    #[test]
    fn test_just_inside_domain_boundary() {
        let t = resistance_to_celsius(MAX_RESISTANCE_OHM - 1.0).unwrap();
        assert!((t - SQRT_OFFSET / SCALE).abs() < 50.0, "T = {}", t);
    }

    #[test]
    fn test_nan_rejected() {
        assert!(resistance_to_celsius(f64::NAN).is_err());
    }

    proptest! {
        #[test]
        fn prop_matches_closed_form_in_domain(r in -1.0e4f64..7582.0) {
            let t = resistance_to_celsius(r).unwrap();
            let expected = -((-0.00232 * r + 17.59246).sqrt() - 3.908) / 0.00116;
            prop_assert!((t - expected).abs() <= 1e-9_f64.max(expected.abs() * 1e-12));
        }

        #[test]
        fn prop_out_of_domain_fails(r in 7583.0f64..1.0e6) {
            prop_assert!(
                matches!(resistance_to_celsius(r), Err(MonitorError::Domain { .. })),
                "expected a Domain error for resistance {}",
                r
            );
        }
    }
}
