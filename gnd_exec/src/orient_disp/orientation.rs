//! # Orientation validation and conversion

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tm::Quaternion;
use nalgebra::{self as na, Rotation3, UnitQuaternion};
use serde::Serialize;
use util::maths::clamp;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Threshold on `|m13|` above which the XYZ Euler decomposition is treated as gimbal locked.
const GIMBAL_LOCK_THRESHOLD: f64 = 0.999_999_9;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Result of validating an incoming attitude quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Orientation {
    /// A unit quaternion within tolerance.
    Valid(UnitQuaternion<f64>),

    /// A finite quaternion whose norm was outside tolerance. It has been renormalised, but the
    /// source is suspect.
    Renormalised {
        attitude: UnitQuaternion<f64>,
        norm: f64,
    },

    /// A quaternion with non-finite components or zero norm, which cannot represent a rotation.
    Invalid { norm: f64 },
}

/// Why a display could not show its data faithfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DegradedCause {
    NonUnitQuaternion,
    NonFiniteQuaternion,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Orientation {
    /// Validate a quaternion against a unit norm tolerance.
    pub fn validate(q: &Quaternion, unit_norm_tolerance: f64) -> Self {
        let norm = q.norm();

        if !q.is_finite() || norm == 0.0 {
            return Orientation::Invalid { norm };
        }

        // Note nalgebra stores w first
        let attitude = UnitQuaternion::from_quaternion(na::Quaternion::new(q.w, q.x, q.y, q.z));

        if (norm - 1.0).abs() <= unit_norm_tolerance {
            Orientation::Valid(attitude)
        } else {
            Orientation::Renormalised { attitude, norm }
        }
    }

    /// The usable attitude, if any.
    pub fn attitude(&self) -> Option<UnitQuaternion<f64>> {
        match self {
            Orientation::Valid(a) => Some(*a),
            Orientation::Renormalised { attitude, .. } => Some(*attitude),
            Orientation::Invalid { .. } => None,
        }
    }

    pub fn degraded_cause(&self) -> Option<DegradedCause> {
        match self {
            Orientation::Valid(_) => None,
            Orientation::Renormalised { .. } => Some(DegradedCause::NonUnitQuaternion),
            Orientation::Invalid { .. } => Some(DegradedCause::NonFiniteQuaternion),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Decompose a rotation into intrinsic XYZ Euler angles `[x, y, z]` in radians, such that
/// `R = Rx(x) * Ry(y) * Rz(z)`.
///
/// In gimbal lock (`|y| = pi/2`) the z angle is set to zero and the whole residual rotation is
/// placed in x.
pub fn euler_xyz(rot: &Rotation3<f64>) -> [f64; 3] {
    let m = rot.matrix();
    let m11 = m[(0, 0)];
    let m12 = m[(0, 1)];
    let m13 = m[(0, 2)];
    let m22 = m[(1, 1)];
    let m23 = m[(1, 2)];
    let m32 = m[(2, 1)];
    let m33 = m[(2, 2)];

    let y = clamp(m13, -1.0, 1.0).asin();

    if m13.abs() < GIMBAL_LOCK_THRESHOLD {
        [(-m23).atan2(m33), y, (-m12).atan2(m11)]
    } else {
        [m32.atan2(m22), y, 0.0]
    }
}

/// Recompose intrinsic XYZ Euler angles into a rotation.
pub fn from_euler_xyz(angles: [f64; 3]) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&na::Vector3::x_axis(), angles[0])
        * Rotation3::from_axis_angle(&na::Vector3::y_axis(), angles[1])
        * Rotation3::from_axis_angle(&na::Vector3::z_axis(), angles[2])
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_validate_unit() {
        let o = Orientation::validate(&Quaternion::new(0.0, 0.0, 0.70710678, 0.70710678), 1e-3);

        let att = match o {
            Orientation::Valid(a) => a,
            _ => panic!("Expected a valid orientation, got {:?}", o),
        };
        assert!((att.angle() - FRAC_PI_2).abs() < 1e-6);
        assert_eq!(o.degraded_cause(), None);
    }

    #[test]
    fn test_validate_renormalises() {
        let o = Orientation::validate(&Quaternion::new(0.0, 0.0, 0.0, 2.0), 1e-3);

        match o {
            Orientation::Renormalised { attitude, norm } => {
                assert_eq!(norm, 2.0);
                assert!(attitude.angle().abs() < 1e-12);
            }
            _ => panic!("Expected a renormalised orientation, got {:?}", o),
        }
        assert_eq!(o.degraded_cause(), Some(DegradedCause::NonUnitQuaternion));
    }

    #[test]
    fn test_validate_invalid() {
        let nan = Orientation::validate(&Quaternion::new(f64::NAN, 0.0, 0.0, 1.0), 1e-3);
        let zero = Orientation::validate(&Quaternion::new(0.0, 0.0, 0.0, 0.0), 1e-3);

        assert_eq!(nan.attitude(), None);
        assert_eq!(zero, Orientation::Invalid { norm: 0.0 });
        assert_eq!(nan.degraded_cause(), Some(DegradedCause::NonFiniteQuaternion));
    }

    #[test]
    fn test_euler_xyz_recomposes() {
        let cases = [
            [0.1, 0.2, 0.3],
            [-1.0, 0.5, 2.5],
            [3.0, -1.2, -0.4],
            [0.0, 0.0, 0.0],
        ];

        for angles in cases.iter() {
            let rot = from_euler_xyz(*angles);
            let back = euler_xyz(&rot);
            let rot_back = from_euler_xyz(back);

            assert!(
                (rot.matrix() - rot_back.matrix()).norm() < 1e-9,
                "{:?} decomposed to {:?}",
                angles,
                back
            );
        }
    }

    #[test]
    fn test_euler_xyz_gimbal_lock() {
        let rot = from_euler_xyz([0.3, FRAC_PI_2, 0.0]);
        let back = euler_xyz(&rot);

        assert!((back[1] - FRAC_PI_2).abs() < 1e-6);
        assert_eq!(back[2], 0.0);
        assert!((rot.matrix() - from_euler_xyz(back).matrix()).norm() < 1e-9);
    }
}
