//! # IMU Telemetry

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An attitude quaternion as reported by the rover's IMU.
///
/// The quaternion should be of unit magnitude, however this is not checked on deserialisation.
/// Consumers are responsible for validating it before use.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

/// IMU data forwarded by the rover.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct ImuData {
    /// Attitude of the rover body, or `None` if the IMU has not yet produced a solution.
    #[serde(default)]
    pub orientation: Option<Quaternion>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Quaternion {
    /// The identity rotation.
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Euclidian norm of the four components.
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// True if every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_quaternion_norm() {
        assert_eq!(Quaternion::IDENTITY.norm(), 1.0);
        assert_eq!(Quaternion::new(0.0, 3.0, 0.0, 4.0).norm(), 5.0);
        assert!(!Quaternion::new(f64::NAN, 0.0, 0.0, 1.0).is_finite());
    }

    #[test]
    fn test_imu_data_missing_orientation() {
        let imu: ImuData = serde_json::from_str("{}").unwrap();
        assert_eq!(imu.orientation, None);

        let imu: ImuData =
            serde_json::from_str(r#"{"orientation": {"x": 0, "y": 0, "z": 0, "w": 1}}"#).unwrap();
        assert_eq!(imu.orientation, Some(Quaternion::IDENTITY));
    }
}
