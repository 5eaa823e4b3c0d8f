//! # Telemetry module
//!
//! This module provides the telemetry frames received by the basestation. A frame is a snapshot of
//! the decoded rover state which the ground displays consume.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod imu;

pub use imu::*;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json::{self, Value};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A telemetry frame, i.e. a snapshot of rover state sent to the ground.
///
/// Any member may be missing, in which case that part of the rover state was not updated by this
/// frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct TmFrame {
    /// IMU data
    #[serde(default)]
    pub imu: Option<ImuData>,

    /// Position of the rover as `[latitude, longitude]` in decimal degrees.
    #[serde(default)]
    pub rover_position: Option<[f64; 2]>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TmParseError {
    #[error("TM contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TM must be a JSON object, found: {0}")]
    NotAnObject(String),

    #[error("TM member \"{0}\" is malformed: {1}")]
    InvalidMember(&'static str, serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TmFrame {
    /// Parse a new frame from a JSON packet.
    ///
    /// Each member is decoded separately so that the error names the member at fault.
    pub fn from_json(json_str: &str) -> Result<Self, TmParseError> {
        // Parse the JSON string into a value
        let val: Value = match serde_json::from_str(json_str) {
            Ok(v) => v,
            Err(e) => return Err(TmParseError::InvalidJson(e)),
        };

        if !val.is_object() {
            return Err(TmParseError::NotAnObject(val.to_string()));
        }

        let imu = match val.get("imu") {
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| TmParseError::InvalidMember("imu", e))?,
            None => None,
        };

        let rover_position = match val.get("rover_position") {
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| TmParseError::InvalidMember("rover_position", e))?,
            None => None,
        };

        Ok(TmFrame {
            imu,
            rover_position,
        })
    }

    /// True if the frame carries no data at all.
    pub fn is_empty(&self) -> bool {
        self.imu.is_none() && self.rover_position.is_none()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_json() {
        let frame = TmFrame::from_json(
            r#"{
                "imu": {"orientation": {"x": 0.0, "y": 0.0, "z": 0.7071, "w": 0.7071}},
                "rover_position": [51.5, -0.12]
            }"#,
        )
        .unwrap();

        assert_eq!(frame.rover_position, Some([51.5, -0.12]));
        let q = frame.imu.unwrap().orientation.unwrap();
        assert_eq!(q.z, 0.7071);
    }

    #[test]
    fn test_from_json_partial() {
        let frame = TmFrame::from_json(r#"{"rover_position": [10, 11]}"#).unwrap();
        assert_eq!(frame.imu, None);
        assert_eq!(frame.rover_position, Some([10.0, 11.0]));

        let frame = TmFrame::from_json("{}").unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            TmFrame::from_json("{not json"),
            Err(TmParseError::InvalidJson(_))
        ));
        assert!(matches!(
            TmFrame::from_json("[1, 2]"),
            Err(TmParseError::NotAnObject(_))
        ));
        assert!(matches!(
            TmFrame::from_json(r#"{"rover_position": [1.0]}"#),
            Err(TmParseError::InvalidMember("rover_position", _))
        ));
    }
}
