//! # Telemetry replay script module
//!
//! This module provides an interpreter for telemetry replay scripts, allowing recorded or
//! hand-written telemetry frames to be fed to the ground displays at scripted times.
//!
//! A script is a sequence of entries of the form
//!
//! ```text
//! <time_s>: <json TmFrame>;
//! ```
//!
//! where `time_s` is the session-relative time at which the frame is delivered. Entries must be
//! given in non-decreasing time order. Lines starting with `#` are comments.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use comms_if::tm::{TmFrame, TmParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A frame which is scripted to be delivered at a specific time.
struct ScriptedFrame {
    /// The time the frame is delivered at
    delivery_time_s: f64,

    frame: TmFrame,
}

/// A telemetry replay script.
///
/// After loading use `.get_pending_frames` each cycle to acquire the frames
/// which are due.
pub struct TmScript {
    script_path: Option<PathBuf>,
    frames: VecDeque<ScriptedFrame>,
    duration_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TmScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Script contains an invalid timestamp: {0}. Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script entry at {0} s is earlier than the previous entry")]
    OutOfOrder(f64),

    #[error("Script contains an invalid TM frame at {0} s: {1}")]
    InvalidFrame(f64, TmParseError),
}

pub enum PendingFrames {
    None,
    Some(Vec<TmFrame>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TmScript {
    /// Load a script from the given path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, TmScriptError> {
        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(TmScriptError::ScriptNotFound(path));
        }

        let script = fs::read_to_string(&path).map_err(TmScriptError::ScriptLoadError)?;

        let mut tm_script = Self::parse(&script)?;
        tm_script.script_path = Some(path);

        Ok(tm_script)
    }

    /// Parse a script from its text.
    pub fn parse(script: &str) -> Result<Self, TmScriptError> {
        // Drop comment lines first so a `;` inside a comment can't end an entry
        let script: String = script
            .lines()
            .filter(|l| !l.trim_start().starts_with('#'))
            .collect::<Vec<_>>()
            .join("\n");

        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("TM script regex is invalid");

        let mut frames: VecDeque<ScriptedFrame> = VecDeque::new();
        let mut last_time_s = 0f64;

        for cap in re.captures_iter(&script) {
            let time_str = &cap[1];
            let delivery_time_s: f64 = time_str
                .parse()
                .map_err(|_| TmScriptError::InvalidTimestamp(time_str.to_string()))?;

            if delivery_time_s < last_time_s {
                return Err(TmScriptError::OutOfOrder(delivery_time_s));
            }
            last_time_s = delivery_time_s;

            let frame = TmFrame::from_json(&cap[3])
                .map_err(|e| TmScriptError::InvalidFrame(delivery_time_s, e))?;

            frames.push_back(ScriptedFrame {
                delivery_time_s,
                frame,
            });
        }

        if frames.is_empty() {
            return Err(TmScriptError::ScriptEmpty);
        }

        Ok(TmScript {
            script_path: None,
            frames,
            duration_s: last_time_s,
        })
    }

    /// Return the frames due at `current_time_s`, in script order.
    ///
    /// `EndOfScript` is only returned once every frame has been delivered.
    pub fn get_pending_frames(&mut self, current_time_s: f64) -> PendingFrames {
        if self.frames.is_empty() {
            return PendingFrames::EndOfScript;
        }

        let mut frame_vec: Vec<TmFrame> = vec![];

        while let Some(f) = self.frames.front() {
            if f.delivery_time_s > current_time_s {
                break;
            }
            if let Some(f) = self.frames.pop_front() {
                frame_vec.push(f.frame);
            }
        }

        if frame_vec.is_empty() {
            PendingFrames::None
        } else {
            PendingFrames::Some(frame_vec)
        }
    }

    /// Get the number of frames still to be delivered
    pub fn get_num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        self.duration_s
    }

    pub fn script_path(&self) -> Option<&Path> {
        self.script_path.as_deref()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SCRIPT: &str = r#"
# Drive east then stop
0.0: {"rover_position": [10.0, 10.0]};
1.0: {"rover_position": [10.0, 11.0], "imu": {"orientation": {"x": 0, "y": 0, "z": 0, "w": 1}}};
1.0: {"imu": {}};
2.5: {};
"#;

    #[test]
    fn test_parse_script() {
        let script = TmScript::parse(SCRIPT).unwrap();

        assert_eq!(script.get_num_frames(), 4);
        assert_eq!(script.get_duration(), 2.5);
        assert!(script.script_path().is_none());
    }

    #[test]
    fn test_pending_frames() {
        let mut script = TmScript::parse(SCRIPT).unwrap();

        match script.get_pending_frames(0.5) {
            PendingFrames::Some(v) => {
                assert_eq!(v.len(), 1);
                assert_eq!(v[0].rover_position, Some([10.0, 10.0]));
            }
            _ => panic!("Expected one frame"),
        }

        assert!(matches!(script.get_pending_frames(0.9), PendingFrames::None));

        match script.get_pending_frames(1.0) {
            PendingFrames::Some(v) => assert_eq!(v.len(), 2),
            _ => panic!("Expected two frames"),
        }

        assert!(matches!(script.get_pending_frames(3.0), PendingFrames::Some(_)));
        assert!(matches!(
            script.get_pending_frames(3.1),
            PendingFrames::EndOfScript
        ));
    }

    #[test]
    fn test_script_errors() {
        assert!(matches!(
            TmScript::parse("# nothing here\n"),
            Err(TmScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            TmScript::parse("2.0: {};\n1.0: {};"),
            Err(TmScriptError::OutOfOrder(_))
        ));
        assert!(matches!(
            TmScript::parse(r#"1.0: {"rover_position": "here"};"#),
            Err(TmScriptError::InvalidFrame(_, _))
        ));
        assert!(matches!(
            TmScript::new("/does/not/exist.tms"),
            Err(TmScriptError::ScriptNotFound(_))
        ));
    }

    #[test]
    fn test_demo_script() {
        let mut script = TmScript::parse(include_str!("../../scripts/demo_drive.tms")).unwrap();

        assert_eq!(script.get_duration(), 30.0);

        // 1.0 to 22.0 s at 10 Hz, plus the closing frame
        assert_eq!(script.get_num_frames(), 212);

        match script.get_pending_frames(1.0) {
            PendingFrames::Some(f) => {
                assert_eq!(f.len(), 1);
                assert!(f[0].rover_position.is_some());
                assert!(f[0].imu.is_some());
            }
            _ => panic!("Expected the first frame at 1.0 s"),
        }
    }
}
