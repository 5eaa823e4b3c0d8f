//! # Ground Executable Parameters
//!
//! This module provide parameters for the ground executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GndExecParams {
    /// Target period of one cycle, the display refresh period.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Write per cycle CSV archives of each display's status
    pub archive: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum GndExecParamsError {
    #[error("Cycle period must be positive and finite, found {0} s")]
    InvalidCyclePeriod(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GndExecParams {
    /// Check the parameters can drive the main loop.
    pub fn validate(&self) -> Result<(), GndExecParamsError> {
        match self.cycle_period_s.is_finite() && self.cycle_period_s > 0.0 {
            true => Ok(()),
            false => Err(GndExecParamsError::InvalidCyclePeriod(self.cycle_period_s)),
        }
    }

    /// Number of cycles per second
    pub fn cycle_frequency_hz(&self) -> f64 {
        1.0 / self.cycle_period_s
    }
}

impl Default for GndExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.05,
            archive: true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validate_cycle_period() {
        assert!(GndExecParams::default().validate().is_ok());

        for period in [0.0, -0.05, f64::INFINITY, f64::NAN].iter() {
            let p = GndExecParams {
                cycle_period_s: *period,
                ..Default::default()
            };
            assert!(matches!(
                p.validate(),
                Err(GndExecParamsError::InvalidCyclePeriod(_))
            ));
        }
    }

    #[test]
    fn test_param_file_valid() {
        let p: GndExecParams =
            util::params::parse(include_str!("../../params/gnd_exec.toml")).unwrap();
        assert!(p.validate().is_ok());
    }
}
