//! # Data Store

use chrono::{DateTime, Utc};
use comms_if::tm::{ImuData, TmFrame};
use log::trace;

use crate::{map_disp, orient_disp};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time
    pub session_time_s: f64,

    /// Wall clock time at the start of this cycle
    pub cycle_time: DateTime<Utc>,

    // Telemetry
    /// Latest IMU data received
    pub imu: Option<ImuData>,

    /// Latest rover position received, `[lat, lon]` in degrees
    pub rover_position: Option<[f64; 2]>,

    /// Every rover position received this cycle, in arrival order
    pub new_rover_positions: Vec<[f64; 2]>,

    /// Number of telemetry frames received
    pub num_tm_frames: u64,

    // OrientDisp
    pub orient_disp: orient_disp::OrientDisp,
    pub orient_disp_output: Option<orient_disp::Scene>,
    pub orient_disp_status_rpt: orient_disp::StatusReport,

    // MapDisp
    pub map_disp: map_disp::MapDisp,
    pub map_disp_output: Option<map_disp::MapView>,
    pub map_disp_status_rpt: map_disp::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64, cycle_time: DateTime<Utc>) {
        let cycles_per_second = (cycle_frequency_hz.round() as u128).max(1);
        self.is_1_hz_cycle = self.num_cycles % cycles_per_second == 0;

        self.new_rover_positions.clear();
        self.orient_disp_status_rpt = orient_disp::StatusReport::default();
        self.map_disp_status_rpt = map_disp::StatusReport::default();

        self.cycle_time = cycle_time;
        self.session_time_s = util::session::try_get_elapsed_seconds().unwrap_or(0.0);
    }

    /// Merge a telemetry frame into the store. Members missing from the frame keep their last
    /// value.
    pub fn apply_tm_frame(&mut self, frame: &TmFrame) {
        self.num_tm_frames += 1;

        if frame.imu.is_some() {
            self.imu = frame.imu;
        }

        if let Some(pos) = frame.rover_position {
            self.rover_position = Some(pos);
            self.new_rover_positions.push(pos);
        }

        trace!("TM frame applied: {:?}", frame);
    }

    /// Input data for this cycle's OrientDisp processing.
    pub fn orient_disp_input(&self) -> orient_disp::InputData {
        orient_disp::InputData { imu: self.imu }
    }

    /// Input data for this cycle's MapDisp processing.
    pub fn map_disp_input(&self) -> map_disp::InputData {
        map_disp::InputData {
            rover_positions: self.new_rover_positions.clone(),
            now: self.cycle_time,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use util::module::State;

    #[test]
    fn test_apply_tm_frame() {
        let mut ds = DataStore::default();
        let t = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        ds.cycle_start(20.0, t);
        ds.apply_tm_frame(
            &TmFrame::from_json(r#"{"rover_position": [10.0, 11.0]}"#).unwrap(),
        );

        assert_eq!(ds.map_disp_input().rover_positions, vec![[10.0, 11.0]]);
        assert_eq!(ds.map_disp_input().now, t);

        // An IMU only frame leaves the position alone
        ds.cycle_start(20.0, t);
        ds.apply_tm_frame(
            &TmFrame::from_json(r#"{"imu": {"orientation": {"x": 0, "y": 0, "z": 0, "w": 1}}}"#)
                .unwrap(),
        );

        assert!(ds.map_disp_input().rover_positions.is_empty());
        assert_eq!(ds.rover_position, Some([10.0, 11.0]));
        assert!(ds.orient_disp_input().imu.unwrap().orientation.is_some());
        assert_eq!(ds.num_tm_frames, 2);
    }

    #[test]
    fn test_positions_in_one_cycle_reach_map_disp() {
        let mut ds = DataStore::default();
        let t = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        ds.map_disp = map_disp::MapDisp::new(map_disp::Params::default(), t).unwrap();

        ds.cycle_start(20.0, t);
        ds.apply_tm_frame(&TmFrame::from_json(r#"{"rover_position": [10.0, 10.0]}"#).unwrap());
        ds.apply_tm_frame(&TmFrame::from_json(r#"{"rover_position": [10.0, 11.0]}"#).unwrap());

        let input = ds.map_disp_input();
        assert_eq!(input.rover_positions, vec![[10.0, 10.0], [10.0, 11.0]]);

        let (_, rpt) = ds.map_disp.proc(&input).unwrap();
        assert_eq!(rpt.trail_len, 2);
        assert!(ds.map_disp.rotation_angle_deg().abs() < 1e-9);

        // Cleared for the next cycle
        ds.cycle_start(20.0, t);
        assert!(ds.map_disp_input().rover_positions.is_empty());
    }

    #[test]
    fn test_1_hz_flag() {
        let mut ds = DataStore::default();
        let t = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        let mut flags = Vec::new();
        for _ in 0..40 {
            ds.cycle_start(20.0, t);
            flags.push(ds.is_1_hz_cycle);
            ds.num_cycles += 1;
        }

        assert_eq!(flags.iter().filter(|f| **f).count(), 2);
        assert!(flags[0] && flags[20]);
    }
}
