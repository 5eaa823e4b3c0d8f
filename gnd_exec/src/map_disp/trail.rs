//! # Position trail

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::LatLon;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A position and the time it was received.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrailPoint {
    pub position: LatLon,
    pub timestamp: DateTime<Utc>,
}

/// Recent rover positions, oldest first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Trail {
    points: Vec<TrailPoint>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Trail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a point to the end of the trail. Repeated positions are kept.
    pub fn push(&mut self, position: LatLon, timestamp: DateTime<Utc>) {
        self.points.push(TrailPoint {
            position,
            timestamp,
        });
    }

    /// Remove all points older than `retention` at time `now`. Points exactly `retention` old are
    /// kept.
    ///
    /// Returns the number of points removed.
    pub fn prune(&mut self, now: DateTime<Utc>, retention: Duration) -> usize {
        let len_before = self.points.len();
        self.points.retain(|p| now - p.timestamp <= retention);
        len_before - self.points.len()
    }

    /// Direction of travel between the last two points, see [`heading_deg`].
    pub fn heading_deg(&self) -> Option<f64> {
        match self.points.len() {
            0 | 1 => None,
            n => Some(heading_deg(
                self.points[n - 2].position,
                self.points[n - 1].position,
            )),
        }
    }

    pub fn points(&self) -> &[TrailPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Direction of travel from `from` to `to` in degrees, anticlockwise from east.
///
/// Latitude and longitude deltas are treated as a flat plane, which is fine over the few metres a
/// rover covers between updates.
pub fn heading_deg(from: LatLon, to: LatLon) -> f64 {
    let d_lat = to.lat_deg - from.lat_deg;
    let d_lon = to.lon_deg - from.lon_deg;

    d_lat.atan2(d_lon).to_degrees()
}
