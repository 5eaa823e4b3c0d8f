//! # Animated recentring of the map view

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use nalgebra::Point2;

use util::{maths::clamp, time::duration_to_seconds};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Smallest ease linearity used, lower values are clamped to this.
const MIN_EASE_LINEARITY: f64 = 0.2;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A pan of the view centre between two world pixel positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanAnimation {
    from_px: Point2<f64>,
    to_px: Point2<f64>,
    start: DateTime<Utc>,
    duration_s: f64,
    ease_out_power: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PanAnimation {
    pub fn new(
        from_px: Point2<f64>,
        to_px: Point2<f64>,
        start: DateTime<Utc>,
        duration_s: f64,
        ease_linearity: f64,
    ) -> Self {
        Self {
            from_px,
            to_px,
            start,
            duration_s,
            ease_out_power: 1.0 / ease_linearity.max(MIN_EASE_LINEARITY),
        }
    }

    /// Fraction of the animation completed at `now`, between 0 and 1.
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        let elapsed_s = duration_to_seconds(now - self.start).unwrap_or(f64::MAX);

        match self.duration_s > 0.0 {
            true => clamp(elapsed_s / self.duration_s, 0.0, 1.0),
            false => 1.0,
        }
    }

    /// Position of the view centre at `now`.
    pub fn position_at(&self, now: DateTime<Utc>) -> Point2<f64> {
        let eased = ease_out(self.progress(now), self.ease_out_power);
        self.from_px + (self.to_px - self.from_px) * eased
    }

    pub fn is_finished(&self, now: DateTime<Utc>) -> bool {
        self.progress(now) >= 1.0
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn ease_out(t: f64, power: f64) -> f64 {
    1.0 - (1.0 - t).powf(power)
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_pan_end_points() {
        let from = Point2::new(0.0, 0.0);
        let to = Point2::new(100.0, -50.0);
        let pan = PanAnimation::new(from, to, t0(), 0.5, 0.25);

        assert_eq!(pan.position_at(t0()), from);
        assert_eq!(pan.position_at(t0() + Duration::milliseconds(500)), to);
        assert_eq!(pan.position_at(t0() + Duration::seconds(10)), to);
        assert!(pan.is_finished(t0() + Duration::milliseconds(500)));
        assert!(!pan.is_finished(t0() + Duration::milliseconds(499)));

        // Before the start the view stays put
        assert_eq!(pan.position_at(t0() - Duration::seconds(1)), from);
    }

    #[test]
    fn test_pan_eases_out() {
        let pan = PanAnimation::new(
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            t0(),
            0.5,
            0.25,
        );

        // Half way through time the view has covered 1 - 0.5^4 of the distance
        let half = pan.position_at(t0() + Duration::milliseconds(250));
        assert!((half.x - 93.75).abs() < 1e-9);

        let mut last = 0.0;
        for ms in (0..=500).step_by(50) {
            let x = pan.position_at(t0() + Duration::milliseconds(ms)).x;
            assert!(x >= last);
            last = x;
        }
    }

    #[test]
    fn test_low_ease_linearity_clamped() {
        let pan = PanAnimation::new(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            t0(),
            1.0,
            0.01,
        );

        let x = pan.position_at(t0() + Duration::milliseconds(500)).x;
        assert!((x - (1.0 - 0.5f64.powi(5))).abs() < 1e-9);
    }
}
