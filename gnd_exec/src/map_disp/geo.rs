//! # Geographic positions and the Web Mercator projection
//!
//! Pixel coordinates follow the slippy map convention: at zoom `z` the whole world is a square of
//! `tile_size * 2^z` pixels with the origin at the north west corner, x to the east and y to the
//! south.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point2;
use serde::Serialize;
use std::f64::consts::PI;

use util::maths::clamp;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Latitude beyond which Web Mercator is undefined, positions are clamped to it before
/// projecting.
pub const MAX_MERCATOR_LAT_DEG: f64 = 85.051_128_779_806_59;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A validated geographic position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    /// Units: degrees, positive north
    pub lat_deg: f64,

    /// Units: degrees, positive east
    pub lon_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PositionError {
    #[error("Position contains non-finite values ({0}, {1})")]
    NonFinite(f64, f64),

    #[error("Latitude {0} is outside [-90, 90]")]
    LatOutOfRange(f64),

    #[error("Longitude {0} is outside [-180, 180]")]
    LonOutOfRange(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LatLon {
    /// Validate a `[lat, lon]` pair in degrees.
    pub fn from_pair(pair: [f64; 2]) -> Result<Self, PositionError> {
        let [lat_deg, lon_deg] = pair;

        if !lat_deg.is_finite() || !lon_deg.is_finite() {
            return Err(PositionError::NonFinite(lat_deg, lon_deg));
        }
        if !(-90.0..=90.0).contains(&lat_deg) {
            return Err(PositionError::LatOutOfRange(lat_deg));
        }
        if !(-180.0..=180.0).contains(&lon_deg) {
            return Err(PositionError::LonOutOfRange(lon_deg));
        }

        Ok(Self { lat_deg, lon_deg })
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Size of the whole world in pixels at the given zoom.
pub fn world_size_px(zoom: u8, tile_size_px: u32) -> f64 {
    tile_size_px as f64 * 2f64.powi(zoom as i32)
}

/// Project a position into world pixel coordinates at the given zoom.
pub fn project(pos: LatLon, zoom: u8, tile_size_px: u32) -> Point2<f64> {
    let size = world_size_px(zoom, tile_size_px);
    let lat_rad = clamp(pos.lat_deg, -MAX_MERCATOR_LAT_DEG, MAX_MERCATOR_LAT_DEG).to_radians();

    Point2::new(
        (pos.lon_deg + 180.0) / 360.0 * size,
        (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * size,
    )
}

/// Inverse of [`project`].
pub fn unproject(px: Point2<f64>, zoom: u8, tile_size_px: u32) -> LatLon {
    let size = world_size_px(zoom, tile_size_px);

    LatLon {
        lat_deg: (PI * (1.0 - 2.0 * px.y / size)).sinh().atan().to_degrees(),
        lon_deg: px.x / size * 360.0 - 180.0,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_pair() {
        assert_eq!(
            LatLon::from_pair([51.5, -0.12]),
            Ok(LatLon {
                lat_deg: 51.5,
                lon_deg: -0.12
            })
        );
        assert!(LatLon::from_pair([90.0, 180.0]).is_ok());

        assert_eq!(
            LatLon::from_pair([90.5, 0.0]),
            Err(PositionError::LatOutOfRange(90.5))
        );
        assert_eq!(
            LatLon::from_pair([0.0, -181.0]),
            Err(PositionError::LonOutOfRange(-181.0))
        );
        assert!(matches!(
            LatLon::from_pair([f64::NAN, 0.0]),
            Err(PositionError::NonFinite(_, _))
        ));
        assert!(LatLon::from_pair([0.0, f64::INFINITY]).is_err());
    }

    #[test]
    fn test_project_known_points() {
        let origin = project(
            LatLon {
                lat_deg: 0.0,
                lon_deg: 0.0,
            },
            0,
            256,
        );
        assert!((origin.x - 128.0).abs() < 1e-9);
        assert!((origin.y - 128.0).abs() < 1e-9);

        let nw = project(
            LatLon {
                lat_deg: MAX_MERCATOR_LAT_DEG,
                lon_deg: -180.0,
            },
            1,
            256,
        );
        assert!(nw.x.abs() < 1e-9);
        assert!(nw.y.abs() < 1e-6);
    }

    #[test]
    fn test_project_round_trip() {
        let positions = [
            LatLon {
                lat_deg: 10.0,
                lon_deg: 11.0,
            },
            LatLon {
                lat_deg: -33.8688,
                lon_deg: 151.2093,
            },
            LatLon {
                lat_deg: 57.1,
                lon_deg: -2.1,
            },
        ];

        for pos in positions.iter() {
            let back = unproject(project(*pos, 22, 256), 22, 256);
            assert!((back.lat_deg - pos.lat_deg).abs() < 1e-9);
            assert!((back.lon_deg - pos.lon_deg).abs() < 1e-9);
        }
    }
}
