//! # Map display module
//!
//! Shows the rover's position on a slippy tile map, with a marker rotated to the direction of
//! travel and a trail of the positions received over the last few seconds.
//!
//! Each cycle the module applies its transitions in a fixed order:
//!
//! 1. append the new position (if any) to the trail,
//! 2. prune old points from the trail if the prune timer has fired,
//! 3. recompute the heading if the trail changed,
//! 4. start a pan of the view towards the new position.
//!
//! The resulting [`MapView`] is a description of what to draw. Fetching and drawing the tiles is
//! left to the renderer.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod geo;
mod pan;
mod params;
mod state;
mod tiles;
mod trail;
mod view;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use geo::*;
pub use pan::*;
pub use params::*;
pub use state::*;
pub use tiles::*;
pub use trail::*;
pub use view::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Message shown before any position has been received.
pub const NO_DATA_MESSAGE: &str = "No Data";

/// Message shown while the latest position received is unusable.
pub const INVALID_DATA_MESSAGE: &str = "Invalid Data";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during MapDisp operation.
#[derive(Debug, thiserror::Error)]
pub enum MapDispError {
    #[error("Could not load the MapDisp parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("The MapDisp style is invalid: {0}")]
    InvalidStyle(crate::disp_style::DispStyleError),

    #[error("Invalid MapDisp parameter {0}: {1}")]
    InvalidParam(&'static str, String),

    #[error("Could not set up the MapDisp archives: {0}")]
    ArchiveError(util::archive::ArchiveError),

    #[error("MapDisp was processed before it was initialised")]
    NotInitialised,
}
