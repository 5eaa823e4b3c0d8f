//! # Orientation display module
//!
//! Shows the rover's attitude by rotating a mesh of the rover (or its IMU mount) inside a lit
//! scene. The mesh is loaded once at initialisation, after which each cycle applies the latest
//! IMU quaternion directly, with no smoothing between frames.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod orientation;
mod params;
mod scene;
mod state;
mod stl;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use orientation::*;
pub use params::*;
pub use scene::*;
pub use state::*;
pub use stl::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during OrientDisp operation.
#[derive(Debug, thiserror::Error)]
pub enum OrientDispError {
    #[error("Could not load the OrientDisp parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("The OrientDisp style is invalid: {0}")]
    InvalidStyle(crate::disp_style::DispStyleError),

    #[error("Could not locate the mesh asset: {0}")]
    AssetRootError(util::host::HostError),

    #[error("Could not load the mesh asset: {0}")]
    MeshLoadError(StlError),

    #[error("Could not set up the OrientDisp archives: {0}")]
    ArchiveError(util::archive::ArchiveError),

    #[error("OrientDisp was processed before a mesh was loaded")]
    NoMesh,
}
