//! # Orientation display scene description
//!
//! The scene is what a 3D renderer draws for one frame of the orientation display.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Point3, Rotation3, UnitQuaternion};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{orientation::euler_xyz, DegradedCause, Mesh};
use crate::disp_style::{Colour, DispStyle};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One frame of the orientation display.
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    pub style: DispStyle,

    pub lights: Vec<Light>,

    /// The rover mesh, or `None` if there is no usable orientation.
    pub mesh: Option<MeshInstance>,

    /// Set if the displayed orientation cannot be trusted.
    pub degraded: Option<DegradedCause>,
}

/// A placed and rotated instance of the rover mesh.
#[derive(Debug, Clone, Serialize)]
pub struct MeshInstance {
    #[serde(skip)]
    pub mesh: Arc<Mesh>,

    /// Position of the mesh origin in the scene.
    pub position: Point3<f64>,

    /// Rotation applied to the mesh.
    pub rotation: Rotation3<f64>,

    /// The same rotation as intrinsic XYZ Euler angles.
    ///
    /// Units: radians
    pub euler_xyz_rad: [f64; 3],

    /// Colour of the mesh's standard material
    pub colour: Colour,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Lights in the scene. Intensities are in the renderer's physically based units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Light {
    Ambient {
        intensity: f64,
    },
    Spot {
        position: [f64; 3],
        /// Cone half angle, radians
        angle: f64,
        penumbra: f64,
        decay: f64,
        intensity: f64,
    },
    Point {
        position: [f64; 3],
        decay: f64,
        intensity: f64,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MeshInstance {
    /// Place `mesh` at `position` with the given attitude.
    pub fn new(
        mesh: Arc<Mesh>,
        position: Point3<f64>,
        attitude: &UnitQuaternion<f64>,
        colour: Colour,
    ) -> Self {
        let rotation = attitude.to_rotation_matrix();

        Self {
            mesh,
            position,
            euler_xyz_rad: euler_xyz(&rotation),
            rotation,
            colour,
        }
    }

    /// Read the applied rotation back as a quaternion.
    pub fn attitude(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_rotation_matrix(&self.rotation)
    }
}

impl Scene {
    /// True if the scene only contains lights.
    pub fn is_empty(&self) -> bool {
        self.mesh.is_none()
    }
}

impl Light {
    /// Ambient fill plus a spot and a point light on opposite corners of the scene.
    pub fn default_set() -> Vec<Light> {
        use std::f64::consts::PI;

        vec![
            Light::Ambient {
                intensity: PI / 2.0,
            },
            Light::Spot {
                position: [10.0, 10.0, 10.0],
                angle: 0.15,
                penumbra: 1.0,
                decay: 0.0,
                intensity: PI,
            },
            Light::Point {
                position: [-10.0, -10.0, -10.0],
                decay: 0.0,
                intensity: PI,
            },
        ]
    }
}
