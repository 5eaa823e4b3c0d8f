//! Parameters structure for OrientDisp

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use std::path::PathBuf;

use super::Light;
use crate::disp_style::{Colour, DispStyle};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the orientation display.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    // ---- APPEARANCE ----
    /// Style of the circular viewport
    pub style: DispStyle,

    /// Colour of the rover mesh's material
    pub mesh_colour: Colour,

    /// Lights in the scene, in addition to the mesh.
    #[serde(default = "Light::default_set")]
    pub lights: Vec<Light>,

    // ---- MESH ----
    /// Path to the STL mesh to display, relative to the software root if not absolute.
    pub mesh_path: PathBuf,

    /// Position of the mesh in the scene.
    ///
    /// Units: scene units
    pub mesh_position: [f64; 3],

    // ---- VALIDATION ----
    /// Maximum deviation of the orientation quaternion's norm from 1 before the orientation is
    /// flagged as degraded.
    pub unit_norm_tolerance: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            style: DispStyle::default(),
            mesh_colour: Colour::rgb(0x2f, 0x74, 0xc0),
            lights: Light::default_set(),
            mesh_path: PathBuf::from("assets/imu_mount.stl"),
            mesh_position: [0.0; 3],
            unit_norm_tolerance: 1e-3,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_param_file_matches_defaults() {
        let p: Params =
            util::params::parse(include_str!("../../../params/orient_disp.toml")).unwrap();
        let d = Params::default();

        assert_eq!(p.style, d.style);
        assert_eq!(p.mesh_colour, d.mesh_colour);
        assert_eq!(p.mesh_path, d.mesh_path);
        assert_eq!(p.lights, d.lights);
        assert_eq!(p.unit_norm_tolerance, d.unit_norm_tolerance);
    }

    #[test]
    fn test_lights_default_when_missing() {
        let p: Params = util::params::parse(
            r##"
            mesh_path = "mesh.stl"
            mesh_position = [0.0, 0.0, 0.0]
            mesh_colour = "white"
            unit_norm_tolerance = 0.01

            [style]
            diameter_px = 200
            border_colour = "#000000"
            border_width_px = 2
            background_opacity = 1.0
            "##,
        )
        .unwrap();

        assert_eq!(p.lights, Light::default_set());
        assert_eq!(p.mesh_colour, Colour::WHITE);
    }
}
