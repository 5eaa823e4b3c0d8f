//! Parameters structure for MapDisp

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::MapDispError;
use crate::disp_style::{Colour, DispStyle};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the map display.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    // ---- APPEARANCE ----
    /// Style of the circular viewport
    pub style: DispStyle,

    /// Height of the map container behind the circular mask. The container is as wide as the
    /// mask and centred in it.
    ///
    /// Units: pixels
    pub container_height_px: u32,

    /// Colour shown where no tile has been drawn
    pub container_background: Colour,

    // ---- TRAIL ----
    /// Age beyond which trail points are pruned.
    ///
    /// Units: seconds
    pub trail_retention_s: f64,

    /// Period of the trail pruning timer.
    ///
    /// Units: seconds
    pub prune_period_s: f64,

    // ---- MAP ----
    /// Zoom level the map is displayed at
    pub zoom: u8,

    pub tile_layer: TileLayerParams,

    pub polyline: PolylineParams,

    pub marker: MarkerParams,

    pub pan: PanParams,

    pub labels: LabelParams,

    #[serde(default)]
    pub interaction: Interaction,
}

/// Raster tile source.
#[derive(Debug, Clone, Deserialize)]
pub struct TileLayerParams {
    /// URL template containing `{s}`, `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,

    /// Values substituted for `{s}`
    pub subdomains: Vec<String>,

    /// Units: pixels
    pub tile_size_px: u32,

    /// Highest zoom the source serves tiles at. Deeper zooms scale up tiles from this level.
    pub max_native_zoom: u8,

    pub attribution: String,
}

/// Style of the trail line.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct PolylineParams {
    pub colour: Colour,

    /// Line width.
    ///
    /// Units: pixels
    pub weight_px: f64,

    pub opacity: f64,
}

/// Rover marker icon.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarkerParams {
    pub icon_url: String,

    /// Units: pixels
    pub icon_size_px: [u32; 2],

    /// Point of the icon placed on the rover's position, from the icon's top left corner.
    ///
    /// Units: pixels
    pub icon_anchor_px: [u32; 2],
}

/// Recentring animation.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PanParams {
    /// Units: seconds
    pub duration_s: f64,

    /// Shape of the ease out curve. Lower is a sharper deceleration.
    pub ease_linearity: f64,
}

/// Style of the N/E/S/W labels.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LabelParams {
    /// Distance of each label from the edge of the display.
    ///
    /// Units: pixels
    pub inset_px: u32,

    /// Units: pixels
    pub font_size_px: u32,

    pub font_family: String,

    pub bold: bool,

    pub colour: Colour,

    /// CSS style text shadow
    pub text_shadow: String,
}

/// User interactions enabled on the map. Everything is disabled by default, the view only moves
/// to follow the rover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Interaction {
    pub scroll_wheel_zoom: bool,
    pub dragging: bool,
    pub world_copy_jump: bool,
    pub zoom_control: bool,
    pub keyboard: bool,
    pub double_click_zoom: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check the parameters describe a usable display.
    pub fn validate(&self) -> Result<(), MapDispError> {
        self.style.validate().map_err(MapDispError::InvalidStyle)?;

        fn positive(name: &'static str, value: f64) -> Result<(), MapDispError> {
            match value.is_finite() && value > 0.0 {
                true => Ok(()),
                false => Err(MapDispError::InvalidParam(
                    name,
                    format!("expected a positive value, found {}", value),
                )),
            }
        }

        positive("trail_retention_s", self.trail_retention_s)?;
        positive("prune_period_s", self.prune_period_s)?;
        positive("pan.duration_s", self.pan.duration_s)?;
        positive("pan.ease_linearity", self.pan.ease_linearity)?;
        positive("polyline.weight_px", self.polyline.weight_px)?;

        if !(0.0..=1.0).contains(&self.polyline.opacity) {
            return Err(MapDispError::InvalidParam(
                "polyline.opacity",
                format!("expected a value between 0 and 1, found {}", self.polyline.opacity),
            ));
        }

        if self.tile_layer.tile_size_px == 0 {
            return Err(MapDispError::InvalidParam(
                "tile_layer.tile_size_px",
                "must be non-zero".into(),
            ));
        }

        // Keeps world pixel coordinates well inside f64 precision
        if self.zoom > 30 {
            return Err(MapDispError::InvalidParam(
                "zoom",
                format!("expected at most 30, found {}", self.zoom),
            ));
        }

        if self.container_height_px == 0 {
            return Err(MapDispError::InvalidParam(
                "container_height_px",
                "must be non-zero".into(),
            ));
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            style: DispStyle {
                border_width_px: 7,
                ..Default::default()
            },
            container_height_px: 400,
            container_background: Colour::rgb(0x17, 0x17, 0x17),
            trail_retention_s: 5.0,
            prune_period_s: 1.0,
            zoom: 22,
            tile_layer: TileLayerParams {
                url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
                subdomains: vec!["a".into(), "b".into(), "c".into()],
                tile_size_px: 256,
                max_native_zoom: 19,
                attribution: "© OpenStreetMap contributors".into(),
            },
            polyline: PolylineParams {
                colour: Colour::BLUE,
                weight_px: 4.0,
                opacity: 0.8,
            },
            marker: MarkerParams {
                icon_url: "https://pngimg.com/d/triangle_PNG76.png".into(),
                icon_size_px: [30, 30],
                icon_anchor_px: [15, 15],
            },
            pan: PanParams {
                duration_s: 0.5,
                ease_linearity: 0.25,
            },
            labels: LabelParams {
                inset_px: 5,
                font_size_px: 16,
                font_family: "'Monotype Corsiva', cursive".into(),
                bold: true,
                colour: Colour::BLACK,
                text_shadow: "2px 2px 4px rgba(0, 0, 0, 0.7)".into(),
            },
            interaction: Interaction::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_params_valid() {
        let p = Params::default();
        assert!(p.validate().is_ok());
        assert_eq!(p.style.border_width_px, 7);
        assert_eq!(p.interaction, Interaction::default());
        assert!(!p.interaction.dragging);
    }

    #[test]
    fn test_param_file_matches_defaults() {
        let p: Params =
            util::params::parse(include_str!("../../../params/map_disp.toml")).unwrap();
        let d = Params::default();

        assert!(p.validate().is_ok());
        assert_eq!(p.style, d.style);
        assert_eq!(p.zoom, d.zoom);
        assert_eq!(p.tile_layer.url_template, d.tile_layer.url_template);
        assert_eq!(p.tile_layer.subdomains, d.tile_layer.subdomains);
        assert_eq!(p.tile_layer.attribution, d.tile_layer.attribution);
        assert_eq!(p.polyline.colour, Colour::BLUE);
        assert_eq!(p.marker.icon_anchor_px, [15, 15]);
        assert_eq!(p.labels.colour, Colour::BLACK);
        assert_eq!(p.interaction, Interaction::default());
        assert_eq!(p.container_background, d.container_background);
    }

    #[test]
    fn test_validate_rejects() {
        let mut p = Params::default();
        p.prune_period_s = 0.0;
        assert!(matches!(
            p.validate(),
            Err(MapDispError::InvalidParam("prune_period_s", _))
        ));

        let mut p = Params::default();
        p.polyline.opacity = 1.2;
        assert!(matches!(
            p.validate(),
            Err(MapDispError::InvalidParam("polyline.opacity", _))
        ));

        let mut p = Params::default();
        p.style.diameter_px = 0;
        assert!(matches!(p.validate(), Err(MapDispError::InvalidStyle(_))));
    }
}
