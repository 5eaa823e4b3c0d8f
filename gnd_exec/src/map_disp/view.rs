//! # Map display view description
//!
//! Screen positions are in pixels from the top left of the map container, apart from the cardinal
//! labels which are positioned relative to the circular display.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;

use super::{Interaction, LabelParams, LatLon, Params, Tile};
use crate::disp_style::{Colour, DispStyle};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One frame of the map display.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub style: DispStyle,

    pub container: Container,

    /// N, E, S and W labels, fixed to the display and drawn over the map.
    pub labels: Vec<CardinalLabel>,

    pub content: MapContent,
}

/// The map container behind the circular mask.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Container {
    /// Units: pixels
    pub width_px: u32,

    /// Units: pixels
    pub height_px: u32,

    /// Vertical offset of the container's top edge from the top of the display. Negative when the
    /// container is taller than the display.
    ///
    /// Units: pixels
    pub offset_y_px: f64,

    pub background: Colour,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardinalLabel {
    pub text: &'static str,

    /// Point on the display the label is anchored to.
    ///
    /// Units: pixels
    pub anchor_px: [f64; 2],

    /// Which edge of the label sits on the anchor.
    pub align: LabelAlign,

    pub font_size_px: u32,
    pub font_family: String,
    pub bold: bool,
    pub colour: Colour,
    pub text_shadow: String,
}

/// The live map, drawn when a valid position is known.
#[derive(Debug, Clone, Serialize)]
pub struct LiveMap {
    /// Geographic position at the centre of the container, part way through a pan if one is
    /// running.
    pub centre: LatLon,

    pub zoom: u8,

    /// True while the view is still moving towards the rover.
    pub panning: bool,

    pub tiles: Vec<Tile>,

    pub attribution: String,

    pub trail: Polyline,

    pub marker: Marker,

    /// Heading used for the compass. Tracked alongside the marker rotation but not currently
    /// drawn.
    ///
    /// Units: degrees
    pub compass_angle_deg: f64,

    pub interaction: Interaction,
}

/// The trail line.
#[derive(Debug, Clone, Serialize)]
pub struct Polyline {
    pub points: Vec<LatLon>,

    /// Units: pixels
    pub screen_px: Vec<[f64; 2]>,

    pub colour: Colour,

    /// Units: pixels
    pub weight_px: f64,

    pub opacity: f64,
}

/// The rover marker.
#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub position: LatLon,

    /// Position of the icon's top left corner.
    ///
    /// Units: pixels
    pub screen_px: [f64; 2],

    pub icon_url: String,

    /// Units: pixels
    pub icon_size_px: [u32; 2],

    /// Rotation of the icon about its centre, clockwise as in a CSS `rotate()` transform.
    ///
    /// Units: degrees
    pub rotation_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LabelAlign {
    Top,
    Right,
    Bottom,
    Left,
}

/// What the display shows inside its border.
#[derive(Debug, Clone, Serialize)]
pub enum MapContent {
    /// No position has been received yet.
    NoData { message: &'static str },

    /// The latest position could not be used.
    Degraded { message: &'static str },

    Live(LiveMap),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MapView {
    /// Build a view around the given content.
    pub fn new(params: &Params, content: MapContent) -> Self {
        Self {
            style: params.style,
            container: Container::from_params(params),
            labels: CardinalLabel::all(&params.style, &params.labels),
            content,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.content, MapContent::Live(_))
    }

    /// Message shown in place of the map, if any.
    pub fn message(&self) -> Option<&'static str> {
        match self.content {
            MapContent::NoData { message } | MapContent::Degraded { message } => Some(message),
            MapContent::Live(_) => None,
        }
    }

    pub fn live(&self) -> Option<&LiveMap> {
        match self.content {
            MapContent::Live(ref l) => Some(l),
            _ => None,
        }
    }
}

impl Container {
    pub fn from_params(params: &Params) -> Self {
        Self {
            width_px: params.style.diameter_px,
            height_px: params.container_height_px,
            offset_y_px: (params.style.diameter_px as f64 - params.container_height_px as f64)
                / 2.0,
            background: params.container_background,
        }
    }
}

impl CardinalLabel {
    /// The four labels, inset from the edges of the display.
    pub fn all(style: &DispStyle, params: &LabelParams) -> Vec<Self> {
        let d = style.diameter_px as f64;
        let r = style.radius_px();
        let inset = params.inset_px as f64;

        let label = |text: &'static str, anchor_px: [f64; 2], align: LabelAlign| CardinalLabel {
            text,
            anchor_px,
            align,
            font_size_px: params.font_size_px,
            font_family: params.font_family.clone(),
            bold: params.bold,
            colour: params.colour,
            text_shadow: params.text_shadow.clone(),
        };

        vec![
            label("N", [r, inset], LabelAlign::Top),
            label("E", [d - inset, r], LabelAlign::Right),
            label("S", [r, d - inset], LabelAlign::Bottom),
            label("W", [inset, r], LabelAlign::Left),
        ]
    }
}
