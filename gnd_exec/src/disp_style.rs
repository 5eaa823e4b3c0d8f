//! # Display style
//!
//! Shared visual contract for the circular dashboard displays.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An RGB colour, written in parameter files as `#rrggbb` or a CSS colour name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Style of a circular display container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispStyle {
    /// Diameter of the circular viewport.
    ///
    /// Units: pixels
    pub diameter_px: u32,

    /// Colour of the border around the viewport
    pub border_colour: Colour,

    /// Width of the border.
    ///
    /// Units: pixels
    pub border_width_px: u32,

    /// Opacity of the black background behind the display, between 0 and 1.
    pub background_opacity: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DispStyleError {
    #[error("Colour \"{0}\" is neither a #rrggbb hex string nor a known colour name")]
    InvalidColour(String),

    #[error("Background opacity must be between 0 and 1, found {0}")]
    InvalidOpacity(f64),

    #[error("Display diameter must be non-zero")]
    ZeroDiameter,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Colour {
    pub const TEAL: Colour = Colour::rgb(0x00, 0x80, 0x80);
    pub const BLUE: Colour = Colour::rgb(0x00, 0x00, 0xff);
    pub const BLACK: Colour = Colour::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Colour = Colour::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Colour {
    type Err = DispStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        match s.to_ascii_lowercase().as_str() {
            "teal" => return Ok(Colour::TEAL),
            "blue" => return Ok(Colour::BLUE),
            "black" => return Ok(Colour::BLACK),
            "white" => return Ok(Colour::WHITE),
            _ => (),
        }

        let hex = match s.strip_prefix('#') {
            Some(h) if h.len() == 6 && h.is_ascii() => h,
            _ => return Err(DispStyleError::InvalidColour(s.to_string())),
        };

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| DispStyleError::InvalidColour(s.to_string()))
        };

        Ok(Colour::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Colour {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Colour {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl DispStyle {
    /// Check the style is drawable.
    pub fn validate(&self) -> Result<(), DispStyleError> {
        if self.diameter_px == 0 {
            return Err(DispStyleError::ZeroDiameter);
        }
        if !(0.0..=1.0).contains(&self.background_opacity) {
            return Err(DispStyleError::InvalidOpacity(self.background_opacity));
        }
        Ok(())
    }

    /// Radius of the circular viewport in pixels.
    pub fn radius_px(&self) -> f64 {
        self.diameter_px as f64 / 2.0
    }

    /// Returns true if the given viewport pixel (origin top left) is visible through the circular
    /// mask.
    pub fn in_mask(&self, x_px: f64, y_px: f64) -> bool {
        let r = self.radius_px();
        let dx = x_px - r;
        let dy = y_px - r;
        dx * dx + dy * dy <= r * r
    }
}

impl Default for DispStyle {
    fn default() -> Self {
        Self {
            diameter_px: 320,
            border_colour: Colour::TEAL,
            border_width_px: 5,
            background_opacity: 0.6,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_colour_parse() {
        assert_eq!("teal".parse::<Colour>(), Ok(Colour::rgb(0, 128, 128)));
        assert_eq!("#2f74c0".parse::<Colour>(), Ok(Colour::rgb(0x2f, 0x74, 0xc0)));
        assert_eq!("#171717".parse::<Colour>().unwrap().to_string(), "#171717");
        assert!("#12345".parse::<Colour>().is_err());
        assert!("#gg0000".parse::<Colour>().is_err());
        assert!("rebeccapurple".parse::<Colour>().is_err());
    }

    #[test]
    fn test_style_from_toml() {
        let style: DispStyle = util::params::parse(
            r#"
            diameter_px = 320
            border_colour = "teal"
            border_width_px = 7
            background_opacity = 0.6
            "#,
        )
        .unwrap();

        assert_eq!(style.border_colour, Colour::TEAL);
        assert_eq!(style.border_width_px, 7);
        assert!(style.validate().is_ok());
    }

    #[test]
    fn test_style_validate() {
        let mut style = DispStyle::default();
        style.background_opacity = 1.5;
        assert_eq!(style.validate(), Err(DispStyleError::InvalidOpacity(1.5)));

        style.background_opacity = 0.6;
        style.diameter_px = 0;
        assert_eq!(style.validate(), Err(DispStyleError::ZeroDiameter));
    }

    #[test]
    fn test_circular_mask() {
        let style = DispStyle::default();

        assert!(style.in_mask(160.0, 160.0));
        assert!(style.in_mask(160.0, 0.0));
        assert!(!style.in_mask(0.0, 0.0));
        assert!(!style.in_mask(319.0, 319.0));
    }
}
