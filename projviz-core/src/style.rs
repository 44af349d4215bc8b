//! Colours and stroke/fill styling for scene nodes

use serde::{Deserialize, Serialize};

/// An opaque sRGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a colour from a `0xRRGGBB` literal
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// `#rrggbb` form used by the SVG writer
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Relative luminance in [0, 1]
    pub fn luminance(self) -> f64 {
        (0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64) / 255.0
    }
}

pub const BLACK: Color = Color::from_hex(0x000000);
pub const WHITE: Color = Color::from_hex(0xFFFFFF);
pub const GREY: Color = Color::from_hex(0xBBBBBB);
pub const BLUE: Color = Color::from_hex(0x58C4DD);
pub const BLUE_E: Color = Color::from_hex(0x1C758A);
pub const RED: Color = Color::from_hex(0xFC6255);
pub const YELLOW: Color = Color::from_hex(0xFFFF00);
pub const GREEN: Color = Color::from_hex(0x83C167);

/// World units per dash for dashed strokes
pub const DEFAULT_DASH_LENGTH: f64 = 0.05;

/// How a node is painted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub color: Color,
    /// 0.0 leaves the interior unpainted
    pub fill_opacity: f64,
    /// Stroke width at 1080 pixels of frame height
    pub stroke_width: f64,
    /// Dash length in world units, `None` for a solid stroke
    pub dash_length: Option<f64>,
}

impl Style {
    pub fn stroke(color: Color, stroke_width: f64) -> Self {
        Self {
            color,
            fill_opacity: 0.0,
            stroke_width,
            dash_length: None,
        }
    }

    pub fn filled(color: Color, fill_opacity: f64, stroke_width: f64) -> Self {
        Self {
            color,
            fill_opacity,
            stroke_width,
            dash_length: None,
        }
    }

    pub fn dashed(mut self) -> Self {
        self.dash_length = Some(DEFAULT_DASH_LENGTH);
        self
    }
}
