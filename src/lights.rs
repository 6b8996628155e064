use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::math::srgb_to_linear;

/// Range of both intensity sliders
pub const INTENSITY_RANGE: RangeInclusive<f32> = 0.0..=2.0;
/// Slider step for both intensities
pub const INTENSITY_STEP: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("color must start with '#': {0:?}")]
    MissingHash(String),
    #[error("color must have 6 hex digits: {0:?}")]
    BadLength(String),
    #[error("invalid hex digit in color: {0:?}")]
    BadDigit(String),
}

/// 8-bit sRGB color, written as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn from_array([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }

    /// Linear RGB in [0, 1], ready for shading
    pub fn to_linear(self) -> [f32; 3] {
        [
            srgb_to_linear(self.r as f32 / 255.0),
            srgb_to_linear(self.g as f32 / 255.0),
            srgb_to_linear(self.b as f32 / 255.0),
        ]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ColorParseError::BadLength(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ColorParseError::BadDigit(s.to_string()))
        };
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Scene lighting: one ambient light and one directional light aimed at the origin.
///
/// Fields are private so every change goes through a setter that applies the
/// control's range. Values inside the range are stored exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    ambient_intensity: f32,
    directional_intensity: f32,
    directional_position: [f32; 3],
    directional_color: Color,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            ambient_intensity: 0.6,
            directional_intensity: 1.0,
            directional_position: [5.0, 10.0, 7.5],
            directional_color: Color::WHITE,
        }
    }
}

fn clamp_intensity(value: f32) -> f32 {
    if value.is_nan() {
        *INTENSITY_RANGE.start()
    } else {
        value.clamp(*INTENSITY_RANGE.start(), *INTENSITY_RANGE.end())
    }
}

impl LightConfig {
    pub fn ambient_intensity(&self) -> f32 {
        self.ambient_intensity
    }

    pub fn directional_intensity(&self) -> f32 {
        self.directional_intensity
    }

    pub fn directional_position(&self) -> [f32; 3] {
        self.directional_position
    }

    pub fn directional_color(&self) -> Color {
        self.directional_color
    }

    /// Returns the stored value
    pub fn set_ambient_intensity(&mut self, value: f32) -> f32 {
        self.ambient_intensity = clamp_intensity(value);
        self.ambient_intensity
    }

    /// Returns the stored value
    pub fn set_directional_intensity(&mut self, value: f32) -> f32 {
        self.directional_intensity = clamp_intensity(value);
        self.directional_intensity
    }

    /// Non-finite components keep their previous value
    pub fn set_directional_position(&mut self, position: [f32; 3]) -> [f32; 3] {
        for (stored, new) in self.directional_position.iter_mut().zip(position) {
            if new.is_finite() {
                *stored = new;
            }
        }
        self.directional_position
    }

    pub fn set_directional_color(&mut self, color: Color) -> Color {
        self.directional_color = color;
        self.directional_color
    }

    /// Re-applies every setter, used after deserializing from a config file
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let position = self.directional_position;
        self.directional_position = defaults.directional_position;
        self.set_ambient_intensity(self.ambient_intensity);
        self.set_directional_intensity(self.directional_intensity);
        self.set_directional_position(position);
        self
    }
}
