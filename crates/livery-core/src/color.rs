//! Color handling for Livery styles
//!
//! This module provides the [`Color`] type. Colors are parsed with the `color`
//! crate, so any CSS color string is accepted ("#ff0000", "#f00", "red",
//! "rgb(255, 0, 0)"), and are normalized to the lower-case `#rrggbb` form that
//! theme documents use.

use std::{fmt, str::FromStr};

use color::{DynamicColor, Srgb};

use crate::StyleError;

/// An opaque sRGB color, displayed as `#rrggbb`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

impl Color {
    /// Create a new `Color` from a CSS color string.
    ///
    /// # Examples
    ///
    /// ```
    /// use livery_core::color::Color;
    ///
    /// let red = Color::new("#FF0000").unwrap();
    /// assert_eq!(red.to_string(), "#ff0000");
    ///
    /// let blue = Color::new("blue").unwrap();
    /// assert_eq!(blue.to_string(), "#0000ff");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::InvalidColor`] if the string is not a CSS color.
    pub fn new(color_str: &str) -> Result<Self, StyleError> {
        let dynamic =
            DynamicColor::from_str(color_str.trim()).map_err(|err| StyleError::InvalidColor {
                value: color_str.to_string(),
                reason: err.to_string(),
            })?;
        let rgba = dynamic.to_alpha_color::<Srgb>().to_rgba8();
        Ok(Self::from_rgb(rgba.r, rgba.g, rgba.b))
    }

    /// Create a color from its red, green and blue channels.
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Returns the `(red, green, blue)` channels.
    pub fn rgb(self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }

    /// Returns a darker shade of this color.
    ///
    /// Each channel is scaled by `1.0 - amount`, so `amount` of `0.3` keeps
    /// 70% of the original intensity.
    ///
    /// # Examples
    ///
    /// ```
    /// use livery_core::color::Color;
    ///
    /// let red = Color::new("#ff0000").unwrap();
    /// assert_eq!(red.darker(0.3).to_string(), "#b20000");
    /// ```
    pub fn darker(self, amount: f32) -> Self {
        let factor = (1.0 - amount).clamp(0.0, 1.0);
        let scale = |channel: u8| (f32::from(channel) * factor) as u8;
        Self::from_rgb(scale(self.red), scale(self.green), scale(self.blue))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::from_rgb(0, 0, 0)
    }
}

impl FromStr for Color {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Color {
    type Error = StyleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

impl serde::Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::new(&value).map_err(serde::de::Error::custom)
    }
}
