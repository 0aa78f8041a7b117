//! Color handling for timeline diagrams.
//!
//! [`Color`] wraps the `DynamicColor` type from the color crate so that style
//! settings can be written as CSS color strings in configuration files and
//! emitted verbatim into rendered output.

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::{DynamicColor, Rgba8, Srgb};
use serde::Deserialize;

/// A CSS color used for node fills, edge strokes and markers.
///
/// Deserializes from any CSS color string, so it can appear directly in
/// configuration structures.
#[derive(Clone, Copy, PartialEq, Debug, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    color: DynamicColor,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl Color {
    /// Create a new `Color` from a CSS color string such as `"#ff0000"`,
    /// `"rgb(255, 0, 0)"` or `"red"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use timeflow_core::color::Color;
    ///
    /// let red = Color::new("#ff0000").unwrap();
    /// let blue = Color::new("blue").unwrap();
    /// assert_ne!(red, blue);
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    /// Returns a string usable as part of an SVG `id` attribute.
    ///
    /// The result only contains alphanumeric characters and underscores and
    /// always starts with a letter.
    pub fn to_id_safe_string(self) -> String {
        let mut sanitized = self
            .to_string()
            .replace('#', "hex")
            .replace(['(', ')', ',', ' ', ';', '.', '%', '/'], "_");

        if sanitized.chars().next().is_some_and(|c| !c.is_ascii_alphabetic()) {
            sanitized = format!("c_{sanitized}");
        }

        sanitized
    }

    /// Returns the color as `#rrggbbaa` in sRGB.
    ///
    /// Used by backends that do not understand CSS color functions.
    ///
    /// ```
    /// # use timeflow_core::color::Color;
    /// assert_eq!(Color::new("red").unwrap().to_hex(), "#ff0000ff");
    /// ```
    pub fn to_hex(self) -> String {
        let Rgba8 { r, g, b, a } = self.color.to_alpha_color::<Srgb>().to_rgba8();
        format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
    }

    /// Returns the alpha component of this color.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("black").expect("'black' is a valid CSS color")
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}

impl From<&Color> for svg::node::Value {
    fn from(color: &Color) -> Self {
        Self::from(color.to_string())
    }
}
