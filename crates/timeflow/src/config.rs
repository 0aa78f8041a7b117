//! Configuration types for timeline layout and rendering.
//!
//! All types implement [`serde::Deserialize`] and every field has a default,
//! so partial configuration files are valid. A configuration value is built
//! once and passed explicitly to [`TimelineBuilder`](crate::TimelineBuilder).
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`LayoutConfig`] - Geometry of the timeline (axis length, lane spacing).
//! - [`StyleConfig`] - Colors and fonts used by renderers.
//! - [`OutputConfig`] - Output image format.
//!
//! # Example
//!
//! ```
//! # use timeflow::config::{AppConfig, OutputFormat};
//! let config = AppConfig::default();
//! assert_eq!(config.output().format(), OutputFormat::Png);
//! assert_eq!(config.layout().axis_length(), 800.0);
//! ```

use std::{fmt, str::FromStr};

use serde::Deserialize;

use timeflow_core::color::Color;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    layout: LayoutConfig,

    #[serde(default)]
    style: StyleConfig,

    #[serde(default)]
    output: OutputConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(layout: LayoutConfig, style: StyleConfig, output: OutputConfig) -> Self {
        Self {
            layout,
            style,
            output,
        }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Returns a copy with the output format replaced.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output.format = format;
        self
    }
}

/// Geometry of the timeline, in pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Horizontal distance covered by the longest duration.
    axis_length: f32,
    /// Minimum horizontal distance between node centers sharing a lane.
    min_separation: f32,
    /// Vertical distance between lanes.
    lane_height: f32,
    /// Blank space around the drawing.
    margin: f32,
    /// Height of an activity box.
    node_height: f32,
    /// Estimated advance of one label character, used to size boxes.
    char_width: f32,
    /// Stroke width of the least frequent edge.
    min_edge_width: f32,
    /// Stroke width of the most frequent edge.
    max_edge_width: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            axis_length: 800.0,
            min_separation: 120.0,
            lane_height: 90.0,
            margin: 60.0,
            node_height: 36.0,
            char_width: 7.5,
            min_edge_width: 1.0,
            max_edge_width: 8.0,
        }
    }
}

impl LayoutConfig {
    pub fn axis_length(&self) -> f32 {
        self.axis_length
    }

    pub fn min_separation(&self) -> f32 {
        self.min_separation
    }

    pub fn lane_height(&self) -> f32 {
        self.lane_height
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn node_height(&self) -> f32 {
        self.node_height
    }

    pub fn char_width(&self) -> f32 {
        self.char_width
    }

    pub fn min_edge_width(&self) -> f32 {
        self.min_edge_width
    }

    pub fn max_edge_width(&self) -> f32 {
        self.max_edge_width
    }

    pub fn with_axis_length(mut self, axis_length: f32) -> Self {
        self.axis_length = axis_length;
        self
    }

    pub fn with_min_separation(mut self, min_separation: f32) -> Self {
        self.min_separation = min_separation;
        self
    }

    pub fn with_edge_widths(mut self, min: f32, max: f32) -> Self {
        self.min_edge_width = min;
        self.max_edge_width = max;
        self
    }

    /// Checks that every distance is usable.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("axis_length", self.axis_length),
            ("lane_height", self.lane_height),
            ("node_height", self.node_height),
            ("char_width", self.char_width),
            ("min_edge_width", self.min_edge_width),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("layout.{name} must be a positive number, got {value}"));
            }
        }
        for (name, value) in [("margin", self.margin), ("min_separation", self.min_separation)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(format!("layout.{name} must not be negative, got {value}"));
            }
        }
        if !(self.max_edge_width.is_finite() && self.max_edge_width >= self.min_edge_width) {
            return Err(format!(
                "layout.max_edge_width ({}) must be at least layout.min_edge_width ({})",
                self.max_edge_width, self.min_edge_width
            ));
        }
        Ok(())
    }
}

/// Colors and fonts used by renderers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    background_color: Color,
    node_color: Color,
    unknown_node_color: Color,
    text_color: Color,
    edge_color: Color,
    start_color: Color,
    end_color: Color,
    font_family: String,
    font_size: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        let color = |name: &str| Color::new(name).unwrap_or_default();
        Self {
            background_color: color("white"),
            node_color: color("#dbeafe"),
            unknown_node_color: color("#e5e7eb"),
            text_color: color("#111827"),
            edge_color: color("#4b5563"),
            start_color: color("#16a34a"),
            end_color: color("#dc2626"),
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            font_size: 13.0,
        }
    }
}

impl StyleConfig {
    pub fn background_color(&self) -> Color {
        self.background_color
    }

    /// Fill of activities with a known duration.
    pub fn node_color(&self) -> Color {
        self.node_color
    }

    /// Fill of activities missing from the duration table.
    pub fn unknown_node_color(&self) -> Color {
        self.unknown_node_color
    }

    pub fn text_color(&self) -> Color {
        self.text_color
    }

    pub fn edge_color(&self) -> Color {
        self.edge_color
    }

    pub fn start_color(&self) -> Color {
        self.start_color
    }

    pub fn end_color(&self) -> Color {
        self.end_color
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }
}

/// Output section of the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    format: OutputFormat,
}

impl OutputConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Image format written by the exporter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Raster image produced through Graphviz.
    #[default]
    Png,
    /// Scalable vector graphics rendered natively.
    Svg,
    /// Graphviz source with pinned node positions.
    Dot,
}

impl OutputFormat {
    /// File extension for this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Dot => "dot",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            "dot" | "gv" => Ok(Self::Dot),
            _ => Err(format!(
                "invalid output format `{s}`, valid values: png, svg, dot"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.layout(), &LayoutConfig::default());
        assert_eq!(config.style().background_color(), Color::new("white").unwrap());
        assert_eq!(config.output().format(), OutputFormat::Png);
        assert!(config.layout().validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config: AppConfig = toml::from_str(
            r##"
            [layout]
            axis_length = 1200.0

            [style]
            node_color = "#ffcc00"

            [output]
            format = "svg"
            "##,
        )
        .unwrap();

        assert_eq!(config.layout().axis_length(), 1200.0);
        assert_eq!(config.layout().lane_height(), 90.0);
        assert_eq!(config.style().node_color(), Color::new("#ffcc00").unwrap());
        assert_eq!(config.output().format(), OutputFormat::Svg);
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[style]\nedge_color = \"nope\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[layout]\naxis = 3.0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate() {
        let config = LayoutConfig::default().with_axis_length(0.0);
        assert!(config.validate().unwrap_err().contains("axis_length"));

        let config = LayoutConfig::default().with_edge_widths(4.0, 2.0);
        assert!(config.validate().unwrap_err().contains("max_edge_width"));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("dot".parse::<OutputFormat>().unwrap(), OutputFormat::Dot);
        assert!("gif".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Svg.extension(), "svg");
    }
}
