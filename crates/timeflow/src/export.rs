//! Rendering and export of timeline layouts.
//!
//! Renderers implement the [`Renderer`] capability trait: place a node, draw
//! an edge, mark a start or end activity. [`draw_layout`] walks a
//! [`TimelineLayout`] and drives any renderer through those calls, so the
//! layout engine never depends on a concrete image library.
//!
//! # Pipeline Position
//!
//! ```text
//! Dfg + DurationTable
//!     ↓ layout
//! TimelineLayout
//!     ↓ render (this module)
//! image bytes
//!     ↓ export (this module)
//! output file
//! ```
//!
//! # Available Backends
//!
//! - [`svg`] - native SVG through the `svg` crate
//! - `dot` - Graphviz source and PNG through `graphviz-rust`, behind the
//!   `graphviz` feature
//!
//! # Error Handling
//!
//! Export operations return [`Error`], which converts into
//! [`TimeflowError::Export`](crate::TimeflowError::Export) at the crate
//! boundary.

#[cfg(feature = "graphviz")]
pub mod dot;
pub mod svg;

use std::{fs, io::Write as _, path::Path};

use log::{debug, error, info};

use crate::{
    config::{OutputFormat, StyleConfig},
    layout::{PlacedEdge, PlacedNode, TerminalMarker, TimelineLayout},
};

/// Drawing capabilities a backend must provide.
///
/// [`draw_layout`] calls [`begin`](Renderer::begin) once, then every edge,
/// every node, every terminal marker and finally [`finish`](Renderer::finish).
pub trait Renderer {
    /// Prepares a drawing for `layout`: canvas size, background and axis.
    fn begin(&mut self, layout: &TimelineLayout) -> Result<(), Error>;

    /// Draws an edge between two placed nodes with its weight and label.
    fn draw_edge(
        &mut self,
        edge: &PlacedEdge,
        source: &PlacedNode,
        target: &PlacedNode,
    ) -> Result<(), Error>;

    /// Places an activity box with its label at its coordinate.
    fn place_node(&mut self, node: &PlacedNode) -> Result<(), Error>;

    /// Marks a node as a start or end activity.
    fn mark_terminal(&mut self, node: &PlacedNode, marker: &TerminalMarker) -> Result<(), Error>;

    /// Returns the encoded image.
    fn finish(&mut self) -> Result<Vec<u8>, Error>;
}

/// Drives `renderer` over every element of `layout`.
///
/// Edges are drawn before nodes so that boxes cover edge ends.
pub fn draw_layout(layout: &TimelineLayout, renderer: &mut dyn Renderer) -> Result<Vec<u8>, Error> {
    renderer.begin(layout)?;
    for edge in layout.edges() {
        let (source, target) = layout.endpoints(edge);
        renderer.draw_edge(edge, source, target)?;
    }
    for node in layout.nodes() {
        renderer.place_node(node)?;
    }
    for node in layout.nodes() {
        for marker in node.markers() {
            renderer.mark_terminal(node, marker)?;
        }
    }
    renderer.finish()
}

/// Output format and style of a render call.
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    format: OutputFormat,
    style: StyleConfig,
}

impl RenderConfig {
    pub fn new(format: OutputFormat, style: StyleConfig) -> Self {
        Self { format, style }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Renders `layout` in the configured format.
///
/// # Errors
///
/// Returns [`Error::Unsupported`] for PNG and DOT output when the crate is
/// built without the `graphviz` feature, and [`Error::Render`] when the
/// backend fails.
pub fn render(layout: &TimelineLayout, config: &RenderConfig) -> Result<Vec<u8>, Error> {
    debug!(format:% = config.format(); "Rendering timeline");
    match config.format() {
        OutputFormat::Svg => draw_layout(layout, &mut svg::SvgRenderer::new(config.style().clone())),
        #[cfg(feature = "graphviz")]
        OutputFormat::Dot => draw_layout(
            layout,
            &mut dot::DotRenderer::new(config.style().clone(), dot::DotOutput::Source),
        ),
        #[cfg(feature = "graphviz")]
        OutputFormat::Png => draw_layout(
            layout,
            &mut dot::DotRenderer::new(config.style().clone(), dot::DotOutput::Png),
        ),
        #[cfg(not(feature = "graphviz"))]
        format @ (OutputFormat::Dot | OutputFormat::Png) => Err(Error::Unsupported(format)),
    }
}

/// Writes rendered bytes to `path`.
///
/// The bytes go to a temporary file next to `path` first, which then
/// replaces `path`, so a failed write never leaves a truncated image behind.
pub fn export(bytes: &[u8], path: &Path) -> Result<(), Error> {
    info!(path:? = path, bytes = bytes.len(); "Writing output file");

    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(Error::Io)?;
    }

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|err| {
        error!(path:? = path, err:err; "Failed to create temporary output file");
        Error::Io(err)
    })?;
    file.write_all(bytes).map_err(|err| {
        error!(path:? = path, err:err; "Failed to write output");
        Error::Io(err)
    })?;
    file.persist(path).map_err(|err| {
        error!(path:? = path, err:err = err.error; "Failed to move output into place");
        Error::Io(err.error)
    })?;
    Ok(())
}

/// Errors that can occur while rendering or exporting.
#[derive(Debug)]
pub enum Error {
    /// A rendering failure described by `message`.
    Render(String),
    /// The requested format needs a backend that was not compiled in.
    Unsupported(OutputFormat),
    /// An I/O error encountered while writing output.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "render error: {msg}"),
            Self::Unsupported(format) => write!(
                f,
                "{} output requires the `graphviz` feature",
                format.extension().to_uppercase()
            ),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) | Self::Unsupported(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use timeflow_core::{dfg::DfgBuilder, duration::DurationTable};

    use super::*;
    use crate::{config::LayoutConfig, layout::TimelineEngine};

    /// Records the call sequence of [`draw_layout`].
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Renderer for Recorder {
        fn begin(&mut self, layout: &TimelineLayout) -> Result<(), Error> {
            self.calls.push(format!("begin {}", layout.nodes().len()));
            Ok(())
        }

        fn draw_edge(
            &mut self,
            edge: &PlacedEdge,
            source: &PlacedNode,
            target: &PlacedNode,
        ) -> Result<(), Error> {
            self.calls.push(format!(
                "edge {}->{} {}",
                source.name(),
                target.name(),
                edge.label()
            ));
            Ok(())
        }

        fn place_node(&mut self, node: &PlacedNode) -> Result<(), Error> {
            self.calls.push(format!("node {}", node.name()));
            Ok(())
        }

        fn mark_terminal(&mut self, node: &PlacedNode, marker: &TerminalMarker) -> Result<(), Error> {
            self.calls.push(format!("mark {} {:?}", node.name(), marker.kind()));
            Ok(())
        }

        fn finish(&mut self) -> Result<Vec<u8>, Error> {
            Ok(self.calls.join("\n").into_bytes())
        }
    }

    fn layout() -> TimelineLayout {
        let mut builder = DfgBuilder::new();
        builder.add_start("A").unwrap();
        builder.add_edge("A", "B", 2).unwrap();
        builder.add_end("B").unwrap();
        TimelineEngine::new(LayoutConfig::default())
            .layout(&builder.build(), &DurationTable::new())
            .unwrap()
    }

    #[test]
    fn test_draw_layout_call_order() {
        let mut recorder = Recorder::default();
        let bytes = draw_layout(&layout(), &mut recorder).unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "begin 2\nedge A->B 2\nnode A\nnode B\nmark A Start\nmark B End"
        );
    }

    #[test]
    fn test_render_svg() {
        let config = RenderConfig::new(OutputFormat::Svg, StyleConfig::default());
        let bytes = render(&layout(), &config).unwrap();
        assert!(String::from_utf8(bytes).unwrap().starts_with("<svg"));
    }

    #[cfg(not(feature = "graphviz"))]
    #[test]
    fn test_png_without_graphviz_is_unsupported() {
        let config = RenderConfig::new(OutputFormat::Png, StyleConfig::default());
        let err = render(&layout(), &config).unwrap_err();
        assert!(matches!(err, Error::Unsupported(OutputFormat::Png)));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.svg");

        export(b"<svg/>", &path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"<svg/>");
    }
}
