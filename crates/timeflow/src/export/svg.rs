//! Native SVG rendering of timeline layouts.

use log::debug;
use svg::{
    Document, Node as _,
    node::{Text as SvgText, element as svg_element},
};

use timeflow_core::{
    apply_stroke,
    color::Color,
    draw::StrokeDefinition,
    geometry::{Bounds, Point, Size},
};

use super::{Error, Renderer};
use crate::{
    config::StyleConfig,
    layout::{PlacedEdge, PlacedNode, TerminalKind, TerminalMarker, TimelineLayout},
};

const CORNER_RADIUS: f32 = 6.0;
const TICK_LENGTH: f32 = 6.0;
/// Height of the arc drawn for self loops.
const LOOP_HEIGHT: f32 = 32.0;
/// Upper bound on how far an edge bows away from the straight line.
const MAX_BOW: f32 = 36.0;
const MARKER_RADIUS: f32 = 7.0;

/// Renders a [`TimelineLayout`] into an SVG document.
///
/// # Example
///
/// ```
/// use timeflow::{
///     config::{LayoutConfig, StyleConfig},
///     export::{draw_layout, svg::SvgRenderer},
///     layout::TimelineEngine,
/// };
///
/// let dfg = timeflow_parser::parse_connections("Start:Submit\nSubmit,Approve,1\nEnd:Approve\n").unwrap();
/// let durations = timeflow_parser::parse_durations("Submit | 1m\nApprove | 2m\n").unwrap();
/// let layout = TimelineEngine::new(LayoutConfig::default())
///     .layout(&dfg, &durations)
///     .unwrap();
///
/// let bytes = draw_layout(&layout, &mut SvgRenderer::new(StyleConfig::default())).unwrap();
/// assert!(String::from_utf8(bytes).unwrap().contains("Approve"));
/// ```
pub struct SvgRenderer {
    style: StyleConfig,
    canvas: Bounds,
    axis: svg_element::Group,
    edges: svg_element::Group,
    nodes: svg_element::Group,
    markers: svg_element::Group,
}

impl SvgRenderer {
    pub fn new(style: StyleConfig) -> Self {
        Self {
            style,
            canvas: Bounds::default(),
            axis: svg_element::Group::new().set("class", "axis"),
            edges: svg_element::Group::new().set("class", "edges"),
            nodes: svg_element::Group::new().set("class", "activities"),
            markers: svg_element::Group::new().set("class", "terminals"),
        }
    }

    fn text(&self, position: Point, content: &str) -> svg_element::Text {
        svg_element::Text::new("")
            .set("x", position.x())
            .set("y", position.y())
            .set("font-family", self.style.font_family())
            .set("font-size", self.style.font_size())
            .set("fill", self.style.text_color().to_string())
            .set("dominant-baseline", "central")
            .add(SvgText::new(content))
    }

    fn arrow_marker_id(&self) -> String {
        format!("arrow-{}", self.style.edge_color().to_id_safe_string())
    }

    fn marker_definitions(&self) -> svg_element::Definitions {
        let color = self.style.edge_color();
        let arrow = svg_element::Marker::new()
            .set("id", self.arrow_marker_id())
            .set("viewBox", "0 0 10 10")
            .set("refX", 9)
            .set("refY", 5)
            .set("markerWidth", 4)
            .set("markerHeight", 4)
            .set("orient", "auto")
            .add(
                svg_element::Path::new()
                    .set("d", "M 0 0 L 10 5 L 0 10 z")
                    .set("fill", &color),
            );
        svg_element::Definitions::new().add(arrow)
    }

    fn draw_axis(&mut self, layout: &TimelineLayout) {
        let axis = layout.axis();
        let origin = axis.origin();
        let end = Point::new(origin.x() + axis.length(), origin.y());
        let stroke = StrokeDefinition::solid(self.style.text_color(), 1.0);

        let line = svg_element::Line::new()
            .set("x1", origin.x())
            .set("y1", origin.y())
            .set("x2", end.x())
            .set("y2", end.y());
        self.axis.append(apply_stroke!(line, &stroke));

        for tick in axis.ticks() {
            let mark = svg_element::Line::new()
                .set("x1", tick.x())
                .set("y1", origin.y())
                .set("x2", tick.x())
                .set("y2", origin.y() + TICK_LENGTH);
            self.axis.append(apply_stroke!(mark, &stroke));

            let anchor = Point::new(tick.x(), origin.y() + TICK_LENGTH * 2.0);
            let label = self
                .text(anchor, &tick.label())
                .set("font-size", self.style.font_size() * 0.8)
                .set("text-anchor", "end")
                .set(
                    "transform",
                    format!("rotate(-30 {} {})", anchor.x(), anchor.y()),
                );
            self.axis.append(label);
        }

        if let Some((first, last)) = axis.unknown_lanes() {
            let lane_height = layout.lane_y(1) - layout.lane_y(0);
            let top = layout.lane_y(first) - lane_height / 2.0;
            let bottom = layout.lane_y(last) + lane_height / 2.0;
            let band = Bounds::new_from_top_left(
                Point::new(layout.canvas().min_x(), top),
                Size::new(layout.canvas().width(), bottom - top),
            );
            let stroke = StrokeDefinition::dashed(self.style.unknown_node_color(), 1.0);
            let rect = svg_element::Rectangle::new()
                .set("x", band.min_x())
                .set("y", band.min_y())
                .set("width", band.width())
                .set("height", band.height())
                .set("fill", "none");
            self.axis.append(apply_stroke!(rect, &stroke));

            let label = self
                .text(Point::new(end.x(), layout.lane_y(first)), "duration unknown")
                .set("font-style", "italic")
                .set("text-anchor", "end");
            self.axis.append(label);
        }
    }

    /// Path data and label position of an edge.
    ///
    /// Forward edges bow upwards and backward edges downwards, so a pair of
    /// opposite edges never overlaps.
    fn edge_path(edge: &PlacedEdge) -> (String, Point) {
        let from = edge.from();
        let to = edge.to();

        if edge.is_self_loop() {
            let lift = from.y() - LOOP_HEIGHT;
            let data = format!(
                "M {} {} C {} {}, {} {}, {} {}",
                from.x(),
                from.y(),
                from.x(),
                lift,
                to.x(),
                lift,
                to.x(),
                to.y()
            );
            let label = Point::new(from.midpoint(to).x(), lift);
            return (data, label);
        }

        let dx = to.x() - from.x();
        let dy = to.y() - from.y();
        let distance = (dx * dx + dy * dy).sqrt();
        let bow = (distance * 0.15).min(MAX_BOW);
        let direction = if dx >= 0.0 { -1.0 } else { 1.0 };
        let control = from.midpoint(to).add_point(Point::new(0.0, bow * direction));
        let data = format!(
            "M {} {} Q {} {}, {} {}",
            from.x(),
            from.y(),
            control.x(),
            control.y(),
            to.x(),
            to.y()
        );
        // Quadratic Bezier at t = 0.5.
        let label = from.midpoint(to).midpoint(control);
        (data, label)
    }
}

impl Renderer for SvgRenderer {
    fn begin(&mut self, layout: &TimelineLayout) -> Result<(), Error> {
        self.canvas = layout.canvas();
        self.draw_axis(layout);
        Ok(())
    }

    fn draw_edge(
        &mut self,
        edge: &PlacedEdge,
        _source: &PlacedNode,
        _target: &PlacedNode,
    ) -> Result<(), Error> {
        let (data, label_at) = Self::edge_path(edge);
        let stroke = StrokeDefinition::solid(self.style.edge_color(), edge.weight());
        let path = svg_element::Path::new()
            .set("d", data)
            .set("fill", "none")
            .set("marker-end", format!("url(#{})", self.arrow_marker_id()));
        self.edges.append(apply_stroke!(path, &stroke));

        let label = self
            .text(label_at, &edge.label())
            .set("font-size", self.style.font_size() * 0.85)
            .set("text-anchor", "middle")
            .set("paint-order", "stroke")
            .set("stroke", &self.style.background_color())
            .set("stroke-width", 3);
        self.edges.append(label);
        Ok(())
    }

    fn place_node(&mut self, node: &PlacedNode) -> Result<(), Error> {
        let bounds = node.bounds();
        let (fill, stroke) = if node.is_unknown() {
            (
                self.style.unknown_node_color(),
                StrokeDefinition::dashed(self.style.text_color(), 1.0),
            )
        } else {
            (
                self.style.node_color(),
                StrokeDefinition::solid(self.style.text_color(), 1.0),
            )
        };

        let rect = svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("rx", CORNER_RADIUS)
            .set("fill", &fill);
        let label = self
            .text(node.center(), node.name())
            .set("text-anchor", "middle");

        let mut group = svg_element::Group::new().set("class", "activity");
        group.append(apply_stroke!(rect, &stroke));
        group.append(label);
        self.nodes.append(group);
        Ok(())
    }

    fn mark_terminal(&mut self, node: &PlacedNode, marker: &TerminalMarker) -> Result<(), Error> {
        let bounds = node.bounds();
        let (color, x): (Color, f32) = match marker.kind() {
            TerminalKind::Start => (self.style.start_color(), bounds.min_x()),
            TerminalKind::End => (self.style.end_color(), bounds.max_x()),
        };
        let stroke = StrokeDefinition::solid(color, 1.0 + 3.0 * marker.emphasis());

        let circle = svg_element::Circle::new()
            .set("cx", x)
            .set("cy", bounds.center().y())
            .set("r", MARKER_RADIUS)
            .set("fill", &self.style.background_color());
        self.markers.append(apply_stroke!(circle, &stroke));

        let count = self
            .text(
                Point::new(x, bounds.min_y() - MARKER_RADIUS),
                &marker.count().to_string(),
            )
            .set("font-size", self.style.font_size() * 0.75)
            .set("text-anchor", "middle")
            .set("fill", &color);
        self.markers.append(count);
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>, Error> {
        let width = self.canvas.width();
        let height = self.canvas.height();

        let background = svg_element::Rectangle::new()
            .set("x", self.canvas.min_x())
            .set("y", self.canvas.min_y())
            .set("width", width)
            .set("height", height)
            .set("fill", &self.style.background_color());

        let document = Document::new()
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    self.canvas.min_x(),
                    self.canvas.min_y(),
                    width,
                    height
                ),
            )
            .set("width", width)
            .set("height", height)
            .add(self.marker_definitions())
            .add(background)
            .add(std::mem::replace(&mut self.axis, svg_element::Group::new()))
            .add(std::mem::replace(&mut self.edges, svg_element::Group::new()))
            .add(std::mem::replace(&mut self.nodes, svg_element::Group::new()))
            .add(std::mem::replace(&mut self.markers, svg_element::Group::new()));

        let rendered = document.to_string();
        debug!(bytes = rendered.len(); "SVG document rendered");
        Ok(rendered.into_bytes())
    }
}
