//! Graphviz rendering of timeline layouts.
//!
//! Node positions are pinned (`pos="x,y!"`) so Graphviz only draws what the
//! layout engine computed. DOT source is printed directly; PNG output runs
//! `neato -n2` on the same graph, which requires Graphviz to be installed.

use dot_structures::{Attribute, Edge, EdgeTy, Graph, GraphAttributes, Id, Node, NodeId, Stmt, Vertex};
use graphviz_rust::{
    cmd::{CommandArg, Format, Layout},
    exec,
    printer::{DotPrinter, PrinterContext},
};
use indexmap::IndexMap;
use log::debug;

use timeflow_core::{color::Color, draw::StrokeDefinition, geometry::Point};

use super::{Error, Renderer};
use crate::{
    config::StyleConfig,
    layout::{PlacedEdge, PlacedNode, TerminalKind, TerminalMarker, TimelineLayout},
};

/// Graphviz points per layout pixel.
const POINTS_PER_PIXEL: f32 = 0.75;
const PIXELS_PER_INCH: f32 = 96.0;

/// What [`DotRenderer::finish`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotOutput {
    /// DOT source text.
    Source,
    /// A PNG image rendered by Graphviz.
    Png,
}

/// Renders a [`TimelineLayout`] as a Graphviz graph.
pub struct DotRenderer {
    style: StyleConfig,
    output: DotOutput,
    canvas_height: f32,
    decorations: Vec<Stmt>,
    nodes: IndexMap<usize, Node>,
    terminal_labels: IndexMap<usize, Vec<String>>,
    edges: Vec<Stmt>,
}

impl DotRenderer {
    pub fn new(style: StyleConfig, output: DotOutput) -> Self {
        Self {
            style,
            output,
            canvas_height: 0.0,
            decorations: Vec::new(),
            nodes: IndexMap::new(),
            terminal_labels: IndexMap::new(),
            edges: Vec::new(),
        }
    }

    /// Graphviz puts the origin at the bottom-left corner.
    fn position(&self, point: Point) -> Id {
        let x = point.x() * POINTS_PER_PIXEL;
        let y = (self.canvas_height - point.y()) * POINTS_PER_PIXEL;
        quoted(&format!("{x:.2},{y:.2}!"))
    }

    fn plain_text(&self, id: String, at: Point, text: &str, font_scale: f32) -> Stmt {
        Stmt::Node(Node {
            id: NodeId(Id::Plain(id), None),
            attributes: vec![
                attr("shape", Id::Plain("plaintext".into())),
                attr("label", quoted(text)),
                attr("pos", self.position(at)),
                attr("fontsize", number(self.style.font_size() * font_scale)),
                attr("fontcolor", color(self.style.text_color())),
            ],
        })
    }

    fn build_graph(&mut self) -> Graph {
        let mut stmts = vec![
            Stmt::GAttribute(GraphAttributes::Graph(vec![
                attr("bgcolor", color(self.style.background_color())),
                attr("outputorder", Id::Plain("edgesfirst".into())),
                attr("splines", Id::Plain("true".into())),
            ])),
            Stmt::GAttribute(GraphAttributes::Node(vec![
                attr("fontname", quoted(self.style.font_family())),
                attr("fontsize", number(self.style.font_size())),
                attr("fontcolor", color(self.style.text_color())),
            ])),
        ];
        stmts.append(&mut self.decorations);

        for (rank, mut node) in std::mem::take(&mut self.nodes) {
            if let Some(labels) = self.terminal_labels.get(&rank) {
                node.attributes.push(attr("xlabel", quoted(&labels.join(" "))));
            }
            stmts.push(Stmt::Node(node));
        }
        stmts.append(&mut self.edges);

        Graph::DiGraph {
            id: Id::Plain("timeline".into()),
            strict: false,
            stmts,
        }
    }
}

impl Renderer for DotRenderer {
    fn begin(&mut self, layout: &TimelineLayout) -> Result<(), Error> {
        self.canvas_height = layout.canvas().max_y();

        let axis = layout.axis();
        for (i, tick) in axis.ticks().iter().enumerate() {
            let at = Point::new(tick.x(), axis.origin().y());
            let stmt = self.plain_text(format!("tick{i}"), at, &tick.label(), 0.8);
            self.decorations.push(stmt);
        }
        if let Some((first, _)) = axis.unknown_lanes() {
            let at = Point::new(axis.origin().x() + axis.length(), layout.lane_y(first));
            let stmt = self.plain_text("unknown".to_string(), at, "duration unknown", 0.9);
            self.decorations.push(stmt);
        }
        Ok(())
    }

    fn draw_edge(
        &mut self,
        edge: &PlacedEdge,
        source: &PlacedNode,
        target: &PlacedNode,
    ) -> Result<(), Error> {
        self.edges.push(Stmt::Edge(Edge {
            ty: EdgeTy::Pair(Vertex::N(node_id(source)), Vertex::N(node_id(target))),
            attributes: vec![
                attr("label", quoted(&edge.label())),
                attr("penwidth", number(edge.weight())),
                attr("color", color(self.style.edge_color())),
                attr("arrowsize", number(0.6)),
            ],
        }));
        Ok(())
    }

    fn place_node(&mut self, node: &PlacedNode) -> Result<(), Error> {
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

        let size = node.size();
        let attributes = vec![
            attr("shape", Id::Plain("box".into())),
            attr(
                "style",
                quoted(&format!("rounded,filled,{}", stroke.style().to_dot_value())),
            ),
            attr("label", quoted(node.name())),
            attr("fillcolor", color(fill)),
            attr("color", color(stroke.color())),
            attr("penwidth", number(stroke.width())),
            attr("pos", self.position(node.center())),
            attr("width", number(size.width() / PIXELS_PER_INCH)),
            attr("height", number(size.height() / PIXELS_PER_INCH)),
            attr("fixedsize", Id::Plain("true".into())),
        ];
        self.nodes.insert(
            node.rank(),
            Node {
                id: node_id(node),
                attributes,
            },
        );
        Ok(())
    }

    fn mark_terminal(&mut self, node: &PlacedNode, marker: &TerminalMarker) -> Result<(), Error> {
        let Some(dot_node) = self.nodes.get_mut(&node.rank()) else {
            return Err(Error::Render(format!(
                "terminal marker for `{}` before its node was placed",
                node.name()
            )));
        };

        let (marker_color, symbol) = match marker.kind() {
            TerminalKind::Start => (self.style.start_color(), "start"),
            TerminalKind::End => {
                dot_node.attributes.push(attr("peripheries", Id::Plain("2".into())));
                (self.style.end_color(), "end")
            }
        };
        dot_node.attributes.push(attr("color", color(marker_color)));
        dot_node
            .attributes
            .push(attr("penwidth", number(1.0 + 3.0 * marker.emphasis())));

        self.terminal_labels
            .entry(node.rank())
            .or_default()
            .push(format!("{symbol} ×{}", marker.count()));
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>, Error> {
        let graph = self.build_graph();
        match self.output {
            DotOutput::Source => {
                let source = graph.print(&mut PrinterContext::default());
                debug!(bytes = source.len(); "DOT source rendered");
                Ok(source.into_bytes())
            }
            DotOutput::Png => {
                let image = exec(
                    graph,
                    &mut PrinterContext::default(),
                    vec![
                        CommandArg::Format(Format::Png),
                        CommandArg::Layout(Layout::Neato),
                        CommandArg::Custom("-n2".to_string()),
                    ],
                )
                .map_err(|err| Error::Render(format!("graphviz failed: {err}")))?;
                debug!(bytes = image.len(); "PNG rendered by graphviz");
                Ok(image)
            }
        }
    }
}

fn attr(key: &str, value: Id) -> Attribute {
    Attribute(Id::Plain(key.to_string()), value)
}

fn quoted(text: &str) -> Id {
    Id::Escaped(format!(
        "\"{}\"",
        text.replace('\\', "\\\\").replace('"', "\\\"")
    ))
}

fn number(value: f32) -> Id {
    Id::Plain(format!("{value:.3}"))
}

fn color(color: Color) -> Id {
    quoted(&color.to_hex())
}

fn node_id(node: &PlacedNode) -> NodeId {
    NodeId(Id::Plain(format!("n{}", node.rank())), None)
}

#[cfg(test)]
mod tests {
    use timeflow_core::{
        dfg::DfgBuilder,
        duration::{ActivityDuration, DurationTable},
    };

    use super::*;
    use crate::{config::LayoutConfig, export::draw_layout, layout::TimelineEngine};

    fn source(builder: DfgBuilder) -> String {
        let layout = TimelineEngine::new(LayoutConfig::default())
            .layout(&builder.build(), &DurationTable::new())
            .unwrap();
        let mut renderer = DotRenderer::new(StyleConfig::default(), DotOutput::Source);
        String::from_utf8(draw_layout(&layout, &mut renderer).unwrap()).unwrap()
    }

    #[test]
    fn test_source_pins_positions() {
        let mut builder = DfgBuilder::new();
        builder.add_start("Submit").unwrap();
        builder.add_edge("Submit", "Approve", 4).unwrap();
        let dot = source(builder);

        assert!(dot.starts_with("digraph timeline"));
        assert!(dot.contains("label=\"Submit\""));
        assert!(dot.contains("label=\"4\""));
        assert!(dot.contains("!\""));
        assert!(dot.contains("start ×1"));
        assert!(dot.contains("duration unknown"));
    }

    #[test]
    fn test_unknown_node_outline_is_dashed() {
        let mut builder = DfgBuilder::new();
        builder.add_edge("Submit", "Approve", 2).unwrap();
        let mut durations = DurationTable::new();
        durations.insert("Submit", ActivityDuration::from_secs(60));
        let layout = TimelineEngine::new(LayoutConfig::default())
            .layout(&builder.build(), &durations)
            .unwrap();

        let mut renderer = DotRenderer::new(StyleConfig::default(), DotOutput::Source);
        renderer.begin(&layout).unwrap();
        for node in layout.nodes() {
            renderer.place_node(node).unwrap();
        }

        let style_of = |name: &str| {
            let rank = layout.node(name).unwrap().rank();
            renderer.nodes[&rank]
                .attributes
                .iter()
                .find(|Attribute(key, _)| *key == Id::Plain("style".into()))
                .map(|Attribute(_, value)| value.clone())
                .unwrap()
        };
        assert_eq!(style_of("Approve"), quoted("rounded,filled,dashed"));
        assert_eq!(style_of("Submit"), quoted("rounded,filled,solid"));
    }

    #[test]
    fn test_quoted_escapes() {
        assert_eq!(quoted("say \"hi\""), Id::Escaped("\"say \\\"hi\\\"\"".to_string()));
    }
}
