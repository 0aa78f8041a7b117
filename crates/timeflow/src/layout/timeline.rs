//! Positioned output of the timeline layout engine.

use timeflow_core::{
    duration::ActivityDuration,
    geometry::{Bounds, Point, Size},
    identifier::ActivityId,
};

/// Whether a terminal marker flags a start or an end activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalKind {
    Start,
    End,
}

/// Start or end marker of an activity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalMarker {
    pub(super) kind: TerminalKind,
    pub(super) count: u32,
    pub(super) emphasis: f32,
}

impl TerminalMarker {
    pub fn kind(&self) -> TerminalKind {
        self.kind
    }

    /// How many traces started or ended with the activity.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Count relative to the largest count of the same kind, in `(0, 1]`.
    pub fn emphasis(&self) -> f32 {
        self.emphasis
    }
}

/// An activity placed on the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    pub(super) id: ActivityId,
    pub(super) name: String,
    pub(super) duration: Option<ActivityDuration>,
    pub(super) rank: usize,
    pub(super) lane: usize,
    pub(super) center: Point,
    pub(super) size: Size,
    pub(super) total_frequency: u64,
    pub(super) start: Option<TerminalMarker>,
    pub(super) end: Option<TerminalMarker>,
}

impl PlacedNode {
    pub fn id(&self) -> ActivityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The duration from the duration table, `None` when the activity had no
    /// entry.
    pub fn duration(&self) -> Option<ActivityDuration> {
        self.duration
    }

    /// Duration used for positioning. Unknown durations resolve to zero.
    pub fn resolved_duration(&self) -> ActivityDuration {
        self.duration.unwrap_or(ActivityDuration::ZERO)
    }

    /// Returns true when the activity had no duration entry.
    pub fn is_unknown(&self) -> bool {
        self.duration.is_none()
    }

    /// Position in the deterministic placement order.
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn lane(&self) -> usize {
        self.lane
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Bounds {
        self.center.to_bounds(self.size)
    }

    /// Sum of incoming and outgoing edge frequencies.
    pub fn total_frequency(&self) -> u64 {
        self.total_frequency
    }

    pub fn start_marker(&self) -> Option<&TerminalMarker> {
        self.start.as_ref()
    }

    pub fn end_marker(&self) -> Option<&TerminalMarker> {
        self.end.as_ref()
    }

    /// Start and end markers, in that order.
    pub fn markers(&self) -> impl Iterator<Item = &TerminalMarker> {
        self.start.iter().chain(self.end.iter())
    }
}

/// An edge between two placed activities.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedEdge {
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) frequency: u64,
    pub(super) weight: f32,
    pub(super) from: Point,
    pub(super) to: Point,
}

impl PlacedEdge {
    /// Index of the source node in [`TimelineLayout::nodes`].
    pub fn source(&self) -> usize {
        self.source
    }

    /// Index of the target node in [`TimelineLayout::nodes`].
    pub fn target(&self) -> usize {
        self.target
    }

    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    /// Stroke width derived from the frequency.
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Label printed next to the edge.
    pub fn label(&self) -> String {
        self.frequency.to_string()
    }

    /// Point on the source border where the edge leaves.
    pub fn from(&self) -> Point {
        self.from
    }

    /// Point on the target border where the edge arrives.
    pub fn to(&self) -> Point {
        self.to
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// A labeled tick on the time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub(super) x: f32,
    pub(super) duration: ActivityDuration,
}

impl AxisTick {
    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn duration(&self) -> ActivityDuration {
        self.duration
    }

    /// Tick label in canonical duration form.
    pub fn label(&self) -> String {
        self.duration.to_string()
    }
}

/// The horizontal time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    pub(super) origin: Point,
    pub(super) length: f32,
    pub(super) max_duration: ActivityDuration,
    pub(super) ticks: Vec<AxisTick>,
    pub(super) unknown_lanes: Option<(usize, usize)>,
}

impl TimeAxis {
    /// Left end of the axis, where zero duration sits.
    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    /// Duration mapped to the right end of the axis.
    pub fn max_duration(&self) -> ActivityDuration {
        self.max_duration
    }

    /// One tick per distinct known duration, left to right.
    pub fn ticks(&self) -> &[AxisTick] {
        &self.ticks
    }

    /// First and last lane holding activities without a duration, if any.
    pub fn unknown_lanes(&self) -> Option<(usize, usize)> {
        self.unknown_lanes
    }
}

/// Result of laying out a graph on the timeline.
///
/// Nodes are stored in placement order: ascending duration, then descending
/// total frequency, then name.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineLayout {
    pub(super) nodes: Vec<PlacedNode>,
    pub(super) edges: Vec<PlacedEdge>,
    pub(super) axis: TimeAxis,
    pub(super) lane_count: usize,
    pub(super) first_lane_y: f32,
    pub(super) lane_height: f32,
    pub(super) canvas: Bounds,
}

impl TimelineLayout {
    pub fn nodes(&self) -> &[PlacedNode] {
        &self.nodes
    }

    /// Edges in the insertion order of the source graph.
    pub fn edges(&self) -> &[PlacedEdge] {
        &self.edges
    }

    pub fn axis(&self) -> &TimeAxis {
        &self.axis
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    /// Vertical center of `lane`.
    pub fn lane_y(&self, lane: usize) -> f32 {
        self.first_lane_y + self.lane_height * lane as f32
    }

    /// Area covered by the whole drawing, margins included.
    pub fn canvas(&self) -> Bounds {
        self.canvas
    }

    /// Looks up a node by activity name.
    pub fn node(&self, name: &str) -> Option<&PlacedNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Source and target nodes of `edge`.
    pub fn endpoints(&self, edge: &PlacedEdge) -> (&PlacedNode, &PlacedNode) {
        (&self.nodes[edge.source], &self.nodes[edge.target])
    }
}
