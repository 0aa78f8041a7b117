//! The timeline layout engine.
//!
//! Placement works in four passes:
//!
//! 1. Every registered activity resolves its duration. Activities missing from
//!    the duration table resolve to zero and are flagged as unknown.
//! 2. Activities are sorted by ascending duration, then descending total
//!    frequency, then name.
//! 3. Each activity gets `x = origin + duration / max_duration * axis_length`.
//!    Walking the sorted order, an activity joins the first lane whose last
//!    activity is far enough to the left, or opens a new lane. Unknown
//!    activities are packed into their own lanes below the known ones.
//! 4. Edges get a stroke weight on a logarithmic scale between the configured
//!    minimum and maximum widths, and anchor points on the node borders.

use indexmap::IndexMap;
use log::{debug, info, warn};

use timeflow_core::{
    dfg::Dfg,
    duration::{ActivityDuration, DurationTable},
    geometry::{Bounds, Point, Size},
    identifier::ActivityId,
};

use super::timeline::{
    AxisTick, PlacedEdge, PlacedNode, TerminalKind, TerminalMarker, TimeAxis, TimelineLayout,
};
use crate::{TimeflowError, config::LayoutConfig};

/// Horizontal padding inside an activity box.
const NODE_PADDING: f32 = 12.0;
const MIN_NODE_WIDTH: f32 = 48.0;
/// Extra gap kept between neighbouring boxes in one lane.
const NODE_GAP: f32 = 12.0;
/// Distance between the lowest lane and the time axis.
const AXIS_GAP: f32 = 24.0;
/// Room below the axis for tick labels.
const TICK_LABEL_SPACE: f32 = 36.0;

/// Lays out directly-follows graphs on a duration timeline.
///
/// # Example
///
/// ```
/// use timeflow::{config::LayoutConfig, layout::TimelineEngine};
///
/// let dfg = timeflow_parser::parse_connections("Start:A\nA,B,5\nB,C,3\nEnd:C\n").unwrap();
/// let durations =
///     timeflow_parser::parse_durations("A | 00:10:00\nB | 00:05:00\nC | 00:02:00\n").unwrap();
///
/// let layout = TimelineEngine::new(LayoutConfig::default())
///     .layout(&dfg, &durations)
///     .unwrap();
///
/// let order: Vec<_> = layout.nodes().iter().map(|node| node.name()).collect();
/// assert_eq!(order, vec!["C", "B", "A"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TimelineEngine {
    config: LayoutConfig,
}

/// Per-activity data gathered before placement.
struct Entry<'a> {
    id: ActivityId,
    name: &'a str,
    duration: Option<ActivityDuration>,
    total_frequency: u64,
}

impl Entry<'_> {
    fn resolved(&self) -> ActivityDuration {
        self.duration.unwrap_or(ActivityDuration::ZERO)
    }
}

/// Last box placed in a lane.
#[derive(Clone, Copy)]
struct LaneTail {
    x: f32,
    half_width: f32,
}

impl TimelineEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Computes the timeline layout of `dfg`.
    ///
    /// # Errors
    ///
    /// - [`TimeflowError::EmptyGraph`] when the graph has no activity.
    /// - [`TimeflowError::UnknownActivity`] when an edge refers to an
    ///   activity that is not registered in the graph.
    /// - [`TimeflowError::Config`] when the layout configuration is invalid.
    pub fn layout(
        &self,
        dfg: &Dfg,
        durations: &DurationTable,
    ) -> Result<TimelineLayout, TimeflowError> {
        self.config.validate().map_err(TimeflowError::Config)?;

        if dfg.is_empty() {
            return Err(TimeflowError::EmptyGraph);
        }
        for edge in dfg.edges() {
            for id in [edge.source(), edge.target()] {
                if !dfg.registry().contains(id) {
                    return Err(TimeflowError::UnknownActivity(id.to_string()));
                }
            }
        }

        let mut entries: Vec<Entry<'_>> = dfg
            .registry()
            .iter()
            .map(|(id, name)| Entry {
                id,
                name,
                duration: durations.get(name),
                total_frequency: dfg.total_frequency(id),
            })
            .collect();
        entries.sort_by(|a, b| {
            a.resolved()
                .cmp(&b.resolved())
                .then_with(|| b.total_frequency.cmp(&a.total_frequency))
                .then_with(|| a.name.cmp(b.name))
        });

        let unknown = entries.iter().filter(|entry| entry.duration.is_none());
        let unknown_count = unknown.clone().count();
        if unknown_count > 0 {
            for entry in unknown {
                debug!(activity = entry.name; "No duration entry, placing at zero");
            }
            warn!(count = unknown_count; "Activities without a duration are placed at zero and flagged");
        }

        let max_duration = entries
            .iter()
            .filter_map(|entry| entry.duration)
            .max()
            .unwrap_or(ActivityDuration::ZERO);

        let sizes: Vec<Size> = entries
            .iter()
            .map(|entry| self.node_size(entry.name))
            .collect();
        let widest = sizes.iter().map(|size| size.width()).fold(0.0, f32::max);
        let origin_x = self.config.margin() + widest / 2.0;

        let xs: Vec<f32> = entries
            .iter()
            .map(|entry| origin_x + self.axis_offset(entry.resolved(), max_duration))
            .collect();

        let lanes = self.assign_lanes(&entries, &xs, &sizes);
        let lane_count = lanes.iter().copied().max().map_or(0, |lane| lane + 1);
        let unknown_lanes = entries
            .iter()
            .zip(&lanes)
            .filter(|(entry, _)| entry.duration.is_none())
            .map(|(_, lane)| *lane)
            .fold(None, |range: Option<(usize, usize)>, lane| match range {
                Some((first, last)) => Some((first.min(lane), last.max(lane))),
                None => Some((lane, lane)),
            });

        let first_lane_y = self.config.margin() + self.config.node_height() / 2.0;
        let lane_y = |lane: usize| first_lane_y + self.config.lane_height() * lane as f32;

        let max_start = dfg.start_activities().map(|(_, count)| count).max().unwrap_or(0);
        let max_end = dfg.end_activities().map(|(_, count)| count).max().unwrap_or(0);

        let mut index: IndexMap<ActivityId, usize> = IndexMap::with_capacity(entries.len());
        let nodes: Vec<PlacedNode> = entries
            .iter()
            .enumerate()
            .map(|(rank, entry)| {
                index.insert(entry.id, rank);
                PlacedNode {
                    id: entry.id,
                    name: entry.name.to_string(),
                    duration: entry.duration,
                    rank,
                    lane: lanes[rank],
                    center: Point::new(xs[rank], lane_y(lanes[rank])),
                    size: sizes[rank],
                    total_frequency: entry.total_frequency,
                    start: terminal_marker(TerminalKind::Start, dfg.start_count(entry.id), max_start),
                    end: terminal_marker(TerminalKind::End, dfg.end_count(entry.id), max_end),
                }
            })
            .collect();

        let max_frequency = dfg.edges().iter().map(|edge| edge.frequency()).max().unwrap_or(1);
        let mut edges = Vec::with_capacity(dfg.edges().len());
        for edge in dfg.edges() {
            let missing = |id: ActivityId| TimeflowError::UnknownActivity(id.to_string());
            let source = *index.get(&edge.source()).ok_or_else(|| missing(edge.source()))?;
            let target = *index.get(&edge.target()).ok_or_else(|| missing(edge.target()))?;
            let (from, to) = anchors(&nodes[source], &nodes[target]);

            edges.push(PlacedEdge {
                source,
                target,
                frequency: edge.frequency(),
                weight: self.edge_weight(edge.frequency(), max_frequency),
                from,
                to,
            });
        }

        let last_lane_y = lane_y(lane_count.saturating_sub(1));
        let axis_y = last_lane_y + self.config.node_height() / 2.0 + AXIS_GAP;

        let mut ticks: Vec<AxisTick> = Vec::new();
        for (entry, x) in entries.iter().zip(&xs) {
            let Some(duration) = entry.duration else {
                continue;
            };
            if ticks.last().is_none_or(|tick| tick.duration != duration) {
                ticks.push(AxisTick { x: *x, duration });
            }
        }

        let axis = TimeAxis {
            origin: Point::new(origin_x, axis_y),
            length: self.config.axis_length(),
            max_duration,
            ticks,
            unknown_lanes,
        };

        let canvas = nodes
            .iter()
            .map(|node| node.bounds().expand(self.config.margin()))
            .fold(
                Bounds::new_from_top_left(
                    Point::default(),
                    Size::new(
                        origin_x + self.config.axis_length() + widest / 2.0 + self.config.margin(),
                        axis_y + TICK_LABEL_SPACE + self.config.margin(),
                    ),
                ),
                |canvas, bounds| canvas.merge(&bounds),
            );

        info!(
            activities = nodes.len(),
            edges = edges.len(),
            lanes = lane_count,
            unknown = unknown_count;
            "Timeline laid out"
        );

        Ok(TimelineLayout {
            nodes,
            edges,
            axis,
            lane_count,
            first_lane_y,
            lane_height: self.config.lane_height(),
            canvas,
        })
    }

    fn node_size(&self, name: &str) -> Size {
        let text_width = name.chars().count() as f32 * self.config.char_width();
        Size::new(
            (text_width + 2.0 * NODE_PADDING).max(MIN_NODE_WIDTH),
            self.config.node_height(),
        )
    }

    /// Distance from the axis origin, proportional to `duration`.
    fn axis_offset(&self, duration: ActivityDuration, max_duration: ActivityDuration) -> f32 {
        if max_duration.is_zero() {
            return 0.0;
        }
        let ratio = duration.as_nanos() as f64 / max_duration.as_nanos() as f64;
        (ratio * f64::from(self.config.axis_length())) as f32
    }

    /// Greedy lane assignment in placement order.
    ///
    /// Known and unknown activities are packed separately; unknown lanes are
    /// numbered after every known lane.
    fn assign_lanes(&self, entries: &[Entry<'_>], xs: &[f32], sizes: &[Size]) -> Vec<usize> {
        let mut known: Vec<LaneTail> = Vec::new();
        let mut unknown: Vec<LaneTail> = Vec::new();
        let mut picks: Vec<(bool, usize)> = Vec::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            let tails = if entry.duration.is_some() {
                &mut known
            } else {
                &mut unknown
            };
            let node = LaneTail {
                x: xs[i],
                half_width: sizes[i].width() / 2.0,
            };
            let lane = match tails.iter().position(|tail| self.fits_after(*tail, node)) {
                Some(lane) => {
                    tails[lane] = node;
                    lane
                }
                None => {
                    tails.push(node);
                    tails.len() - 1
                }
            };
            picks.push((entry.duration.is_some(), lane));
        }

        let known_lanes = known.len();
        picks
            .into_iter()
            .map(|(is_known, lane)| if is_known { lane } else { known_lanes + lane })
            .collect()
    }

    fn fits_after(&self, tail: LaneTail, node: LaneTail) -> bool {
        let required = self
            .config
            .min_separation()
            .max(tail.half_width + node.half_width + NODE_GAP);
        node.x - tail.x >= required
    }

    /// Stroke width on a logarithmic scale, so frequent edges do not drown
    /// out the rest.
    fn edge_weight(&self, frequency: u64, max_frequency: u64) -> f32 {
        let min = self.config.min_edge_width();
        let max = self.config.max_edge_width();
        if max_frequency <= 1 {
            return min;
        }
        let ratio = (frequency as f64).ln() / (max_frequency as f64).ln();
        min + (max - min) * ratio as f32
    }
}

fn terminal_marker(kind: TerminalKind, count: u32, max_count: u32) -> Option<TerminalMarker> {
    (count > 0).then(|| TerminalMarker {
        kind,
        count,
        emphasis: count as f32 / max_count.max(1) as f32,
    })
}

/// Border points where an edge leaves its source and reaches its target.
///
/// A self loop leaves and re-enters through the top side of its box.
fn anchors(source: &PlacedNode, target: &PlacedNode) -> (Point, Point) {
    if source.id() == target.id() {
        let bounds = source.bounds();
        let quarter = bounds.width() / 4.0;
        let center_x = bounds.center().x();
        return (
            Point::new(center_x - quarter, bounds.min_y()),
            Point::new(center_x + quarter, bounds.min_y()),
        );
    }
    (
        source.bounds().border_point_towards(target.center()),
        target.bounds().border_point_towards(source.center()),
    )
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use timeflow_core::dfg::DfgBuilder;

    use super::*;

    fn engine() -> TimelineEngine {
        TimelineEngine::new(LayoutConfig::default())
    }

    fn durations(entries: &[(&str, u64)]) -> DurationTable {
        entries
            .iter()
            .map(|(name, secs)| (*name, ActivityDuration::from_secs(*secs)))
            .collect()
    }

    fn scenario() -> (Dfg, DurationTable) {
        let mut builder = DfgBuilder::new();
        builder.add_start("A").unwrap();
        builder.add_edge("A", "B", 5).unwrap();
        builder.add_edge("B", "C", 3).unwrap();
        builder.add_end("C").unwrap();
        (
            builder.build(),
            durations(&[("A", 600), ("B", 300), ("C", 120)]),
        )
    }

    #[test]
    fn test_orders_by_ascending_duration() {
        let (dfg, table) = scenario();
        let layout = engine().layout(&dfg, &table).unwrap();

        let c = layout.node("C").unwrap();
        let b = layout.node("B").unwrap();
        let a = layout.node("A").unwrap();
        assert!(c.center().x() < b.center().x());
        assert!(b.center().x() < a.center().x());
        assert_eq!(layout.lane_count(), 1);
    }

    #[test]
    fn test_spacing_is_proportional_to_duration() {
        let (dfg, table) = scenario();
        let layout = engine().layout(&dfg, &table).unwrap();
        let origin = layout.axis().origin().x();

        assert_approx_eq!(f32, layout.node("A").unwrap().center().x() - origin, 800.0, epsilon = 0.01);
        assert_approx_eq!(f32, layout.node("B").unwrap().center().x() - origin, 400.0, epsilon = 0.01);
        assert_approx_eq!(f32, layout.node("C").unwrap().center().x() - origin, 160.0, epsilon = 0.01);
    }

    #[test]
    fn test_start_end_markers_and_edge_weights() {
        let (dfg, table) = scenario();
        let layout = engine().layout(&dfg, &table).unwrap();

        let a = layout.node("A").unwrap();
        let c = layout.node("C").unwrap();
        assert_eq!(a.start_marker().map(TerminalMarker::count), Some(1));
        assert!(a.end_marker().is_none());
        assert_eq!(c.end_marker().map(TerminalMarker::kind), Some(TerminalKind::End));

        let ab = &layout.edges()[0];
        let bc = &layout.edges()[1];
        assert_eq!(ab.frequency(), 5);
        assert_eq!(ab.label(), "5");
        assert!(ab.weight() > bc.weight());
        assert_approx_eq!(f32, ab.weight(), 8.0);
    }

    #[test]
    fn test_missing_duration_is_placed_at_zero_and_flagged() {
        let mut builder = DfgBuilder::new();
        builder.add_edge("A", "X", 2).unwrap();
        let layout = engine()
            .layout(&builder.build(), &durations(&[("A", 60)]))
            .unwrap();

        let x = layout.node("X").unwrap();
        assert!(x.is_unknown());
        assert_eq!(x.resolved_duration(), ActivityDuration::ZERO);
        assert_approx_eq!(f32, x.center().x(), layout.axis().origin().x());
        assert_eq!(x.lane(), 1);
        assert_eq!(layout.axis().unknown_lanes(), Some((1, 1)));
        assert_eq!(layout.nodes().len(), 2);
    }

    #[test]
    fn test_empty_graph_is_rejected() {
        let result = engine().layout(&DfgBuilder::new().build(), &DurationTable::new());
        assert!(matches!(result, Err(TimeflowError::EmptyGraph)));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let (dfg, table) = scenario();
        let engine = TimelineEngine::new(LayoutConfig::default().with_axis_length(-1.0));
        assert!(matches!(engine.layout(&dfg, &table), Err(TimeflowError::Config(_))));
    }

    #[test]
    fn test_close_nodes_are_stacked_into_lanes() {
        let mut builder = DfgBuilder::new();
        builder.add_edge("A", "B", 1).unwrap();
        builder.add_edge("B", "C", 1).unwrap();
        let table = durations(&[("A", 100), ("B", 101), ("C", 1000)]);
        let layout = engine().layout(&builder.build(), &table).unwrap();

        let a = layout.node("A").unwrap();
        let b = layout.node("B").unwrap();
        let c = layout.node("C").unwrap();
        assert_eq!(a.lane(), 0);
        assert_eq!(b.lane(), 1);
        assert_eq!(c.lane(), 0);
        assert!(b.center().y() > a.center().y());
        assert_approx_eq!(f32, b.center().y(), layout.lane_y(1));
    }

    #[test]
    fn test_ties_break_by_frequency_then_name() {
        let mut builder = DfgBuilder::new();
        builder.add_edge("Z", "Y", 1).unwrap();
        builder.add_edge("Z", "B", 10).unwrap();
        builder.add_edge("Y", "A", 1).unwrap();
        let table = durations(&[("Z", 5), ("Y", 5), ("B", 5), ("A", 5)]);
        let layout = engine().layout(&builder.build(), &table).unwrap();

        let order: Vec<_> = layout.nodes().iter().map(PlacedNode::name).collect();
        assert_eq!(order, vec!["Z", "B", "Y", "A"]);
    }

    #[test]
    fn test_all_zero_durations_sit_at_origin() {
        let mut builder = DfgBuilder::new();
        builder.add_edge("A", "B", 1).unwrap();
        let layout = engine()
            .layout(&builder.build(), &durations(&[("A", 0), ("B", 0)]))
            .unwrap();

        for node in layout.nodes() {
            assert_approx_eq!(f32, node.center().x(), layout.axis().origin().x());
        }
        assert_eq!(layout.axis().ticks().len(), 1);
    }

    #[test]
    fn test_self_loop_anchors_on_top() {
        let mut builder = DfgBuilder::new();
        builder.add_edge("A", "A", 3).unwrap();
        let layout = engine().layout(&builder.build(), &DurationTable::new()).unwrap();

        let edge = &layout.edges()[0];
        let node = layout.node("A").unwrap();
        assert!(edge.is_self_loop());
        assert_approx_eq!(f32, edge.from().y(), node.bounds().min_y());
        assert!(edge.from().x() < edge.to().x());
    }

    #[test]
    fn test_edge_anchors_lie_on_borders() {
        let (dfg, table) = scenario();
        let layout = engine().layout(&dfg, &table).unwrap();
        let edge = &layout.edges()[0];
        let (source, target) = layout.endpoints(edge);

        assert_approx_eq!(f32, edge.from().x(), source.bounds().min_x(), epsilon = 0.01);
        assert_approx_eq!(f32, edge.to().x(), target.bounds().max_x(), epsilon = 0.01);
    }

    #[test]
    fn test_marker_emphasis_is_relative() {
        let mut builder = DfgBuilder::new();
        for _ in 0..4 {
            builder.add_start("A").unwrap();
        }
        builder.add_start("B").unwrap();
        builder.add_edge("A", "B", 1).unwrap();
        let layout = engine().layout(&builder.build(), &DurationTable::new()).unwrap();

        let a = layout.node("A").unwrap().start_marker().unwrap();
        let b = layout.node("B").unwrap().start_marker().unwrap();
        assert_approx_eq!(f32, a.emphasis(), 1.0);
        assert_approx_eq!(f32, b.emphasis(), 0.25);
    }

    #[test]
    fn test_ticks_cover_distinct_known_durations() {
        let mut builder = DfgBuilder::new();
        builder.add_edge("A", "B", 1).unwrap();
        builder.add_edge("B", "C", 1).unwrap();
        builder.add_edge("C", "D", 1).unwrap();
        let table = durations(&[("A", 60), ("B", 60), ("C", 3600)]);
        let layout = engine().layout(&builder.build(), &table).unwrap();

        let labels: Vec<_> = layout.axis().ticks().iter().map(AxisTick::label).collect();
        assert_eq!(labels, vec!["0 days 00:01:00", "0 days 01:00:00"]);
    }

    #[test]
    fn test_canvas_contains_every_node() {
        let (dfg, table) = scenario();
        let layout = engine().layout(&dfg, &table).unwrap();
        let canvas = layout.canvas();

        for node in layout.nodes() {
            let bounds = node.bounds();
            assert!(bounds.min_x() >= canvas.min_x() && bounds.max_x() <= canvas.max_x());
            assert!(bounds.min_y() >= canvas.min_y() && bounds.max_y() <= canvas.max_y());
        }
        assert!(layout.axis().origin().y() < canvas.max_y());
    }

    fn graph_strategy() -> impl Strategy<Value = (Dfg, DurationTable)> {
        let names = prop::sample::select(vec!["A", "B", "C", "D", "E", "F", "G"]);
        (
            prop::collection::vec((names.clone(), names.clone(), 1u64..5_000), 1..15),
            prop::collection::vec((names, prop::option::of(0u64..100_000)), 0..10),
        )
            .prop_map(|(edges, entries)| {
                let mut builder = DfgBuilder::new();
                for (source, target, frequency) in edges {
                    builder.add_edge(source, target, frequency).unwrap();
                }
                let table = entries
                    .into_iter()
                    .filter_map(|(name, secs)| Some((name, ActivityDuration::from_secs(secs?))))
                    .collect();
                (builder.build(), table)
            })
    }

    proptest! {
        #[test]
        fn prop_layout_is_deterministic((dfg, table) in graph_strategy()) {
            let first = engine().layout(&dfg, &table).unwrap();
            let second = engine().layout(&dfg, &table).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_coordinates_are_monotonic_in_duration((dfg, table) in graph_strategy()) {
            let layout = engine().layout(&dfg, &table).unwrap();
            for a in layout.nodes() {
                for b in layout.nodes() {
                    if a.resolved_duration() < b.resolved_duration() {
                        prop_assert!(a.center().x() <= b.center().x());
                    }
                }
            }
        }

        #[test]
        fn prop_weights_follow_frequencies((dfg, table) in graph_strategy()) {
            let layout = engine().layout(&dfg, &table).unwrap();
            for e1 in layout.edges() {
                for e2 in layout.edges() {
                    if e1.frequency() < e2.frequency() {
                        prop_assert!(e1.weight() <= e2.weight());
                    }
                }
            }
        }

        #[test]
        fn prop_lane_neighbours_keep_min_separation((dfg, table) in graph_strategy()) {
            let config = LayoutConfig::default();
            let layout = engine().layout(&dfg, &table).unwrap();
            for lane in 0..layout.lane_count() {
                let xs: Vec<f32> = layout
                    .nodes()
                    .iter()
                    .filter(|node| node.lane() == lane)
                    .map(|node| node.center().x())
                    .collect();
                for pair in xs.windows(2) {
                    prop_assert!(pair[1] - pair[0] >= config.min_separation());
                }
            }
        }
    }
}
