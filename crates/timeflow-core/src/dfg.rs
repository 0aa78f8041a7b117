//! The directly-follows graph model.
//!
//! A [`Dfg`] is built once through a [`DfgBuilder`] and is immutable
//! afterwards. The builder registers every activity name it sees (edge
//! endpoints, start and end activities) in an [`ActivityRegistry`] so the
//! set of activities is explicit before layout starts.
//!
//! # Duplicate edges
//!
//! Adding the same ordered `(source, target)` pair twice does not aggregate
//! frequencies: the last frequency replaces the earlier one and the edge keeps
//! the position of its first insertion.
//!
//! # Example
//!
//! ```
//! use timeflow_core::dfg::DfgBuilder;
//!
//! let mut builder = DfgBuilder::new();
//! builder.add_start("A").unwrap();
//! builder.add_edge("A", "B", 5).unwrap();
//! builder.add_edge("B", "C", 3).unwrap();
//! builder.add_end("C").unwrap();
//!
//! let dfg = builder.build();
//! assert_eq!(dfg.activity_count(), 3);
//! assert_eq!(dfg.frequency("A", "B"), Some(5));
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::trace;
use thiserror::Error;

use crate::identifier::{ActivityId, ActivityRegistry};

/// Errors raised while assembling a [`Dfg`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("edge `{from}` -> `{to}` has frequency 0; frequencies must be at least 1")]
    ZeroFrequency { from: String, to: String },

    #[error("activity names must not be empty")]
    EmptyName,
}

/// A directly-follows edge with its observed frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    source: ActivityId,
    target: ActivityId,
    frequency: u64,
}

impl Edge {
    pub fn source(&self) -> ActivityId {
        self.source
    }

    pub fn target(&self) -> ActivityId {
        self.target
    }

    /// Number of times `target` directly followed `source`. Always at least 1.
    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    /// Returns true when the edge starts and ends at the same activity.
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Immutable directly-follows graph.
///
/// Two graphs compare equal when they have the same named edges with the
/// same frequencies and the same start/end counts, regardless of the order in
/// which activities were registered.
#[derive(Debug, Clone, Default)]
pub struct Dfg {
    registry: ActivityRegistry,
    edges: Vec<Edge>,
    start: BTreeMap<ActivityId, u32>,
    end: BTreeMap<ActivityId, u32>,
}

impl Dfg {
    /// The registry of every activity referenced by the graph.
    pub fn registry(&self) -> &ActivityRegistry {
        &self.registry
    }

    /// Resolves an activity id to its name.
    pub fn name(&self, id: ActivityId) -> Option<&str> {
        self.registry.name(id)
    }

    pub fn activity_count(&self) -> usize {
        self.registry.len()
    }

    /// Returns true when the graph references no activity at all.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Edges in first-insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Start activities with their occurrence counts, in registration order.
    pub fn start_activities(&self) -> impl Iterator<Item = (ActivityId, u32)> + '_ {
        self.start.iter().map(|(id, count)| (*id, *count))
    }

    /// End activities with their occurrence counts, in registration order.
    pub fn end_activities(&self) -> impl Iterator<Item = (ActivityId, u32)> + '_ {
        self.end.iter().map(|(id, count)| (*id, *count))
    }

    pub fn start_count(&self, id: ActivityId) -> u32 {
        self.start.get(&id).copied().unwrap_or(0)
    }

    pub fn end_count(&self, id: ActivityId) -> u32 {
        self.end.get(&id).copied().unwrap_or(0)
    }

    /// Sum of the frequencies of all incoming and outgoing edges of `id`.
    ///
    /// A self loop contributes its frequency twice. Saturates at `u64::MAX`.
    pub fn total_frequency(&self, id: ActivityId) -> u64 {
        self.edges.iter().fold(0u64, |total, edge| {
            let mut total = total;
            if edge.source == id {
                total = total.saturating_add(edge.frequency);
            }
            if edge.target == id {
                total = total.saturating_add(edge.frequency);
            }
            total
        })
    }

    /// Looks up the frequency of the edge between two named activities.
    pub fn frequency(&self, source: &str, target: &str) -> Option<u64> {
        let source = self.registry.lookup(source)?;
        let target = self.registry.lookup(target)?;
        self.edges
            .iter()
            .find(|edge| edge.source == source && edge.target == target)
            .map(Edge::frequency)
    }
}

type NamedView<'a> = (
    BTreeSet<(&'a str, &'a str, u64)>,
    BTreeMap<&'a str, u32>,
    BTreeMap<&'a str, u32>,
);

impl Dfg {
    fn named_view(&self) -> NamedView<'_> {
        let name = |id: ActivityId| self.registry.name(id).unwrap_or_default();
        let edges = self
            .edges
            .iter()
            .map(|edge| (name(edge.source), name(edge.target), edge.frequency))
            .collect();
        let start = self.start.iter().map(|(id, n)| (name(*id), *n)).collect();
        let end = self.end.iter().map(|(id, n)| (name(*id), *n)).collect();
        (edges, start, end)
    }
}

impl PartialEq for Dfg {
    fn eq(&self, other: &Self) -> bool {
        self.named_view() == other.named_view()
    }
}

impl Eq for Dfg {}

/// Incremental builder for a [`Dfg`].
#[derive(Debug, Default)]
pub struct DfgBuilder {
    registry: ActivityRegistry,
    edges: Vec<Edge>,
    edge_index: HashMap<(ActivityId, ActivityId), usize>,
    start: BTreeMap<ActivityId, u32>,
    end: BTreeMap<ActivityId, u32>,
}

impl DfgBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the edge `source -> target`, replacing the frequency of an
    /// existing edge between the same ordered pair.
    ///
    /// Returns the replaced frequency, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ZeroFrequency`] when `frequency` is 0 and
    /// [`ModelError::EmptyName`] when either name is empty.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        frequency: u64,
    ) -> Result<Option<u64>, ModelError> {
        if frequency == 0 {
            return Err(ModelError::ZeroFrequency {
                from: source.to_string(),
                to: target.to_string(),
            });
        }
        let source_id = self.register(source)?;
        let target_id = self.register(target)?;

        let key = (source_id, target_id);
        if let Some(&index) = self.edge_index.get(&key) {
            let edge = &mut self.edges[index];
            let previous = edge.frequency;
            edge.frequency = frequency;
            trace!(source, target, previous, frequency; "Edge frequency overwritten");
            return Ok(Some(previous));
        }

        self.edge_index.insert(key, self.edges.len());
        self.edges.push(Edge {
            source: source_id,
            target: target_id,
            frequency,
        });
        Ok(None)
    }

    /// Counts one more occurrence of `name` as a start activity and returns
    /// the new count.
    pub fn add_start(&mut self, name: &str) -> Result<u32, ModelError> {
        let id = self.register(name)?;
        let count = self.start.entry(id).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    /// Counts one more occurrence of `name` as an end activity and returns
    /// the new count.
    pub fn add_end(&mut self, name: &str) -> Result<u32, ModelError> {
        let id = self.register(name)?;
        let count = self.end.entry(id).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    /// Finishes the graph.
    pub fn build(self) -> Dfg {
        Dfg {
            registry: self.registry,
            edges: self.edges,
            start: self.start,
            end: self.end,
        }
    }

    fn register(&mut self, name: &str) -> Result<ActivityId, ModelError> {
        if name.is_empty() {
            return Err(ModelError::EmptyName);
        }
        Ok(self.registry.register(name))
    }
}
