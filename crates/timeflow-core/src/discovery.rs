//! Directly-follows graph discovery over an event log.
//!
//! For every trace the first activity counts as a start, the last as an end,
//! and each consecutive pair `(a, b)` adds one to the frequency of edge
//! `a -> b`.

use std::collections::HashMap;

use log::debug;

use crate::{
    dfg::{Dfg, DfgBuilder, ModelError},
    event_log::EventLog,
};

/// Discovers the directly-follows graph of `log`.
///
/// Empty traces are skipped.
///
/// # Errors
///
/// Returns [`ModelError::EmptyName`] when the log contains an empty activity
/// name.
///
/// # Example
///
/// ```
/// use timeflow_core::{discovery::discover, event_log::{EventLog, Trace}};
///
/// let mut first = Trace::new("1");
/// first.push("A");
/// first.push("B");
/// let mut second = Trace::new("2");
/// second.push("A");
/// second.push("B");
///
/// let dfg = discover(&EventLog::new(vec![first, second])).unwrap();
/// assert_eq!(dfg.frequency("A", "B"), Some(2));
/// ```
pub fn discover(log: &EventLog) -> Result<Dfg, ModelError> {
    let mut counts: Vec<((&str, &str), u64)> = Vec::new();
    let mut positions: HashMap<(&str, &str), usize> = HashMap::new();
    let mut builder = DfgBuilder::new();

    for trace in log.traces().iter().filter(|trace| !trace.is_empty()) {
        let activities = trace.activities();

        if let Some(first) = activities.first() {
            builder.add_start(first)?;
        }
        if let Some(last) = activities.last() {
            builder.add_end(last)?;
        }

        for pair in activities.windows(2) {
            let key = (pair[0].as_str(), pair[1].as_str());
            match positions.get(&key) {
                Some(&index) => counts[index].1 += 1,
                None => {
                    positions.insert(key, counts.len());
                    counts.push((key, 1));
                }
            }
        }
    }

    for ((source, target), frequency) in counts {
        builder.add_edge(source, target, frequency)?;
    }

    let dfg = builder.build();
    debug!(
        traces = log.traces().len(),
        activities = dfg.activity_count(),
        edges = dfg.edges().len();
        "Discovered directly-follows graph"
    );
    Ok(dfg)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::event_log::Trace;

    fn trace(case: &str, activities: &[&str]) -> Trace {
        let mut trace = Trace::new(case);
        for activity in activities {
            trace.push(*activity);
        }
        trace
    }

    #[test]
    fn test_discover_counts_pairs_and_terminals() {
        let log = EventLog::new(vec![
            trace("1", &["A", "B", "C"]),
            trace("2", &["A", "C"]),
            trace("3", &["A", "B", "C"]),
        ]);
        let dfg = discover(&log).unwrap();

        assert_eq!(dfg.frequency("A", "B"), Some(2));
        assert_eq!(dfg.frequency("B", "C"), Some(2));
        assert_eq!(dfg.frequency("A", "C"), Some(1));

        let a = dfg.registry().lookup("A").unwrap();
        let c = dfg.registry().lookup("C").unwrap();
        assert_eq!(dfg.start_count(a), 3);
        assert_eq!(dfg.end_count(c), 3);
    }

    #[test]
    fn test_single_event_trace_is_start_and_end() {
        let log = EventLog::new(vec![trace("1", &["Only"])]);
        let dfg = discover(&log).unwrap();

        let only = dfg.registry().lookup("Only").unwrap();
        assert!(dfg.edges().is_empty());
        assert_eq!(dfg.start_count(only), 1);
        assert_eq!(dfg.end_count(only), 1);
    }

    #[test]
    fn test_repeated_activity_forms_self_loop() {
        let log = EventLog::new(vec![trace("1", &["A", "A", "A"])]);
        let dfg = discover(&log).unwrap();

        assert_eq!(dfg.frequency("A", "A"), Some(2));
    }

    #[test]
    fn test_empty_log_yields_empty_graph() {
        let dfg = discover(&EventLog::default()).unwrap();
        assert!(dfg.is_empty());
    }

    proptest! {
        #[test]
        fn prop_frequencies_account_for_every_transition(
            traces in prop::collection::vec(
                prop::collection::vec(prop::sample::select(vec!["A", "B", "C", "D"]), 0..8),
                0..10,
            )
        ) {
            let log = EventLog::new(
                traces
                    .iter()
                    .enumerate()
                    .map(|(case, activities)| trace(&case.to_string(), activities))
                    .collect(),
            );
            let dfg = discover(&log).unwrap();

            let transitions: usize = traces.iter().map(|t| t.len().saturating_sub(1)).sum();
            let counted: u64 = dfg.edges().iter().map(|edge| edge.frequency()).sum();
            prop_assert_eq!(counted, transitions as u64);

            let non_empty = traces.iter().filter(|t| !t.is_empty()).count() as u32;
            let starts: u32 = dfg.start_activities().map(|(_, count)| count).sum();
            let ends: u32 = dfg.end_activities().map(|(_, count)| count).sum();
            prop_assert_eq!(starts, non_empty);
            prop_assert_eq!(ends, non_empty);
        }
    }
}
