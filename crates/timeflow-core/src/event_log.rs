//! In-memory event log grouped into traces.
//!
//! An [`EventLog`] is the input of [`discover`](crate::discovery::discover).
//! Each [`Trace`] is the ordered sequence of activities executed for one case.

/// Ordered activities of a single case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    case_id: String,
    activities: Vec<String>,
}

impl Trace {
    pub fn new(case_id: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            activities: Vec::new(),
        }
    }

    /// Appends an activity to the end of the trace.
    pub fn push(&mut self, activity: impl Into<String>) {
        self.activities.push(activity.into());
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    pub fn activities(&self) -> &[String] {
        &self.activities
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

/// A collection of traces, in order of first appearance of each case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    traces: Vec<Trace>,
}

impl EventLog {
    pub fn new(traces: Vec<Trace>) -> Self {
        Self { traces }
    }

    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    /// Total number of events across all traces.
    pub fn event_count(&self) -> usize {
        self.traces.iter().map(|trace| trace.activities.len()).sum()
    }
}
