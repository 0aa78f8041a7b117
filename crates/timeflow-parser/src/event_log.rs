//! Reader for raw event logs.
//!
//! A raw log is a text file with one event per line:
//!
//! ```text
//! case_id,activity
//! 1,Submit
//! 1,Approve
//! 2,Submit
//! ```
//!
//! Blank lines and lines starting with `#` are skipped, as is a header on
//! the first significant line. Fields beyond the second (timestamps,
//! resources) are ignored. Events keep file order within their case and
//! cases are ordered by first appearance.

use indexmap::IndexMap;
use log::debug;

use timeflow_core::event_log::{EventLog, Trace};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    lines::source_lines,
    span::Span,
};

const HEADERS: [(&str, &str); 3] = [
    ("case", "activity"),
    ("case_id", "activity"),
    ("case:concept:name", "concept:name"),
];

/// Parses a raw event log into traces.
///
/// # Errors
///
/// Returns a [`ParseError`] with an [`ErrorCode::E300`] diagnostic for every
/// record that lacks a case identifier or an activity.
pub fn parse_event_log(src: &str) -> Result<EventLog, ParseError> {
    let mut traces: IndexMap<&str, Trace> = IndexMap::new();
    let mut collector = DiagnosticCollector::new();
    let mut first_record = true;

    for line in source_lines(src) {
        if line.text.is_empty() || line.text.starts_with('#') {
            continue;
        }

        let mut fields = line.text.splitn(3, ',').map(str::trim);
        let case_id = fields.next().unwrap_or_default();
        let activity = fields.next().unwrap_or_default();

        if std::mem::take(&mut first_record) && is_header(case_id, activity) {
            continue;
        }

        if case_id.is_empty() || activity.is_empty() {
            collector.emit(
                Diagnostic::error("expected `<case_id>,<activity>`")
                    .with_code(ErrorCode::E300)
                    .with_label(Span::new(0..line.text.len()), "malformed event")
                    .with_help("each event needs a case identifier and an activity name")
                    .offset_labels(line.offset)
                    .with_message_prefix(&line.prefix()),
            );
            continue;
        }

        traces
            .entry(case_id)
            .or_insert_with(|| Trace::new(case_id))
            .push(activity);
    }
    collector.finish()?;

    let log = EventLog::new(traces.into_values().collect());
    debug!(cases = log.traces().len(), events = log.event_count(); "Event log parsed");
    Ok(log)
}

fn is_header(case_id: &str, activity: &str) -> bool {
    HEADERS.iter().any(|(case_header, activity_header)| {
        case_id.eq_ignore_ascii_case(case_header) && activity.eq_ignore_ascii_case(activity_header)
    })
}
