//! Reader and writer for DFG connections files.
//!
//! Every line of a connections file is one directive:
//!
//! ```text
//! Start:<activity>
//! End:<activity>
//! <source>,<target>,<frequency>
//! ```
//!
//! Lines are trimmed before matching. Names are taken verbatim otherwise,
//! so `Start:A:B` names the activity `A:B`. Unlike duration files there are
//! no ignorable lines: a blank line or any other shape is an error.

use std::fmt::Write as _;

use log::{debug, warn};

use timeflow_core::dfg::{Dfg, DfgBuilder, ModelError};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    lines::{SourceLine, source_lines},
    span::Span,
};

const START_PREFIX: &str = "Start:";
const END_PREFIX: &str = "End:";

/// Parses a connections file into a [`Dfg`].
///
/// All malformed lines are reported together. Repeating an edge line
/// replaces the earlier frequency.
///
/// # Errors
///
/// Returns a [`ParseError`] with one diagnostic per malformed line:
/// [`ErrorCode::E100`] for a wrong shape, [`ErrorCode::E101`] for a
/// frequency that is not a positive integer and [`ErrorCode::E102`] for an
/// empty activity name.
///
/// # Example
///
/// ```
/// let dfg = timeflow_parser::parse_connections("Start:A\nA,B,5\nEnd:B\n").unwrap();
/// assert_eq!(dfg.frequency("A", "B"), Some(5));
///
/// assert!(timeflow_parser::parse_connections("X,Y\n").is_err());
/// ```
pub fn parse_connections(src: &str) -> Result<Dfg, ParseError> {
    let mut builder = DfgBuilder::new();
    let mut collector = DiagnosticCollector::new();

    for line in source_lines(src) {
        if let Err(diag) = parse_directive(&line, &mut builder) {
            collector.emit(
                diag.offset_labels(line.offset)
                    .with_message_prefix(&line.prefix()),
            );
        }
    }
    collector.finish()?;

    let dfg = builder.build();
    debug!(
        activities = dfg.activity_count(),
        edges = dfg.edges().len();
        "Connections parsed"
    );
    Ok(dfg)
}

fn parse_directive(line: &SourceLine<'_>, builder: &mut DfgBuilder) -> Result<(), Diagnostic> {
    let text = line.text;

    if let Some(name) = text.strip_prefix(START_PREFIX) {
        let name = terminal_name(text, START_PREFIX, name)?;
        builder.add_start(name).map_err(|err| model_error(err, text))?;
        return Ok(());
    }
    if let Some(name) = text.strip_prefix(END_PREFIX) {
        let name = terminal_name(text, END_PREFIX, name)?;
        builder.add_end(name).map_err(|err| model_error(err, text))?;
        return Ok(());
    }

    parse_edge(line, builder)
}

fn terminal_name<'a>(text: &str, prefix: &str, name: &'a str) -> Result<&'a str, Diagnostic> {
    if name.is_empty() {
        return Err(Diagnostic::error(format!("`{prefix}` directive without an activity name"))
            .with_code(ErrorCode::E102)
            .with_label(Span::new(0..text.len()), "missing name")
            .with_help(format!("write `{prefix}<activity>`")));
    }
    Ok(name)
}

fn parse_edge(line: &SourceLine<'_>, builder: &mut DfgBuilder) -> Result<(), Diagnostic> {
    let text = line.text;
    let whole = Span::new(0..text.len());

    if text.is_empty() {
        return Err(Diagnostic::error("empty line")
            .with_code(ErrorCode::E100)
            .with_label(whole, "expected a directive")
            .with_help("every line must be `Start:<name>`, `End:<name>` or `<source>,<target>,<frequency>`"));
    }

    let mut fields = Vec::with_capacity(3);
    let mut start = 0;
    for field in text.split(',') {
        fields.push((Span::new(start..start + field.len()), field));
        start += field.len() + 1;
    }

    let [(source_span, source), (target_span, target), (freq_span, freq)] = fields[..] else {
        return Err(Diagnostic::error(format!(
            "expected `<source>,<target>,<frequency>`, found {} field{}",
            fields.len(),
            if fields.len() == 1 { "" } else { "s" },
        ))
        .with_code(ErrorCode::E100)
        .with_label(whole, "malformed line")
        .with_help("edge lines have exactly three comma-separated fields"));
    };

    for (span, name) in [(source_span, source), (target_span, target)] {
        if name.is_empty() {
            return Err(Diagnostic::error("edge with an empty activity name")
                .with_code(ErrorCode::E102)
                .with_label(span, "missing name")
                .with_secondary_label(whole, "in this edge"));
        }
        if name.trim() != name {
            warn!(line = line.number, name; "Activity name has surrounding whitespace");
        }
    }

    let digits = freq.trim();
    let parsed = digits.parse::<u64>();
    let overflow =
        parsed.is_err() && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit());
    let frequency = parsed
        .ok()
        .filter(|frequency| *frequency > 0)
        .ok_or_else(|| {
            if overflow {
                Diagnostic::error(format!("frequency `{digits}` is out of range"))
                    .with_code(ErrorCode::E101)
                    .with_label(freq_span, "too large")
                    .with_help(format!("frequencies are at most {}", u64::MAX))
            } else {
                Diagnostic::error(format!("invalid frequency `{freq}`"))
                    .with_code(ErrorCode::E101)
                    .with_label(freq_span, "expected a positive integer")
                    .with_help(
                        "the third field counts how often the target directly followed the source",
                    )
            }
        })?;

    let replaced = builder
        .add_edge(source, target, frequency)
        .map_err(|err| model_error(err, text))?;
    if let Some(previous) = replaced {
        warn!(
            line = line.number,
            source,
            target,
            previous,
            frequency;
            "Duplicate edge, keeping the last frequency"
        );
    }
    Ok(())
}

fn model_error(err: ModelError, text: &str) -> Diagnostic {
    let code = match err {
        ModelError::ZeroFrequency { .. } => ErrorCode::E101,
        ModelError::EmptyName => ErrorCode::E102,
    };
    Diagnostic::error(err.to_string())
        .with_code(code)
        .with_label(Span::new(0..text.len()), "rejected here")
}

/// Serializes a [`Dfg`] back into connections file syntax.
///
/// Edges come first in insertion order, followed by one `Start:` line per
/// start occurrence and one `End:` line per end occurrence. Parsing the
/// output yields a graph equal to `dfg`.
pub fn write_connections(dfg: &Dfg) -> String {
    let mut out = String::new();
    let name = |id| dfg.name(id).unwrap_or_default();

    for edge in dfg.edges() {
        let _ = writeln!(
            out,
            "{},{},{}",
            name(edge.source()),
            name(edge.target()),
            edge.frequency()
        );
    }
    for (id, count) in dfg.start_activities() {
        for _ in 0..count {
            let _ = writeln!(out, "{START_PREFIX}{}", name(id));
        }
    }
    for (id, count) in dfg.end_activities() {
        for _ in 0..count {
            let _ = writeln!(out, "{END_PREFIX}{}", name(id));
        }
    }
    out
}
