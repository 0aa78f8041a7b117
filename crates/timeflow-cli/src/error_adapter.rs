//! Error adapter for converting [`TimeflowError`] into miette reports.
//!
//! Parse errors carry every malformed line of a file; each diagnostic is
//! rendered as its own report against the named source file.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, NamedSource, SourceSpan};

use timeflow::TimeflowError;
use timeflow_parser::{Span, error::Diagnostic};

/// Adapter for a single parser diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    source: NamedSource<String>,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Wraps `diag`, naming its source text `name`.
    pub fn new(diag: &'a Diagnostic, name: impl AsRef<str>, src: &str) -> Self {
        Self {
            diag,
            source: NamedSource::new(name, src.to_string()),
        }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .field("source", &self.source.name())
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|code| Box::new(code) as Box<dyn fmt::Display>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|help| Box::new(help) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.source as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = span_to_miette(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Adapter for [`TimeflowError`] variants without source spans.
pub struct ErrorAdapter<'a>(pub &'a TimeflowError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            TimeflowError::Io(_) => "timeflow::io",
            TimeflowError::MalformedLine { .. } => "timeflow::connections",
            TimeflowError::MalformedDuration { .. } => "timeflow::durations",
            TimeflowError::MalformedLog { .. } => "timeflow::log",
            TimeflowError::UnknownActivity(_) => "timeflow::unknown_activity",
            TimeflowError::EmptyGraph => "timeflow::empty_graph",
            TimeflowError::Model(_) => "timeflow::model",
            TimeflowError::Config(_) => "timeflow::config",
            TimeflowError::Export(_) => "timeflow::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            TimeflowError::EmptyGraph => {
                "the connections file must contain at least one edge or Start:/End: line"
            }
            TimeflowError::Export(timeflow::export::Error::Unsupported(_)) => {
                "rebuild with the `graphviz` feature or pass `--format svg`"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A diagnostic with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// An error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

fn span_to_miette(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Converts a [`TimeflowError`] into one reportable per diagnostic.
///
/// Parse errors without a file path are named after the input kind.
pub fn to_reportables(err: &TimeflowError) -> Vec<Reportable<'_>> {
    let Some((parse_err, src, path)) = err.parse_details() else {
        return vec![Reportable::Error(ErrorAdapter(err))];
    };

    let name = match (path, err) {
        (Some(path), _) => path.display().to_string(),
        (None, TimeflowError::MalformedDuration { .. }) => "<durations>".to_string(),
        (None, TimeflowError::MalformedLog { .. }) => "<event log>".to_string(),
        (None, _) => "<connections>".to_string(),
    };

    parse_err
        .diagnostics()
        .iter()
        .map(|diag| Reportable::Diagnostic(DiagnosticAdapter::new(diag, &name, src)))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use timeflow_parser::error::{ErrorCode, ParseError};

    use super::*;

    fn malformed_line(diagnostics: Vec<Diagnostic>, path: Option<PathBuf>) -> TimeflowError {
        TimeflowError::MalformedLine {
            err: ParseError::new(diagnostics),
            src: "A,B\nC,D,x\n".to_string(),
            path,
        }
    }

    #[test]
    fn test_one_reportable_per_diagnostic() {
        let err = malformed_line(
            vec![
                Diagnostic::error("line 1: expected 3 fields")
                    .with_code(ErrorCode::E100)
                    .with_label(Span::new(0..3), "found 2 fields"),
                Diagnostic::error("line 2: invalid frequency")
                    .with_code(ErrorCode::E101)
                    .with_label(Span::new(8..9), "not a positive integer")
                    .with_help("frequencies are whole numbers of at least 1"),
            ],
            Some(PathBuf::from("conn.txt")),
        );

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 2);
        assert_eq!(reportables[0].to_string(), "line 1: expected 3 fields");
        assert_eq!(reportables[1].code().unwrap().to_string(), "E101");
        assert!(reportables[1].help().is_some());
    }

    #[test]
    fn test_source_is_named_after_path() {
        let err = malformed_line(
            vec![Diagnostic::error("bad").with_label(Span::new(0..3), "here")],
            Some(PathBuf::from("conn.txt")),
        );

        let reportables = to_reportables(&err);
        let Reportable::Diagnostic(adapter) = &reportables[0] else {
            panic!("expected a diagnostic");
        };
        assert_eq!(adapter.source.name(), "conn.txt");
    }

    #[test]
    fn test_unnamed_source_falls_back_to_kind() {
        let err = malformed_line(vec![Diagnostic::error("bad")], None);

        let reportables = to_reportables(&err);
        let Reportable::Diagnostic(adapter) = &reportables[0] else {
            panic!("expected a diagnostic");
        };
        assert_eq!(adapter.source.name(), "<connections>");
        assert!(adapter.labels().is_none());
    }

    #[test]
    fn test_labels_keep_primary_flag() {
        let diag = Diagnostic::error("bad frequency")
            .with_label(Span::new(6..7), "here")
            .with_secondary_label(Span::new(4..9), "in this edge");
        let adapter = DiagnosticAdapter::new(&diag, "conn.txt", "A,B\nC,D,x\n");

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
        assert_eq!(labels[1].label(), Some("in this edge"));
    }

    #[test]
    fn test_non_parse_error() {
        let err = TimeflowError::EmptyGraph;

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        assert_eq!(
            reportables[0].code().unwrap().to_string(),
            "timeflow::empty_graph"
        );
        assert!(reportables[0].help().is_some());
    }
}
