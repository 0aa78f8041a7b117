//! Error types for timeflow operations.
//!
//! [`TimeflowError`] is returned by every fallible operation of the
//! [`TimelineBuilder`](crate::TimelineBuilder) and the layout engine.

use std::{io, path::PathBuf};

use thiserror::Error;

use timeflow_core::dfg::ModelError;
use timeflow_parser::error::ParseError;

/// The main error type for timeflow operations.
///
/// # Diagnostic Variants
///
/// The `Malformed*` variants keep the parsed source text and, when known, the
/// file it was read from, so callers can render the labeled spans of each
/// [`Diagnostic`](timeflow_parser::error::Diagnostic) against the original
/// input.
#[derive(Debug, Error)]
pub enum TimeflowError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed connections file: {err}")]
    MalformedLine {
        err: ParseError,
        src: String,
        path: Option<PathBuf>,
    },

    #[error("malformed duration file: {err}")]
    MalformedDuration {
        err: ParseError,
        src: String,
        path: Option<PathBuf>,
    },

    #[error("malformed event log: {err}")]
    MalformedLog {
        err: ParseError,
        src: String,
        path: Option<PathBuf>,
    },

    #[error("edge references unknown activity {0}")]
    UnknownActivity(String),

    #[error("nothing to render: the graph has no activities")]
    EmptyGraph,

    #[error("invalid graph: {0}")]
    Model(#[from] ModelError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("export error: {0}")]
    Export(#[from] crate::export::Error),
}

impl TimeflowError {
    /// Returns the parse error, source text and path of a `Malformed*` error.
    pub fn parse_details(&self) -> Option<(&ParseError, &str, Option<&PathBuf>)> {
        match self {
            Self::MalformedLine { err, src, path }
            | Self::MalformedDuration { err, src, path }
            | Self::MalformedLog { err, src, path } => Some((err, src, path.as_ref())),
            _ => None,
        }
    }

    /// Attaches the file a `Malformed*` error was read from.
    ///
    /// Other variants are returned unchanged.
    pub fn with_path(mut self, new_path: impl Into<PathBuf>) -> Self {
        if let Self::MalformedLine { path, .. }
        | Self::MalformedDuration { path, .. }
        | Self::MalformedLog { path, .. } = &mut self
        {
            *path = Some(new_path.into());
        }
        self
    }
}
