//! The diagnostic type reported for malformed input lines.

use std::fmt;

use crate::{
    error::{error_code::ErrorCode, label::Label},
    span::Span,
};

/// An error message with source location information.
///
/// # Example
///
/// ```text
/// error[E101]: line 2: invalid frequency `five`
///    ╭─[connections.txt:2:5]
///  2 │ A,B,five
///    ·     ──┬─
///    ·       ╰── expected a positive integer
///    ╰────
///   help: the third field counts how often the target directly followed the source
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use timeflow_parser::error::{Diagnostic, ErrorCode};
    /// # use timeflow_parser::Span;
    ///
    /// let diag = Diagnostic::error("invalid duration `soon`")
    ///     .with_code(ErrorCode::E201)
    ///     .with_label(Span::new(4..8), "not a duration");
    /// assert_eq!(diag.to_string(), "error[E201]: invalid duration `soon`");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Moves every label right by `offset` bytes.
    ///
    /// Used when a diagnostic produced for a single line is reported against
    /// the whole file.
    pub(crate) fn offset_labels(mut self, offset: usize) -> Self {
        for label in &mut self.labels {
            *label = label.offset_by(offset);
        }
        self
    }

    /// Prefixes the message, typically with a line number.
    pub(crate) fn with_message_prefix(mut self, prefix: &str) -> Self {
        self.message = format!("{prefix}{}", self.message);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error")?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}
