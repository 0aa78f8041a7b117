//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A message attached to a span of the input.
///
/// Primary labels mark the offending field; secondary labels give context,
/// such as the whole line the field belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub(crate) fn offset_by(&self, offset: usize) -> Self {
        Self {
            span: self.span.offset_by(offset),
            message: self.message.clone(),
            is_primary: self.is_primary,
        }
    }
}
