//! Byte ranges into parsed source text.

use std::ops::Range;

/// A half-open byte range `start..end` into a source string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create a new span from a byte range.
    pub fn new(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end.max(range.start),
        }
    }

    /// Get the start offset of the span
    pub fn start(&self) -> usize {
        self.start
    }

    /// Get the end offset of the span
    pub fn end(&self) -> usize {
        self.end
    }

    /// Get the length of the span
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Shifts the span right by `offset` bytes.
    pub fn offset_by(&self, offset: usize) -> Span {
        Span::new(self.start + offset..self.end + offset)
    }

    /// Returns the byte range covered by the span.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}
