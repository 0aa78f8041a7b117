//! Accumulates diagnostics while a whole input file is parsed.
//!
//! Parsers keep going after a malformed line so that every problem in a file
//! is reported at once; the file is still rejected as a whole.

use crate::error::{Diagnostic, ParseError};

#[derive(Debug, Default)]
pub(crate) struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Returns `Ok(())` when nothing was emitted.
    pub(crate) fn finish(self) -> Result<(), ParseError> {
        if self.diagnostics.is_empty() {
            Ok(())
        } else {
            Err(ParseError::new(self.diagnostics))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_collector_finishes_ok() {
        assert!(DiagnosticCollector::new().finish().is_ok());
    }

    #[test]
    fn test_collector_keeps_all_diagnostics() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::error("one"));
        collector.emit(Diagnostic::error("two"));

        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
    }
}
