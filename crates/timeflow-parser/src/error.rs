//! Error and diagnostic system for the timeflow parsers.
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error with an optional [`ErrorCode`], labeled source
//! locations and help text. Every malformed line of an input file produces one
//! diagnostic; all of them are returned together in a [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use timeflow_parser::error::{Diagnostic, ErrorCode};
//! # use timeflow_parser::Span;
//!
//! let diag = Diagnostic::error("line 3: expected `<source>,<target>,<frequency>`")
//!     .with_code(ErrorCode::E100)
//!     .with_label(Span::new(12..15), "found 2 fields")
//!     .with_help("add the missing frequency");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
