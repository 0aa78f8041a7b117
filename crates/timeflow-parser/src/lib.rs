//! Parsers for timeflow input files.
//!
//! - [`parse_connections`] reads a directly-follows graph from a connections
//!   file, and [`write_connections`] writes one back.
//! - [`parse_durations`] reads a duration table; [`parse_duration`] parses a
//!   single duration string.
//! - [`parse_event_log`] reads a raw `case_id,activity` event log.
//!
//! Every parser reports all malformed lines of a file at once through a
//! [`ParseError`](error::ParseError) made of labeled
//! [`Diagnostic`](error::Diagnostic)s whose spans are byte offsets into the
//! parsed source.

mod connections;
mod durations;
pub mod error;
mod event_log;
mod lines;
mod span;

pub use connections::{parse_connections, write_connections};
pub use durations::{parse_duration, parse_durations};
pub use event_log::parse_event_log;
pub use span::Span;
