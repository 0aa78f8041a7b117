//! Error codes for the timeflow diagnostic system.
//!
//! Error codes are organized by input file:
//! - `E1xx` - Connections file (malformed lines)
//! - `E2xx` - Duration file (malformed durations)
//! - `E3xx` - Event log

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Connections file (E1xx)
    // =========================================================================
    /// Malformed connections line.
    ///
    /// A line is neither `Start:<name>`, `End:<name>` nor exactly three
    /// comma-separated fields `<source>,<target>,<frequency>`.
    E100,

    /// Invalid frequency.
    ///
    /// The third field of an edge line is not a positive integer.
    E101,

    /// Missing activity name.
    ///
    /// A `Start:`/`End:` directive or an edge endpoint is empty.
    E102,

    // =========================================================================
    // Duration file (E2xx)
    // =========================================================================
    /// Malformed duration entry.
    ///
    /// A line containing `|` does not have a non-empty name on the left and
    /// a non-empty duration on the right.
    E200,

    /// Invalid duration.
    ///
    /// The duration text is not in a recognized form such as `HH:MM:SS`,
    /// `2 days 01:00:00` or `1h30m`.
    E201,

    // =========================================================================
    // Event log (E3xx)
    // =========================================================================
    /// Malformed event record.
    ///
    /// A record lacks a case identifier or an activity name.
    E300,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E100").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E300 => "E300",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "malformed connections line",
            ErrorCode::E101 => "invalid frequency",
            ErrorCode::E102 => "missing activity name",
            ErrorCode::E200 => "malformed duration entry",
            ErrorCode::E201 => "invalid duration",
            ErrorCode::E300 => "malformed event record",
        }
    }

    /// Returns true for codes raised by the connections parser.
    pub fn is_connections_error(&self) -> bool {
        matches!(self, ErrorCode::E100 | ErrorCode::E101 | ErrorCode::E102)
    }

    /// Returns true for codes raised by the duration parser.
    pub fn is_duration_error(&self) -> bool {
        matches!(self, ErrorCode::E200 | ErrorCode::E201)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
