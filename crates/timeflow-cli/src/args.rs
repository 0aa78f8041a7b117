//! Command-line argument definitions for the timeflow CLI.
//!
//! Three positionals render one timeline. A fourth positional, a raw event
//! log, switches to compare mode: the graph discovered from the log and the
//! graph from the connections file are rendered side by side as
//! `<output>_old.<ext>` and `<output>_new.<ext>`.

use clap::Parser;

/// Command-line arguments for the timeflow renderer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Output file, or output prefix in compare mode
    pub output: String,

    /// Connections file (`Start:`/`End:` directives and `source,target,frequency` edges)
    pub connections: String,

    /// Duration file (`activity | duration` entries)
    pub durations: String,

    /// Raw `case_id,activity` event log; enables compare mode
    pub log: Option<String>,

    /// Output format (png, svg, dot); overrides the configuration file
    #[arg(short, long)]
    pub format: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Returns true when an event log was given.
    pub fn is_compare(&self) -> bool {
        self.log.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_mode() {
        let args = Args::parse_from(["timeflow", "out.png", "conn.txt", "dur.txt"]);
        assert_eq!(args.output, "out.png");
        assert!(!args.is_compare());
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_compare_mode_with_options() {
        let args = Args::parse_from([
            "timeflow", "--format", "svg", "cmp", "conn.txt", "dur.txt", "log.csv",
        ]);
        assert!(args.is_compare());
        assert_eq!(args.log.as_deref(), Some("log.csv"));
        assert_eq!(args.format.as_deref(), Some("svg"));
    }

    #[test]
    fn test_missing_positional_is_usage_error() {
        assert!(Args::try_parse_from(["timeflow", "out.png", "conn.txt"]).is_err());
    }
}
