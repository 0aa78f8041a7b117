//! Timeflow - directly-follows graphs laid out on a duration timeline.
//!
//! Activities of a directly-follows graph (DFG) are placed along a horizontal
//! time axis by their typical duration, edges are drawn with a weight
//! proportional to their frequency, and start/end activities are marked.
//!
//! The pipeline runs in four stages:
//!
//! 1. parse a connections file (or discover a DFG from an event log) and a
//!    duration table,
//! 2. lay the graph out with the [`TimelineEngine`](layout::TimelineEngine),
//! 3. render the layout through a [`Renderer`](export::Renderer),
//! 4. write the bytes with [`export::export`].
//!
//! [`TimelineBuilder`] drives the first three stages with one configuration.

pub mod config;
pub mod export;
pub mod layout;

mod error;

pub use timeflow_core::{color, dfg, discovery, duration, event_log, geometry, identifier};
pub use timeflow_parser::error as diagnostics;

pub use error::TimeflowError;

use std::{fs, path::Path};

use log::{debug, info, trace};

use timeflow_core::{dfg::Dfg, duration::DurationTable, event_log::EventLog};

use config::AppConfig;
use export::RenderConfig;
use layout::{TimelineEngine, TimelineLayout};

/// Builder for parsing, laying out and rendering timelines.
///
/// # Examples
///
/// ```rust
/// use timeflow::{TimelineBuilder, config::{AppConfig, OutputFormat}};
///
/// let builder = TimelineBuilder::new(AppConfig::default().with_format(OutputFormat::Svg));
///
/// let dfg = builder.parse_connections("Start:A\nA,B,5\nEnd:B\n").unwrap();
/// let durations = builder.parse_durations("A | 00:10:00\nB | 00:05:00\n").unwrap();
///
/// let layout = builder.layout(&dfg, &durations).unwrap();
/// let svg = builder.render(&layout).unwrap();
/// assert!(String::from_utf8(svg).unwrap().contains("<svg"));
/// ```
#[derive(Debug, Default)]
pub struct TimelineBuilder {
    config: AppConfig,
}

impl TimelineBuilder {
    /// Create a new builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a connections file into a directly-follows graph.
    ///
    /// # Errors
    ///
    /// Returns [`TimeflowError::MalformedLine`] listing every malformed line.
    pub fn parse_connections(&self, source: &str) -> Result<Dfg, TimeflowError> {
        info!("Parsing connections");
        let dfg =
            timeflow_parser::parse_connections(source).map_err(|err| TimeflowError::MalformedLine {
                err,
                src: source.to_string(),
                path: None,
            })?;

        debug!(
            activities = dfg.activity_count(),
            edges = dfg.edges().len();
            "Connections parsed"
        );
        trace!(dfg:?; "Parsed graph");
        Ok(dfg)
    }

    /// Parse a duration file into a duration table.
    ///
    /// # Errors
    ///
    /// Returns [`TimeflowError::MalformedDuration`] listing every malformed entry.
    pub fn parse_durations(&self, source: &str) -> Result<DurationTable, TimeflowError> {
        info!("Parsing durations");
        let table = timeflow_parser::parse_durations(source).map_err(|err| {
            TimeflowError::MalformedDuration {
                err,
                src: source.to_string(),
                path: None,
            }
        })?;

        debug!(entries = table.len(); "Durations parsed");
        Ok(table)
    }

    /// Parse a raw `case_id,activity` event log.
    ///
    /// # Errors
    ///
    /// Returns [`TimeflowError::MalformedLog`] listing every malformed record.
    pub fn parse_event_log(&self, source: &str) -> Result<EventLog, TimeflowError> {
        info!("Parsing event log");
        let log = timeflow_parser::parse_event_log(source).map_err(|err| {
            TimeflowError::MalformedLog {
                err,
                src: source.to_string(),
                path: None,
            }
        })?;

        debug!(traces = log.traces().len(), events = log.event_count(); "Event log parsed");
        Ok(log)
    }

    /// Read and parse a connections file.
    pub fn read_connections(&self, path: impl AsRef<Path>) -> Result<Dfg, TimeflowError> {
        let path = path.as_ref();
        let source = read_source(path)?;
        self.parse_connections(&source)
            .map_err(|err| err.with_path(path))
    }

    /// Read and parse a duration file.
    pub fn read_durations(&self, path: impl AsRef<Path>) -> Result<DurationTable, TimeflowError> {
        let path = path.as_ref();
        let source = read_source(path)?;
        self.parse_durations(&source).map_err(|err| err.with_path(path))
    }

    /// Read and parse an event log file.
    pub fn read_event_log(&self, path: impl AsRef<Path>) -> Result<EventLog, TimeflowError> {
        let path = path.as_ref();
        let source = read_source(path)?;
        self.parse_event_log(&source).map_err(|err| err.with_path(path))
    }

    /// Discover the directly-follows graph of an event log.
    pub fn discover(&self, log: &EventLog) -> Result<Dfg, TimeflowError> {
        let dfg = discovery::discover(log)?;
        info!(
            activities = dfg.activity_count(),
            edges = dfg.edges().len();
            "Graph discovered from event log"
        );
        Ok(dfg)
    }

    /// Lay `dfg` out on the timeline defined by `durations`.
    ///
    /// # Errors
    ///
    /// Returns [`TimeflowError::EmptyGraph`] when the graph has no activity,
    /// and [`TimeflowError::Config`] for an invalid layout configuration.
    pub fn layout(
        &self,
        dfg: &Dfg,
        durations: &DurationTable,
    ) -> Result<TimelineLayout, TimeflowError> {
        TimelineEngine::new(self.config.layout().clone()).layout(dfg, durations)
    }

    /// Render a layout in the configured output format.
    pub fn render(&self, layout: &TimelineLayout) -> Result<Vec<u8>, TimeflowError> {
        let render_config =
            RenderConfig::new(self.config.output().format(), self.config.style().clone());
        let bytes = export::render(layout, &render_config)?;
        info!(format:% = render_config.format(), bytes = bytes.len(); "Timeline rendered");
        Ok(bytes)
    }
}

fn read_source(path: &Path) -> Result<String, TimeflowError> {
    debug!(path:? = path; "Reading input file");
    Ok(fs::read_to_string(path)?)
}
