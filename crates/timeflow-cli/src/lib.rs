//! CLI logic for the timeflow renderer.
//!
//! [`run`] implements both invocation modes with one pipeline:
//!
//! - render: `timeflow <output> <connections> <durations>`
//! - compare: `timeflow <prefix> <connections> <durations> <log>`, which
//!   writes the graph discovered from the log to `<prefix>_old.<ext>` and the
//!   connections-file graph to `<prefix>_new.<ext>`.
//!
//! Every graph is parsed, laid out and rendered before the first file is
//! written. When writing a later file fails, the files already written by
//! this run are removed again, so a failure never leaves a partial set of
//! outputs behind.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fs, path::PathBuf};

use log::{info, warn};

use timeflow::{
    TimeflowError, TimelineBuilder,
    config::{AppConfig, OutputFormat},
    dfg::Dfg,
    duration::DurationTable,
    export,
};

/// A graph paired with the file it is exported to.
struct Job {
    label: &'static str,
    dfg: Dfg,
    output: PathBuf,
}

/// Run the timeflow CLI application.
///
/// # Errors
///
/// Returns `TimeflowError` for configuration, I/O, parse, layout and export
/// failures. Nothing is written when any stage fails before export, and
/// outputs written before a failed export are removed.
pub fn run(args: &Args) -> Result<(), TimeflowError> {
    info!(
        output = args.output,
        connections = args.connections,
        durations = args.durations,
        compare = args.is_compare();
        "Processing timeline"
    );

    let app_config = resolve_config(args)?;
    let format = app_config.output().format();
    let builder = TimelineBuilder::new(app_config);

    let durations = builder.read_durations(&args.durations)?;
    let dfg = builder.read_connections(&args.connections)?;

    let jobs = match &args.log {
        Some(log_path) => {
            let log = builder.read_event_log(log_path)?;
            let discovered = builder.discover(&log)?;
            vec![
                Job {
                    label: "discovered",
                    dfg: discovered,
                    output: suffixed_output(&args.output, "old", format),
                },
                Job {
                    label: "connections",
                    dfg,
                    output: suffixed_output(&args.output, "new", format),
                },
            ]
        }
        None => vec![Job {
            label: "connections",
            dfg,
            output: PathBuf::from(&args.output),
        }],
    };

    let rendered = jobs
        .iter()
        .map(|job| render_job(&builder, job, &durations).map(|bytes| (&job.output, bytes)))
        .collect::<Result<Vec<_>, _>>()?;

    export_all(&rendered)?;

    info!(files = rendered.len(); "Timeline export finished");
    Ok(())
}

fn render_job(
    builder: &TimelineBuilder,
    job: &Job,
    durations: &DurationTable,
) -> Result<Vec<u8>, TimeflowError> {
    info!(graph = job.label, output:? = job.output; "Rendering graph");
    let layout = builder.layout(&job.dfg, durations)?;
    builder.render(&layout)
}

/// Writes every rendered graph, removing the earlier ones if a later write fails.
fn export_all(rendered: &[(&PathBuf, Vec<u8>)]) -> Result<(), TimeflowError> {
    let mut written: Vec<&PathBuf> = Vec::with_capacity(rendered.len());
    for (output, bytes) in rendered {
        if let Err(err) = export::export(bytes, output) {
            for path in written {
                if let Err(remove_err) = fs::remove_file(path) {
                    warn!(path:? = path, err:err = remove_err; "Failed to remove partial output");
                }
            }
            return Err(err.into());
        }
        info!(output:? = output; "Timeline exported successfully");
        written.push(*output);
    }
    Ok(())
}

fn resolve_config(args: &Args) -> Result<AppConfig, TimeflowError> {
    let app_config = config::load_config(args.config.as_ref())?;
    match &args.format {
        Some(format) => {
            let format = format.parse::<OutputFormat>().map_err(TimeflowError::Config)?;
            Ok(app_config.with_format(format))
        }
        None => Ok(app_config),
    }
}

/// Builds `<prefix>_<suffix>.<ext>`.
fn suffixed_output(prefix: &str, suffix: &str, format: OutputFormat) -> PathBuf {
    PathBuf::from(format!("{prefix}_{suffix}.{}", format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffixed_output() {
        assert_eq!(
            suffixed_output("out/cmp", "old", OutputFormat::Png),
            PathBuf::from("out/cmp_old.png")
        );
        assert_eq!(
            suffixed_output("cmp", "new", OutputFormat::Svg),
            PathBuf::from("cmp_new.svg")
        );
    }

    #[test]
    fn test_failed_export_removes_earlier_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let old = dir.path().join("cmp_old.svg");
        let new = blocker.join("cmp_new.svg");
        let rendered = vec![(&old, b"<svg/>".to_vec()), (&new, b"<svg/>".to_vec())];

        let err = export_all(&rendered).unwrap_err();
        assert!(matches!(err, TimeflowError::Export(_)), "{err:?}");
        assert!(!old.exists(), "earlier output must be removed");
    }

    #[test]
    fn test_export_all_writes_every_output() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("cmp_old.svg");
        let new = dir.path().join("cmp_new.svg");
        let rendered = vec![(&old, b"old".to_vec()), (&new, b"new".to_vec())];

        export_all(&rendered).unwrap();
        assert_eq!(fs::read(&old).unwrap(), b"old");
        assert_eq!(fs::read(&new).unwrap(), b"new");
    }

    #[test]
    fn test_invalid_format_is_config_error() {
        let args = Args {
            output: "out".to_string(),
            connections: "c".to_string(),
            durations: "d".to_string(),
            log: None,
            format: Some("gif".to_string()),
            config: None,
            log_level: "off".to_string(),
        };
        let err = resolve_config(&args).unwrap_err();
        assert!(matches!(err, TimeflowError::Config(_)));
    }
}
