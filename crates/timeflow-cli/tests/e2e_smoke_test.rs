use std::{fs, path::PathBuf};

use tempfile::tempdir;

use timeflow::TimeflowError;
use timeflow_cli::{Args, run};

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
        .to_string_lossy()
        .to_string()
}

fn args(output: &str, connections: &str, durations: &str, log: Option<&str>) -> Args {
    Args {
        output: output.to_string(),
        connections: fixture(connections),
        durations: fixture(durations),
        log: log.map(fixture),
        format: Some("svg".to_string()),
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_render_mode_writes_svg() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("timeline.svg");

    run(&args(
        &output.to_string_lossy(),
        "connections.txt",
        "durations.txt",
        None,
    ))
    .expect("render mode should succeed");

    let svg = fs::read_to_string(&output).expect("output written");
    assert!(svg.contains("<svg"));
    assert!(svg.contains("A_Create"));
    assert!(svg.contains("1 days 04:00:00"));
}

#[test]
fn e2e_compare_mode_writes_old_and_new() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let prefix = temp_dir.path().join("cmp");

    run(&args(
        &prefix.to_string_lossy(),
        "connections.txt",
        "durations.txt",
        Some("log.csv"),
    ))
    .expect("compare mode should succeed");

    let old = fs::read_to_string(temp_dir.path().join("cmp_old.svg")).expect("old written");
    let new = fs::read_to_string(temp_dir.path().join("cmp_new.svg")).expect("new written");

    // Self loop on Archive only exists in the connections file.
    assert!(old.contains("Register"));
    assert!(new.contains("Register"));
    assert_ne!(old, new);
}

#[test]
fn e2e_config_file_sets_format() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[output]\nformat = \"svg\"\n").unwrap();
    let output = temp_dir.path().join("from_config.svg");

    let mut args = args(
        &output.to_string_lossy(),
        "connections.txt",
        "durations.txt",
        None,
    );
    args.format = None;
    args.config = Some(config_path.to_string_lossy().to_string());

    run(&args).expect("config run should succeed");
    assert!(fs::read_to_string(&output).unwrap().contains("<svg"));
}

#[cfg(feature = "graphviz")]
#[test]
fn e2e_dot_output() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("timeline.dot");

    let mut args = args(
        &output.to_string_lossy(),
        "connections.txt",
        "durations.txt",
        None,
    );
    args.format = Some("dot".to_string());

    run(&args).expect("dot output should succeed");
    let dot = fs::read_to_string(&output).unwrap();
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("pos="));
}

#[test]
fn e2e_errors_abort_without_output() {
    let cases: [(&str, &str, Option<&str>, fn(&TimeflowError) -> bool); 4] = [
        (
            "errors/missing_frequency.txt",
            "durations.txt",
            None,
            |err| matches!(err, TimeflowError::MalformedLine { .. }),
        ),
        (
            "connections.txt",
            "errors/bad_duration.txt",
            None,
            |err| matches!(err, TimeflowError::MalformedDuration { .. }),
        ),
        ("errors/empty.txt", "durations.txt", None, |err| {
            matches!(err, TimeflowError::EmptyGraph)
        }),
        (
            "connections.txt",
            "durations.txt",
            Some("errors/bad_log.csv"),
            |err| matches!(err, TimeflowError::MalformedLog { .. }),
        ),
    ];

    for (connections, durations, log, expected) in cases {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let prefix = temp_dir.path().join("out");

        let err = run(&args(&prefix.to_string_lossy(), connections, durations, log))
            .expect_err("invalid input should fail");
        assert!(expected(&err), "{connections}: unexpected error {err:?}");

        let written = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(written, 0, "{connections}: no file may be written");
    }
}

#[test]
fn e2e_parse_error_names_the_file() {
    let err = run(&args(
        "unused.svg",
        "errors/missing_frequency.txt",
        "durations.txt",
        None,
    ))
    .unwrap_err();

    let (parse_err, _, path) = err.parse_details().expect("parse error");
    assert!(path.is_some_and(|path| path.ends_with("missing_frequency.txt")));
    assert!(parse_err.diagnostics()[0].message().starts_with("line 2"));
}

#[test]
fn e2e_missing_input_is_io_error() {
    let err = run(&args("unused.svg", "nope.txt", "durations.txt", None)).unwrap_err();
    assert!(matches!(err, TimeflowError::Io(_)));
}
