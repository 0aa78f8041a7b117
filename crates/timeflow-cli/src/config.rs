//! Configuration file discovery for the CLI.
//!
//! Search order:
//! 1. the `--config` path, which must exist
//! 2. `timeflow/config.toml` relative to the working directory
//! 3. `config.toml` in the platform configuration directory
//! 4. built-in defaults

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use timeflow::{TimeflowError, config::AppConfig};

/// Configuration-related errors for the CLI.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse TOML configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("invalid layout settings in {path}: {message}")]
    Validation { path: PathBuf, message: String },
}

impl From<ConfigError> for TimeflowError {
    fn from(err: ConfigError) -> Self {
        TimeflowError::Config(err.to_string())
    }
}

/// Finds and loads the application configuration.
///
/// # Errors
///
/// Fails when an explicit path does not exist, or when a configuration file
/// is found but cannot be read, parsed or validated.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, TimeflowError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path:? = path; "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("timeflow/config.toml");
    if local_config.exists() {
        info!(path:? = local_config; "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "timeflow", "timeflow") {
        let system_config = proj_dirs.config_dir().join("config.toml");
        if system_config.exists() {
            info!(path:? = system_config; "Loading configuration from system path");
            return load_config_file(&system_config);
        }
        debug!(path:? = system_config; "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

fn load_config_file(path: &Path) -> Result<AppConfig, TimeflowError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    config
        .layout()
        .validate()
        .map_err(|message| ConfigError::Validation {
            path: path.to_path_buf(),
            message,
        })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use timeflow::config::OutputFormat;

    use super::*;

    #[test]
    fn test_explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[output]\nformat = \"svg\"\n\n[layout]\naxis_length = 400\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.output().format(), OutputFormat::Svg);
        assert_eq!(config.layout().axis_length(), 400.0);
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, TimeflowError::Config(message) if message.contains("missing")));
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[layout]\nwidth = 3\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, TimeflowError::Config(message) if message.contains("TOML")));
    }

    #[test]
    fn test_invalid_layout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[layout]\naxis_length = -5\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, TimeflowError::Config(message) if message.contains("invalid layout")));
    }
}
