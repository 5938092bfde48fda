use crate::config::schema::{Config, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the project-level configuration file.
pub const CONFIG_FILE_NAME: &str = "stylefix.toml";

/// Name of the per-user configuration file in the home directory.
pub const USER_CONFIG_FILE_NAME: &str = ".stylefix.toml";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl ConfigError {
    fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            ConfigError::Io { .. } => self,
            ConfigError::Toml { path: None, source } => ConfigError::Toml {
                path: Some(path),
                source,
            },
            ConfigError::Validation { path: None, source } => ConfigError::Validation {
                path: Some(path),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(
                    f,
                    "failed to read stylefix config from {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::Toml { path, source } => match path {
                Some(path) => write!(
                    f,
                    "failed to parse stylefix config TOML ({}): {}",
                    path.display(),
                    source
                ),
                None => write!(f, "failed to parse stylefix config TOML: {}", source),
            },
            ConfigError::Validation { path, source } => match path {
                Some(path) => write!(f, "invalid stylefix config ({}): {}", path.display(), source),
                None => write!(f, "invalid stylefix config: {}", source),
            },
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml { source, .. } => Some(source),
            ConfigError::Validation { source, .. } => Some(source),
        }
    }
}

pub fn load_from_str(input: &str) -> Result<Config, ConfigError> {
    let config: Config = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.with_path(path))
}

/// Candidate configuration files, highest priority first.
///
/// 1. `explicit` (the `--config` flag); when given, it is the only candidate.
/// 2. `stylefix.toml` in `cwd`.
/// 3. `.stylefix.toml` in the user's home directory.
pub fn candidate_paths(explicit: Option<&Path>, cwd: &Path) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }
    let mut candidates = vec![cwd.join(CONFIG_FILE_NAME)];
    if let Some(home) = home::home_dir() {
        candidates.push(home.join(USER_CONFIG_FILE_NAME));
    }
    candidates
}

/// Load the first configuration found by [`candidate_paths`], or defaults.
///
/// An explicit path that does not exist is an error; missing implicit
/// candidates are skipped.
pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<(Config, Option<PathBuf>), ConfigError> {
    if let Some(path) = explicit {
        return Ok((load_from_path(path)?, Some(path.to_path_buf())));
    }
    for candidate in candidate_paths(None, cwd) {
        if candidate.is_file() {
            let config = load_from_path(&candidate)?;
            return Ok((config, Some(candidate)));
        }
    }
    Ok((Config::default(), None))
}
