//! Configuration management for daemon mode
//!
//! Handles `key=value` parsing and wholesale replacement on reload

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::DEFAULT_INTERVAL_SECS;

/// Effective daemon configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Directory that is measured and emptied (`folder1`)
    pub source_dir: PathBuf,
    /// Directory receiving `size.log` (`folder2`)
    pub dest_dir: PathBuf,
    /// Seconds between work cycles (`interval`), always > 0
    pub interval_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            dest_dir: PathBuf::new(),
            interval_seconds: DEFAULT_INTERVAL_SECS,
        }
    }
}

impl Config {
    /// Both folders are set
    pub fn has_folders(&self) -> bool {
        !self.source_dir.as_os_str().is_empty() && !self.dest_dir.as_os_str().is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid interval '{value}' on line {line}: must be a positive integer")]
    InvalidInterval { line: usize, value: String },
}

/// Apply the `key=value` lines of `text` on top of `previous`.
///
/// Field-level problems do not abort the parse; they are returned alongside
/// the resulting config and the offending field keeps its previous value.
pub fn parse_config(text: &str, previous: &Config) -> (Config, Vec<ConfigError>) {
    let mut config = previous.clone();
    let mut errors = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match key.trim() {
            "folder1" => config.source_dir = PathBuf::from(value),
            "folder2" => config.dest_dir = PathBuf::from(value),
            "interval" => match value.parse::<u64>() {
                Ok(seconds) if seconds > 0 => config.interval_seconds = seconds,
                _ => errors.push(ConfigError::InvalidInterval {
                    line: index + 1,
                    value: value.to_string(),
                }),
            },
            _ => {}
        }
    }

    (config, errors)
}

/// Read `path` and apply it on top of `previous`.
///
/// Field errors are logged and skipped; only an unreadable file is an error.
pub fn load(path: &Path, previous: &Config) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let (config, errors) = parse_config(&text, previous);
    for err in &errors {
        log::error!("{}", err);
    }

    Ok(config)
}

/// Owner of the current configuration, bound to a file path fixed at startup
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    current: Config,
}

impl ConfigStore {
    /// Create a store holding the default configuration
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: Config::default(),
        }
    }

    pub fn current(&self) -> &Config {
        &self.current
    }

    /// Re-read the config file, replacing the current config wholesale.
    ///
    /// On a read failure the previous configuration stays in effect.
    pub fn reload(&mut self) -> Result<&Config, ConfigError> {
        match load(&self.path, &self.current) {
            Ok(config) => {
                self.current = config;
                Ok(&self.current)
            }
            Err(err) => {
                log::error!("{}", err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_recognized_keys() {
        let text = "folder1=/tmp/src\nfolder2=/tmp/dst\ninterval=5\n";
        let (config, errors) = parse_config(text, &Config::default());

        assert!(errors.is_empty());
        assert_eq!(config.source_dir, PathBuf::from("/tmp/src"));
        assert_eq!(config.dest_dir, PathBuf::from("/tmp/dst"));
        assert_eq!(config.interval_seconds, 5);
    }

    #[test]
    fn test_parse_ignores_unknown_keys_and_lines_without_separator() {
        let text = "# comment\nfolder1=/a\ncolour=blue\njust some text\nfolder2=/b\n";
        let (config, errors) = parse_config(text, &Config::default());

        assert!(errors.is_empty());
        assert_eq!(config.source_dir, PathBuf::from("/a"));
        assert_eq!(config.dest_dir, PathBuf::from("/b"));
        assert_eq!(config.interval_seconds, DEFAULT_INTERVAL_SECS);
    }

    #[test]
    fn test_parse_invalid_interval_keeps_previous_value() {
        let previous = Config {
            source_dir: PathBuf::from("/old/src"),
            dest_dir: PathBuf::from("/old/dst"),
            interval_seconds: 7,
        };
        let text = "folder1=/new/src\ninterval=soon\n";
        let (config, errors) = parse_config(text, &previous);

        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ConfigError::InvalidInterval { line: 2, value } if value == "soon"
        ));
        assert_eq!(config.interval_seconds, 7);
        assert_eq!(config.source_dir, PathBuf::from("/new/src"));
        assert_eq!(config.dest_dir, PathBuf::from("/old/dst"));
    }

    #[test]
    fn test_parse_rejects_zero_and_negative_interval() {
        let (config, errors) = parse_config("interval=0\ninterval=-3\n", &Config::default());

        assert_eq!(errors.len(), 2);
        assert_eq!(config.interval_seconds, DEFAULT_INTERVAL_SECS);
    }

    #[test]
    fn test_parse_trims_whitespace_and_crlf() {
        let text = "folder1 = /a \r\nfolder2=/b\r\ninterval=12\r\n";
        let (config, errors) = parse_config(text, &Config::default());

        assert!(errors.is_empty());
        assert_eq!(config.source_dir, PathBuf::from("/a"));
        assert_eq!(config.dest_dir, PathBuf::from("/b"));
        assert_eq!(config.interval_seconds, 12);
    }

    #[test]
    fn test_parse_empty_value_keeps_previous() {
        let previous = Config {
            source_dir: PathBuf::from("/keep"),
            ..Config::default()
        };
        let (config, errors) = parse_config("folder1=\n", &previous);

        assert!(errors.is_empty());
        assert_eq!(config.source_dir, PathBuf::from("/keep"));
    }

    #[test]
    fn test_parse_value_may_contain_separator() {
        let (config, _) = parse_config("folder1=/data/a=b\n", &Config::default());
        assert_eq!(config.source_dir, PathBuf::from("/data/a=b"));
    }

    #[test]
    fn test_store_missing_file_retains_previous_config() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.txt");
        fs::write(&path, "folder1=/a\nfolder2=/b\ninterval=3\n").unwrap();

        let mut store = ConfigStore::new(&path);
        store.reload().unwrap();
        fs::remove_file(&path).unwrap();

        let result = store.reload();
        assert!(matches!(result, Err(ConfigError::Read { .. })));
        assert_eq!(store.current().interval_seconds, 3);
        assert_eq!(store.current().source_dir, PathBuf::from("/a"));
    }

    #[test]
    fn test_store_first_load_of_missing_file_keeps_default() {
        let temp = tempdir().unwrap();
        let mut store = ConfigStore::new(temp.path().join("absent.txt"));

        assert!(store.reload().is_err());
        assert_eq!(store.current(), &Config::default());
        assert!(!store.current().has_folders());
    }

    #[test]
    fn test_store_reload_picks_up_changes() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.txt");
        fs::write(&path, "folder1=/a\nfolder2=/b\ninterval=3\n").unwrap();

        let mut store = ConfigStore::new(&path);
        store.reload().unwrap();
        fs::write(&path, "folder1=/c\nfolder2=/d\ninterval=bogus\n").unwrap();
        let config = store.reload().unwrap().clone();

        assert_eq!(config.source_dir, PathBuf::from("/c"));
        assert_eq!(config.dest_dir, PathBuf::from("/d"));
        assert_eq!(config.interval_seconds, 3);
    }
}
