//! Application-level configuration loading: round length, feedback delay and data locations.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MOVIE_QUIZ_BACK_CONFIG_PATH";
/// Environment variable selecting the statistics backend.
const STATISTICS_BACKEND_ENV: &str = "STATISTICS_BACKEND";

const DEFAULT_TOTAL_QUESTIONS: i64 = 10;
const DEFAULT_FEEDBACK_DELAY_MS: u64 = 1000;
const DEFAULT_CATALOG_PATH: &str = "data/movies.json";
const DEFAULT_STATISTICS_PATH: &str = "data/statistics.json";

/// Where aggregate statistics are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticsBackend {
    /// JSON document on local disk.
    #[default]
    File,
    /// CouchDB document, configured through `COUCH_*` variables.
    Couch,
    /// Process memory; statistics are lost on exit.
    Memory,
}

impl StatisticsBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Some(Self::File),
            "couch" | "couchdb" => Some(Self::Couch),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Questions per round. Validated when a round starts, not here.
    pub total_questions: i64,
    /// How long feedback stays visible before the next question. Zero means manual advance.
    pub feedback_delay: Duration,
    /// Movie catalog the questions are drawn from.
    pub catalog_path: PathBuf,
    /// Statistics document used by the file backend.
    pub statistics_path: PathBuf,
    /// Where statistics are persisted.
    pub statistics_backend: StatisticsBackend,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    ///
    /// `STATISTICS_BACKEND` overrides the backend named in the file.
    pub fn load() -> Self {
        let mut config = Self::from_file();
        if let Ok(value) = env::var(STATISTICS_BACKEND_ENV) {
            match StatisticsBackend::parse(&value) {
                Some(backend) => config.statistics_backend = backend,
                None => warn!(value, "unknown statistics backend; keeping configured one"),
            }
        }
        config
    }

    fn from_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|err| {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to parse config; falling back to defaults"
                );
                Self::default()
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON configuration document. Missing fields take their default.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        let raw = serde_json::from_str::<RawConfig>(contents)?;
        let config: Self = raw.into();
        info!(
            total_questions = config.total_questions,
            feedback_delay_ms = config.feedback_delay.as_millis() as u64,
            backend = ?config.statistics_backend,
            "loaded quiz config"
        );
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    total_questions: i64,
    feedback_delay_ms: u64,
    catalog_path: PathBuf,
    statistics_path: PathBuf,
    statistics_backend: StatisticsBackend,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            total_questions: DEFAULT_TOTAL_QUESTIONS,
            feedback_delay_ms: DEFAULT_FEEDBACK_DELAY_MS,
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            statistics_path: PathBuf::from(DEFAULT_STATISTICS_PATH),
            statistics_backend: StatisticsBackend::default(),
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            total_questions: value.total_questions,
            feedback_delay: Duration::from_millis(value.feedback_delay_ms),
            catalog_path: value.catalog_path,
            statistics_path: value.statistics_path,
            statistics_backend: value.statistics_backend,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = AppConfig::from_json(r#"{ "total_questions": 5 }"#).unwrap();
        assert_eq!(config.total_questions, 5);
        assert_eq!(config.feedback_delay, Duration::from_millis(1000));
        assert_eq!(config.catalog_path, PathBuf::from("data/movies.json"));
        assert_eq!(config.statistics_backend, StatisticsBackend::File);
    }

    #[test]
    fn invalid_totals_are_kept_for_start_to_reject() {
        let config = AppConfig::from_json(r#"{ "total_questions": -1 }"#).unwrap();
        assert_eq!(config.total_questions, -1);
    }

    #[test]
    fn backend_names_are_case_insensitive() {
        assert_eq!(StatisticsBackend::parse("CouchDB"), Some(StatisticsBackend::Couch));
        assert_eq!(StatisticsBackend::parse(" memory "), Some(StatisticsBackend::Memory));
        assert_eq!(StatisticsBackend::parse("redis"), None);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(AppConfig::from_json("{ not json").is_err());
    }
}
