//! Configuration types and utilities for Palaver

use crate::constants::{DEFAULT_INSERT_URL, DEFAULT_OUTPUT_URL, polling, task_fields, timeouts};
use crate::error::{PalaverError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Settings for talking to the task relay endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Endpoint that accepts new generation tasks
    pub insert_url: String,
    /// Endpoint polled for generated output
    pub output_url: String,
    /// Conversation framing sent with every task
    pub task_context: String,
    /// Output instruction sent with every task
    pub task_instruction: String,
    /// Maximum poll requests per streamed response
    pub max_polls: u32,
    /// Delay between poll requests in milliseconds
    pub poll_interval_ms: u64,
    /// Per-request HTTP timeout in seconds
    pub request_timeout_seconds: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            insert_url: DEFAULT_INSERT_URL.to_string(),
            output_url: DEFAULT_OUTPUT_URL.to_string(),
            task_context: task_fields::CONTEXT.to_string(),
            task_instruction: task_fields::REQUIRED.to_string(),
            max_polls: polling::DEFAULT_MAX_POLLS,
            poll_interval_ms: polling::DEFAULT_POLL_INTERVAL_MS,
            request_timeout_seconds: timeouts::DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl RelayConfig {
    /// Load a configuration from a TOML file.
    ///
    /// Fields missing from the file keep their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: RelayConfig = toml::from_str(&raw)
            .map_err(|e| PalaverError::Config(format!("invalid config file {:?}: {}", path, e)))?;
        debug!("loaded relay config from {:?}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_documented_relay() {
        let config = RelayConfig::default();
        assert_eq!(config.insert_url, DEFAULT_INSERT_URL);
        assert_eq!(config.output_url, DEFAULT_OUTPUT_URL);
        assert_eq!(config.max_polls, 60);
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.request_timeout_seconds, 30);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "insert_url = \"http://localhost:8080/insert\"").unwrap();
        writeln!(file, "max_polls = 10").unwrap();

        let config = RelayConfig::load(&path).unwrap();
        assert_eq!(config.insert_url, "http://localhost:8080/insert");
        assert_eq!(config.max_polls, 10);
        assert_eq!(config.output_url, DEFAULT_OUTPUT_URL);
        assert_eq!(config.poll_interval_ms, 500);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.toml");
        std::fs::write(&path, "insert_url = [not toml").unwrap();

        let err = RelayConfig::load(&path).unwrap_err();
        assert!(matches!(err, PalaverError::Config(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = RelayConfig::load("/nonexistent/palaver/relay.toml").unwrap_err();
        assert!(matches!(err, PalaverError::Io(_)));
    }
}
