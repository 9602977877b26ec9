//! HTTP client for the task relay's insert and output endpoints.

use crate::snapshot::{PollRecord, PollSnapshot};
use crate::streaming::{self, ResponseStream};
use palaver_common::error::{PalaverError, Result};
use palaver_common::RelayConfig;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Acknowledgement returned by the insert endpoint
#[derive(Debug, Deserialize)]
struct InsertAck {
    #[serde(default)]
    success: bool,
}

/// Client for one task relay.
///
/// The relay exposes a single shared task slot: the output endpoint
/// carries no task identifier, so only one submission may be in flight at
/// a time. Callers are expected to serialize their sends.
#[derive(Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    config: RelayConfig,
}

impl RelayClient {
    /// Build a client with the configured per-request timeout.
    pub fn new(config: RelayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| PalaverError::Http(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Submit a generation task to the insert endpoint.
    ///
    /// The prompt travels as the `task` query parameter next to the fixed
    /// `context` and `required` strings, percent-encoded by the HTTP
    /// client. A transport failure, a non-success HTTP status, an
    /// unparseable body, or a falsy `success` field all fail the
    /// submission.
    pub async fn submit_task(&self, prompt: &str) -> Result<()> {
        let response = self
            .http
            .get(&self.config.insert_url)
            .query(&[
                ("task", prompt),
                ("context", self.config.task_context.as_str()),
                ("required", self.config.task_instruction.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PalaverError::Http(format!("insert request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| PalaverError::Http(format!("insert request failed: {}", e)))?;

        let ack: InsertAck = response
            .json()
            .await
            .map_err(|e| PalaverError::Http(format!("insert response was not valid JSON: {}", e)))?;
        if !ack.success {
            return Err(PalaverError::Relay(
                "the relay refused the submitted task".to_string(),
            ));
        }
        debug!("task accepted by relay");
        Ok(())
    }

    /// Fetch the current state of the in-flight task.
    pub async fn poll_output(&self) -> Result<PollRecord> {
        let snapshot: PollSnapshot = self
            .http
            .get(&self.config.output_url)
            .send()
            .await
            .map_err(|e| PalaverError::Http(format!("poll request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| PalaverError::Http(format!("poll request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| PalaverError::Http(format!("poll response was not valid JSON: {}", e)))?;
        Ok(snapshot.into_latest())
    }

    /// Stream the relay's response to `prompt` as it is generated.
    ///
    /// Spawns a background task that submits the prompt and then polls the
    /// output endpoint, forwarding each newly appeared text suffix as a
    /// chunk. The stream is finite and always ends with a final chunk:
    /// `Complete` on success, `Error` on any failure, or `Timeout` when
    /// the poll budget runs out first.
    pub fn stream_response(&self, prompt: impl Into<String>) -> ResponseStream {
        let (sender, receiver) = mpsc::channel(streaming::CHUNK_BUFFER);
        let client = self.clone();
        let prompt = prompt.into();
        tokio::spawn(streaming::run_stream(client, prompt, sender));
        ResponseStream::new(receiver)
    }
}
