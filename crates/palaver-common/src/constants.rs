//! Common constants used across Palaver

/// Display name for the assistant in chat transcripts
pub const ASSISTANT_NAME: &str = "Palaver";

/// Default endpoint that accepts new generation tasks
pub const DEFAULT_INSERT_URL: &str = "https://nodejsllm-1.onrender.com/insert";

/// Default endpoint polled for incrementally generated output
pub const DEFAULT_OUTPUT_URL: &str = "https://nodejsllm-1.onrender.com/true";

/// Fixed strings sent alongside every task submission
pub mod task_fields {
    /// Conversation framing passed as the `context` query parameter
    pub const CONTEXT: &str = "general chatbot conversation";

    /// Output instruction passed as the `required` query parameter
    pub const REQUIRED: &str =
        "short answer only answer which is asked,dont answer anything else";
}

/// Polling defaults for the output endpoint
pub mod polling {
    /// Maximum number of poll requests per streamed response
    pub const DEFAULT_MAX_POLLS: u32 = 60;

    /// Delay between poll requests in milliseconds
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
}

/// Default timeout values in seconds
pub mod timeouts {
    pub const DEFAULT_HTTP_TIMEOUT: u64 = 30;
}
