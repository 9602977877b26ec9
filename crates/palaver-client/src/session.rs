//! Chat session tying a relay client to an owned message history.

use crate::relay::RelayClient;
use crate::streaming::ResponseStream;
use palaver_common::{ChatHistory, ChatMessage};

/// A single user's conversation with the relay.
///
/// The history lives here for the lifetime of the UI session and nowhere
/// else; the remote service keeps no per-session state this client can
/// rely on.
pub struct ChatSession {
    client: RelayClient,
    history: ChatHistory,
}

impl ChatSession {
    /// Start a session with an empty transcript.
    pub fn new(client: RelayClient) -> Self {
        Self {
            client,
            history: ChatHistory::new(),
        }
    }

    /// Record the user's prompt and start streaming the response to it.
    ///
    /// The caller collects the stream and hands the final text back
    /// through [`ChatSession::record_response`].
    pub fn send(&mut self, prompt: impl Into<String>) -> ResponseStream {
        let prompt = prompt.into();
        self.history.push(ChatMessage::user(prompt.clone()));
        self.client.stream_response(prompt)
    }

    /// Record the assistant's completed response.
    pub fn record_response(&mut self, content: impl Into<String>) {
        self.history.push(ChatMessage::assistant(content));
    }

    /// The transcript so far.
    pub fn history(&self) -> &ChatHistory {
        &self.history
    }
}
