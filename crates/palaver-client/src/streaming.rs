//! Chunked response streaming over the relay's insert/poll exchange.
//!
//! A streamed response is produced by a background task that submits the
//! prompt, then polls the output endpoint on a fixed cadence and forwards
//! each newly appeared text suffix. Every failure is absorbed into a
//! terminal chunk, so the consumer only ever sees displayable text.

use crate::relay::RelayClient;
use crate::snapshot::{PollRecord, suffix_delta};
use chrono::{DateTime, Utc};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

/// Buffered chunk capacity per stream
pub(crate) const CHUNK_BUFFER: usize = 64;

/// Notice shown when the poll budget runs out before completion
const TIMEOUT_NOTICE: &str = "\n\nSorry, the relay timed out while generating a response.";

/// Kinds of streamed chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkKind {
    /// Newly generated text
    Text,
    /// Terminal error notice
    Error,
    /// Poll budget ran out before the relay reported completion
    Timeout,
    /// Generation finished; carries no text
    Complete,
}

/// One piece of a streamed response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseChunk {
    /// Sequence number for ordering
    pub sequence: u64,
    /// Text carried by this chunk
    pub content: String,
    /// What the chunk represents
    pub kind: ChunkKind,
    /// Whether this is the last chunk of the stream
    pub is_final: bool,
    /// When the chunk was produced
    pub timestamp: DateTime<Utc>,
}

impl ResponseChunk {
    fn new(sequence: u64, content: impl Into<String>, kind: ChunkKind, is_final: bool) -> Self {
        Self {
            sequence,
            content: content.into(),
            kind,
            is_final,
            timestamp: Utc::now(),
        }
    }
}

/// A finite stream of chunks for one submitted prompt
pub struct ResponseStream {
    receiver: ReceiverStream<ResponseChunk>,
}

impl ResponseStream {
    pub(crate) fn new(receiver: mpsc::Receiver<ResponseChunk>) -> Self {
        Self {
            receiver: ReceiverStream::new(receiver),
        }
    }

    /// Collect the whole stream into the text a transcript would show.
    ///
    /// Error and timeout notices are part of the collected text, exactly
    /// as they would appear in the chat window.
    pub async fn collect_text(mut self) -> String {
        let mut text = String::new();
        while let Some(chunk) = self.next().await {
            text.push_str(&chunk.content);
        }
        text
    }
}

impl Stream for ResponseStream {
    type Item = ResponseChunk;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}

/// Drive one submit-then-poll exchange, forwarding chunks until a terminal
/// condition is reached or the receiver goes away.
pub(crate) async fn run_stream(
    client: RelayClient,
    prompt: String,
    sender: mpsc::Sender<ResponseChunk>,
) {
    let mut sequence = 0u64;

    if let Err(e) = client.submit_task(&prompt).await {
        warn!("task submission failed: {}", e);
        let notice = format!("Error: could not submit the task to the relay: {}", e);
        let _ = sender
            .send(ResponseChunk::new(sequence, notice, ChunkKind::Error, true))
            .await;
        return;
    }

    let interval = Duration::from_millis(client.config().poll_interval_ms);
    let max_polls = client.config().max_polls;
    let mut seen = String::new();
    let mut polls = 0u32;

    while polls < max_polls {
        let record = match client.poll_output().await {
            Ok(record) => record,
            Err(e) => {
                warn!("polling failed after {} polls: {}", polls, e);
                let notice = format!("Error: lost contact with the relay while streaming: {}", e);
                let _ = sender
                    .send(ResponseChunk::new(sequence, notice, ChunkKind::Error, true))
                    .await;
                return;
            }
        };

        let PollRecord { output, status } = record;
        let delta = suffix_delta(&seen, &output);
        if !delta.is_empty() {
            let chunk = ResponseChunk::new(sequence, delta, ChunkKind::Text, false);
            sequence += 1;
            if sender.send(chunk).await.is_err() {
                debug!("chunk receiver dropped, abandoning stream");
                return;
            }
        }
        seen = output;

        if status {
            debug!("relay reported completion after {} polls", polls + 1);
            let _ = sender
                .send(ResponseChunk::new(sequence, "", ChunkKind::Complete, true))
                .await;
            return;
        }

        tokio::time::sleep(interval).await;
        polls += 1;
    }

    warn!("poll budget of {} exhausted without completion", max_polls);
    let _ = sender
        .send(ResponseChunk::new(
            sequence,
            TIMEOUT_NOTICE,
            ChunkKind::Timeout,
            true,
        ))
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collect_text_concatenates_every_chunk() {
        let (sender, receiver) = mpsc::channel(8);
        sender
            .send(ResponseChunk::new(0, "Hel", ChunkKind::Text, false))
            .await
            .unwrap();
        sender
            .send(ResponseChunk::new(1, "lo", ChunkKind::Text, false))
            .await
            .unwrap();
        sender
            .send(ResponseChunk::new(2, "", ChunkKind::Complete, true))
            .await
            .unwrap();
        drop(sender);

        let text = ResponseStream::new(receiver).collect_text().await;
        assert_eq!(text, "Hello");
    }

    #[tokio::test]
    async fn stream_yields_chunks_in_order() {
        let (sender, receiver) = mpsc::channel(8);
        for i in 0..3u64 {
            sender
                .send(ResponseChunk::new(i, i.to_string(), ChunkKind::Text, false))
                .await
                .unwrap();
        }
        drop(sender);

        let mut stream = ResponseStream::new(receiver);
        let mut sequences = Vec::new();
        while let Some(chunk) = stream.next().await {
            sequences.push(chunk.sequence);
        }
        assert_eq!(sequences, vec![0, 1, 2]);
    }
}
