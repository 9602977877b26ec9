//! Main TUI application state and event loop

use crate::conversation::Conversation;
use crate::events::{AppEvent, EventHandler, handle_key_event};
use anyhow::Result;
use futures_util::StreamExt;
use palaver_client::RelayClient;
use palaver_common::{ChatHistory, ChatMessage, RelayConfig};
use ratatui::{Terminal, backend::Backend};
use std::time::Duration;
use tracing::{debug, info};

pub struct App {
    client: RelayClient,
    conversation: Conversation,
    history: ChatHistory,
    event_handler: EventHandler,
    /// Response text accumulated for the in-flight stream
    pending_response: String,
    needs_redraw: bool,
    quitting: bool,
}

impl App {
    pub fn new(config: RelayConfig) -> Result<Self> {
        let client = RelayClient::new(config)?;
        Ok(Self {
            client,
            conversation: Conversation::new(),
            history: ChatHistory::new(),
            event_handler: EventHandler::new(Duration::from_millis(100)),
            pending_response: String::new(),
            needs_redraw: true,
            quitting: false,
        })
    }

    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        info!("Starting Palaver TUI");

        loop {
            match self.event_handler.next_event().await? {
                AppEvent::Key(key) => {
                    self.needs_redraw = true;
                    if let Some(AppEvent::Quit) = handle_key_event(key) {
                        self.quitting = true;
                    } else if let Some(AppEvent::PromptSubmitted(prompt)) =
                        self.conversation.handle_key_event(key)
                    {
                        self.submit_prompt(prompt);
                    }
                }

                AppEvent::PromptSubmitted(prompt) => {
                    self.needs_redraw = true;
                    self.submit_prompt(prompt);
                }

                AppEvent::StreamChunk(chunk) => {
                    self.needs_redraw = true;
                    self.pending_response.push_str(&chunk.content);
                    self.conversation.append_chunk(&chunk);
                }

                AppEvent::StreamClosed => {
                    self.needs_redraw = true;
                    self.conversation.finish_stream();
                    let response = std::mem::take(&mut self.pending_response);
                    self.history.push(ChatMessage::assistant(response));
                    debug!("response recorded, transcript has {} messages", self.history.len());
                }

                AppEvent::Mouse(mouse) => {
                    self.needs_redraw = true;
                    self.conversation.handle_mouse_event(mouse);
                }

                AppEvent::Resize(width, height) => {
                    self.needs_redraw = true;
                    debug!("terminal resized to {}x{}", width, height);
                }

                AppEvent::Tick => {
                    if self.conversation.is_busy() {
                        self.conversation.advance_spinner();
                        self.needs_redraw = true;
                    }
                }

                AppEvent::Quit => {
                    self.quitting = true;
                }
            }

            if self.needs_redraw {
                terminal.draw(|frame| self.conversation.render(frame))?;
                self.needs_redraw = false;
            }

            if self.quitting {
                break;
            }
        }

        info!("Palaver TUI exiting");
        Ok(())
    }

    /// Record the prompt and spawn the stream-forwarding task.
    ///
    /// The relay serves a single task at a time, so the input stays
    /// locked until the stream closes.
    fn submit_prompt(&mut self, prompt: String) {
        if self.conversation.is_busy() {
            return;
        }
        info!("submitting prompt ({} chars)", prompt.len());

        self.history.push(ChatMessage::user(prompt.clone()));
        self.conversation.push_user(&prompt);
        self.conversation.start_assistant();
        self.conversation.set_busy(true);
        self.pending_response.clear();

        let mut stream = self.client.stream_response(prompt);
        let sender = self.event_handler.sender();
        tokio::spawn(async move {
            while let Some(chunk) = stream.next().await {
                if sender.send(AppEvent::StreamChunk(chunk)).is_err() {
                    return;
                }
            }
            let _ = sender.send(AppEvent::StreamClosed);
        });
    }
}
