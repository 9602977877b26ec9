//! Chat transcript, input line, and streaming state for the Palaver TUI

use crate::events::AppEvent;
use crate::markdown::render_line;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use palaver_client::ResponseChunk;
use palaver_common::ASSISTANT_NAME;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Streaming cursor shown at the end of an in-flight assistant bubble
const STREAM_CURSOR: &str = "▌";

/// Spinner frames for the status line while a response is in flight
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Wrap plain text to a column width, breaking at word boundaries and
/// hard-splitting words wider than the column.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let mut word_len = word.chars().count();
        let mut word = word;

        // Hard-split anything wider than the column
        while word_len > width {
            if current_width > 0 {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            let split: usize = word.chars().take(width).map(|c| c.len_utf8()).sum();
            lines.push(word[..split].to_string());
            word = &word[split..];
            word_len -= width;
        }

        if current_width + word_len + usize::from(current_width > 0) > width {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        if current_width > 0 {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(word);
        current_width += word_len;
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// One transcript entry as rendered on screen
#[derive(Debug, Clone)]
pub struct DisplayMessage {
    pub sender: String,
    pub content: String,
    pub timestamp: String,
    pub is_streaming: bool,
}

impl DisplayMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            sender: "You".to_string(),
            content: content.into(),
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            is_streaming: false,
        }
    }

    /// An empty assistant bubble that grows as chunks arrive
    pub fn streaming_assistant() -> Self {
        Self {
            sender: ASSISTANT_NAME.to_string(),
            content: String::new(),
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            is_streaming: true,
        }
    }

    /// Fold a stream chunk into this bubble.
    pub fn append_chunk(&mut self, chunk: &ResponseChunk) {
        self.content.push_str(&chunk.content);
        if chunk.is_final {
            self.is_streaming = false;
        }
    }
}

/// Conversation view: transcript, input line, scroll and busy state
pub struct Conversation {
    messages: Vec<DisplayMessage>,
    input: String,
    /// Lines scrolled up from the bottom of the transcript
    scroll_offset: usize,
    busy: bool,
    spinner_frame: usize,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            scroll_offset: 0,
            busy: false,
            spinner_frame: 0,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
    }

    pub fn push_user(&mut self, content: &str) {
        self.messages.push(DisplayMessage::user(content));
        self.scroll_offset = 0;
    }

    pub fn start_assistant(&mut self) {
        self.messages.push(DisplayMessage::streaming_assistant());
        self.scroll_offset = 0;
    }

    /// Fold a chunk into the bubble that is currently streaming.
    pub fn append_chunk(&mut self, chunk: &ResponseChunk) {
        if let Some(last) = self.messages.last_mut() {
            last.append_chunk(chunk);
        }
        self.scroll_offset = 0;
    }

    /// Close the streaming bubble whether or not a final chunk arrived.
    pub fn finish_stream(&mut self) {
        if let Some(last) = self.messages.last_mut() {
            last.is_streaming = false;
        }
        self.busy = false;
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Enter => {
                if self.busy {
                    return None;
                }
                let prompt = self.input.trim().to_string();
                if prompt.is_empty() {
                    return None;
                }
                self.input.clear();
                Some(AppEvent::PromptSubmitted(prompt))
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                None
            }
            KeyCode::Backspace => {
                self.input.pop();
                None
            }
            KeyCode::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_add(5);
                None
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(5);
                None
            }
            _ => None,
        }
    }

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
            }
            MouseEventKind::ScrollDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
            }
            _ => {}
        }
    }

    /// Build the fully wrapped transcript for the given column width.
    fn transcript_lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for message in &self.messages {
            let sender_style = if message.sender == "You" {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("[{}] ", message.timestamp),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("{}:", message.sender), sender_style),
            ]));

            let body = if message.is_streaming {
                format!("{}{}", message.content, STREAM_CURSOR)
            } else {
                message.content.clone()
            };
            for content_line in body.split('\n') {
                for wrapped in wrap_text(content_line, width) {
                    lines.push(render_line(&wrapped));
                }
            }
            lines.push(Line::from(""));
        }
        lines
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.render_transcript(frame, chunks[0]);
        self.render_input(frame, chunks[1]);
        self.render_status(frame, chunks[2]);
    }

    fn render_transcript(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", ASSISTANT_NAME));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let width = inner.width.max(1) as usize;
        let height = inner.height as usize;
        let lines = self.transcript_lines(width);
        let max_offset = lines.len().saturating_sub(height);

        // Clamp so scrolling past the top sticks to the first line
        self.scroll_offset = self.scroll_offset.min(max_offset);
        let start = max_offset - self.scroll_offset;

        let visible: Vec<Line> = lines.into_iter().skip(start).take(height).collect();
        frame.render_widget(Paragraph::new(visible), inner);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let style = if self.busy {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let input = Paragraph::new(self.input.as_str()).style(style).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Ask something... "),
        );
        frame.render_widget(input, area);

        if !self.busy {
            let cursor_x = area.x + 1 + self.input.chars().count() as u16;
            frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 1));
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let status = if self.busy {
            Line::from(vec![
                Span::styled(
                    format!(" {} ", SPINNER_FRAMES[self.spinner_frame]),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(
                    format!("{} is responding...", ASSISTANT_NAME),
                    Style::default().fg(Color::Yellow),
                ),
            ])
        } else {
            Line::from(Span::styled(
                " Enter: send · PgUp/PgDn: scroll · Ctrl+Q: quit",
                Style::default().fg(Color::DarkGray),
            ))
        };
        frame.render_widget(Paragraph::new(status), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crossterm::event::KeyModifiers;
    use palaver_client::ChunkKind;

    fn text_chunk(content: &str, is_final: bool) -> ResponseChunk {
        ResponseChunk {
            sequence: 0,
            content: content.to_string(),
            kind: ChunkKind::Text,
            is_final,
            timestamp: Utc::now(),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn chunks_grow_the_streaming_bubble() {
        let mut conversation = Conversation::new();
        conversation.push_user("hi");
        conversation.start_assistant();
        conversation.append_chunk(&text_chunk("Hel", false));
        conversation.append_chunk(&text_chunk("lo", false));

        let last = conversation.messages.last().unwrap();
        assert_eq!(last.content, "Hello");
        assert!(last.is_streaming);
    }

    #[test]
    fn final_chunk_closes_the_bubble() {
        let mut conversation = Conversation::new();
        conversation.start_assistant();
        conversation.append_chunk(&ResponseChunk {
            sequence: 0,
            content: String::new(),
            kind: ChunkKind::Complete,
            is_final: true,
            timestamp: Utc::now(),
        });
        assert!(!conversation.messages.last().unwrap().is_streaming);
    }

    #[test]
    fn enter_submits_and_clears_the_input() {
        let mut conversation = Conversation::new();
        for c in "hello".chars() {
            assert!(conversation.handle_key_event(key(KeyCode::Char(c))).is_none());
        }
        assert!(
            conversation
                .handle_key_event(key(KeyCode::Backspace))
                .is_none()
        );

        let event = conversation.handle_key_event(key(KeyCode::Enter));
        match event {
            Some(AppEvent::PromptSubmitted(prompt)) => assert_eq!(prompt, "hell"),
            other => panic!("expected PromptSubmitted, got {:?}", other),
        }
        assert!(conversation.input.is_empty());
    }

    #[test]
    fn busy_conversation_refuses_to_submit() {
        let mut conversation = Conversation::new();
        conversation.set_busy(true);
        assert!(conversation.handle_key_event(key(KeyCode::Char('x'))).is_none());
        assert!(conversation.handle_key_event(key(KeyCode::Enter)).is_none());
        // Typed text is kept for when the stream finishes
        assert_eq!(conversation.input, "x");
    }

    #[test]
    fn empty_input_is_not_submitted() {
        let mut conversation = Conversation::new();
        assert!(conversation.handle_key_event(key(KeyCode::Char(' '))).is_none());
        assert!(conversation.handle_key_event(key(KeyCode::Enter)).is_none());
    }

    #[test]
    fn wrap_text_breaks_at_word_boundaries() {
        let lines = wrap_text("the quick brown fox", 9);
        assert_eq!(lines, vec!["the quick", "brown fox"]);
    }

    #[test]
    fn wrap_text_hard_splits_long_words() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_text_keeps_empty_lines() {
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }
}
