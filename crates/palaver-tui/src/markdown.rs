//! Lightweight markdown styling for transcript bubbles.
//!
//! Handles the subset the relay actually produces: headings, bullet
//! lists, and inline bold/italic/code runs. Anything else passes through
//! as plain text.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Render one line of markdown-ish text into styled spans.
pub fn render_line(line: &str) -> Line<'static> {
    let trimmed = line.trim_start();
    let indent = line.len() - trimmed.len();

    if let Some(level) = heading_level(trimmed) {
        let text = trimmed.trim_start_matches('#').trim_start();
        let style = heading_style(level);
        return Line::from(Span::styled(
            format!("{} {}", "#".repeat(level), text),
            style,
        ));
    }

    if let Some(rest) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        let mut spans = vec![
            Span::raw(" ".repeat(indent)),
            Span::styled("• ", Style::default().fg(Color::Blue)),
        ];
        spans.extend(inline_spans(rest));
        return Line::from(spans);
    }

    Line::from(inline_spans(line))
}

fn heading_level(line: &str) -> Option<usize> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&level) && line.chars().nth(level).is_none_or(|c| c.is_whitespace()) {
        Some(level)
    } else {
        None
    }
}

fn heading_style(level: usize) -> Style {
    let color = match level {
        1 => Color::Blue,
        2 => Color::Cyan,
        3 => Color::Green,
        _ => Color::Yellow,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Scan a line for inline `code`, **bold** and *italic* runs.
fn inline_spans(text: &str) -> Vec<Span<'static>> {
    fn flush(plain: &mut String, spans: &mut Vec<Span<'static>>) {
        if !plain.is_empty() {
            spans.push(Span::raw(std::mem::take(plain)));
        }
    }

    let chars: Vec<char> = text.chars().collect();
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '`' {
            if let Some(end) = find_char(&chars, i + 1, '`') {
                flush(&mut plain, &mut spans);
                let inner: String = chars[i + 1..end].iter().collect();
                spans.push(Span::styled(
                    inner,
                    Style::default().bg(Color::DarkGray).fg(Color::White),
                ));
                i = end + 1;
                continue;
            }
        }
        if chars[i] == '*' && chars.get(i + 1) == Some(&'*') {
            if let Some(end) = find_double_star(&chars, i + 2) {
                flush(&mut plain, &mut spans);
                let inner: String = chars[i + 2..end].iter().collect();
                spans.push(Span::styled(
                    inner,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                i = end + 2;
                continue;
            }
        }
        if chars[i] == '*' {
            if let Some(end) = find_char(&chars, i + 1, '*') {
                flush(&mut plain, &mut spans);
                let inner: String = chars[i + 1..end].iter().collect();
                spans.push(Span::styled(
                    inner,
                    Style::default().add_modifier(Modifier::ITALIC),
                ));
                i = end + 1;
                continue;
            }
        }
        plain.push(chars[i]);
        i += 1;
    }

    flush(&mut plain, &mut spans);
    if spans.is_empty() {
        spans.push(Span::raw(String::new()));
    }
    spans
}

fn find_char(chars: &[char], from: usize, needle: char) -> Option<usize> {
    chars
        .get(from..)?
        .iter()
        .position(|&c| c == needle)
        .map(|p| from + p)
}

fn find_double_star(chars: &[char], from: usize) -> Option<usize> {
    let mut i = from;
    while i + 1 < chars.len() {
        if chars[i] == '*' && chars[i + 1] == '*' {
            return Some(i);
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn plain_text_passes_through() {
        let line = render_line("just a sentence");
        assert_eq!(line_text(&line), "just a sentence");
    }

    #[test]
    fn headings_keep_their_marker() {
        let line = render_line("## Section");
        assert_eq!(line_text(&line), "## Section");
        assert_eq!(line.spans.len(), 1);
    }

    #[test]
    fn bullets_become_dots() {
        let line = render_line("- item one");
        assert_eq!(line_text(&line), "• item one");
    }

    #[test]
    fn inline_code_gets_its_own_span() {
        let line = render_line("run `cargo` now");
        let texts: Vec<String> = line.spans.iter().map(|s| s.content.to_string()).collect();
        assert_eq!(texts, vec!["run ", "cargo", " now"]);
    }

    #[test]
    fn bold_and_italic_are_split_out() {
        let line = render_line("a **bold** and *soft* word");
        let texts: Vec<String> = line.spans.iter().map(|s| s.content.to_string()).collect();
        assert_eq!(texts, vec!["a ", "bold", " and ", "soft", " word"]);
    }

    #[test]
    fn unclosed_markers_stay_literal() {
        let line = render_line("2 * 3 = 6");
        assert_eq!(line_text(&line), "2 * 3 = 6");
    }
}
