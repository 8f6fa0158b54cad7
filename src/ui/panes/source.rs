//! Source code pane rendering with syntax highlighting
//!
//! Shows the loaded program with line numbers. One line can be marked: the
//! definition of the selected function, or the line a failed call stopped on.
//! The marked line is kept at a fixed visual row while the selection moves;
//! Up/Down on the focused pane shift that row.

use crate::ui::theme::{border_style, DEFAULT_THEME};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Which line to mark, and why
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMark {
    /// Definition of the selected function
    Selected(usize),
    /// Location of the last runtime error
    Error(usize),
}

impl LineMark {
    pub fn line(self) -> usize {
        match self {
            LineMark::Selected(line) | LineMark::Error(line) => line,
        }
    }
}

/// Scroll state for the source pane
#[derive(Debug, Default)]
pub struct SourceScrollState {
    pub offset: usize,
    /// Visual row of the marked line; centered on first render
    pub target_line_row: Option<usize>,
}

/// Split a line into styled spans. Works per line, so block comments that
/// span lines are only recognized on their first line.
fn highlight_source_code(line: &str) -> Line<'_> {
    let mut spans = Vec::new();
    let bytes = line.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];

        if line[i..].starts_with("//") || line[i..].starts_with("/*") {
            spans.push(Span::styled(
                &line[i..],
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            break;
        }

        if c == b'"' || c == b'\'' {
            let mut end = i + 1;
            while end < bytes.len() && bytes[end] != c {
                end += if bytes[end] == b'\\' { 2 } else { 1 };
            }
            let end = (end + 1).min(bytes.len());
            spans.push(Span::styled(
                &line[i..end],
                Style::default().fg(DEFAULT_THEME.string),
            ));
            i = end;
            continue;
        }

        if c.is_ascii_alphanumeric() || c == b'_' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            let word = &line[start..i];
            let is_call = line[i..].trim_start().starts_with('(');
            spans.push(Span::styled(word, word_style(word, is_call)));
            continue;
        }

        let style = match c {
            b'{' | b'}' | b'(' | b')' | b'[' | b']' => Style::default().fg(DEFAULT_THEME.primary),
            _ => Style::default().fg(DEFAULT_THEME.fg),
        };
        // Advance by whole characters so non-ASCII text stays intact
        let width = line[i..].chars().next().map_or(1, char::len_utf8);
        spans.push(Span::styled(&line[i..i + width], style));
        i += width;
    }

    Line::from(spans)
}

fn word_style(word: &str, is_call: bool) -> Style {
    match word {
        "int" | "char" | "void" => Style::default().fg(DEFAULT_THEME.type_name),
        "struct" | "return" | "if" | "else" | "while" | "for" | "sizeof" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        w if w.starts_with(|c: char| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ if is_call => Style::default().fg(DEFAULT_THEME.function),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Render the source code pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source_code: &str,
    mark: Option<LineMark>,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let block = Block::default()
        .title(" Source Code ")
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let lines: Vec<&str> = source_code.lines().collect();
    let total_lines = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    if let Some(line) = mark.map(LineMark::line).filter(|l| (1..=total_lines).contains(l)) {
        scroll_state.offset = (line - 1).saturating_sub(target_row);
    }
    scroll_state.offset = scroll_state
        .offset
        .min(total_lines.saturating_sub(visible_height));

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let number = format!("{:4} ", line_num);
            let mut content = highlight_source_code(line);

            let number_style = match mark {
                Some(LineMark::Error(l)) if l == line_num => {
                    let error_style = Style::default()
                        .bg(DEFAULT_THEME.error)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD);
                    for span in &mut content.spans {
                        span.style = error_style;
                    }
                    Style::default()
                        .fg(DEFAULT_THEME.error)
                        .add_modifier(Modifier::BOLD)
                }
                Some(LineMark::Selected(l)) if l == line_num => {
                    let background = Style::default().bg(DEFAULT_THEME.current_line_bg);
                    for span in &mut content.spans {
                        span.style = span.style.patch(background);
                    }
                    Style::default()
                        .fg(DEFAULT_THEME.secondary)
                        .add_modifier(Modifier::BOLD)
                }
                _ => Style::default().fg(DEFAULT_THEME.comment),
            };

            let mut spans = vec![Span::styled(number, number_style)];
            spans.extend(content.spans);
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines).block(block), area);
}
