//! Globals memory pane
//!
//! Each global gets a header row (`offset name: type = value`) followed by
//! its bytes as hex, 8 per row. Only scalar globals show a decoded value;
//! arrays and structs show bytes alone.

use crate::interpreter::Interpreter;
use crate::memory::Value;
use crate::sema::typed::GlobalVar;
use crate::ui::theme::{border_style, DEFAULT_THEME};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

const BYTES_PER_ROW: usize = 8;

/// Hex rows for a byte slice: `00 01 02 ...`
pub fn hex_rows(bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(BYTES_PER_ROW)
        .map(|row| {
            row.iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn decoded_value(interpreter: &Interpreter, global: &GlobalVar) -> Option<String> {
    if !global.ty.is_scalar() {
        return None;
    }
    Some(match interpreter.global_value(global) {
        Ok(Value::Int(n)) if global.ty.is_integer() && (32..127).contains(&n) => {
            format!("{} '{}'", n, n as u8 as char)
        }
        Ok(value) => value.to_string(),
        Err(e) => format!("<{}>", e),
    })
}

fn global_lines<'a>(interpreter: &Interpreter, global: &'a GlobalVar) -> Vec<Line<'a>> {
    let mut header = vec![
        Span::styled(
            format!("+{:<4} ", global.offset),
            Style::default().fg(DEFAULT_THEME.comment),
        ),
        Span::styled(
            global.name.as_str(),
            Style::default()
                .fg(DEFAULT_THEME.fg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(": "),
        Span::styled(
            global.ty.to_string(),
            Style::default().fg(DEFAULT_THEME.type_name),
        ),
    ];
    if let Some(value) = decoded_value(interpreter, global) {
        header.push(Span::raw(" = "));
        header.push(Span::styled(
            value,
            Style::default().fg(DEFAULT_THEME.return_value),
        ));
    }

    let mut lines = vec![Line::from(header)];
    let bytes = interpreter.global_bytes(global).unwrap_or_default();
    lines.extend(hex_rows(bytes).into_iter().map(|row| {
        Line::from(Span::styled(
            format!("      {}", row),
            Style::default().fg(DEFAULT_THEME.number),
        ))
    }));
    lines
}

/// Render the globals block, scrolled by `scroll_offset` rows
pub fn render_memory_pane(
    frame: &mut Frame,
    area: Rect,
    interpreter: &Interpreter,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let globals = &interpreter.program().globals;
    let title = format!(" Globals ({} bytes) ", interpreter.program().globals_size);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    if globals.is_empty() {
        let paragraph = Paragraph::new("(no globals)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let lines: Vec<Line> = globals
        .iter()
        .flat_map(|g| global_lines(interpreter, g))
        .collect();

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll_offset = (*scroll_offset).min(lines.len().saturating_sub(visible_height));

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    let paragraph = Paragraph::new(visible).block(block.padding(Padding::new(1, 0, 0, 0)));
    frame.render_widget(paragraph, area);
}
