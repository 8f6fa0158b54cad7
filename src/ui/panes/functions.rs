//! Function list pane
//!
//! One row per defined function, rendered as its C signature. Functions
//! without parameters can be invoked from the explorer and are marked `▸`.

use crate::sema::typed::Function;
use crate::ui::theme::{border_style, DEFAULT_THEME};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// `int f(char *s, int n)`
pub fn signature(function: &Function) -> String {
    let params = if function.params.is_empty() {
        String::new()
    } else {
        function
            .params
            .iter()
            .map(|p| format!("{} {}", p.ty, p.name))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("{} {}({})", function.return_type, function.name, params)
}

/// Render the function list with the selected row highlighted
pub fn render_functions_pane(
    frame: &mut Frame,
    area: Rect,
    functions: &[Function],
    selected: usize,
    is_focused: bool,
) {
    let block = Block::default()
        .title(" Functions ")
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    if functions.is_empty() {
        let paragraph = Paragraph::new("(no functions)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let offset = (selected + 1).saturating_sub(visible_height);

    let items: Vec<ListItem> = functions
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible_height)
        .map(|(idx, function)| {
            let callable = function.params.is_empty();
            let marker = if callable { "▸ " } else { "  " };
            let mut style = Style::default().fg(if callable {
                DEFAULT_THEME.function
            } else {
                DEFAULT_THEME.comment
            });
            if idx == selected {
                style = style
                    .bg(DEFAULT_THEME.current_line_bg)
                    .add_modifier(Modifier::BOLD);
            }
            ListItem::new(Line::from(vec![
                Span::styled(marker, style),
                Span::styled(signature(function), style),
            ]))
        })
        .collect();

    let list = List::new(items).block(block.padding(Padding::new(1, 0, 0, 0)));
    frame.render_widget(list, area);
}
