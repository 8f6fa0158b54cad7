//! Status bar: outcome badge, arena usage against its limit, keybindings

use crate::memory::Arena;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Outcome shown in the badge on the left of the status bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Ready,
    Success,
    Failure,
}

/// Live arena bytes against the arena limit
fn usage_label(arena: &Arena) -> String {
    format!("{}/{} B ", arena.live_bytes(), arena.limit())
}

pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    message: &str,
    kind: StatusKind,
    arena: &Arena,
) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let (badge, badge_color) = match kind {
        StatusKind::Ready => (" READY ", DEFAULT_THEME.primary),
        StatusKind::Success => (" OK ", DEFAULT_THEME.success),
        StatusKind::Failure => (" ERROR ", DEFAULT_THEME.error),
    };
    let bar = Style::default().bg(DEFAULT_THEME.current_line_bg);

    let left_spans = vec![
        Span::styled(
            badge,
            Style::default()
                .bg(badge_color)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", bar.fg(DEFAULT_THEME.comment)),
        Span::styled(
            format!(" {} ", message),
            bar.fg(if kind == StatusKind::Failure {
                DEFAULT_THEME.error
            } else {
                DEFAULT_THEME.fg
            }),
        ),
    ];
    frame.render_widget(
        Paragraph::new(Line::from(left_spans))
            .style(bar)
            .alignment(Alignment::Left),
        layout[0],
    );

    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = bar.fg(DEFAULT_THEME.fg);
    let sep_style = bar.fg(DEFAULT_THEME.comment);

    let mut right_spans = vec![Span::styled(usage_label(arena), sep_style)];
    for (key, desc) in [
        (" ↑/↓ ", " select "),
        (" ↵ ", " call "),
        (" r ", " main "),
        (" g ", " reset "),
        (" ⇥ ", " focus "),
        (" q ", " quit "),
    ] {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(Span::styled(key, key_style));
        right_spans.push(Span::styled(desc, desc_style));
    }

    frame.render_widget(
        Paragraph::new(Line::from(right_spans))
            .style(bar)
            .alignment(Alignment::Right),
        layout[1],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::BlockKind;

    #[test]
    fn test_usage_label_tracks_live_bytes() {
        let mut arena = Arena::new(64);
        assert_eq!(usage_label(&arena), "0/64 B ");
        let frame = arena.allocate(BlockKind::Frame(0), 24).unwrap();
        assert_eq!(usage_label(&arena), "24/64 B ");
        arena.release(frame);
        assert_eq!(usage_label(&arena), "0/64 B ");
    }
}
