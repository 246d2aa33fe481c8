//! Shared counter.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::state::App;

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let theme = &app.theme;
    let counter = &app.counter;

    let mut lines = match counter.state {
        Some(state) => vec![
            Line::from(Span::styled(
                format!("Count: {}", state.count),
                Style::default()
                    .fg(theme.primary)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("Step: {}", state.step),
                Style::default().fg(theme.secondary),
            )),
        ],
        None if counter.busy => vec![Line::from(Span::styled(
            "Loading…",
            Style::default().fg(theme.text_dim),
        ))],
        None => vec![Line::from(Span::styled(
            "Counter unavailable",
            Style::default().fg(theme.text_muted),
        ))],
    };

    lines.push(Line::from(""));
    if counter.busy && counter.state.is_some() {
        lines.push(Line::from(Span::styled(
            "Saving…",
            Style::default().fg(theme.text_dim),
        )));
    }
    if let Some(error) = &counter.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(theme.error),
        )));
    }

    let widget = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .title("Counter")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border_focus)),
    );
    f.render_widget(widget, area);
}
