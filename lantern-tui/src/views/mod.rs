//! View rendering dispatch.

pub mod counter;
pub mod stories;
pub mod story;
pub mod weather;

use crate::nav::View;
use crate::state::App;
use crate::theme::notification_color;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    match app.active_view {
        View::Stories => match &app.detail {
            Some(detail) => story::render(f, app, detail, layout[1]),
            None => stories::render(f, app, layout[1]),
        },
        View::Weather => weather::render(f, app, layout[1]),
        View::Counter => counter::render(f, app, layout[1]),
    }

    render_footer(f, app, layout[2]);
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let titles: Vec<Line> = View::all()
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!("{} {}", i + 1, view.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.active_view.index())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Lantern")
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(Style::default().fg(app.theme.text_dim))
        .highlight_style(
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, area);
}

fn help_text(app: &App) -> &'static str {
    match app.active_view {
        View::Stories if app.detail.is_some() => "j/k scroll • Esc back • r refresh • : go to • q quit",
        View::Stories => "j/k move • Enter open • m load more • r reload • : go to • q quit",
        View::Weather => "c change city • r refresh • Tab switch view • q quit",
        View::Counter => "+/- apply step • [/] change step • r refresh • q quit",
    }
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let (text, style) = if let Some(prompt) = &app.prompt {
        (
            format!("{}: {}_", prompt.label(), prompt.input),
            Style::default().fg(app.theme.text),
        )
    } else if let Some(note) = app.notifications.last() {
        (
            format!("{}: {}", note.level.label(), note.message),
            Style::default().fg(notification_color(note.level, &app.theme)),
        )
    } else {
        (help_text(app).to_string(), Style::default().fg(app.theme.text_dim))
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}

/// A bordered, centered message filling `area`.
pub(crate) fn render_message(f: &mut Frame<'_>, area: Rect, title: &str, message: &str, style: Style) {
    let widget = Paragraph::new(message)
        .style(style)
        .block(Block::default().title(title).borders(Borders::ALL))
        .alignment(ratatui::layout::Alignment::Center);
    f.render_widget(widget, area);
}
