//! Top stories list with "load more".

use chrono::Utc;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::state::App;
use crate::text::relative_time;

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let theme = &app.theme;
    let stories = app.story_items();
    let now = Utc::now();

    let mut rows: Vec<ListItem> = stories
        .iter()
        .enumerate()
        .map(|(i, story)| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("{:>3}. ", i + 1), Style::default().fg(theme.text_dim)),
                    Span::styled(story.title.clone(), Style::default().fg(theme.text)),
                ]),
                Line::from(Span::styled(
                    format!(
                        "     {} points by {} {} | {} comments",
                        story.score,
                        story.by,
                        relative_time(story.time, now),
                        story.descendants
                    ),
                    Style::default().fg(theme.text_dim),
                )),
            ])
        })
        .collect();

    let has_more = app.queries.stories().has_next_page().unwrap_or(false);
    let status = if let Some(error) = &app.stories.error {
        Span::styled(format!("Error: {error}"), Style::default().fg(theme.error))
    } else if app.stories.loading || app.queries.stories().is_fetching_next_page() {
        Span::styled("Loading more…", Style::default().fg(theme.text_dim))
    } else if has_more {
        Span::styled("Load more (m)", Style::default().fg(theme.secondary))
    } else {
        Span::styled("Nothing more to load", Style::default().fg(theme.text_muted))
    };
    rows.push(ListItem::new(Line::from(status)));

    let title = format!("Top Stories ({})", stories.len());
    let list = List::new(rows)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border_focus)),
        )
        .highlight_style(
            Style::default()
                .bg(theme.bg_highlight)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !stories.is_empty() {
        state.select(Some(app.stories.selected.min(stories.len() - 1)));
    }
    f.render_stateful_widget(list, area, &mut state);
}
