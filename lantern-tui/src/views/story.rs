//! Story detail with its comment tree.

use chrono::Utc;
use lantern_core::Story;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    Frame,
};

use crate::state::{App, StoryDetailState, StoryStatus, INVALID_STORY_ID};
use crate::text::{html_to_text, relative_time};
use crate::views::render_message;
use crate::widgets::{CommentTree, DetailPanel};

pub const NO_COMMENTS: &str = "No comments yet.";

pub fn render(f: &mut Frame<'_>, app: &App, detail: &StoryDetailState, area: Rect) {
    let theme = &app.theme;
    match &detail.status {
        StoryStatus::InvalidId(_) => {
            render_message(f, area, "Story", INVALID_STORY_ID, Style::default().fg(theme.error))
        }
        StoryStatus::Loading => {
            render_message(f, area, "Story", "Loading…", Style::default().fg(theme.text_dim))
        }
        StoryStatus::NotFound => {
            render_message(f, area, "Story", "Story not found.", Style::default().fg(theme.warning))
        }
        StoryStatus::Failed(reason) => render_message(
            f,
            area,
            "Story",
            &format!("Could not load story: {reason}"),
            Style::default().fg(theme.error),
        ),
        StoryStatus::Loaded(story) => render_story(f, app, detail, story, area),
    }
}

fn render_story(f: &mut Frame<'_>, app: &App, detail: &StoryDetailState, story: &Story, area: Rect) {
    let theme = &app.theme;
    let now = Utc::now();

    let panel = DetailPanel::new(&story.title)
        .field("Author", story.by.clone())
        .field("Score", story.score.to_string())
        .field("Posted", relative_time(story.time, now))
        .field("Comments", story.descendants.to_string())
        .optional_field("URL", story.url.clone())
        .optional_field("Text", story.text.as_deref().map(html_to_text))
        .label_style(Style::default().fg(theme.secondary))
        .border_style(Style::default().fg(theme.border_focus));

    let header_height = panel.height().min(area.height / 2).max(3);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(header_height), Constraint::Min(0)])
        .split(area);
    panel.render(f, chunks[0]);

    if story.kids.is_empty() {
        render_message(f, chunks[1], "Comments", NO_COMMENTS, Style::default().fg(theme.text_dim));
        return;
    }

    let tree = app.queries.comment_snapshot(&story.kids);
    let title = if detail.comments_settled {
        format!("Comments ({})", story.descendants)
    } else {
        format!("Comments ({}) loading…", story.descendants)
    };
    CommentTree {
        title,
        tree: &tree,
        now,
        theme,
        scroll: detail.scroll,
    }
    .render(f, chunks[1]);
}
