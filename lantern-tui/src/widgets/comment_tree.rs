//! Indented rendering of a resolved comment tree.
//!
//! Works from [`ResolvedTree::flatten`], so arbitrarily deep threads render
//! without recursion. Unresolved nodes show as loading and failed or deleted
//! ones as a placeholder; neither affects their siblings.

use chrono::{DateTime, Utc};
use lantern_core::Item;
use lantern_query::{NodeView, ResolvedTree};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::text::{html_to_text, relative_time};
use crate::theme::{depth_color, LanternTheme};

pub const UNAVAILABLE_PLACEHOLDER: &str = "[comment deleted or unavailable]";
pub const LOADING_PLACEHOLDER: &str = "Loading…";

const INDENT: &str = "│ ";

pub struct CommentTree<'a> {
    pub title: String,
    pub tree: &'a ResolvedTree<Item>,
    pub now: DateTime<Utc>,
    pub theme: &'a LanternTheme,
    pub scroll: u16,
}

impl<'a> CommentTree<'a> {
    pub fn lines(&self) -> Vec<Line<'static>> {
        let theme = self.theme;
        let mut lines = Vec::new();

        for node in self.tree.flatten() {
            let indent = INDENT.repeat(node.depth);
            let indent_style = Style::default().fg(theme.text_muted);
            match node.view {
                NodeView::Loading => lines.push(Line::from(vec![
                    Span::styled(indent, indent_style),
                    Span::styled(LOADING_PLACEHOLDER, Style::default().fg(theme.text_dim)),
                ])),
                NodeView::Unavailable => lines.push(Line::from(vec![
                    Span::styled(indent, indent_style),
                    Span::styled(
                        UNAVAILABLE_PLACEHOLDER,
                        Style::default()
                            .fg(theme.text_muted)
                            .add_modifier(Modifier::ITALIC),
                    ),
                ])),
                NodeView::Available { content, .. } => {
                    let (author, time, body) = match content {
                        Item::Comment(comment) => (
                            comment.author().to_string(),
                            comment.time,
                            comment.text.as_deref().map(html_to_text).unwrap_or_default(),
                        ),
                        Item::Story(story) => (story.by.clone(), story.time, story.title.clone()),
                        Item::Other { .. } => continue,
                    };
                    lines.push(Line::from(vec![
                        Span::styled(indent.clone(), indent_style),
                        Span::styled(
                            author,
                            Style::default()
                                .fg(depth_color(node.depth, theme))
                                .add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!(" · {}", relative_time(time, self.now)),
                            Style::default().fg(theme.text_dim),
                        ),
                    ]));
                    for text_line in body.lines() {
                        lines.push(Line::from(vec![
                            Span::styled(indent.clone(), indent_style),
                            Span::styled(text_line.to_string(), Style::default().fg(theme.text)),
                        ]));
                    }
                }
            }
            lines.push(Line::from(""));
        }
        lines
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let widget = Paragraph::new(Text::from(self.lines()))
            .block(
                Block::default()
                    .title(self.title.as_str())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.border)),
            )
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        f.render_widget(widget, area);
    }
}
