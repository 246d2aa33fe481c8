//! Detail panel widget for showing field/value pairs.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub struct DetailPanel<'a> {
    pub title: &'a str,
    pub fields: Vec<(&'a str, String)>,
    pub label_style: Style,
    pub border_style: Style,
}

impl<'a> DetailPanel<'a> {
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            fields: Vec::new(),
            label_style: Style::default(),
            border_style: Style::default(),
        }
    }

    pub fn field(mut self, label: &'a str, value: impl Into<String>) -> Self {
        self.fields.push((label, value.into()));
        self
    }

    /// Add the field only when `value` is present.
    pub fn optional_field(self, label: &'a str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.field(label, value),
            None => self,
        }
    }

    pub fn label_style(mut self, style: Style) -> Self {
        self.label_style = style;
        self
    }

    pub fn border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }

    /// Rows needed to show every field unwrapped, borders included.
    pub fn height(&self) -> u16 {
        u16::try_from(self.fields.len()).unwrap_or(u16::MAX).saturating_add(2)
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let lines: Vec<Line> = self
            .fields
            .iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!("{}: ", label), self.label_style),
                    Span::raw(value.clone()),
                ])
            })
            .collect();

        let widget = Paragraph::new(Text::from(lines))
            .block(
                Block::default()
                    .title(self.title)
                    .borders(Borders::ALL)
                    .border_style(self.border_style),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(widget, area);
    }
}
