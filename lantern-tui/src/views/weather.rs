//! Weather dashboard: current conditions, the week ahead and precipitation
//! sparklines.

use chrono::Utc;
use lantern_core::Forecast;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Sparkline},
    Frame,
};

use crate::state::{App, WEATHER_FAILED};
use crate::text::relative_time;
use crate::theme::rain_chance_color;
use crate::views::render_message;

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let theme = &app.theme;
    let title = format!("Weather: {}", app.weather.city);

    if let Some(error) = &app.weather.error {
        render_message(f, area, &title, error, Style::default().fg(theme.error));
        return;
    }
    if app.weather.coordinates.is_none() {
        let message = format!("Looking up {}…", app.weather.city);
        render_message(f, area, &title, &message, Style::default().fg(theme.text_dim));
        return;
    }

    let state = app.weather.forecast_state();
    let Some(forecast) = state.data.as_ref() else {
        let (message, color) = if state.is_error() {
            (WEATHER_FAILED, theme.error)
        } else {
            ("Loading forecast…", theme.text_dim)
        };
        render_message(f, area, &title, message, Style::default().fg(color));
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(9),
            Constraint::Min(4),
            Constraint::Min(4),
        ])
        .split(area);

    let mut summary = vec![Span::styled(
        match forecast.current_temp {
            Some(temp) => format!("{temp:.0}°F now"),
            None => "No current reading".to_string(),
        },
        Style::default()
            .fg(theme.primary)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(updated) = state.updated_at {
        summary.push(Span::styled(
            format!("  updated {}", relative_time(updated, Utc::now())),
            Style::default().fg(theme.text_dim),
        ));
    }
    if state.is_error() {
        summary.push(Span::styled(
            "  (refresh failed, showing last forecast)",
            Style::default().fg(theme.warning),
        ));
    }
    let header = Paragraph::new(Line::from(summary)).block(
        Block::default()
            .title(format!(
                "{title} ({:.2}, {:.2})",
                forecast.coordinates.lat, forecast.coordinates.lon
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border_focus)),
    );
    f.render_widget(header, chunks[0]);

    f.render_widget(week_panel(app, forecast), chunks[1]);

    match &forecast.minutely {
        Some(minutely) => {
            let data: Vec<u64> = minutely
                .iter()
                .map(|m| (m.precipitation * 100.0).round().max(0.0) as u64)
                .collect();
            let sparkline = Sparkline::default()
                .block(
                    Block::default()
                        .title("Precipitation, next 60 minutes (hundredths of mm)")
                        .borders(Borders::ALL),
                )
                .data(&data)
                .style(Style::default().fg(theme.secondary));
            f.render_widget(sparkline, chunks[2]);
        }
        None => render_message(
            f,
            chunks[2],
            "Precipitation, next 60 minutes",
            "No minute-level data for this location.",
            Style::default().fg(theme.text_dim),
        ),
    }

    let pops: Vec<u64> = forecast
        .hourly
        .iter()
        .map(|h| (h.pop.clamp(0.0, 1.0) * 100.0).round() as u64)
        .collect();
    let peak = forecast.hourly.iter().map(|h| h.pop).fold(0.0, f64::max);
    let hourly = Sparkline::default()
        .block(
            Block::default()
                .title(format!("Chance of rain, hourly (peak {:.0}%)", peak * 100.0))
                .borders(Borders::ALL),
        )
        .data(&pops)
        .max(100)
        .style(Style::default().fg(rain_chance_color(peak, theme)));
    f.render_widget(hourly, chunks[3]);
}

fn week_panel<'a>(app: &App, forecast: &'a Forecast) -> Paragraph<'a> {
    let theme = &app.theme;
    let lines: Vec<Line> = forecast
        .week()
        .iter()
        .map(|day| {
            let mut spans = vec![
                Span::styled(
                    format!("{:<11}", day.dt.format("%a %b %d").to_string()),
                    Style::default().fg(theme.text),
                ),
                Span::styled(
                    format!("{:>4.0}° / {:<4.0}° ", day.temp_min, day.temp_max),
                    Style::default().fg(theme.tertiary),
                ),
                Span::styled(
                    format!("{} ({})", day.summary, day.description),
                    Style::default().fg(theme.text_dim),
                ),
            ];
            if let Some(rain) = day.rain {
                spans.push(Span::styled(
                    format!("  rain {rain:.1} mm"),
                    Style::default().fg(theme.secondary),
                ));
            }
            Line::from(spans)
        })
        .collect();
    Paragraph::new(lines).block(
        Block::default()
            .title("7-day forecast")
            .borders(Borders::ALL),
    )
}
