//! Detail view
//!
//! Title metadata on top, availability for the current region grouped by
//! offer category below. Rendered from `DetailView`, so nothing is shown as
//! ready until both halves have settled.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::models::{OfferCategory, StreamingAvailability, Title};
use crate::session::{AvailabilityView, DetailView};
use crate::ui::{rounded_block, Theme};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    match app.session.detail() {
        DetailView::Closed => {}
        DetailView::Loading => {
            let block = rounded_block(Theme::border());
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let loading = Paragraph::new("⟳ Loading title...")
                .style(Theme::loading())
                .alignment(Alignment::Center);
            frame.render_widget(loading, inner);
        }
        DetailView::Failed(error) => {
            let block = rounded_block(Theme::error());
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let message = error
                .map(|e| e.message.as_str())
                .unwrap_or("Could not load this title");
            let failed = Paragraph::new(vec![
                Line::from(Span::styled(format!("✗ {}", message), Theme::error())),
                Line::from(""),
                Line::from(Span::styled("↵ retry   ESC back", Theme::dimmed())),
            ])
            .alignment(Alignment::Center);
            frame.render_widget(failed, inner);
        }
        DetailView::Ready {
            title,
            availability,
        } => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(6), Constraint::Length(8)])
                .split(area);
            render_title(frame, chunks[0], title);
            render_availability(frame, chunks[1], &availability);
        }
    }
}

fn render_title(frame: &mut Frame, area: Rect, title: &Title) {
    let block = rounded_block(Theme::border()).title(Span::styled(
        format!(" {} ", title.title.to_uppercase()),
        Theme::title(),
    ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut meta = Vec::new();
    if let Some(year) = title.year() {
        meta.push(Span::styled(year.to_string(), Theme::year()));
    }
    if let Some(runtime) = title.runtime.filter(|r| *r > 0) {
        meta.push(Span::styled(
            format!("  {}h {}m", runtime / 60, runtime % 60),
            Theme::dimmed(),
        ));
    }
    if let Some(rating) = title.rating().filter(|r| *r > 0.0) {
        meta.push(Span::styled(format!("  ★ {:.1}", rating), Theme::rating(rating)));
    }

    let mut lines = vec![Line::from(meta)];
    let genres = title.genre_names();
    if !genres.is_empty() {
        lines.push(Line::from(Span::styled(genres.join(" · "), Theme::genre())));
    }
    if let Some(tagline) = title.tagline.as_deref().filter(|t| !t.is_empty()) {
        lines.push(Line::from(Span::styled(format!("\"{}\"", tagline), Theme::accent())));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        title.overview.clone().unwrap_or_default(),
        Theme::text(),
    )));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn render_availability(frame: &mut Frame, area: Rect, availability: &AvailabilityView<'_>) {
    let region = match availability {
        AvailabilityView::Available(a) => a.region,
        AvailabilityView::Unavailable { region, .. } => *region,
    };
    let block = rounded_block(Theme::border()).title(Span::styled(
        format!(" WHERE TO WATCH · {} ", region.name().to_uppercase()),
        Theme::title(),
    ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = match availability {
        AvailabilityView::Available(a) => offer_lines(a),
        AvailabilityView::Unavailable { .. } => vec![Line::from(Span::styled(
            "Availability data is unavailable right now",
            Theme::warning(),
        ))],
    };
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

/// One line per offer category that has providers
pub fn offer_lines(availability: &StreamingAvailability) -> Vec<Line<'static>> {
    if availability.is_empty() {
        return vec![Line::from(Span::styled(
            format!("Not available to stream, rent or buy in {}", availability.region.name()),
            Theme::dimmed(),
        ))];
    }
    let mut lines: Vec<Line> = OfferCategory::ALL
        .iter()
        .filter(|c| !availability.offers(**c).is_empty())
        .map(|c| {
            let names: Vec<&str> = availability
                .offers(*c)
                .iter()
                .map(|o| o.provider_name.as_str())
                .collect();
            Line::from(vec![
                Span::styled(format!("{:<7}", c.to_string()), Theme::offer_category(*c)),
                Span::styled(names.join(", "), Theme::text()),
            ])
        })
        .collect();
    if let Some(link) = &availability.external_link {
        lines.push(Line::from(Span::styled(link.clone(), Theme::dimmed())));
    }
    lines
}
