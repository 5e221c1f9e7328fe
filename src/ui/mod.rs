//! Terminal UI components
//!
//! Built with ratatui. Views only read `App` and the controller state it
//! owns; all mutation happens in key handling and `App::tick`.

pub mod detail;
pub mod home;
pub mod recommendations;
pub mod region;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, AppState, InputMode};
use crate::models::TitleSummary;
use crate::session::{ChannelState, Status};

/// Main render function - dispatches to view-specific renderers
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(Style::default().bg(Theme::BACKGROUND)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_header(frame, chunks[0], app);
    match app.state {
        AppState::Home => home::render(frame, chunks[1], app),
        AppState::Detail => detail::render(frame, chunks[1], app),
        AppState::Recommendations => recommendations::render(frame, chunks[1], app),
        AppState::RegionPicker => region::render(frame, chunks[1], app),
    }
    render_status_bar(frame, chunks[2], app);

    if let Some(ref error) = app.error {
        render_error_popup(frame, area, error);
    }
}

/// Logo, search box and current region
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(14), // Logo
            Constraint::Min(1),     // Search box
            Constraint::Length(22), // Region
        ])
        .split(area);

    let logo = Paragraph::new(Line::from(vec![
        Span::styled(
            "CINE",
            Style::default()
                .fg(Theme::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "GRAPH",
            Style::default()
                .fg(Theme::SECONDARY)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(rounded_block(Theme::border()));
    frame.render_widget(logo, header_chunks[0]);

    let editing = app.input_mode == InputMode::Editing && app.state == AppState::Home;
    let search_text = if editing {
        let (before, after) = app.search.split();
        format!("⌕ {}│{}", before, after)
    } else if app.search.text.is_empty() {
        "⌕ Type / to search...".to_string()
    } else {
        format!("⌕ {}", app.search.text)
    };
    let search_box = Paragraph::new(search_text)
        .style(if editing {
            Theme::input().fg(Theme::PRIMARY)
        } else {
            Theme::input()
        })
        .block(
            rounded_block(if editing {
                Theme::border_focused()
            } else {
                Theme::border()
            })
            .title(Span::styled(" SEARCH ", Theme::title())),
        );
    frame.render_widget(search_box, header_chunks[1]);

    let region = app.session.region();
    let region_box = Paragraph::new(Line::from(vec![
        Span::styled(region.code(), Theme::accent()),
        Span::raw(" "),
        Span::styled(region.name(), Theme::dimmed()),
    ]))
    .alignment(Alignment::Center)
    .block(rounded_block(Theme::border()).title(Span::styled(" REGION ", Theme::title())));
    frame.render_widget(region_box, header_chunks[2]);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mode_indicator = match app.input_mode {
        InputMode::Normal => Span::styled(
            " NORMAL ",
            Style::default().fg(Theme::BACKGROUND).bg(Theme::PRIMARY),
        ),
        InputMode::Editing => Span::styled(
            " INSERT ",
            Style::default().fg(Theme::BACKGROUND).bg(Theme::ACCENT),
        ),
    };

    let busy = if app.session.is_busy() {
        Span::styled(" ⟳ ", Theme::loading())
    } else {
        Span::raw("   ")
    };

    let help = match app.state {
        AppState::Home => " /:search  ↵:open  c:region  R:refresh  q:quit ",
        AppState::Detail => " r:similar  c:region  ↵:retry  ESC:back ",
        AppState::Recommendations => " ↑↓:move  ↵:open  ESC:back ",
        AppState::RegionPicker => " type to filter  ↵:select  ESC:cancel ",
    };

    let status_line = Line::from(vec![
        mode_indicator,
        busy,
        Span::styled(help, Theme::dimmed()),
    ]);
    frame.render_widget(Paragraph::new(status_line).style(Theme::status_bar()), area);
}

fn render_error_popup(frame: &mut Frame, area: Rect, error: &str) {
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 5;

    let popup_area = Rect {
        x: area.x + (area.width.saturating_sub(popup_width)) / 2,
        y: area.y + (area.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let error_block = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(error, Theme::error())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Theme::error())
            .title(Span::styled(" ✗ ERROR ", Theme::error()))
            .style(Style::default().bg(Theme::BACKGROUND)),
    );

    frame.render_widget(error_block, popup_area);
}

// =============================================================================
// Shared widgets
// =============================================================================

pub(crate) fn rounded_block<'a>(border: Style) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
}

/// One-line list entry: title, year, rating
pub(crate) fn title_item(title: &TitleSummary, selected: bool) -> ListItem<'static> {
    let mut spans = vec![Span::styled(
        format!(" {}", title.title),
        if selected {
            Theme::list_item_selected()
        } else {
            Theme::list_item()
        },
    )];
    if let Some(year) = title.year() {
        spans.push(Span::styled(format!(" ({})", year), Theme::year()));
    }
    if let Some(rating) = title.vote_average.filter(|r| *r > 0.0) {
        spans.push(Span::styled(format!("  ★ {:.1}", rating), Theme::rating(rating)));
    }
    ListItem::new(Line::from(spans))
}

/// Centered message for a channel that has nothing to list yet
pub(crate) fn placeholder<T>(state: &ChannelState<T>, empty: &str) -> Option<Paragraph<'static>> {
    let (text, style) = match state.status {
        Status::Loading if state.data.is_none() => ("⟳ Loading...".to_string(), Theme::loading()),
        Status::Error => (
            state
                .error
                .as_ref()
                .map(|e| format!("✗ {}", e))
                .unwrap_or_else(|| "✗ Request failed".into()),
            Theme::error(),
        ),
        Status::Idle if state.data.is_none() => (empty.to_string(), Theme::dimmed()),
        _ => return None,
    };
    Some(Paragraph::new(text).style(style).alignment(Alignment::Center))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ErrorInfo, ErrorKind};

    #[test]
    fn test_placeholder_follows_status() {
        let idle: ChannelState<Vec<u8>> = ChannelState::default();
        assert!(placeholder(&idle, "nothing").is_some());

        let loaded = ChannelState {
            status: Status::Success,
            data: Some(vec![1u8]),
            error: None,
        };
        assert!(placeholder(&loaded, "nothing").is_none());

        let refreshing = ChannelState {
            status: Status::Loading,
            data: Some(vec![1u8]),
            error: None,
        };
        assert!(placeholder(&refreshing, "nothing").is_none());

        let failed: ChannelState<Vec<u8>> = ChannelState {
            status: Status::Error,
            data: None,
            error: Some(ErrorInfo {
                kind: ErrorKind::Network,
                message: "HTTP 502".into(),
            }),
        };
        assert!(placeholder(&failed, "nothing").is_some());
    }
}
