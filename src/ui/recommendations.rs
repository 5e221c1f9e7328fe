//! Recommendations view: the source title on top, similar titles below

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::{placeholder, rounded_block, title_item, Theme};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let state = app.session.recommendations();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let source = state
        .data
        .as_ref()
        .map(|r| r.source.to_string())
        .unwrap_or_else(|| "…".to_string());
    let header = Paragraph::new(Line::from(vec![
        Span::styled("Because you looked at ", Theme::dimmed()),
        Span::styled(source, Theme::accent()),
    ]))
    .alignment(Alignment::Center)
    .block(rounded_block(Theme::border()));
    frame.render_widget(header, chunks[0]);

    let block = rounded_block(Theme::border()).title(Span::styled(" ✦ SIMILAR TITLES ", Theme::title()));
    let inner = block.inner(chunks[1]);
    frame.render_widget(block, chunks[1]);

    if let Some(message) = placeholder(state, "Nothing to recommend") {
        frame.render_widget(message, inner);
        return;
    }

    let titles = app.recommended_titles();
    if titles.is_empty() {
        let none = Paragraph::new("No similar titles found")
            .style(Theme::dimmed())
            .alignment(Alignment::Center);
        frame.render_widget(none, inner);
        return;
    }

    let visible = inner.height as usize;
    let mut list = app.recommendations_list.clone();
    list.scroll_into_view(visible);
    let items: Vec<ListItem> = titles
        .iter()
        .enumerate()
        .skip(list.offset)
        .take(visible)
        .map(|(i, t)| title_item(t, i == list.selected))
        .collect();
    frame.render_widget(List::new(items), inner);
}
