//! Home view
//!
//! Live search results while the box holds a query, trending otherwise.

use ratatui::{
    layout::{Alignment, Rect},
    text::Span,
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::{placeholder, rounded_block, title_item, Theme};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let (heading, state, empty) = if app.is_searching() {
        (
            format!(" RESULTS FOR \"{}\" ", app.search.text.trim()),
            app.session.search(),
            "Waiting for you to stop typing...",
        )
    } else {
        (
            " ⚡ TRENDING THIS WEEK ".to_string(),
            app.session.trending(),
            "Nothing trending yet",
        )
    };

    let block = rounded_block(Theme::border()).title(Span::styled(heading, Theme::title()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(message) = placeholder(state, empty) {
        frame.render_widget(message, inner);
        return;
    }

    let titles = app.home_titles();
    if titles.is_empty() {
        let none = Paragraph::new("No results found")
            .style(Theme::dimmed())
            .alignment(Alignment::Center);
        frame.render_widget(none, inner);
        return;
    }

    let visible = inner.height as usize;
    let mut list = app.home_list.clone();
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
