//! Region picker: filter-as-you-type over code or country name

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::{rounded_block, Theme};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let picker = &app.region_picker;
    let current = app.session.region();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let (before, after) = picker.filter.split();
    let filter = Paragraph::new(format!("⌕ {}│{}", before, after))
        .style(Theme::input().fg(Theme::PRIMARY))
        .block(rounded_block(Theme::border_focused()).title(Span::styled(" COUNTRY ", Theme::title())));
    frame.render_widget(filter, chunks[0]);

    let block = rounded_block(Theme::border()).title(Span::styled(
        format!(" REGIONS · current {} ", current.code()),
        Theme::title(),
    ));
    let inner = block.inner(chunks[1]);
    frame.render_widget(block, chunks[1]);

    let matches = picker.matches();
    if matches.is_empty() {
        let none = Paragraph::new("No matching country")
            .style(Theme::dimmed())
            .alignment(Alignment::Center);
        frame.render_widget(none, inner);
        return;
    }

    let visible = inner.height as usize;
    let mut list = picker.list.clone();
    list.scroll_into_view(visible);
    let items: Vec<ListItem> = matches
        .iter()
        .enumerate()
        .skip(list.offset)
        .take(visible)
        .map(|(i, region)| {
            let style = if i == list.selected {
                Theme::list_item_selected()
            } else {
                Theme::list_item()
            };
            let marker = if *region == current { "●" } else { " " };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", marker), Theme::accent()),
                Span::styled(format!("{}  {}", region.code(), region.name()), style),
            ]))
        })
        .collect();
    frame.render_widget(List::new(items), inner);
}
