use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::app::App;

pub struct MutationLogWidget;

impl MutationLogWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let block = Block::default()
            .title(format!(" Mutations ({}) ", app.log.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.grey0))
            .style(Style::default().bg(theme.bg1));

        // Newest entries at the bottom, as many as fit
        let rows = area.height.saturating_sub(2) as usize;
        let skip = app.log.len().saturating_sub(rows);
        let items: Vec<ListItem> = app
            .log
            .iter()
            .skip(skip)
            .map(|entry| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:>7.0} ", entry.at_ms), Style::default().fg(theme.grey1)),
                    Span::styled(app.page.describe(&entry.mutation), Style::default().fg(theme.fg0)),
                ]))
            })
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }
}
