use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use glint_core::page::style;
use glint_core::Page;

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;

        let status_text = if let Some(msg) = &app.status_message {
            format!(" {}", msg)
        } else {
            Self::summary(app)
        };

        let help_hint = " q:quit j/k:scroll Tab/Enter:links m:menu o:logo t:tilt ?:help ";
        let padding_len = area
            .width
            .saturating_sub(status_text.chars().count() as u16 + help_hint.len() as u16)
            as usize;

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }

    /// Engine state at a glance
    pub fn summary(app: &App) -> String {
        let scroll_state = app.engine.scroll_state();
        let navbar = match (scroll_state.is_scrolled(), scroll_state.is_hidden()) {
            (true, true) => "scrolled, hidden",
            (true, false) => "scrolled",
            (false, true) => "hidden",
            (false, false) => "top",
        };

        let run = match app.engine.driver().target() {
            Some(target) => format!("-> {}", style::px(target)),
            None => "idle".to_string(),
        };

        let revealer = app.engine.revealer();
        format!(
            " y {} | navbar {} | scroll {} | revealed {}/{} | menu {:?} | tasks {} | confetti {}",
            style::px(app.page.scroll_y()),
            navbar,
            run,
            revealer.revealed().len(),
            revealer.sections().len(),
            app.engine.menu().state(),
            app.engine.tasks().len(),
            app.engine.easter_eggs().confetti().len(),
        )
    }
}
