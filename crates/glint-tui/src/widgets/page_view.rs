use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use glint_core::page::style;
use glint_core::{ElementId, Page};

use crate::app::App;

/// Classes the engine adds that the preview highlights
const MARK_CLASSES: [&str; 4] = ["visible", "scrolled", "active", "loaded"];

pub struct PageViewWidget;

impl PageViewWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let title = format!(
            " Page {}/{}px ",
            style::fmt_num(app.page.scroll_y()),
            style::fmt_num(app.page.max_scroll())
        );
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.grey0))
            .style(Style::default().bg(theme.bg0));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let selected = app.selected_link_element();
        let hovered = app.hovered_card_element();

        for el in app.page.elements() {
            let Some(top) = Self::element_top(app, el) else {
                continue;
            };
            let Some(layout) = app.page.layout(el) else {
                continue;
            };
            let Some(cell) = place(
                top,
                layout.left,
                layout.width,
                layout.height,
                inner,
                app.page.viewport_width(),
                app.px_per_row(),
            ) else {
                continue;
            };

            let opacity = style::opacity_value(app.page.style(el, style::OPACITY).as_deref());
            let marked = MARK_CLASSES.iter().any(|c| app.page.has_class(el, c));

            let mut text_style = Style::default().fg(theme.fg0);
            let mut border_style = Style::default().fg(theme.grey1);
            if marked {
                border_style = border_style.fg(theme.marked);
            }
            if Some(el) == hovered {
                border_style = border_style.fg(theme.yellow).add_modifier(Modifier::BOLD);
            }
            if Some(el) == selected {
                text_style = text_style.fg(theme.accent).bg(theme.selection).add_modifier(Modifier::BOLD);
            }
            if opacity < 0.5 {
                text_style = text_style.fg(theme.faded);
                border_style = border_style.fg(theme.faded);
            }

            let label = app.page.label(el);
            let text = app.page.text(el);
            if cell.height >= 3 && cell.width >= 4 {
                let block = Block::default()
                    .title(truncate_str(&label, cell.width.saturating_sub(2) as usize))
                    .borders(Borders::ALL)
                    .border_style(border_style);
                let body = block.inner(cell);
                frame.render_widget(block, cell);
                if let Some(text) = text {
                    frame.render_widget(Paragraph::new(text).style(text_style), body);
                }
            } else {
                let content = text.unwrap_or(label);
                frame.render_widget(Paragraph::new(content).style(text_style), cell);
            }
        }
    }

    /// Viewport-relative top of `el` in pixels, including its current
    /// vertical translation; `None` for elements without a box
    fn element_top(app: &App, el: ElementId) -> Option<f64> {
        let layout = app.page.layout(el)?;
        if layout.width <= 0.0 || layout.height <= 0.0 {
            return None;
        }
        // The navbar stays pinned to the top of the viewport
        let fixed = app
            .engine
            .scroll_state()
            .navbar()
            .map(|navbar| app.page.contains(navbar, el))
            .unwrap_or(false);
        let mut top = if fixed {
            layout.top
        } else {
            layout.top - app.page.scroll_y()
        };
        if let Some(transform) = app.page.style(el, style::TRANSFORM) {
            top += style::translate_y_px(&transform, layout.height).unwrap_or(0.0);
        }
        Some(top)
    }
}

/// Map a pixel box onto terminal cells of `area`, clipped to it
fn place(
    top: f64,
    left: f64,
    width: f64,
    height: f64,
    area: Rect,
    viewport_width: f64,
    px_per_row: f64,
) -> Option<Rect> {
    let scale_x = area.width as f64 / viewport_width.max(1.0);
    let px_per_row = px_per_row.max(1.0);

    let x0 = (left * scale_x).floor();
    let x1 = ((left + width) * scale_x).ceil().max(x0 + 1.0);
    let y0 = (top / px_per_row).floor();
    let y1 = ((top + height) / px_per_row).ceil().max(y0 + 1.0);

    let x0 = x0.clamp(0.0, area.width as f64);
    let x1 = x1.clamp(0.0, area.width as f64);
    let y0 = y0.clamp(0.0, area.height as f64);
    let y1 = y1.clamp(0.0, area.height as f64);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    Some(Rect::new(
        area.x + x0 as u16,
        area.y + y0 as u16,
        (x1 - x0) as u16,
        (y1 - y0) as u16,
    ))
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_scales_and_clips() {
        let area = Rect::new(0, 0, 64, 40);
        // 1280 px wide viewport onto 64 columns is 20 px per column
        let cell = place(100.0, 200.0, 400.0, 200.0, area, 1280.0, 20.0).unwrap();
        assert_eq!(cell, Rect::new(10, 5, 20, 10));

        // Partly above the viewport
        let cell = place(-100.0, 0.0, 200.0, 200.0, area, 1280.0, 20.0).unwrap();
        assert_eq!(cell, Rect::new(0, 0, 10, 5));

        // Entirely below
        assert!(place(900.0, 0.0, 200.0, 200.0, area, 1280.0, 20.0).is_none());
    }

    #[test]
    fn test_place_keeps_thin_boxes_visible() {
        let area = Rect::new(2, 1, 64, 40);
        let cell = place(0.0, 0.0, 5.0, 2.0, area, 1280.0, 20.0).unwrap();
        assert_eq!(cell, Rect::new(2, 1, 1, 1));
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("section#about.section", 10), "section...");
        assert_eq!(truncate_str("nav", 10), "nav");
        assert_eq!(truncate_str("nav#navbar", 2), "na");
    }
}
