use std::collections::VecDeque;

use anyhow::Result;
use tracing::debug;

use glint_core::page::Mutation;
use glint_core::{Choreographer, ElementId, GlintConfig, InputEvent, Key, Millis, Page, VirtualPage};

use crate::input::Action;
use crate::theme::Theme;

/// Mutations kept for the log panel
const LOG_CAPACITY: usize = 500;

/// A page mutation and the clock time it was observed at
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub at_ms: Millis,
    pub mutation: Mutation,
}

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Key binding overlay
    Help,
}

/// Preview state: the engine driving an in-memory page
pub struct App {
    pub config: GlintConfig,
    pub page: VirtualPage,
    pub engine: Choreographer,
    pub theme: Theme,
    pub mode: Mode,
    /// Index into `links()` selected with Tab
    pub selected_link: Option<usize>,
    /// Index into the tilt cards currently hovered
    pub hovered_card: Option<usize>,
    pub log: VecDeque<LogEntry>,
    pub status_message: Option<String>,
    pub should_quit: bool,
    /// Last clock value seen
    pub now_ms: Millis,
}

impl App {
    pub fn new(config: GlintConfig, page: VirtualPage) -> Result<Self> {
        let engine = Choreographer::new(config.clone())?;
        Ok(Self {
            config,
            page,
            engine,
            theme: Theme::default(),
            mode: Mode::Normal,
            selected_link: None,
            hovered_card: None,
            log: VecDeque::with_capacity(LOG_CAPACITY),
            status_message: None,
            should_quit: false,
            now_ms: 0.0,
        })
    }

    /// Mount the engine and report the window as loaded
    pub fn mount(&mut self, now: Millis) {
        self.engine.mount(&mut self.page, now);
        self.dispatch(now, InputEvent::Load { load_ms: None });
    }

    pub fn links(&self) -> Vec<ElementId> {
        self.engine.links().links(&self.page)
    }

    pub fn selected_link_element(&self) -> Option<ElementId> {
        self.selected_link.and_then(|i| self.links().get(i).copied())
    }

    pub fn hovered_card_element(&self) -> Option<ElementId> {
        self.hovered_card
            .and_then(|i| self.engine.tilt().cards().get(i).copied())
    }

    pub fn px_per_row(&self) -> f64 {
        self.config.preview.px_per_row
    }

    /// Size the page viewport to a terminal area of `rows` rows
    pub fn fit_viewport(&mut self, now: Millis, rows: u16) {
        let height = rows as f64 * self.px_per_row();
        if (height - self.page.viewport_height()).abs() < f64::EPSILON {
            return;
        }
        let width = self.page.viewport_width();
        self.page.set_viewport(width, height);
        self.dispatch(now, InputEvent::Resize);
        self.dispatch(now, InputEvent::Scroll);
    }

    /// Move the scroll offset by `dy` pixels, the way a wheel would
    pub fn scroll_by(&mut self, now: Millis, dy: f64) {
        let y = self.page.scroll_y() + dy;
        self.scroll_to(now, y);
    }

    pub fn scroll_to(&mut self, now: Millis, y: f64) {
        self.page.set_scroll(y);
        self.dispatch(now, InputEvent::Scroll);
    }

    pub fn half_page(&self) -> f64 {
        (self.page.viewport_height() / 2.0).floor()
    }

    pub fn next_link(&mut self) {
        let count = self.links().len();
        if count == 0 {
            self.set_status("No links on this page");
            return;
        }
        let next = match self.selected_link {
            Some(i) => (i + 1) % count,
            None => 0,
        };
        self.selected_link = Some(next);
        if let Some(link) = self.selected_link_element() {
            let label = self.page.attribute(link, "href").unwrap_or_else(|| self.page.label(link));
            self.set_status(format!("Link {}/{}: {}", next + 1, count, label));
        }
    }

    pub fn click_link(&mut self, now: Millis) {
        let Some(link) = self.selected_link_element() else {
            self.set_status("Press Tab to select a link first");
            return;
        };
        self.click(now, link);
        match self.engine.driver().target() {
            Some(y) => self.set_status(format!("Scrolling to {}", y)),
            None => self.set_status(format!("Jumped to {}", self.page.scroll_y())),
        }
    }

    pub fn toggle_menu(&mut self, now: Millis) {
        match self.engine.menu().toggle_element() {
            Some(toggle) => {
                self.click(now, toggle);
                let state = format!("Menu {:?}", self.engine.menu().state());
                self.set_status(state);
            }
            None => self.set_status("No mobile menu on this page"),
        }
    }

    pub fn click_logo(&mut self, now: Millis) {
        match self.engine.easter_eggs().logo() {
            Some(logo) => {
                self.click(now, logo);
                let clicks = self.engine.easter_eggs().clicks();
                self.set_status(format!("Logo clicks: {}", clicks));
            }
            None => self.set_status("No logo on this page"),
        }
    }

    /// Leave the hovered tilt card and hover the next one, pointer near its
    /// top-left quarter
    pub fn hover_next_card(&mut self, now: Millis) {
        let count = self.engine.tilt().cards().len();
        if count == 0 {
            self.set_status("No tilt cards on this page");
            return;
        }
        if let Some(card) = self.hovered_card_element() {
            self.dispatch(now, InputEvent::MouseLeave { target: card });
        }
        let next = match self.hovered_card {
            Some(i) if i + 1 < count => Some(i + 1),
            Some(_) => None,
            None => Some(0),
        };
        self.hovered_card = next;

        let Some(card) = self.hovered_card_element() else {
            self.set_status("Tilt hover cleared");
            return;
        };
        self.dispatch(now, InputEvent::MouseEnter { target: card });
        if let Some(rect) = self.page.rect(card) {
            let x = rect.left + rect.width / 4.0;
            let y = rect.top + rect.height / 4.0;
            self.dispatch(now, InputEvent::MouseMove { target: card, x, y });
        }
        let label = self.page.label(card);
        self.set_status(format!("Hovering {}", label));
    }

    pub fn forward_key(&mut self, now: Millis, key: Key) {
        debug!(key = %key, "Forwarding key");
        self.dispatch(now, InputEvent::KeyDown { key });
    }

    fn click(&mut self, now: Millis, target: ElementId) {
        self.dispatch(now, InputEvent::Click { target });
    }

    fn dispatch(&mut self, now: Millis, event: InputEvent) {
        self.now_ms = now;
        self.engine.dispatch(&mut self.page, now, &event);
        self.collect(now);
    }

    /// Advance the engine to `now`
    pub fn tick(&mut self, now: Millis) {
        self.now_ms = now;
        self.engine.tick(&mut self.page, now);
        self.collect(now);
    }

    fn collect(&mut self, now: Millis) {
        for mutation in self.page.take_mutations() {
            if self.log.len() == LOG_CAPACITY {
                self.log.pop_front();
            }
            self.log.push_back(LogEntry { at_ms: now, mutation });
        }
    }

    pub fn apply(&mut self, action: Action, now: Millis) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ScrollDown => self.scroll_by(now, self.config.preview.scroll_step_px),
            Action::ScrollUp => self.scroll_by(now, -self.config.preview.scroll_step_px),
            Action::HalfPageDown => self.scroll_by(now, self.half_page()),
            Action::HalfPageUp => self.scroll_by(now, -self.half_page()),
            Action::JumpToTop => self.scroll_to(now, 0.0),
            Action::JumpToBottom => self.scroll_to(now, self.page.max_scroll()),
            Action::NextLink => self.next_link(),
            Action::ClickLink => self.click_link(now),
            Action::ToggleMenu => self.toggle_menu(now),
            Action::ClickLogo => self.click_logo(now),
            Action::HoverTilt => self.hover_next_card(now),
            Action::ForwardKey(key) => self.forward_key(now, key),
            Action::ToggleHelp => {
                self.mode = match self.mode {
                    Mode::Normal => Mode::Help,
                    Mode::Help => Mode::Normal,
                }
            }
            Action::None => {}
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}
