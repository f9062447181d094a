//! Scroll-state controller: navbar scrolled class and show/hide
//!
//! Runs once per frame pass. The pass itself is coalesced by the
//! choreographer; this type only derives state from the current offset and
//! the previous sample.

use serde::Serialize;
use tracing::trace;

use crate::config::NavbarConfig;
use crate::motion::Millis;
use crate::page::{style, ElementId, Page, Selector};
use crate::Result;

use super::compile;

const NAVBAR_HIDDEN: &str = "translateY(-100%)";
const NAVBAR_SHOWN: &str = "translateY(0)";

/// Scroll offset observed by one pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollSample {
    pub position: f64,
    pub timestamp_ms: Millis,
}

#[derive(Debug, Clone)]
pub struct ScrollStateController {
    config: NavbarConfig,
    hero_selector: Selector,
    navbar: Option<ElementId>,
    hero: Option<ElementId>,
    last: Option<ScrollSample>,
    /// Last written state; `None` until the first pass writes it
    scrolled: Option<bool>,
    hidden: Option<bool>,
    passes: u64,
}

impl ScrollStateController {
    pub fn new(config: &NavbarConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            hero_selector: compile("navbar.hero_selector", &config.hero_selector)?,
            navbar: None,
            hero: None,
            last: None,
            scrolled: None,
            hidden: None,
            passes: 0,
        })
    }

    pub fn mount(&mut self, page: &dyn Page, now: Millis) {
        self.navbar = page.by_id(&self.config.navbar_id);
        self.hero = page.query(&self.hero_selector, None);
        self.last = Some(ScrollSample {
            position: page.scroll_y(),
            timestamp_ms: now,
        });
    }

    /// One style-update pass for the current scroll offset
    pub fn pass(&mut self, page: &mut dyn Page, now: Millis) -> Result<()> {
        let current = page.scroll_y();
        let previous = self.last.map(|s| s.position).unwrap_or(current);
        self.last = Some(ScrollSample {
            position: current,
            timestamp_ms: now,
        });
        self.passes += 1;
        trace!(scroll_y = current, previous, "Scroll pass");

        let Some(navbar) = self.navbar else {
            return Ok(());
        };

        if let Some(hero) = self.hero {
            let scrolled = current > page.offset_height(hero) * self.config.scrolled_ratio;
            if self.scrolled != Some(scrolled) {
                page.set_class(navbar, &self.config.scrolled_class, scrolled)?;
                self.scrolled = Some(scrolled);
            }
        }

        let hidden = current > previous && current > self.config.hide_after_px;
        if self.hidden != Some(hidden) {
            let transform = if hidden { NAVBAR_HIDDEN } else { NAVBAR_SHOWN };
            page.set_style(navbar, style::TRANSFORM, transform)?;
            self.hidden = Some(hidden);
        }

        Ok(())
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn last_sample(&self) -> Option<ScrollSample> {
        self.last
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled.unwrap_or(false)
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.unwrap_or(false)
    }

    pub fn navbar(&self) -> Option<ElementId> {
        self.navbar
    }
}
