//! Smooth in-page links
//!
//! Resolves a click on a `#fragment` link to the scroll offset the driver
//! should animate to. Starting the run is left to the choreographer, which
//! owns the driver.

use crate::config::ScrollConfig;
use crate::page::{ElementId, Page, Selector};
use crate::Result;

use super::compile;

/// A resolved link click
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkJump {
    pub link: ElementId,
    pub section: ElementId,
    /// Scroll offset to move to
    pub y: f64,
}

#[derive(Debug, Clone)]
pub struct SmoothLinks {
    selector: Selector,
    offset_px: f64,
}

impl SmoothLinks {
    pub fn new(config: &ScrollConfig) -> Result<Self> {
        Ok(Self {
            selector: compile("scroll.link_selector", &config.link_selector)?,
            offset_px: config.offset_px,
        })
    }

    /// The jump for a click on `target`, if it lands on (or inside) a link
    /// to an existing section
    pub fn resolve(&self, page: &dyn Page, target: ElementId) -> Option<LinkJump> {
        let link = page.closest(target, &self.selector)?;
        let href = page.attribute(link, "href")?;
        let fragment = href.strip_prefix('#')?;
        if fragment.is_empty() {
            return None;
        }
        let section = page.by_id(fragment)?;
        Some(LinkJump {
            link,
            section,
            y: page.offset_top(section) - self.offset_px,
        })
    }

    /// Every link the selector matches, in document order
    pub fn links(&self, page: &dyn Page) -> Vec<ElementId> {
        page.query_all(&self.selector, None)
    }
}
