//! Lazy image fade-in

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::config::LazyImageConfig;
use crate::page::{style, ElementId, Page, Selector};
use crate::Result;

use super::compile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LazyImageState {
    /// Not yet in the viewport
    Waiting,
    /// Hidden while the preload runs
    Loading,
    Shown,
}

#[derive(Debug, Clone)]
pub struct LazyImages {
    selector: Selector,
    critical: Vec<String>,
    states: BTreeMap<ElementId, LazyImageState>,
}

impl LazyImages {
    pub fn new(config: &LazyImageConfig) -> Result<Self> {
        Ok(Self {
            selector: compile("lazy_images.selector", &config.selector)?,
            critical: config.critical.clone(),
            states: BTreeMap::new(),
        })
    }

    /// Watch matching images and add preload links for critical ones
    pub fn mount(&mut self, page: &mut dyn Page) -> Result<()> {
        self.states = page
            .query_all(&self.selector, None)
            .into_iter()
            .map(|el| (el, LazyImageState::Waiting))
            .collect();

        for href in &self.critical {
            page.append_preload_link(href)?;
        }
        Ok(())
    }

    /// Start loading every waiting image that has entered the viewport
    pub fn evaluate(&mut self, page: &mut dyn Page) -> Result<usize> {
        let viewport_height = page.viewport_height();
        let entered: Vec<ElementId> = self
            .states
            .iter()
            .filter(|(_, state)| **state == LazyImageState::Waiting)
            .map(|(el, _)| *el)
            .filter(|el| {
                page.rect(*el)
                    .map(|r| r.intersects_viewport(viewport_height))
                    .unwrap_or(false)
            })
            .collect();

        for &el in &entered {
            self.states.insert(el, LazyImageState::Loading);
            page.set_style(el, style::TRANSITION, "opacity 0.5s ease, transform 0.5s ease")?;
            page.set_style(el, style::OPACITY, "0")?;
            page.set_style(el, style::TRANSFORM, "scale(1.1)")?;
            page.preload_image(el)?;
        }

        if !entered.is_empty() {
            debug!(images = entered.len(), "Lazy images entered viewport");
        }
        Ok(entered.len())
    }

    /// The host finished preloading `el`
    pub fn loaded(&mut self, page: &mut dyn Page, el: ElementId) -> Result<bool> {
        if self.state(el) != Some(LazyImageState::Loading) {
            return Ok(false);
        }
        self.states.insert(el, LazyImageState::Shown);
        page.set_style(el, style::OPACITY, "1")?;
        page.set_style(el, style::TRANSFORM, "scale(1)")?;
        Ok(true)
    }

    pub fn state(&self, el: ElementId) -> Option<LazyImageState> {
        self.states.get(&el).copied()
    }

    pub fn count(&self, state: LazyImageState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::VirtualPage;

    const PAGE: &str = r#"
viewport_height = 800

[[element]]
tag = "img"
attrs = { src = "https://images.unsplash.com/a.jpg" }
top = 100
height = 300

[[element]]
tag = "img"
attrs = { src = "https://images.unsplash.com/b.jpg" }
top = 2000
height = 300

[[element]]
tag = "img"
attrs = { src = "/local.png" }
top = 100
height = 300
"#;

    fn setup() -> (LazyImages, VirtualPage) {
        let mut page = VirtualPage::from_toml_str(PAGE).unwrap();
        let mut lazy = LazyImages::new(&LazyImageConfig::default()).unwrap();
        lazy.mount(&mut page).unwrap();
        (lazy, page)
    }

    #[test]
    fn test_mount_adds_preload_links() {
        let (lazy, page) = setup();
        assert_eq!(page.preload_links().len(), 2);
        assert_eq!(lazy.count(LazyImageState::Waiting), 2);
    }

    #[test]
    fn test_visible_images_start_loading_once() {
        let (mut lazy, mut page) = setup();
        assert_eq!(lazy.evaluate(&mut page).unwrap(), 1);
        assert_eq!(lazy.evaluate(&mut page).unwrap(), 0);

        let first = page.elements()[0];
        assert_eq!(lazy.state(first), Some(LazyImageState::Loading));
        assert_eq!(page.style(first, "transform").as_deref(), Some("scale(1.1)"));
        assert_eq!(page.preload_requests(), &[first]);

        page.set_scroll(1500.0);
        assert_eq!(lazy.evaluate(&mut page).unwrap(), 1);
    }

    #[test]
    fn test_loaded_fades_in() {
        let (mut lazy, mut page) = setup();
        let first = page.elements()[0];
        let second = page.elements()[1];

        // Not loading yet
        assert!(!lazy.loaded(&mut page, second).unwrap());

        lazy.evaluate(&mut page).unwrap();
        assert!(lazy.loaded(&mut page, first).unwrap());
        assert_eq!(page.style(first, "opacity").as_deref(), Some("1"));
        assert_eq!(lazy.state(first), Some(LazyImageState::Shown));
        assert!(!lazy.loaded(&mut page, first).unwrap());
    }
}
