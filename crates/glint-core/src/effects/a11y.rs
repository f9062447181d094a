//! Skip link and focus ring

use crate::config::AccessibilityConfig;
use crate::page::{style, ElementId, NewElement, Page, Placement, Selector};
use crate::Result;

use super::compile;

const SKIP_LINK_CSS: &str = "position: absolute; top: -40px; left: 6px; \
    background: var(--deep-green); color: white; padding: 8px 16px; \
    text-decoration: none; border-radius: 4px; z-index: 10001; \
    transition: top 0.3s; font-weight: 500";

const SKIP_LINK_HIDDEN: &str = "-40px";
const SKIP_LINK_SHOWN: &str = "6px";

#[derive(Debug, Clone)]
pub struct Accessibility {
    config: AccessibilityConfig,
    /// Always focusable
    focusable: Selector,
    /// Focusable unless `tabindex="-1"`
    tabindex: Selector,
    skip_link: Option<ElementId>,
}

impl Accessibility {
    pub fn new(config: &AccessibilityConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            focusable: compile("accessibility", "a[href], button")?,
            tabindex: compile("accessibility", "[tabindex]")?,
            skip_link: None,
        })
    }

    /// Insert the skip link as the first child of body
    pub fn mount(&mut self, page: &mut dyn Page) -> Result<()> {
        if !self.config.skip_link || self.skip_link.is_some() {
            return Ok(());
        }
        let body = page.body();
        let link = NewElement::new("a")
            .attr("href", self.config.skip_target.as_str())
            .attr("class", "skip-link")
            .text(self.config.skip_text.as_str())
            .css(SKIP_LINK_CSS);
        self.skip_link = Some(page.insert_element(body, link, Placement::First)?);
        Ok(())
    }

    pub fn is_focusable(&self, page: &dyn Page, el: ElementId) -> bool {
        if page.matches(el, &self.focusable) {
            return true;
        }
        page.matches(el, &self.tabindex) && page.attribute(el, "tabindex").as_deref() != Some("-1")
    }

    pub fn focus(&mut self, page: &mut dyn Page, target: ElementId) -> Result<()> {
        if self.skip_link == Some(target) {
            page.set_style(target, style::TOP, SKIP_LINK_SHOWN)?;
        }
        if self.is_focusable(page, target) {
            page.set_style(target, style::BOX_SHADOW, &self.config.focus_ring)?;
        }
        Ok(())
    }

    pub fn blur(&mut self, page: &mut dyn Page, target: ElementId) -> Result<()> {
        if self.skip_link == Some(target) {
            page.set_style(target, style::TOP, SKIP_LINK_HIDDEN)?;
        }
        if self.is_focusable(page, target) {
            page.set_style(target, style::BOX_SHADOW, "")?;
        }
        Ok(())
    }

    pub fn skip_link(&self) -> Option<ElementId> {
        self.skip_link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::VirtualPage;

    const PAGE: &str = r##"
[[element]]
tag = "a"
attrs = { href = "#about" }

[[element]]
tag = "div"
attrs = { tabindex = "-1" }

[[element]]
tag = "div"
attrs = { tabindex = "0" }

[[element]]
tag = "p"
"##;

    fn setup() -> (Accessibility, VirtualPage) {
        let mut page = VirtualPage::from_toml_str(PAGE).unwrap();
        let mut a11y = Accessibility::new(&AccessibilityConfig::default()).unwrap();
        a11y.mount(&mut page).unwrap();
        (a11y, page)
    }

    #[test]
    fn test_skip_link_inserted_first() {
        let (a11y, page) = setup();
        let link = a11y.skip_link().unwrap();
        assert_eq!(page.elements()[0], link);
        assert_eq!(page.attribute(link, "href").as_deref(), Some("#about"));
        assert_eq!(page.text(link).as_deref(), Some("Skip to main content"));
        assert_eq!(page.style(link, "top").as_deref(), Some("-40px"));
    }

    #[test]
    fn test_skip_link_focus_and_blur() {
        let (mut a11y, mut page) = setup();
        let link = a11y.skip_link().unwrap();
        a11y.focus(&mut page, link).unwrap();
        assert_eq!(page.style(link, "top").as_deref(), Some("6px"));
        a11y.blur(&mut page, link).unwrap();
        assert_eq!(page.style(link, "top").as_deref(), Some("-40px"));
    }

    #[test]
    fn test_focus_ring_on_focusable_only() {
        let (mut a11y, mut page) = setup();
        let elements = page.elements();
        let (anchor, negative, positive, para) = (elements[1], elements[2], elements[3], elements[4]);

        for el in [anchor, negative, positive, para] {
            a11y.focus(&mut page, el).unwrap();
        }
        let ring = Some("0 0 0 3px rgba(255, 122, 61, 0.5)".to_string());
        assert_eq!(page.style(anchor, "box-shadow"), ring);
        assert_eq!(page.style(positive, "box-shadow"), ring);
        assert_eq!(page.style(negative, "box-shadow"), None);
        assert_eq!(page.style(para, "box-shadow"), None);

        a11y.blur(&mut page, anchor).unwrap();
        assert_eq!(page.style(anchor, "box-shadow"), None);
    }
}
