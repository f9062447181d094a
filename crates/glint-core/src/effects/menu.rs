//! Mobile menu

use serde::Serialize;
use tracing::debug;

use crate::config::MenuConfig;
use crate::event::{Key, Outcome};
use crate::motion::Millis;
use crate::page::{set_styles, style, ElementId, Page, Selector};
use crate::schedule::{TaskId, TaskQueue};
use crate::Result;

use super::{compile, Job};

const ITEM_SHOWN: [(&str, &str); 3] = [
    (style::TRANSITION, "all 0.3s ease"),
    (style::OPACITY, "1"),
    (style::TRANSFORM, "translateY(0)"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone)]
pub struct MobileMenu {
    config: MenuConfig,
    link_selector: Selector,
    toggle: Option<ElementId>,
    menu: Option<ElementId>,
    state: MenuState,
    /// Pending entrance per menu item
    item_tasks: Vec<(ElementId, TaskId)>,
}

impl MobileMenu {
    pub fn new(config: &MenuConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            link_selector: compile("menu.link_selector", &config.link_selector)?,
            toggle: None,
            menu: None,
            state: MenuState::Closed,
            item_tasks: Vec::new(),
        })
    }

    pub fn mount(&mut self, page: &dyn Page) {
        self.toggle = page.by_id(&self.config.toggle_id);
        self.menu = page.by_id(&self.config.menu_id);
        self.state = MenuState::Closed;
    }

    /// Both the toggle and the menu exist
    pub fn is_active(&self) -> bool {
        self.toggle.is_some() && self.menu.is_some()
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn toggle_element(&self) -> Option<ElementId> {
        self.toggle
    }

    pub fn click(&mut self, page: &mut dyn Page, tasks: &mut TaskQueue<Job>, now: Millis, target: ElementId) -> Result<Outcome> {
        let (Some(toggle), Some(menu)) = (self.toggle, self.menu) else {
            return Ok(Outcome::default());
        };

        if page.contains(toggle, target) {
            match self.state {
                MenuState::Closed => self.open(page, tasks, now, toggle, menu)?,
                MenuState::Open => self.close(page, tasks, toggle, menu)?,
            }
            return Ok(Outcome {
                stop_propagation: true,
                ..Default::default()
            });
        }

        if self.state == MenuState::Open {
            let on_link = page.closest(target, &self.link_selector).is_some();
            if on_link || !page.contains(menu, target) {
                self.close(page, tasks, toggle, menu)?;
            }
        }

        Ok(Outcome::default())
    }

    pub fn key(&mut self, page: &mut dyn Page, tasks: &mut TaskQueue<Job>, key: &Key) -> Result<()> {
        if *key != Key::Escape || self.state != MenuState::Open {
            return Ok(());
        }
        if let (Some(toggle), Some(menu)) = (self.toggle, self.menu) {
            self.close(page, tasks, toggle, menu)?;
        }
        Ok(())
    }

    fn open(&mut self, page: &mut dyn Page, tasks: &mut TaskQueue<Job>, now: Millis, toggle: ElementId, menu: ElementId) -> Result<()> {
        self.state = MenuState::Open;
        self.set_active(page, toggle, menu, true)?;

        let items = page.query_all(&self.link_selector, Some(menu));
        for (index, item) in items.iter().copied().enumerate() {
            page.set_style(item, style::OPACITY, "0")?;
            page.set_style(item, style::TRANSFORM, "translateY(20px)")?;
            let delay = index as f64 * self.config.item_stagger_ms + self.config.item_delay_ms;
            let id = tasks.schedule(now, delay, Job::styles(item, &ITEM_SHOWN));
            self.item_tasks.push((item, id));
        }

        debug!(items = items.len(), "Menu opened");
        Ok(())
    }

    fn close(&mut self, page: &mut dyn Page, tasks: &mut TaskQueue<Job>, toggle: ElementId, menu: ElementId) -> Result<()> {
        self.state = MenuState::Closed;
        // Items still waiting on their entrance are shown right away
        let pending: Vec<ElementId> = self
            .item_tasks
            .drain(..)
            .filter(|(_, id)| tasks.cancel(*id))
            .map(|(item, _)| item)
            .collect();
        for &item in &pending {
            set_styles(page, item, &ITEM_SHOWN)?;
        }
        let cancelled = pending.len();
        self.set_active(page, toggle, menu, false)?;
        debug!(cancelled, "Menu closed");
        Ok(())
    }

    fn set_active(&self, page: &mut dyn Page, toggle: ElementId, menu: ElementId, on: bool) -> Result<()> {
        page.set_class(toggle, &self.config.active_class, on)?;
        page.set_class(menu, &self.config.active_class, on)?;
        let body = page.body();
        page.set_style(body, style::OVERFLOW, if on { "hidden" } else { "auto" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::VirtualPage;

    const PAGE: &str = r##"
[[element]]
tag = "button"
id = "mobile-toggle"

[[element.element]]
tag = "span"
class = "bar"

[[element]]
tag = "ul"
id = "nav-menu"

[[element.element]]
tag = "li"

[[element.element]]
tag = "a"
class = "nav-link"
attrs = { href = "#style" }

[[element.element]]
tag = "a"
class = "nav-link"
attrs = { href = "#about" }

[[element]]
tag = "main"
height = 2000
"##;

    fn setup() -> (MobileMenu, VirtualPage, TaskQueue<Job>) {
        let page = VirtualPage::from_toml_str(PAGE).unwrap();
        let mut menu = MobileMenu::new(&MenuConfig::default()).unwrap();
        menu.mount(&page);
        (menu, page, TaskQueue::new())
    }

    fn find(page: &VirtualPage, selector: &str) -> ElementId {
        page.query(&Selector::parse(selector).unwrap(), None).unwrap()
    }

    #[test]
    fn test_toggle_opens_with_staggered_items() {
        let (mut menu, mut page, mut tasks) = setup();
        let bar = find(&page, ".bar");

        let outcome = menu.click(&mut page, &mut tasks, 0.0, bar).unwrap();
        assert!(outcome.stop_propagation);
        assert_eq!(menu.state(), MenuState::Open);

        let toggle = page.by_id("mobile-toggle").unwrap();
        let nav = page.by_id("nav-menu").unwrap();
        assert!(page.has_class(toggle, "active"));
        assert!(page.has_class(nav, "active"));
        assert_eq!(page.style(page.body(), "overflow").as_deref(), Some("hidden"));

        let dues: Vec<Millis> = tasks.pending().map(|(_, due, _)| due).collect();
        assert_eq!(dues, vec![200.0, 300.0]);
    }

    #[test]
    fn test_escape_closes_and_cancels_items() {
        let (mut menu, mut page, mut tasks) = setup();
        let toggle = page.by_id("mobile-toggle").unwrap();
        menu.click(&mut page, &mut tasks, 0.0, toggle).unwrap();

        menu.key(&mut page, &mut tasks, &Key::Escape).unwrap();
        assert_eq!(menu.state(), MenuState::Closed);
        assert!(tasks.is_empty());
        assert_eq!(page.style(page.body(), "overflow").as_deref(), Some("auto"));

        // Links never stay hidden behind a cancelled entrance
        for link in page.query_all(&Selector::parse(".nav-link").unwrap(), None) {
            assert_eq!(page.style(link, "opacity").as_deref(), Some("1"));
            assert_eq!(page.style(link, "transform").as_deref(), Some("translateY(0)"));
        }
    }

    #[test]
    fn test_quick_toggle_close_restores_links() {
        let (mut menu, mut page, mut tasks) = setup();
        let toggle = page.by_id("mobile-toggle").unwrap();
        menu.click(&mut page, &mut tasks, 0.0, toggle).unwrap();

        // First item's entrance has run, the second is still pending
        let first = tasks.pop_due(250.0).unwrap();
        let Job::Styles { element, styles } = first.job else {
            panic!("expected a style job");
        };
        for (property, value) in &styles {
            page.set_style(element, property, value).unwrap();
        }
        menu.click(&mut page, &mut tasks, 250.0, toggle).unwrap();
        assert!(tasks.is_empty());

        for link in page.query_all(&Selector::parse(".nav-link").unwrap(), None) {
            assert_eq!(page.style(link, "opacity").as_deref(), Some("1"));
            assert_eq!(page.style(link, "transform").as_deref(), Some("translateY(0)"));
        }
    }

    #[test]
    fn test_outside_click_closes_inside_click_does_not() {
        let (mut menu, mut page, mut tasks) = setup();
        let toggle = page.by_id("mobile-toggle").unwrap();
        menu.click(&mut page, &mut tasks, 0.0, toggle).unwrap();

        let item = find(&page, "li");
        menu.click(&mut page, &mut tasks, 10.0, item).unwrap();
        assert_eq!(menu.state(), MenuState::Open);

        let main = find(&page, "main");
        menu.click(&mut page, &mut tasks, 20.0, main).unwrap();
        assert_eq!(menu.state(), MenuState::Closed);
    }

    #[test]
    fn test_link_click_closes() {
        let (mut menu, mut page, mut tasks) = setup();
        let toggle = page.by_id("mobile-toggle").unwrap();
        menu.click(&mut page, &mut tasks, 0.0, toggle).unwrap();

        let link = find(&page, ".nav-link");
        menu.click(&mut page, &mut tasks, 10.0, link).unwrap();
        assert_eq!(menu.state(), MenuState::Closed);
        assert!(!page.has_class(toggle, "active"));
    }

    #[test]
    fn test_escape_while_closed_is_noop() {
        let (mut menu, mut page, mut tasks) = setup();
        menu.key(&mut page, &mut tasks, &Key::Escape).unwrap();
        assert!(page.mutations().is_empty());
    }

    #[test]
    fn test_missing_elements_disable_feature() {
        let mut page = VirtualPage::new(1280.0, 800.0);
        let mut menu = MobileMenu::new(&MenuConfig::default()).unwrap();
        menu.mount(&page);
        assert!(!menu.is_active());
        let body = page.body();
        let mut tasks = TaskQueue::new();
        let outcome = menu.click(&mut page, &mut tasks, 0.0, body).unwrap();
        assert_eq!(outcome, Outcome::default());
    }
}
