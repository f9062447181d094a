//! [`Page`] over the live document
//!
//! Elements are issued ids on first sight and tagged with a
//! `data-glint-id` attribute so the same node maps back to the same id.

use std::cell::RefCell;
use std::collections::HashMap;

use glint_core::page::{NewElement, Placement, Rect};
use glint_core::{ElementId, Error, Page, Result, Selector};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Window};

const ID_ATTR: &str = "data-glint-id";

/// Id allocation for live nodes
///
/// Ids are never reused; releasing one forgets its node.
#[derive(Debug)]
pub struct Registry<T> {
    nodes: HashMap<u32, T>,
    next: u32,
}

impl<T: Clone + PartialEq> Registry<T> {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            next: 0,
        }
    }

    /// `node` under `claimed` if that id still holds it, otherwise a fresh id
    pub fn issue(&mut self, node: &T, claimed: Option<u32>) -> (ElementId, bool) {
        if let Some(index) = claimed {
            if self.nodes.get(&index) == Some(node) {
                return (ElementId(index), false);
            }
        }
        let index = self.next;
        self.next += 1;
        self.nodes.insert(index, node.clone());
        (ElementId(index), true)
    }

    pub fn get(&self, el: ElementId) -> Option<T> {
        self.nodes.get(&el.0).cloned()
    }

    pub fn release(&mut self, el: ElementId) -> Option<T> {
        self.nodes.remove(&el.0)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<T: Clone + PartialEq> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn dom_error(e: JsValue) -> Error {
    Error::Dom(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

pub struct DomPage {
    window: Window,
    document: Document,
    body: ElementId,
    registry: RefCell<Registry<Element>>,
    /// Images waiting for the host to start a preload
    preloads: Vec<ElementId>,
}

impl DomPage {
    pub fn new(window: Window) -> Result<Self> {
        let document = window
            .document()
            .ok_or_else(|| Error::Dom("window has no document".into()))?;
        let body = document
            .body()
            .ok_or_else(|| Error::Dom("document has no body".into()))?;

        let page = Self {
            window,
            document,
            body: ElementId(0),
            registry: RefCell::new(Registry::new()),
            preloads: Vec::new(),
        };
        let body = page.register(&body);
        Ok(Self { body, ..page })
    }

    /// The id for `element`, issuing one if it has none yet
    pub fn register(&self, element: &Element) -> ElementId {
        // Cloned nodes carry the attribute of their original
        let claimed = element.get_attribute(ID_ATTR).and_then(|v| v.parse::<u32>().ok());
        let (id, fresh) = self.registry.borrow_mut().issue(element, claimed);
        if fresh {
            let _ = element.set_attribute(ID_ATTR, &id.0.to_string());
        }
        id
    }

    pub fn element(&self, el: ElementId) -> Option<Element> {
        self.registry.borrow().get(el)
    }

    fn html(&self, el: ElementId) -> Option<HtmlElement> {
        self.element(el).and_then(|e| e.dyn_into::<HtmlElement>().ok())
    }

    fn require(&self, el: ElementId) -> Result<Element> {
        self.element(el)
            .ok_or_else(|| Error::ElementNotFound(el.to_string()))
    }

    fn require_html(&self, el: ElementId) -> Result<HtmlElement> {
        self.html(el)
            .ok_or_else(|| Error::ElementNotFound(el.to_string()))
    }

    /// Preload requests made since the last call
    pub fn take_preloads(&mut self) -> Vec<ElementId> {
        std::mem::take(&mut self.preloads)
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Page for DomPage {
    fn query_all(&self, selector: &Selector, scope: Option<ElementId>) -> Vec<ElementId> {
        let list = match scope {
            Some(scope) => match self.element(scope) {
                Some(root) => root.query_selector_all(selector.as_str()),
                None => return Vec::new(),
            },
            None => self.document.query_selector_all(selector.as_str()),
        };
        let Ok(list) = list else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.register(&element))
            .collect()
    }

    fn query(&self, selector: &Selector, scope: Option<ElementId>) -> Option<ElementId> {
        let found = match scope {
            Some(scope) => self.element(scope)?.query_selector(selector.as_str()),
            None => self.document.query_selector(selector.as_str()),
        };
        found.ok().flatten().map(|element| self.register(&element))
    }

    fn by_id(&self, id: &str) -> Option<ElementId> {
        self.document
            .get_element_by_id(id)
            .map(|element| self.register(&element))
    }

    fn body(&self) -> ElementId {
        self.body
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.element(el)?
            .parent_element()
            .map(|parent| self.register(&parent))
    }

    fn matches(&self, el: ElementId, selector: &Selector) -> bool {
        self.element(el)
            .and_then(|e| e.matches(selector.as_str()).ok())
            .unwrap_or(false)
    }

    fn closest(&self, el: ElementId, selector: &Selector) -> Option<ElementId> {
        self.element(el)?
            .closest(selector.as_str())
            .ok()
            .flatten()
            .map(|found| self.register(&found))
    }

    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        match (self.element(ancestor), self.element(node)) {
            (Some(ancestor), Some(node)) => ancestor.contains(Some(&node)),
            _ => false,
        }
    }

    fn rect(&self, el: ElementId) -> Option<Rect> {
        let rect = self.element(el)?.get_bounding_client_rect();
        Some(Rect {
            top: rect.top(),
            left: rect.left(),
            width: rect.width(),
            height: rect.height(),
        })
    }

    fn offset_top(&self, el: ElementId) -> f64 {
        self.html(el).map(|e| e.offset_top() as f64).unwrap_or(0.0)
    }

    fn offset_height(&self, el: ElementId) -> f64 {
        self.html(el).map(|e| e.offset_height() as f64).unwrap_or(0.0)
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0)
    }

    fn scroll_to(&mut self, y: f64) -> Result<()> {
        self.window.scroll_to_with_x_and_y(0.0, y);
        Ok(())
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        self.element(el)?.get_attribute(name)
    }

    fn text(&self, el: ElementId) -> Option<String> {
        self.element(el)?.text_content()
    }

    fn set_text(&mut self, el: ElementId, text: &str) -> Result<()> {
        self.require(el)?.set_text_content(Some(text));
        Ok(())
    }

    fn style(&self, el: ElementId, property: &str) -> Option<String> {
        self.html(el)?
            .style()
            .get_property_value(property)
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn set_style(&mut self, el: ElementId, property: &str, value: &str) -> Result<()> {
        let style = self.require_html(el)?.style();
        if value.is_empty() {
            style.remove_property(property).map_err(dom_error)?;
        } else {
            style.set_property(property, value).map_err(dom_error)?;
        }
        Ok(())
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.element(el)
            .map(|e| e.class_list().contains(class))
            .unwrap_or(false)
    }

    fn set_class(&mut self, el: ElementId, class: &str, on: bool) -> Result<()> {
        let list = self.require(el)?.class_list();
        if on {
            list.add_1(class).map_err(dom_error)
        } else {
            list.remove_1(class).map_err(dom_error)
        }
    }

    fn insert_element(&mut self, parent: ElementId, element: NewElement, placement: Placement) -> Result<ElementId> {
        let parent = self.require(parent)?;
        let node = self.document.create_element(&element.tag).map_err(dom_error)?;
        for (name, value) in &element.attributes {
            node.set_attribute(name, value).map_err(dom_error)?;
        }
        if let Some(text) = &element.text {
            node.set_text_content(Some(text));
        }
        if !element.css_text.is_empty() {
            node.set_attribute("style", &element.css_text).map_err(dom_error)?;
        }

        match placement {
            Placement::First => parent.prepend_with_node_1(&node).map_err(dom_error)?,
            Placement::Last => parent.append_with_node_1(&node).map_err(dom_error)?,
        }
        Ok(self.register(&node))
    }

    fn remove_element(&mut self, el: ElementId) -> Result<()> {
        let element = self
            .registry
            .get_mut()
            .release(el)
            .ok_or_else(|| Error::ElementNotFound(el.to_string()))?;
        element.remove();
        Ok(())
    }

    fn append_stylesheet(&mut self, css: &str) -> Result<()> {
        let head = self
            .document
            .head()
            .ok_or_else(|| Error::Dom("document has no head".into()))?;
        let style = self.document.create_element("style").map_err(dom_error)?;
        style.set_text_content(Some(css));
        head.append_child(&style).map_err(dom_error)?;
        Ok(())
    }

    fn append_preload_link(&mut self, href: &str) -> Result<()> {
        let head = self
            .document
            .head()
            .ok_or_else(|| Error::Dom("document has no head".into()))?;
        let link = self.document.create_element("link").map_err(dom_error)?;
        link.set_attribute("rel", "preload").map_err(dom_error)?;
        link.set_attribute("as", "image").map_err(dom_error)?;
        link.set_attribute("href", href).map_err(dom_error)?;
        head.append_child(&link).map_err(dom_error)?;
        Ok(())
    }

    fn preload_image(&mut self, el: ElementId) -> Result<()> {
        self.require(el)?;
        self.preloads.push(el);
        Ok(())
    }

    fn supports_touch(&self) -> bool {
        js_sys::Reflect::has(&self.window, &JsValue::from_str("ontouchstart")).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_reuses_claimed_id() {
        let mut registry = Registry::new();
        let (a, fresh) = registry.issue(&"hero", None);
        assert!(fresh);
        assert_eq!(registry.issue(&"hero", Some(a.0)), (a, false));

        // A clone claiming someone else's id gets its own
        let (b, fresh) = registry.issue(&"copy", Some(a.0));
        assert!(fresh);
        assert_ne!(a, b);
    }

    #[test]
    fn test_released_nodes_are_dropped() {
        let mut registry = Registry::new();
        let ids: Vec<ElementId> = (0..50).map(|i| registry.issue(&i, None).0).collect();
        for id in &ids {
            assert!(registry.release(*id).is_some());
        }
        assert!(registry.is_empty());
        assert_eq!(registry.get(ids[0]), None);

        // Ids are not handed out again
        let (next, _) = registry.issue(&99, None);
        assert_eq!(next, ElementId(50));
    }
}
