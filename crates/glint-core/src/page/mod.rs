//! The DOM contract
//!
//! The engine never touches a real document. Everything it reads or writes
//! goes through [`Page`], implemented by the browser host (`glint-web`) and
//! by the in-memory [`VirtualPage`] used for tests, simulation and preview.

pub mod selector;
pub mod style;
pub mod virtual_page;

use serde::{Deserialize, Serialize};

pub use selector::{Selector, SelectorSubject};
pub use virtual_page::{ElementSpec, Mutation, PageSpec, VirtualPage};

use crate::Result;

/// Opaque handle for an element, issued by the page that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u32);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Viewport-relative bounding box, CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// True if any part lies within `[0, viewport_height]` vertically
    pub fn intersects_viewport(&self, viewport_height: f64) -> bool {
        self.bottom() >= 0.0 && self.top <= viewport_height
    }
}

/// Description of an element to create
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    /// Inline `style` attribute text
    pub css_text: String,
}

impl NewElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn css(mut self, css_text: impl Into<String>) -> Self {
        self.css_text = css_text.into();
        self
    }
}

/// Where to insert a new element relative to its parent's children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    First,
    Last,
}

/// Read/write access to the page the engine decorates
///
/// Lookups return `Option`/empty collections when nothing matches; the
/// engine treats that as "feature inactive". Writes return `Result` so a
/// host can surface DOM failures, which the engine logs and moves past.
pub trait Page {
    // Lookup

    /// All elements matching `selector`, in document order, optionally
    /// restricted to descendants of `scope`
    fn query_all(&self, selector: &Selector, scope: Option<ElementId>) -> Vec<ElementId>;

    /// First element matching `selector`
    fn query(&self, selector: &Selector, scope: Option<ElementId>) -> Option<ElementId> {
        self.query_all(selector, scope).into_iter().next()
    }

    fn by_id(&self, id: &str) -> Option<ElementId>;

    fn body(&self) -> ElementId;

    fn parent(&self, el: ElementId) -> Option<ElementId>;

    fn matches(&self, el: ElementId, selector: &Selector) -> bool;

    /// Nearest inclusive ancestor matching `selector`
    fn closest(&self, el: ElementId, selector: &Selector) -> Option<ElementId> {
        let mut current = Some(el);
        while let Some(node) = current {
            if self.matches(node, selector) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// True if `node` is `ancestor` or lies inside it
    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    // Geometry

    fn rect(&self, el: ElementId) -> Option<Rect>;

    /// Distance from the document top to the element's top edge
    fn offset_top(&self, el: ElementId) -> f64;

    fn offset_height(&self, el: ElementId) -> f64;

    fn scroll_y(&self) -> f64;

    fn viewport_height(&self) -> f64;

    fn scroll_to(&mut self, y: f64) -> Result<()>;

    // Content

    fn attribute(&self, el: ElementId, name: &str) -> Option<String>;

    fn text(&self, el: ElementId) -> Option<String>;

    fn set_text(&mut self, el: ElementId, text: &str) -> Result<()>;

    fn style(&self, el: ElementId, property: &str) -> Option<String>;

    /// Set an inline style property; an empty value removes it
    fn set_style(&mut self, el: ElementId, property: &str, value: &str) -> Result<()>;

    fn has_class(&self, el: ElementId, class: &str) -> bool;

    fn set_class(&mut self, el: ElementId, class: &str, on: bool) -> Result<()>;

    // Structure

    fn insert_element(&mut self, parent: ElementId, element: NewElement, placement: Placement) -> Result<ElementId>;

    fn remove_element(&mut self, el: ElementId) -> Result<()>;

    /// Append a `<style>` element with the given rules to the document head
    fn append_stylesheet(&mut self, css: &str) -> Result<()>;

    /// Append `<link rel="preload" as="image">` to the document head
    fn append_preload_link(&mut self, href: &str) -> Result<()>;

    /// Start loading the image behind `el`; the host reports completion with
    /// `InputEvent::ImageLoaded`
    fn preload_image(&mut self, el: ElementId) -> Result<()>;

    // Capabilities

    fn supports_touch(&self) -> bool {
        false
    }
}

/// Convenience for writing several style properties in order
pub fn set_styles(page: &mut dyn Page, el: ElementId, props: &[(&str, &str)]) -> Result<()> {
    for (property, value) in props {
        page.set_style(el, property, value)?;
    }
    Ok(())
}
