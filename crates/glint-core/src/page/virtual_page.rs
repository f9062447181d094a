//! In-memory page used by tests, the simulator and the terminal preview
//!
//! Layout is static: every element carries a document-space box from its
//! description, and transforms written by the engine do not move it. That is
//! enough for everything the engine measures (offsets, viewport rects).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::selector::{Selector, SelectorSubject};
use super::{style, ElementId, NewElement, Page, Placement, Rect};
use crate::{Error, Result};

const SAMPLE_PAGE: &str = include_str!("../../assets/sample_page.toml");

/// Page description, usually loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSpec {
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
    /// Initial scroll offset
    #[serde(default)]
    pub scroll_y: f64,
    /// Whether the simulated device reports touch support
    #[serde(default)]
    pub touch: bool,
    /// Children of `<body>`
    #[serde(default, rename = "element")]
    pub elements: Vec<ElementSpec>,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            scroll_y: 0.0,
            touch: false,
            elements: Vec::new(),
        }
    }
}

/// One element and its subtree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSpec {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    /// Space-separated class list
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub style: BTreeMap<String, String>,
    /// Document-space top edge
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub left: f64,
    /// Defaults to the parent's width
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: f64,
    #[serde(default, rename = "element")]
    pub children: Vec<ElementSpec>,
}

fn default_viewport_width() -> f64 {
    1280.0
}

fn default_viewport_height() -> f64 {
    800.0
}

fn default_tag() -> String {
    "div".to_string()
}

/// A write made through the [`Page`] trait
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    Style {
        element: ElementId,
        property: String,
        value: String,
    },
    Class {
        element: ElementId,
        class: String,
        on: bool,
    },
    Text {
        element: ElementId,
        text: String,
    },
    Scroll {
        y: f64,
    },
    Insert {
        parent: ElementId,
        element: ElementId,
        tag: String,
    },
    Remove {
        element: ElementId,
    },
    Stylesheet {
        css: String,
    },
    PreloadLink {
        href: String,
    },
    PreloadImage {
        element: ElementId,
    },
}

impl Mutation {
    /// Element the mutation touched, if any
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Mutation::Style { element, .. }
            | Mutation::Class { element, .. }
            | Mutation::Text { element, .. }
            | Mutation::Insert { element, .. }
            | Mutation::Remove { element }
            | Mutation::PreloadImage { element } => Some(*element),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: Option<String>,
    style: BTreeMap<String, String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    layout: Rect,
    alive: bool,
}

impl SelectorSubject for Node {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        match name {
            "id" => self.id.as_deref(),
            _ => self.attrs.get(name).map(String::as_str),
        }
    }
}

/// In-memory implementation of [`Page`]
#[derive(Debug, Clone)]
pub struct VirtualPage {
    nodes: Vec<Node>,
    scroll_y: f64,
    viewport_width: f64,
    viewport_height: f64,
    touch: bool,
    stylesheets: Vec<String>,
    preload_links: Vec<String>,
    preload_requests: Vec<ElementId>,
    log: Vec<Mutation>,
}

const BODY: ElementId = ElementId(0);

impl VirtualPage {
    /// Empty page with just a body
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        let body = Node {
            tag: "body".to_string(),
            id: None,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            text: None,
            style: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
            layout: Rect {
                top: 0.0,
                left: 0.0,
                width: viewport_width,
                height: 0.0,
            },
            alive: true,
        };
        Self {
            nodes: vec![body],
            scroll_y: 0.0,
            viewport_width,
            viewport_height,
            touch: false,
            stylesheets: Vec::new(),
            preload_links: Vec::new(),
            preload_requests: Vec::new(),
            log: Vec::new(),
        }
    }

    pub fn from_spec(spec: &PageSpec) -> Self {
        let mut page = Self::new(spec.viewport_width, spec.viewport_height);
        page.touch = spec.touch;
        for element in &spec.elements {
            page.build(BODY, element);
        }
        page.refresh_body_height();
        page.scroll_y = spec.scroll_y.clamp(0.0, page.max_scroll());
        page
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let spec: PageSpec =
            toml::from_str(content).map_err(|e| Error::PageSpec(e.to_string()))?;
        Ok(Self::from_spec(&spec))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// The built-in demo landing page
    pub fn sample() -> Result<Self> {
        Self::from_toml_str(SAMPLE_PAGE)
    }

    /// Raw TOML of the built-in demo page
    pub fn sample_source() -> &'static str {
        SAMPLE_PAGE
    }

    fn build(&mut self, parent: ElementId, spec: &ElementSpec) -> ElementId {
        let parent_width = self.node(parent).map(|n| n.layout.width).unwrap_or(self.viewport_width);
        let id = ElementId(self.nodes.len() as u32);
        self.nodes.push(Node {
            tag: spec.tag.to_ascii_lowercase(),
            id: spec.id.clone(),
            classes: spec.class.split_whitespace().map(str::to_string).collect(),
            attrs: spec.attrs.clone(),
            text: spec.text.clone(),
            style: spec.style.clone(),
            parent: Some(parent),
            children: Vec::new(),
            layout: Rect {
                top: spec.top,
                left: spec.left,
                width: spec.width.unwrap_or(parent_width),
                height: spec.height,
            },
            alive: true,
        });
        self.nodes[parent.0 as usize].children.push(id);

        for child in &spec.children {
            self.build(id, child);
        }
        id
    }

    fn node(&self, el: ElementId) -> Option<&Node> {
        self.nodes.get(el.0 as usize).filter(|n| n.alive)
    }

    fn node_mut(&mut self, el: ElementId) -> Result<&mut Node> {
        self.nodes
            .get_mut(el.0 as usize)
            .filter(|n| n.alive)
            .ok_or_else(|| Error::ElementNotFound(el.to_string()))
    }

    fn refresh_body_height(&mut self) {
        let height = self.document_height();
        self.nodes[BODY.0 as usize].layout.height = height;
    }

    /// Lowest bottom edge of any element
    pub fn document_height(&self) -> f64 {
        self.nodes
            .iter()
            .skip(1)
            .filter(|n| n.alive)
            .map(|n| n.layout.bottom())
            .fold(self.viewport_height, f64::max)
    }

    pub fn max_scroll(&self) -> f64 {
        (self.document_height() - self.viewport_height).max(0.0)
    }

    /// Move the viewport as a user would (not recorded as a mutation)
    pub fn set_scroll(&mut self, y: f64) {
        self.scroll_y = y.clamp(0.0, self.max_scroll());
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.scroll_y = self.scroll_y.clamp(0.0, self.max_scroll());
    }

    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    pub fn set_touch(&mut self, touch: bool) {
        self.touch = touch;
    }

    /// Live elements in document order, body excluded
    pub fn elements(&self) -> Vec<ElementId> {
        self.descendants(BODY)
    }

    fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = match self.node(root) {
            Some(n) => n.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(id) = stack.pop() {
            if let Some(node) = self.node(id) {
                out.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn ancestors(&self, el: ElementId) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut current = self.node(el).and_then(|n| n.parent);
        while let Some(id) = current {
            match self.node(id) {
                Some(node) => {
                    out.push(node);
                    current = node.parent;
                }
                None => break,
            }
        }
        out
    }

    /// Nesting depth below body (children of body are depth 0)
    pub fn depth(&self, el: ElementId) -> usize {
        self.ancestors(el).len().saturating_sub(1)
    }

    /// Document-space box
    pub fn layout(&self, el: ElementId) -> Option<Rect> {
        self.node(el).map(|n| n.layout)
    }

    pub fn tag(&self, el: ElementId) -> Option<&str> {
        self.node(el).map(|n| n.tag.as_str())
    }

    pub fn classes(&self, el: ElementId) -> Vec<String> {
        self.node(el).map(|n| n.classes.clone()).unwrap_or_default()
    }

    /// All inline style properties of an element
    pub fn styles(&self, el: ElementId) -> BTreeMap<String, String> {
        self.node(el).map(|n| n.style.clone()).unwrap_or_default()
    }

    pub fn is_alive(&self, el: ElementId) -> bool {
        self.node(el).is_some()
    }

    /// Short label such as `div#navbar.nav.scrolled`
    pub fn label(&self, el: ElementId) -> String {
        let Some(node) = self.nodes.get(el.0 as usize) else {
            return el.to_string();
        };
        let mut label = node.tag.clone();
        if let Some(id) = &node.id {
            label.push('#');
            label.push_str(id);
        }
        for class in &node.classes {
            label.push('.');
            label.push_str(class);
        }
        label
    }

    pub fn stylesheets(&self) -> &[String] {
        &self.stylesheets
    }

    pub fn preload_links(&self) -> &[String] {
        &self.preload_links
    }

    pub fn preload_requests(&self) -> &[ElementId] {
        &self.preload_requests
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.log
    }

    /// Drain the mutation log
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.log)
    }

    fn record(&mut self, mutation: Mutation) {
        self.log.push(mutation);
    }

    /// One-line, human readable form of a mutation
    pub fn describe(&self, mutation: &Mutation) -> String {
        match mutation {
            Mutation::Style { element, property, value } if value.is_empty() => {
                format!("{} {} removed", self.label(*element), property)
            }
            Mutation::Style { element, property, value } => {
                format!("{} {}: {}", self.label(*element), property, value)
            }
            Mutation::Class { element, class, on } => {
                format!("{} {}{}", self.label(*element), if *on { '+' } else { '-' }, class)
            }
            Mutation::Text { element, text } => format!("{} text {:?}", self.label(*element), text),
            Mutation::Scroll { y } => format!("scroll to {}", style::px(*y)),
            Mutation::Insert { parent, element, .. } => {
                format!("insert {} into {}", self.label(*element), self.label(*parent))
            }
            Mutation::Remove { element } => format!("remove {}", self.label(*element)),
            Mutation::Stylesheet { css } => format!("stylesheet ({} bytes)", css.len()),
            Mutation::PreloadLink { href } => format!("preload link {}", href),
            Mutation::PreloadImage { element } => format!("preload image {}", self.label(*element)),
        }
    }
}

/// Split `prop: value; prop: value` into pairs
fn parse_css_text(css: &str) -> Vec<(String, String)> {
    css.split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim();
            let value = value.trim();
            (!prop.is_empty() && !value.is_empty()).then(|| (prop.to_string(), value.to_string()))
        })
        .collect()
}

impl Page for VirtualPage {
    fn query_all(&self, selector: &Selector, scope: Option<ElementId>) -> Vec<ElementId> {
        let candidates = match scope {
            Some(root) => self.descendants(root),
            None => self.elements(),
        };
        candidates
            .into_iter()
            .filter(|el| self.matches(*el, selector))
            .collect()
    }

    fn by_id(&self, id: &str) -> Option<ElementId> {
        self.elements()
            .into_iter()
            .find(|el| self.node(*el).and_then(|n| n.id.as_deref()) == Some(id))
    }

    fn body(&self) -> ElementId {
        BODY
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.node(el).and_then(|n| n.parent)
    }

    fn matches(&self, el: ElementId, selector: &Selector) -> bool {
        match self.node(el) {
            Some(node) => selector.matches(node, self.ancestors(el)),
            None => false,
        }
    }

    fn rect(&self, el: ElementId) -> Option<Rect> {
        self.node(el).map(|n| Rect {
            top: n.layout.top - self.scroll_y,
            ..n.layout
        })
    }

    fn offset_top(&self, el: ElementId) -> f64 {
        self.node(el).map(|n| n.layout.top).unwrap_or(0.0)
    }

    fn offset_height(&self, el: ElementId) -> f64 {
        self.node(el).map(|n| n.layout.height).unwrap_or(0.0)
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn scroll_to(&mut self, y: f64) -> Result<()> {
        self.scroll_y = y.clamp(0.0, self.max_scroll());
        let y = self.scroll_y;
        self.record(Mutation::Scroll { y });
        Ok(())
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        self.node(el)
            .and_then(|n| n.attribute(name))
            .map(str::to_string)
    }

    fn text(&self, el: ElementId) -> Option<String> {
        self.node(el).and_then(|n| n.text.clone())
    }

    fn set_text(&mut self, el: ElementId, text: &str) -> Result<()> {
        self.node_mut(el)?.text = Some(text.to_string());
        self.record(Mutation::Text {
            element: el,
            text: text.to_string(),
        });
        Ok(())
    }

    fn style(&self, el: ElementId, property: &str) -> Option<String> {
        self.node(el).and_then(|n| n.style.get(property).cloned())
    }

    fn set_style(&mut self, el: ElementId, property: &str, value: &str) -> Result<()> {
        let node = self.node_mut(el)?;
        if value.is_empty() {
            node.style.remove(property);
        } else {
            node.style.insert(property.to_string(), value.to_string());
        }
        self.record(Mutation::Style {
            element: el,
            property: property.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.node(el).map(|n| n.has_class(class)).unwrap_or(false)
    }

    fn set_class(&mut self, el: ElementId, class: &str, on: bool) -> Result<()> {
        let node = self.node_mut(el)?;
        let present = node.classes.iter().any(|c| c == class);
        if on && !present {
            node.classes.push(class.to_string());
        } else if !on && present {
            node.classes.retain(|c| c != class);
        }
        self.record(Mutation::Class {
            element: el,
            class: class.to_string(),
            on,
        });
        Ok(())
    }

    fn insert_element(&mut self, parent: ElementId, element: NewElement, placement: Placement) -> Result<ElementId> {
        let parent_width = self.node_mut(parent)?.layout.width;

        let mut attrs = BTreeMap::new();
        let mut id_attr = None;
        let mut classes = Vec::new();
        for (name, value) in element.attributes {
            match name.as_str() {
                "id" => id_attr = Some(value),
                "class" => classes = value.split_whitespace().map(str::to_string).collect(),
                _ => {
                    attrs.insert(name, value);
                }
            }
        }

        let id = ElementId(self.nodes.len() as u32);
        let tag = element.tag.to_ascii_lowercase();
        self.nodes.push(Node {
            tag: tag.clone(),
            id: id_attr,
            classes,
            attrs,
            text: element.text,
            style: parse_css_text(&element.css_text).into_iter().collect(),
            parent: Some(parent),
            children: Vec::new(),
            layout: Rect {
                top: 0.0,
                left: 0.0,
                width: parent_width,
                height: 0.0,
            },
            alive: true,
        });

        let children = &mut self.nodes[parent.0 as usize].children;
        match placement {
            Placement::First => children.insert(0, id),
            Placement::Last => children.push(id),
        }

        self.record(Mutation::Insert {
            parent,
            element: id,
            tag,
        });
        Ok(id)
    }

    fn remove_element(&mut self, el: ElementId) -> Result<()> {
        if el == BODY {
            return Err(Error::Dom("cannot remove body".to_string()));
        }
        let parent = self.node_mut(el)?.parent;

        let mut doomed = self.descendants(el);
        doomed.push(el);
        for id in doomed {
            self.nodes[id.0 as usize].alive = false;
        }
        if let Some(parent) = parent {
            self.nodes[parent.0 as usize].children.retain(|c| *c != el);
        }

        self.record(Mutation::Remove { element: el });
        Ok(())
    }

    fn append_stylesheet(&mut self, css: &str) -> Result<()> {
        self.stylesheets.push(css.to_string());
        self.record(Mutation::Stylesheet {
            css: css.to_string(),
        });
        Ok(())
    }

    fn append_preload_link(&mut self, href: &str) -> Result<()> {
        self.preload_links.push(href.to_string());
        self.record(Mutation::PreloadLink {
            href: href.to_string(),
        });
        Ok(())
    }

    fn preload_image(&mut self, el: ElementId) -> Result<()> {
        self.node_mut(el)?;
        self.preload_requests.push(el);
        self.record(Mutation::PreloadImage { element: el });
        Ok(())
    }

    fn supports_touch(&self) -> bool {
        self.touch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
viewport_height = 600

[[element]]
tag = "nav"
id = "navbar"
height = 80

[[element.element]]
tag = "a"
class = "nav-link"
attrs = { href = "#about" }
text = "About"

[[element]]
tag = "section"
id = "about"
class = "section"
top = 900
height = 700

[[element.element]]
class = "feature"
top = 1000
height = 100
"##;

    fn page() -> VirtualPage {
        VirtualPage::from_toml_str(PAGE).unwrap()
    }

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    #[test]
    fn test_query_and_scope() {
        let page = page();
        let about = page.by_id("about").unwrap();
        assert_eq!(page.query_all(&sel(".feature"), None).len(), 1);
        assert_eq!(page.query_all(&sel(".feature"), Some(about)).len(), 1);
        let navbar = page.by_id("navbar").unwrap();
        assert!(page.query_all(&sel(".feature"), Some(navbar)).is_empty());
        assert!(page.query(&sel("#about .feature"), None).is_some());
    }

    #[test]
    fn test_rect_follows_scroll() {
        let mut page = page();
        let about = page.by_id("about").unwrap();
        assert_eq!(page.rect(about).unwrap().top, 900.0);
        page.set_scroll(500.0);
        assert_eq!(page.rect(about).unwrap().top, 400.0);
        assert_eq!(page.offset_top(about), 900.0);
    }

    #[test]
    fn test_scroll_clamped_to_document() {
        let mut page = page();
        assert_eq!(page.document_height(), 1600.0);
        page.scroll_to(5000.0).unwrap();
        assert_eq!(page.scroll_y(), 1000.0);
        assert_eq!(page.take_mutations(), vec![Mutation::Scroll { y: 1000.0 }]);
    }

    #[test]
    fn test_closest_and_contains() {
        let page = page();
        let link = page.query(&sel(".nav-link"), None).unwrap();
        let navbar = page.by_id("navbar").unwrap();
        assert_eq!(page.closest(link, &sel("nav")), Some(navbar));
        assert!(page.contains(navbar, link));
        assert!(!page.contains(link, navbar));
        assert_eq!(page.attribute(link, "href").as_deref(), Some("#about"));
    }

    #[test]
    fn test_insert_and_remove() {
        let mut page = page();
        let body = page.body();
        let el = page
            .insert_element(body, NewElement::new("a").attr("href", "#about").css("top: -40px; left: 6px"), Placement::First)
            .unwrap();
        assert_eq!(page.elements()[0], el);
        assert_eq!(page.style(el, "top").as_deref(), Some("-40px"));

        page.remove_element(el).unwrap();
        assert!(!page.is_alive(el));
        assert!(page.set_style(el, "top", "0").is_err());
        assert!(page.remove_element(body).is_err());
    }

    #[test]
    fn test_style_and_class_writes() {
        let mut page = page();
        let navbar = page.by_id("navbar").unwrap();
        page.set_class(navbar, "scrolled", true).unwrap();
        page.set_class(navbar, "scrolled", true).unwrap();
        assert_eq!(page.classes(navbar), vec!["scrolled".to_string()]);
        assert_eq!(page.label(navbar), "nav#navbar.scrolled");

        page.set_style(navbar, "transform", "translateY(0)").unwrap();
        page.set_style(navbar, "transform", "").unwrap();
        assert_eq!(page.style(navbar, "transform"), None);
        assert_eq!(page.mutations().len(), 4);
    }

    #[test]
    fn test_describe_mutations() {
        let mut page = VirtualPage::from_toml_str(PAGE).unwrap();
        let navbar = page.by_id("navbar").unwrap();
        page.set_class(navbar, "scrolled", true).unwrap();
        page.set_style(navbar, "transform", "translateY(0)").unwrap();
        page.set_style(navbar, "transform", "").unwrap();

        let lines: Vec<String> = page.mutations().iter().map(|m| page.describe(m)).collect();
        assert_eq!(lines[0], "nav#navbar.scrolled +scrolled");
        assert_eq!(lines[1], "nav#navbar.scrolled transform: translateY(0)");
        assert_eq!(lines[2], "nav#navbar.scrolled transform removed");
    }

    #[test]
    fn test_sample_page_loads() {
        let page = VirtualPage::sample().unwrap();
        assert!(page.by_id("navbar").is_some());
        assert!(page.by_id("about").is_some());
        assert!(page.document_height() > page.viewport_height());
    }

    #[test]
    fn test_bad_spec_is_error() {
        let err = VirtualPage::from_toml_str("viewport_height = \"tall\"").unwrap_err();
        assert!(matches!(err, Error::PageSpec(_)));
    }
}
