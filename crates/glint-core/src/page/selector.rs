//! A small CSS selector subset
//!
//! Supported: comma-separated lists of descendant chains of compound
//! selectors made of `tag`, `#id`, `.class`, `[attr]`, `[attr="v"]`,
//! `[attr*="v"]`, `[attr^="v"]` and `[attr$="v"]`. Other combinators and
//! pseudo-classes are rejected.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Attribute comparison inside `[...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
    StartsWith(String),
    EndsWith(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrFilter {
    pub name: String,
    pub op: AttrOp,
}

impl AttrFilter {
    fn matches(&self, value: Option<&str>) -> bool {
        match (&self.op, value) {
            (_, None) => false,
            (AttrOp::Exists, Some(_)) => true,
            (AttrOp::Equals(v), Some(actual)) => actual == v,
            (AttrOp::Contains(v), Some(actual)) => actual.contains(v.as_str()),
            (AttrOp::StartsWith(v), Some(actual)) => actual.starts_with(v.as_str()),
            (AttrOp::EndsWith(v), Some(actual)) => actual.ends_with(v.as_str()),
        }
    }
}

/// Anything a compound selector can be tested against
pub trait SelectorSubject {
    fn tag(&self) -> &str;
    fn id(&self) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
    fn attribute(&self, name: &str) -> Option<&str>;
}

/// One compound selector such as `img.hero[src*="cdn"]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrFilter>,
}

impl Compound {
    pub fn matches<S: SelectorSubject + ?Sized>(&self, subject: &S) -> bool {
        if let Some(tag) = &self.tag {
            if !subject.tag().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if subject.id() != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| subject.has_class(c))
            && self
                .attrs
                .iter()
                .all(|a| a.matches(subject.attribute(&a.name)))
    }

    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }
}

/// A descendant chain, outermost compound first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub parts: Vec<Compound>,
}

impl Chain {
    /// Match `subject` given its ancestors, nearest first
    pub fn matches<'a, S, I>(&self, subject: &S, ancestors: I) -> bool
    where
        S: SelectorSubject + ?Sized + 'a,
        I: IntoIterator<Item = &'a S>,
    {
        let Some((last, rest)) = self.parts.split_last() else {
            return false;
        };
        if !last.matches(subject) {
            return false;
        }

        // Greedy right-to-left walk is exact for descendant-only chains
        let mut remaining = rest.iter().rev().peekable();
        for ancestor in ancestors {
            match remaining.peek() {
                Some(part) if part.matches(ancestor) => {
                    remaining.next();
                }
                Some(_) => {}
                None => break,
            }
        }
        remaining.peek().is_none()
    }
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    chains: Vec<Chain>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self> {
        let source = source.trim();
        if source.is_empty() {
            return Err(selector_error(source, "empty selector"));
        }

        let mut chains = Vec::new();
        for alternative in split_top_level(source) {
            chains.push(parse_chain(source, alternative.trim())?);
        }

        Ok(Self {
            source: source.to_string(),
            chains,
        })
    }

    /// Original selector text, suitable for `querySelectorAll`
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// True if any alternative matches
    pub fn matches<'a, S, I>(&self, subject: &S, ancestors: I) -> bool
    where
        S: SelectorSubject + ?Sized + 'a,
        I: IntoIterator<Item = &'a S>,
        I::IntoIter: Clone,
    {
        let ancestors = ancestors.into_iter();
        self.chains
            .iter()
            .any(|chain| chain.matches(subject, ancestors.clone()))
    }
}

impl FromStr for Selector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn selector_error(selector: &str, reason: impl Into<String>) -> Error {
    Error::Selector {
        selector: selector.to_string(),
        reason: reason.into(),
    }
}

/// Split on commas that are not inside brackets or quotes
fn split_top_level(source: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, ch) in source.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&source[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&source[start..]);
    parts
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_chain(full: &str, text: &str) -> Result<Chain> {
    if text.is_empty() {
        return Err(selector_error(full, "empty alternative"));
    }

    let chars: Vec<char> = text.chars().collect();
    let mut pos = 0;
    let mut parts = Vec::new();

    while pos < chars.len() {
        if chars[pos].is_whitespace() {
            pos += 1;
            continue;
        }
        let (compound, next) = parse_compound(full, &chars, pos)?;
        parts.push(compound);
        pos = next;
    }

    Ok(Chain { parts })
}

fn read_ident(chars: &[char], mut pos: usize) -> (String, usize) {
    let start = pos;
    while pos < chars.len() && is_ident_char(chars[pos]) {
        pos += 1;
    }
    (chars[start..pos].iter().collect(), pos)
}

fn parse_compound(full: &str, chars: &[char], mut pos: usize) -> Result<(Compound, usize)> {
    let mut compound = Compound::default();
    let mut universal = false;

    if pos < chars.len() && is_ident_char(chars[pos]) {
        let (tag, next) = read_ident(chars, pos);
        compound.tag = Some(tag.to_ascii_lowercase());
        pos = next;
    } else if pos < chars.len() && chars[pos] == '*' {
        universal = true;
        pos += 1;
    }

    while pos < chars.len() && !chars[pos].is_whitespace() {
        match chars[pos] {
            '#' => {
                let (id, next) = read_ident(chars, pos + 1);
                if id.is_empty() {
                    return Err(selector_error(full, "expected id after '#'"));
                }
                compound.id = Some(id);
                pos = next;
            }
            '.' => {
                let (class, next) = read_ident(chars, pos + 1);
                if class.is_empty() {
                    return Err(selector_error(full, "expected class after '.'"));
                }
                compound.classes.push(class);
                pos = next;
            }
            '[' => {
                let (filter, next) = parse_attr(full, chars, pos + 1)?;
                compound.attrs.push(filter);
                pos = next;
            }
            '>' | '+' | '~' => {
                return Err(selector_error(full, format!("combinator '{}' is not supported", chars[pos])));
            }
            ':' => {
                return Err(selector_error(full, "pseudo-classes are not supported"));
            }
            other => {
                return Err(selector_error(full, format!("unexpected character '{}'", other)));
            }
        }
    }

    if compound.is_empty() && !universal {
        return Err(selector_error(full, "empty compound selector"));
    }

    Ok((compound, pos))
}

fn parse_attr(full: &str, chars: &[char], mut pos: usize) -> Result<(AttrFilter, usize)> {
    let (name, next) = read_ident(chars, pos);
    if name.is_empty() {
        return Err(selector_error(full, "expected attribute name"));
    }
    pos = next;

    let op_kind = match chars.get(pos) {
        Some(']') => {
            return Ok((
                AttrFilter {
                    name,
                    op: AttrOp::Exists,
                },
                pos + 1,
            ));
        }
        Some('=') => {
            pos += 1;
            '='
        }
        Some(c @ ('*' | '^' | '$')) if chars.get(pos + 1) == Some(&'=') => {
            pos += 2;
            *c
        }
        _ => return Err(selector_error(full, "malformed attribute filter")),
    };

    let value = match chars.get(pos) {
        Some(q @ ('"' | '\'')) => {
            let q = *q;
            let start = pos + 1;
            let end = chars[start..]
                .iter()
                .position(|c| *c == q)
                .map(|offset| start + offset)
                .ok_or_else(|| selector_error(full, "unterminated attribute value"))?;
            pos = end + 1;
            chars[start..end].iter().collect::<String>()
        }
        _ => {
            let (value, next) = read_ident(chars, pos);
            pos = next;
            value
        }
    };

    if chars.get(pos) != Some(&']') {
        return Err(selector_error(full, "expected ']'"));
    }

    let op = match op_kind {
        '=' => AttrOp::Equals(value),
        '*' => AttrOp::Contains(value),
        '^' => AttrOp::StartsWith(value),
        _ => AttrOp::EndsWith(value),
    };

    Ok((AttrFilter { name, op }, pos + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Node {
        tag: &'static str,
        id: Option<&'static str>,
        classes: Vec<&'static str>,
        attrs: HashMap<&'static str, &'static str>,
    }

    impl SelectorSubject for Node {
        fn tag(&self) -> &str {
            self.tag
        }
        fn id(&self) -> Option<&str> {
            self.id
        }
        fn has_class(&self, class: &str) -> bool {
            self.classes.contains(&class)
        }
        fn attribute(&self, name: &str) -> Option<&str> {
            match name {
                "id" => self.id,
                _ => self.attrs.get(name).copied(),
            }
        }
    }

    fn node(tag: &'static str, id: Option<&'static str>, classes: &[&'static str]) -> Node {
        Node {
            tag,
            id,
            classes: classes.to_vec(),
            attrs: HashMap::new(),
        }
    }

    #[test]
    fn test_parse_list() {
        let sel = Selector::parse(".nav-link, .cta-primary, .cta-secondary").unwrap();
        assert_eq!(sel.chains().len(), 3);
        assert_eq!(sel.as_str(), ".nav-link, .cta-primary, .cta-secondary");
    }

    #[test]
    fn test_descendant_match() {
        let sel = Selector::parse(".hero-stats .stat-number").unwrap();
        let stat = node("span", None, &["stat-number"]);
        let wrapper = node("div", None, &["stat"]);
        let stats = node("div", None, &["hero-stats"]);
        let other = node("div", None, &["contact"]);

        assert!(sel.matches(&stat, [&wrapper, &stats]));
        assert!(!sel.matches(&stat, [&wrapper, &other]));
        assert!(!sel.matches(&wrapper, [&stats]));
    }

    #[test]
    fn test_attribute_filters() {
        let sel = Selector::parse(r#"img[src*="unsplash"]"#).unwrap();
        let mut img = node("img", None, &[]);
        img.attrs.insert("src", "https://images.unsplash.com/photo.jpg");
        assert!(sel.matches(&img, []));

        img.attrs.insert("src", "/local.png");
        assert!(!sel.matches(&img, []));

        let tilt = Selector::parse("[data-tilt]").unwrap();
        let mut card = node("div", None, &["card"]);
        assert!(!tilt.matches(&card, []));
        card.attrs.insert("data-tilt", "");
        assert!(tilt.matches(&card, []));
    }

    #[test]
    fn test_id_and_tag() {
        let sel = Selector::parse("nav#navbar.fixed").unwrap();
        assert!(sel.matches(&node("NAV", Some("navbar"), &["fixed"]), []));
        assert!(!sel.matches(&node("nav", Some("navbar"), &[]), []));
    }

    #[test]
    fn test_rejects_unsupported() {
        for bad in ["", "a > b", "a:hover", ".", "[x", "[x~=y]", "div,", "#"] {
            assert!(Selector::parse(bad).is_err(), "accepted {:?}", bad);
        }
    }
}
