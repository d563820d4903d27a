//! Owned markup tree and the presentation-attribute sanitizer.
//!
//! Parsed documents borrow from `scraper`'s arena. The table the pipeline
//! keeps is copied into an owned [`Element`] tree so that the sanitizer can
//! take exclusive ownership, mutate it in place and serialize it.

use scraper::{ElementRef, Node as ParsedNode};
use std::fmt::Write as _;

/// Attributes removed from every node by [`sanitize`]: style class,
/// hyperlink target and click handler.
pub const PRESENTATION_ATTRIBUTES: [&str; 3] = ["class", "href", "onclick"];

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// A node of an owned markup tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Element with attributes and children.
    Element(Element),
    /// Text content.
    Text(String),
    /// Comment content.
    Comment(String),
}

/// An owned markup element.
///
/// Attributes keep their source order. Names are compared
/// case-insensitively.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name.
    pub name: String,
    /// Attribute name/value pairs.
    pub attrs: Vec<(String, String)>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an element without attributes or children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Deep-copies a parsed element.
    #[must_use]
    pub fn from_parsed(element: ElementRef<'_>) -> Self {
        let value = element.value();
        let mut owned = Self::new(value.name());
        owned.attrs = value
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        for child in element.children() {
            match child.value() {
                ParsedNode::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        owned.children.push(Node::Element(Self::from_parsed(child)));
                    }
                }
                ParsedNode::Text(text) => owned.children.push(Node::Text(text.text.to_string())),
                ParsedNode::Comment(comment) => {
                    owned
                        .children
                        .push(Node::Comment(comment.comment.to_string()));
                }
                _ => {}
            }
        }
        owned
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style child appender.
    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the value of an attribute.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Sets an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self
            .attrs
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    /// Removes an attribute if present, returning its value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self
            .attrs
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))?;
        Some(self.attrs.remove(idx).1)
    }

    /// Applies `f` to this element and every descendant element, depth first.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Self)) {
        f(self);
        for child in &mut self.children {
            if let Node::Element(el) = child {
                el.walk_mut(f);
            }
        }
    }

    /// Applies `f` to this element and every descendant element, depth first.
    pub fn walk(&self, f: &mut impl FnMut(&Self)) {
        f(self);
        for child in &self.children {
            if let Node::Element(el) = child {
                el.walk(f);
            }
        }
    }

    /// Removes every [`PRESENTATION_ATTRIBUTES`] entry from this element and
    /// all its descendants.
    pub fn strip_presentation(&mut self) {
        self.walk_mut(&mut |el| {
            for name in PRESENTATION_ATTRIBUTES {
                el.remove_attr(name);
            }
        });
    }

    /// Serializes the tree to markup. Newline characters in text are dropped.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    // `ElementRef::html()` only sees scraper's immutable arena, so the
    // stripped attributes would come back. It also writes `<br>` and keeps
    // newlines, which this output must not.
    fn write_markup(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.name);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape(value, true));
        }
        if VOID_ELEMENTS.contains(&self.name.as_str()) {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(el) => el.write_markup(out),
                Node::Text(text) => out.push_str(&escape(text, false)),
                Node::Comment(comment) => {
                    let _ = write!(out, "<!--{}-->", strip_newlines(comment));
                }
            }
        }
        let _ = write!(out, "</{}>", self.name);
    }
}

fn strip_newlines(s: &str) -> String {
    s.chars().filter(|c| *c != '\n' && *c != '\r').collect()
}

fn escape(s: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\n' | '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// Strips presentation attributes from the whole tree and serializes it.
///
/// Takes ownership: the tree is mutated in place and dropped afterwards.
#[must_use]
pub fn sanitize(mut table: Element) -> String {
    table.strip_presentation();
    table.to_markup()
}
