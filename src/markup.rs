//! Markup tree and the deferred-loading rewrite.
//!
//! Synthesis assembles a small element tree rather than a string so that
//! later passes can work on attributes by name. [`defer_loading`] renames
//! `src`, `srcset` and `sizes` to their `data-` forms for client-side lazy
//! loaders; [`restore_eager`] undoes it. Neither pass can touch an attribute
//! that merely contains one of those names (`data-source`, `srcset-hint`).
//!
//! Rendering goes through [`maud::Render`], so a [`MarkupTree`] drops
//! straight into a maud template:
//!
//! ```
//! # use picture_synth::markup::{Element, MarkupTree};
//! # use maud::html;
//! let picture = Element::new("picture").child(Element::new("img").attr("src", "/a.jpg"));
//! let tree = MarkupTree::new(picture, None);
//! let page = html! { figure { (tree) } };
//! assert_eq!(page.into_string(), r#"<figure><picture><img src="/a.jpg"></picture></figure>"#);
//! ```
//!
//! Attribute values are escaped once, here, with maud's escaping.

use maud::{Markup, Render, html};

/// Attribute pairs renamed by [`defer_loading`], eager name first.
pub const DEFERRED_ATTRIBUTES: [(&str, &str); 3] = [
    ("src", "data-src"),
    ("srcset", "data-srcset"),
    ("sizes", "data-sizes"),
];

/// Elements rendered without a closing tag.
const VOID_ELEMENTS: [&str; 2] = ["img", "source"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<Attr>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.push(Attr {
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    /// Add the attribute only when `value` is present.
    pub fn attr_opt(self, name: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Depth-first visit of this element and all descendants.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }

    /// First descendant (or self) with the given tag.
    pub fn find(&self, tag: &str) -> Option<&Element> {
        if self.tag == tag {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(tag))
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag.as_str())
    }
}

fn escape(value: &str) -> String {
    html! { (value) }.into_string()
}

impl Render for Element {
    fn render_to(&self, buffer: &mut String) {
        buffer.push('<');
        buffer.push_str(&self.tag);
        for attr in &self.attrs {
            buffer.push(' ');
            buffer.push_str(&attr.name);
            buffer.push_str("=\"");
            buffer.push_str(&escape(&attr.value));
            buffer.push('"');
        }
        buffer.push('>');
        if self.is_void() {
            return;
        }
        for child in &self.children {
            child.render_to(buffer);
        }
        buffer.push_str("</");
        buffer.push_str(&self.tag);
        buffer.push('>');
    }
}

fn rename_attributes(root: &mut Element, pairs: &[(&str, &str)]) {
    root.walk_mut(&mut |el| {
        for attr in &mut el.attrs {
            if let Some((_, to)) = pairs.iter().find(|(from, _)| attr.name == *from) {
                attr.name = to.to_string();
            }
        }
    });
}

/// Rename `src`/`srcset`/`sizes` to `data-*` across the tree.
pub fn defer_loading(root: &mut Element) {
    rename_attributes(root, &DEFERRED_ATTRIBUTES);
}

/// Inverse of [`defer_loading`].
pub fn restore_eager(root: &mut Element) {
    let reversed: Vec<(&str, &str)> = DEFERRED_ATTRIBUTES
        .iter()
        .map(|(eager, deferred)| (*deferred, *eager))
        .collect();
    rename_attributes(root, &reversed);
}

/// Remove one class token; an emptied `class` attribute is dropped.
pub fn remove_class(el: &mut Element, class: &str) {
    let Some(pos) = el.attrs.iter().position(|a| a.name == "class") else {
        return;
    };
    let remaining: Vec<&str> = el.attrs[pos]
        .value
        .split_whitespace()
        .filter(|token| *token != class)
        .collect();
    if remaining.is_empty() {
        el.attrs.remove(pos);
    } else {
        el.attrs[pos].value = remaining.join(" ");
    }
}

/// A synthesized `<picture>` plus an optional `<noscript>` sibling.
///
/// Built once per request and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupTree {
    picture: Element,
    noscript: Option<Element>,
}

impl MarkupTree {
    pub fn new(picture: Element, noscript: Option<Element>) -> Self {
        Self { picture, noscript }
    }

    pub fn picture(&self) -> &Element {
        &self.picture
    }

    pub fn noscript(&self) -> Option<&Element> {
        self.noscript.as_ref()
    }

    /// `<source>` children in emission order.
    pub fn sources(&self) -> Vec<&Element> {
        self.picture
            .children
            .iter()
            .filter(|c| c.tag == "source")
            .collect()
    }

    pub fn img(&self) -> Option<&Element> {
        self.picture.children.iter().find(|c| c.tag == "img")
    }

    /// Undo deferred loading: restore eager attribute names, strip the
    /// marker class from the `<img>` and drop the `<noscript>` copy.
    pub fn into_eager(mut self, marker_class: &str) -> Self {
        restore_eager(&mut self.picture);
        for child in &mut self.picture.children {
            if child.tag == "img" {
                remove_class(child, marker_class);
            }
        }
        self.noscript = None;
        self
    }

    pub fn into_string(self) -> String {
        self.render().into_string()
    }
}

impl Render for MarkupTree {
    fn render(&self) -> Markup {
        html! {
            (self.picture)
            @if let Some(noscript) = &self.noscript {
                (noscript)
            }
        }
    }
}
