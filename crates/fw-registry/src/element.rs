//! Render tree produced by widgets
//!
//! Widgets never touch a live document. They return an [`Element`] tree which
//! the hosting form renderer turns into markup with [`Element::to_html`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Elements rendered without a closing tag
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta", "link"];

/// A node in a rendered widget tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Element {
    /// Plain text, escaped on output
    Text(String),

    /// Tagged node with string attributes and children
    Node {
        /// Tag name (`div`, `input`, ...)
        tag: String,
        /// Attributes, sorted for stable output
        #[serde(default)]
        attrs: BTreeMap<String, String>,
        /// Child nodes
        #[serde(default)]
        children: Vec<Element>,
    },
}

impl Element {
    /// Create a text node
    #[inline]
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// Create an empty node
    #[inline]
    #[must_use]
    pub fn node(tag: impl Into<String>) -> Self {
        Self::Node {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute (ignored on text nodes)
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Node { attrs, .. } = &mut self {
            attrs.insert(key.into(), value.into());
        }
        self
    }

    /// Add an attribute only when `condition` holds
    #[must_use]
    pub fn flag(self, key: &str, condition: bool) -> Self {
        if condition {
            self.attr(key, key)
        } else {
            self
        }
    }

    /// Append a child (ignored on text nodes)
    #[must_use]
    pub fn child(mut self, child: Element) -> Self {
        if let Self::Node { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    /// Append several children
    #[must_use]
    pub fn children(mut self, items: impl IntoIterator<Item = Element>) -> Self {
        if let Self::Node { children, .. } = &mut self {
            children.extend(items);
        }
        self
    }

    /// Tag name, `None` for text
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Node { tag, .. } => Some(tag),
        }
    }

    /// Attribute lookup, `None` for text or missing keys
    #[must_use]
    pub fn get_attr(&self, key: &str) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Node { attrs, .. } => attrs.get(key).map(String::as_str),
        }
    }

    /// Concatenated text of the whole subtree
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(t) => out.push_str(t),
            Self::Node { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Depth-first search for the first node with `tag`
    #[must_use]
    pub fn find_tag(&self, wanted: &str) -> Option<&Element> {
        match self {
            Self::Text(_) => None,
            Self::Node { tag, children, .. } => {
                if tag == wanted {
                    return Some(self);
                }
                children.iter().find_map(|c| c.find_tag(wanted))
            }
        }
    }

    /// Serialize to escaped HTML
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Text(t) => out.push_str(&escape_html(t)),
            Self::Node {
                tag,
                attrs,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (key, value) in attrs {
                    let _ = write!(out, " {key}=\"{}\"", escape_html(value));
                }
                out.push('>');
                if VOID_TAGS.contains(&tag.as_str()) {
                    return;
                }
                for child in children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

/// Escape text for safe inclusion in HTML content and attribute values
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn html_escapes_text_and_attrs() {
        let el = Element::node("p")
            .attr("title", "a \"quoted\" <value>")
            .child(Element::text("1 < 2 & 3"));

        assert_eq!(
            el.to_html(),
            "<p title=\"a &quot;quoted&quot; &lt;value&gt;\">1 &lt; 2 &amp; 3</p>"
        );
    }

    #[test]
    fn void_tags_have_no_closing_tag() {
        let el = Element::node("input").attr("id", "x").flag("disabled", true);
        assert_eq!(el.to_html(), "<input disabled=\"disabled\" id=\"x\">");
    }

    #[test]
    fn text_content_walks_subtree() {
        let el = Element::node("div")
            .child(Element::node("label").child(Element::text("Name")))
            .child(Element::text(": "))
            .child(Element::node("span").child(Element::text("Ada")));

        assert_eq!(el.text_content(), "Name: Ada");
        assert_eq!(el.find_tag("span").map(Element::text_content), Some("Ada".to_string()));
    }

    #[test]
    fn deserializes_untagged_tree() {
        let json = serde_json::json!({
            "tag": "div",
            "attrs": { "class": "w" },
            "children": ["hello", { "tag": "br" }]
        });
        let el: Element = serde_json::from_value(json).unwrap();

        assert_eq!(el.get_attr("class"), Some("w"));
        assert_eq!(el.to_html(), "<div class=\"w\">hello<br></div>");
    }
}
