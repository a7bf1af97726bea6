//! Owned HTML node tree used as the projection format of the block model.
//!
//! Parsing goes through html5ever (via kuchiki) and the resulting DOM is
//! projected into plain `Node`/`Element` values the editor can mutate. Parsed
//! attributes come out sorted by name; built elements keep insertion order.
//! The serializer escapes text and writes void elements without a closing
//! tag, so for any tree `t` produced by `parse_fragment`,
//! `parse_fragment(&to_html(&t))` yields `t` again.

use std::fmt::Write as _;

use kuchiki::traits::*;
use kuchiki::NodeRef;

const VOID_TAGS: &[&str] = &["br", "img", "hr", "input", "meta", "link", "wbr", "col"];
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(s) => out.push_str(s),
            Node::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Number of characters this node contributes to its line's text.
    pub fn char_len(&self) -> usize {
        match self {
            Node::Text(s) => s.chars().count(),
            Node::Element(el) => el.children.iter().map(Node::char_len).sum(),
        }
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, Node::Text(s) if s.trim().is_empty())
    }

    pub fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(s) => out.push_str(&escape_text(s)),
            Node::Element(el) => el.write_html(out),
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: append an attribute.
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder: append a child node.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Builder: append a text child. Empty strings add nothing.
    pub fn with_text(mut self, text: &str) -> Self {
        if !text.is_empty() {
            self.children.push(Node::Text(text.to_string()));
        }
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k == name)
    }

    /// Replaces the value in place if present, else appends.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| k != name);
    }

    pub fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag.as_str())
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }

    pub fn char_len(&self) -> usize {
        self.children.iter().map(Node::char_len).sum()
    }

    /// Depth-first search for the first descendant (or self) matching `pred`.
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if pred(self) {
            return Some(self);
        }
        self.children
            .iter()
            .filter_map(Node::as_element)
            .find_map(|child| child.find(pred))
    }

    /// All descendants (excluding self) matching `pred`, in document order.
    pub fn find_all<'a>(&'a self, pred: &dyn Fn(&Element) -> bool) -> Vec<&'a Element> {
        let mut out = Vec::new();
        for child in self.children.iter().filter_map(Node::as_element) {
            if pred(child) {
                out.push(child);
            }
            out.extend(child.find_all(pred));
        }
        out
    }

    /// The first descendant carrying `data-field="<name>"`.
    pub fn field(&self, name: &str) -> Option<&Element> {
        self.find(&|el| el.attr("data-field") == Some(name))
    }

    pub fn inner_html(&self) -> String {
        to_html(&self.children)
    }

    pub fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
        }
        out.push('>');
        if self.is_void() {
            return;
        }
        if RAW_TEXT_TAGS.contains(&self.tag.as_str()) {
            for child in &self.children {
                if let Node::Text(s) = child {
                    out.push_str(s);
                }
            }
        } else {
            for child in &self.children {
                child.write_html(out);
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }
}

pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.write_html(&mut out);
    }
    out
}

pub fn escape_text(s: &str) -> String {
    html_escape::encode_text(s).into_owned()
}

pub fn escape_attr(s: &str) -> String {
    html_escape::encode_double_quoted_attribute(s).into_owned()
}

// ────────────────────────────────────────────────────────────────────────────
// Parser
// ────────────────────────────────────────────────────────────────────────────

/// Parses an HTML fragment into a node list. Never fails.
///
/// The input is parsed as the body of a full document, so implied end tags,
/// misnested markup and entities follow the HTML parsing algorithm. Comments
/// and doctypes are dropped.
pub fn parse_fragment(input: &str) -> Vec<Node> {
    let document = kuchiki::parse_html().one(format!("<body>{input}"));
    let body = document
        .descendants()
        .find(|node| node.as_element().is_some_and(|el| &*el.name.local == "body"));
    match body {
        Some(body) => body.children().filter_map(|child| project(&child)).collect(),
        None => Vec::new(),
    }
}

fn project(node: &NodeRef) -> Option<Node> {
    if let Some(text) = node.as_text() {
        return Some(Node::Text(text.borrow().clone()));
    }
    let data = node.as_element()?;
    let mut el = Element::new(&data.name.local);
    for (name, attr) in data.attributes.borrow().map.iter() {
        el.attrs.push((name.local.to_string(), attr.value.clone()));
    }
    el.children = node.children().filter_map(|child| project(&child)).collect();
    Some(Node::Element(el))
}

// ────────────────────────────────────────────────────────────────────────────
// Inline editing helpers (char offsets over a line's text content)
// ────────────────────────────────────────────────────────────────────────────

/// Splits inline children at a char offset. Elements straddling the offset
/// are cloned into both halves; empty text fragments are dropped.
pub fn split_at(children: Vec<Node>, offset: usize) -> (Vec<Node>, Vec<Node>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut remaining = offset;

    for node in children {
        if remaining == 0 {
            right.push(node);
            continue;
        }
        let len = node.char_len();
        if len <= remaining {
            remaining -= len;
            left.push(node);
            continue;
        }
        match node {
            Node::Text(s) => {
                let byte = s
                    .char_indices()
                    .nth(remaining)
                    .map(|(b, _)| b)
                    .unwrap_or(s.len());
                let (a, b) = s.split_at(byte);
                if !a.is_empty() {
                    left.push(Node::Text(a.to_string()));
                }
                if !b.is_empty() {
                    right.push(Node::Text(b.to_string()));
                }
            }
            Node::Element(el) => {
                let (a, b) = split_at(el.children, remaining);
                left.push(Node::Element(Element {
                    tag: el.tag.clone(),
                    attrs: el.attrs.clone(),
                    children: a,
                }));
                right.push(Node::Element(Element {
                    tag: el.tag,
                    attrs: el.attrs,
                    children: b,
                }));
            }
        }
        remaining = 0;
    }

    (left, right)
}

/// Merges adjacent text nodes and drops empty ones.
pub fn normalize_text(children: &mut Vec<Node>) {
    let mut out: Vec<Node> = Vec::with_capacity(children.len());
    for node in children.drain(..) {
        match node {
            Node::Text(s) if s.is_empty() => {}
            Node::Text(s) => {
                if let Some(Node::Text(prev)) = out.last_mut() {
                    prev.push_str(&s);
                } else {
                    out.push(Node::Text(s));
                }
            }
            other => out.push(other),
        }
    }
    *children = out;
}

/// Inserts inline nodes at a char offset.
pub fn insert_inline(children: &mut Vec<Node>, offset: usize, nodes: Vec<Node>) {
    let (mut left, right) = split_at(std::mem::take(children), offset);
    left.extend(nodes);
    left.extend(right);
    normalize_text(&mut left);
    *children = left;
}

/// Removes the first `count` characters of a line's inline content.
pub fn remove_leading_chars(children: &mut Vec<Node>, count: usize) {
    let (_, right) = split_at(std::mem::take(children), count);
    *children = right;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_and_serialize_nested() {
        let html = r#"<section class="blk" data-block="quote"><p>Hello <b>world</b></p></section>"#;
        let nodes = parse_fragment(html);
        assert_eq!(nodes.len(), 1);
        assert_eq!(to_html(&nodes), html);
    }

    #[test]
    fn test_void_elements_have_no_children() {
        let nodes = parse_fragment("a<br>b<img src=\"x.png\" alt=\"\"/>c");
        assert_eq!(nodes.len(), 5);
        assert_eq!(to_html(&nodes), "a<br>b<img alt=\"\" src=\"x.png\">c");
    }

    #[test]
    fn test_entities_round_trip() {
        let nodes = parse_fragment("<p>a &amp; b &lt;c&gt; &#39;d&#39; &copy;</p>");
        assert_eq!(nodes[0].text_content(), "a & b <c> 'd' ©");
        assert_eq!(to_html(&nodes), "<p>a &amp; b &lt;c&gt; 'd' ©</p>");
    }

    #[test]
    fn test_unmatched_end_tag_ignored_and_unclosed_closed() {
        let nodes = parse_fragment("<p>one</div><b>two");
        assert_eq!(to_html(&nodes), "<p>one<b>two</b></p>");
    }

    #[test]
    fn test_implied_end_tags() {
        let nodes = parse_fragment("<ul><li>a<li>b</ul><p>one<p>two");
        assert_eq!(
            to_html(&nodes),
            "<ul><li>a</li><li>b</li></ul><p>one</p><p>two</p>"
        );
    }

    #[test]
    fn test_block_inside_paragraph_closes_it() {
        let nodes = parse_fragment("<p>lead<div>box</div>tail</p>");
        assert_eq!(to_html(&nodes), "<p>lead</p><div>box</div>tail<p></p>");
    }

    #[test]
    fn test_leading_whitespace_and_script_stay_in_fragment() {
        let nodes = parse_fragment("  <script>if (a < b) {}</script><p>x</p>");
        assert_eq!(nodes[0], Node::text("  "));
        let script = nodes[1].as_element().unwrap();
        assert_eq!(script.tag, "script");
        assert_eq!(script.text_content(), "if (a < b) {}");
        assert_eq!(nodes[2].text_content(), "x");
    }

    #[test]
    fn test_comments_dropped() {
        let nodes = parse_fragment("a<!-- note -->b");
        assert_eq!(to_html(&nodes), "ab");
    }

    #[test]
    fn test_attribute_forms() {
        let nodes = parse_fragment("<a href='/x' target=_blank data-x title=\"&quot;q&quot;\">y</a>");
        let a = nodes[0].as_element().unwrap();
        assert_eq!(a.attr("href"), Some("/x"));
        assert_eq!(a.attr("target"), Some("_blank"));
        assert_eq!(a.attr("data-x"), Some(""));
        assert_eq!(a.attr("title"), Some("\"q\""));
        assert_eq!(
            a.to_html(),
            r#"<a data-x="" href="/x" target="_blank" title="&quot;q&quot;">y</a>"#
        );
    }

    #[test]
    fn test_split_at_inside_bold() {
        let nodes = parse_fragment("ab<b>cd</b>ef");
        let (left, right) = split_at(nodes, 3);
        assert_eq!(to_html(&left), "ab<b>c</b>");
        assert_eq!(to_html(&right), "<b>d</b>ef");
    }

    #[test]
    fn test_insert_inline_merges_text() {
        let mut nodes = vec![Node::text("hello")];
        insert_inline(&mut nodes, 5, vec![Node::text(" world")]);
        assert_eq!(nodes, vec![Node::text("hello world")]);
    }

    #[test]
    fn test_remove_leading_chars() {
        let mut nodes = parse_fragment("# <i>Title</i>");
        remove_leading_chars(&mut nodes, 2);
        assert_eq!(to_html(&nodes), "<i>Title</i>");
    }
}
