//! The in-memory document: an ordered list of top-level nodes, each either a
//! structured block, a generic element (paragraph, heading, list, ...) or a
//! bare text run.

use serde_json::Value;

use crate::editor::blocks::Block;
use crate::editor::decorate::{decorate, strip_decorations};
use crate::editor::html::{parse_fragment, Element, Node};
use crate::models::document::ContentEnvelope;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocNode {
    Block(Block),
    Element(Element),
    Text(String),
}

impl DocNode {
    pub fn from_node(node: Node) -> Self {
        match node {
            Node::Text(s) => DocNode::Text(s),
            Node::Element(el) => match Block::from_element(&el) {
                Some(block) => DocNode::Block(block),
                None => DocNode::Element(el),
            },
        }
    }

    pub fn to_node(&self) -> Node {
        match self {
            DocNode::Block(block) => Node::Element(block.render()),
            DocNode::Element(el) => Node::Element(el.clone()),
            DocNode::Text(s) => Node::Text(s.clone()),
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            DocNode::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_block_mut(&mut self) -> Option<&mut Block> {
        match self {
            DocNode::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, DocNode::Block(_))
    }

    /// An empty paragraph (or a whitespace-only text run).
    pub fn is_empty_line(&self) -> bool {
        match self {
            DocNode::Element(el) => {
                matches!(el.tag.as_str(), "p" | "div")
                    && el.text_content().trim().is_empty()
                    && el.find(&|e| e.tag == "img").is_none()
            }
            DocNode::Text(s) => s.trim().is_empty(),
            DocNode::Block(_) => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub nodes: Vec<DocNode>,
}

impl Document {
    /// Parses persisted or surface HTML. Decorations are stripped first.
    pub fn parse(html: &str) -> Self {
        let mut nodes = parse_fragment(html);
        strip_decorations(&mut nodes);
        Self::from_nodes(nodes)
    }

    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self {
            nodes: nodes.into_iter().map(DocNode::from_node).collect(),
        }
    }

    pub fn from_envelope(envelope: &ContentEnvelope) -> Self {
        Self::parse(&envelope.to_html())
    }

    pub fn from_value(content: &Value) -> Self {
        Self::from_envelope(&ContentEnvelope::from_value(content))
    }

    pub fn to_nodes(&self) -> Vec<Node> {
        self.nodes.iter().map(DocNode::to_node).collect()
    }

    /// The persisted form. Never contains decorations.
    pub fn to_html(&self) -> String {
        crate::editor::html::to_html(&self.to_nodes())
    }

    /// The editing surface: every top-level block carries its toolbar and overlay.
    pub fn to_editing_html(&self) -> String {
        let mut nodes = self.to_nodes();
        for (doc_node, node) in self.nodes.iter().zip(nodes.iter_mut()) {
            if let (DocNode::Block(_), Node::Element(el)) = (doc_node, node) {
                decorate(el);
            }
        }
        crate::editor::html::to_html(&nodes)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.nodes.iter().filter_map(DocNode::as_block)
    }
}
