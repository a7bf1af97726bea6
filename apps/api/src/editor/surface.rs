//! The editor reducer: a `Document` plus caret, selection and pending
//! side-channel state, mutated only through the methods below.
//!
//! Lines are addressed by `Caret { node, item }`: `node` indexes a top-level
//! node and `item` the `<li>` inside a top-level list. Offsets count
//! characters of the line's text content.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::editor::blocks::{Block, BlockKind, DEFAULT_BULLET, DEFAULT_CHIP};
use crate::editor::commands::{BlockAction, ClickTarget, Clipboard, Format, KeyChord, Shortcut, SlashItem};
use crate::editor::decorate::strip_decorations;
use crate::editor::document::{DocNode, Document};
use crate::editor::html::{
    insert_inline, normalize_text, parse_fragment, remove_leading_chars, split_at, to_html, Element,
    Node,
};
use crate::editor::markdown::{self, LineConversion, CODE_FENCE};
use crate::editor::placeholders::PlaceholderContext;
use crate::editor::sanitize::{plain_text_to_html, sanitize_html};

pub const UPLOAD_FAILED_MESSAGE: &str = "이미지를 읽을 수 없습니다.";

const INLINE_TAGS: &[&str] = &["b", "strong", "i", "em", "u", "s", "a", "span", "br", "code", "img"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("node {0} does not exist")]
    NoSuchNode(usize),

    #[error("node {0} is not a content block")]
    NotABlock(usize),

    #[error("node {0} is a content block, not a text line")]
    NotALine(usize),

    #[error("item {0} does not exist")]
    NoSuchItem(usize),

    #[error("{action} is not supported on {target}")]
    Unsupported { action: &'static str, target: String },

    #[error("{kind} has no field '{field}'")]
    UnknownField { kind: &'static str, field: String },

    #[error("uploaded file is not an image")]
    NotAnImage,

    #[error("no image upload is pending")]
    NoUploadTarget,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caret {
    pub node: usize,
    #[serde(default)]
    pub item: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

impl Caret {
    pub fn at(node: usize, offset: usize) -> Self {
        Self {
            node,
            item: None,
            offset,
        }
    }
}

/// `Text` is a character range of the caret line; `Nodes` a half-open range
/// of top-level nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    Text { start: usize, end: usize },
    Nodes { start: usize, end: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadTarget {
    pub node: usize,
    pub field: String,
}

/// What the host surface should do after an input was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorEffect {
    None,
    SaveRequested,
    PromptKpiBadge,
    OpenSlashMenu,
    OpenFilePicker,
}

#[derive(Debug, Clone, Default)]
pub struct Editor {
    doc: Document,
    caret: Caret,
    selection: Option<Selection>,
    context: PlaceholderContext,
    upload_target: Option<UploadTarget>,
    status: Option<String>,
}

impl Editor {
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            ..Self::default()
        }
    }

    pub fn from_html(html: &str) -> Self {
        Self::new(Document::parse(html))
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn to_html(&self) -> String {
        self.doc.to_html()
    }

    pub fn to_editing_html(&self) -> String {
        self.doc.to_editing_html()
    }

    pub fn caret(&self) -> Caret {
        self.caret
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn context(&self) -> &PlaceholderContext {
        &self.context
    }

    pub fn set_context(&mut self, context: PlaceholderContext) {
        self.context = context;
    }

    pub fn upload_target(&self) -> Option<&UploadTarget> {
        self.upload_target.as_ref()
    }

    // ────────────────────────────────────────────────────────────────────────
    // Caret and selection
    // ────────────────────────────────────────────────────────────────────────

    pub fn set_caret(&mut self, caret: Caret) -> Result<(), EditorError> {
        if caret.node >= self.doc.len() && !(self.doc.is_empty() && caret.node == 0) {
            return Err(EditorError::NoSuchNode(caret.node));
        }
        self.caret = caret;
        self.selection = None;
        Ok(())
    }

    pub fn select(&mut self, selection: Selection) -> Result<(), EditorError> {
        let selection = match selection {
            Selection::Text { start, end } => {
                let len = self.line_text(self.caret)?.chars().count();
                let (start, end) = (start.min(end), start.max(end));
                if end > len {
                    return Err(EditorError::NoSuchItem(end));
                }
                Selection::Text { start, end }
            }
            Selection::Nodes { start, end } => {
                let (start, end) = (start.min(end), start.max(end));
                if end > self.doc.len() {
                    return Err(EditorError::NoSuchNode(end));
                }
                Selection::Nodes { start, end }
            }
        };
        self.selection = Some(selection);
        Ok(())
    }

    /// Plain text of the selection; `None` when nothing is selected.
    pub fn selection_text(&self) -> Option<String> {
        let text = match self.selection? {
            Selection::Text { start, end } => self
                .line_text(self.caret)
                .ok()?
                .chars()
                .skip(start)
                .take(end - start)
                .collect(),
            Selection::Nodes { start, end } => self
                .doc
                .nodes
                .get(start..end)?
                .iter()
                .map(|n| n.to_node().text_content())
                .collect::<Vec<_>>()
                .join("\n"),
        };
        (!text.trim().is_empty()).then_some(text)
    }

    /// Serialized HTML of the selection; `None` when nothing is selected.
    pub fn selection_html(&self) -> Option<String> {
        let html = match self.selection? {
            Selection::Text { start, end } => {
                let children = self.line_children(self.caret).ok()?;
                let (_, rest) = split_at(children, start);
                let (mid, _) = split_at(rest, end - start);
                to_html(&mid)
            }
            Selection::Nodes { start, end } => {
                let nodes: Vec<Node> = self
                    .doc
                    .nodes
                    .get(start..end)?
                    .iter()
                    .map(DocNode::to_node)
                    .collect();
                to_html(&nodes)
            }
        };
        (!html.trim().is_empty()).then_some(html)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Typing
    // ────────────────────────────────────────────────────────────────────────

    pub fn type_text(&mut self, text: &str) -> Result<EditorEffect, EditorError> {
        if text.is_empty() {
            return Ok(EditorEffect::None);
        }
        self.ensure_line();
        if text == "/" && self.caret.offset == 0 && self.line_text(self.caret)?.is_empty() {
            return Ok(EditorEffect::OpenSlashMenu);
        }
        self.cut_text_selection()?;
        self.insert_inline_at_caret(vec![Node::text(text)])?;

        if text.ends_with(' ') {
            let caret = self.caret;
            let tag = self.line_tag(caret)?;
            let before: String = self.line_text(caret)?.chars().take(caret.offset).collect();
            if let Some((conversion, consumed)) = markdown::detect(&tag, &before) {
                debug!(?conversion, "markdown prefix");
                self.convert_line(conversion, consumed)?;
            }
        }
        Ok(EditorEffect::None)
    }

    pub fn press_enter(&mut self) -> Result<EditorEffect, EditorError> {
        self.ensure_line();
        self.cut_text_selection()?;
        let caret = self.caret;
        let tag = self.line_tag(caret)?;

        if matches!(tag.as_str(), "p" | "div") && self.line_text(caret)?.trim() == CODE_FENCE {
            let fence = Element::new("pre").with_child(Element::new("code"));
            self.splice_nodes(caret.node..caret.node + 1, vec![DocNode::Element(fence)]);
            self.caret = Caret::at(caret.node, 0);
            return Ok(EditorEffect::None);
        }

        match tag.as_str() {
            "pre" => {
                self.insert_inline_at_caret(vec![Node::text("\n")])?;
            }
            "li" => self.split_list_item(caret)?,
            _ => {
                let line = self.line_mut(caret)?;
                let (left, right) = split_at(std::mem::take(&mut line.children), caret.offset);
                line.children = left;
                let next = caret.node + 1;
                self.splice_nodes(next..next, vec![DocNode::Element(wrap("p", right))]);
                self.caret = Caret::at(next, 0);
            }
        }
        Ok(EditorEffect::None)
    }

    pub fn key_down(&mut self, chord: &KeyChord) -> Result<EditorEffect, EditorError> {
        match Shortcut::lookup(chord) {
            Some(Shortcut::Bold) => self.apply_format(Format::Bold),
            Some(Shortcut::Italic) => self.apply_format(Format::Italic),
            Some(Shortcut::Underline) => self.apply_format(Format::Underline),
            Some(Shortcut::Save) => Ok(EditorEffect::SaveRequested),
            Some(Shortcut::InsertKpiBadge) => Ok(EditorEffect::PromptKpiBadge),
            None if chord.key == "Enter" && !chord.shift => self.press_enter(),
            None => Ok(EditorEffect::None),
        }
    }

    /// Wraps the text selection of the caret line in `<b>`, `<i>` or `<u>`.
    /// Without a non-empty text selection this is a no-op.
    pub fn apply_format(&mut self, format: Format) -> Result<EditorEffect, EditorError> {
        let Some(Selection::Text { start, end }) = self.selection else {
            return Ok(EditorEffect::None);
        };
        if start == end {
            return Ok(EditorEffect::None);
        }
        let line = self.line_mut(self.caret)?;
        let (mut left, rest) = split_at(std::mem::take(&mut line.children), start);
        let (mid, right) = split_at(rest, end - start);
        left.push(wrap(format.tag(), mid).into());
        left.extend(right);
        normalize_text(&mut left);
        line.children = left;
        Ok(EditorEffect::None)
    }

    pub fn choose_slash_item(&mut self, item: SlashItem) -> Result<(), EditorError> {
        let node = match item {
            SlashItem::Heading { level } => Element::new(&format!("h{}", level.clamp(1, 3))),
            SlashItem::Quote => Element::new("blockquote"),
            SlashItem::BulletList => Element::new("ul").with_child(Element::new("li")),
            SlashItem::NumberedList => Element::new("ol").with_child(Element::new("li")),
            SlashItem::Checklist => checklist(Vec::new()),
            SlashItem::CodeBlock => Element::new("pre").with_child(Element::new("code")),
            SlashItem::Divider => Element::new("hr"),
            SlashItem::Block { kind } => {
                self.insert_block(kind);
                return Ok(());
            }
        };
        let is_list = matches!(node.tag.as_str(), "ul" | "ol");
        let at = self.insert_doc_nodes(vec![DocNode::Element(node)]);
        self.caret = Caret {
            node: at,
            item: is_list.then_some(0),
            offset: 0,
        };
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────────────
    // Insertion
    // ────────────────────────────────────────────────────────────────────────

    /// The insertion primitive shared by templates, presets and paste.
    /// Nodes replace the caret line when it is an empty paragraph, otherwise
    /// they go right after it. Returns the index of the first inserted node.
    pub fn insert_nodes(&mut self, nodes: Vec<Node>) -> usize {
        let nodes = nodes.into_iter().map(DocNode::from_node).collect();
        self.insert_doc_nodes(nodes)
    }

    /// Inserts raw HTML as-is (no sanitization).
    pub fn insert_html(&mut self, html: &str) -> usize {
        let mut nodes = parse_fragment(html);
        strip_decorations(&mut nodes);
        self.insert_nodes(nodes)
    }

    pub fn insert_block(&mut self, kind: BlockKind) -> usize {
        self.insert_doc_nodes(vec![DocNode::Block(Block::default_for(kind))])
    }

    /// Inline KPI badge at the caret, e.g. "+35%".
    pub fn insert_kpi_badge(&mut self, text: &str) -> Result<(), EditorError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        self.ensure_line();
        let badge = Element::new("span")
            .with_attr("class", "kpi-badge")
            .with_attr("data-kpi-badge", "1")
            .with_attr("contenteditable", "false")
            .with_text(text);
        self.insert_inline_at_caret(vec![badge.into()])
    }

    pub fn paste(&mut self, clipboard: Clipboard) -> Result<(), EditorError> {
        self.ensure_line();
        let nodes = match clipboard {
            Clipboard::Text(text) => parse_fragment(&plain_text_to_html(&text)),
            Clipboard::Html(html) => {
                let mut nodes = sanitize_html(&html);
                strip_decorations(&mut nodes);
                nodes
            }
        };
        if nodes.is_empty() {
            return Ok(());
        }
        let inline = nodes.iter().all(is_inline);
        let on_block = self
            .doc
            .nodes
            .get(self.caret.node)
            .is_some_and(DocNode::is_block);

        if inline && !on_block {
            self.cut_text_selection()?;
            self.insert_inline_at_caret(nodes)
        } else if inline {
            self.insert_doc_nodes(vec![DocNode::Element(wrap("p", nodes))]);
            Ok(())
        } else {
            self.insert_nodes(nodes);
            Ok(())
        }
    }

    /// Replaces the selection (or inserts at the caret) with `text` after
    /// placeholder substitution. Used for AI rewrites.
    pub fn replace_selection(&mut self, text: &str) -> Result<(), EditorError> {
        let text = self.context.fill(text);
        if let Some(Selection::Nodes { start, end }) = self.selection {
            let paragraphs: Vec<DocNode> = text
                .replace("\r\n", "\n")
                .split('\n')
                .filter(|line| !line.trim().is_empty())
                .map(|line| DocNode::Element(Element::new("p").with_text(line)))
                .collect();
            let count = paragraphs.len();
            let end = end.min(self.doc.len());
            self.splice_nodes(start.min(end)..end, paragraphs);
            self.selection = None;
            self.caret = Caret::at(start + count.saturating_sub(1), 0);
            return Ok(());
        }
        self.ensure_line();
        self.cut_text_selection()?;
        self.insert_inline_at_caret(parse_fragment(&plain_text_to_html(&text)))
    }

    // ────────────────────────────────────────────────────────────────────────
    // Block actions
    // ────────────────────────────────────────────────────────────────────────

    pub fn click(&mut self, target: &ClickTarget) -> Result<EditorEffect, EditorError> {
        match BlockAction::route(target) {
            Some(action) => self.apply_action(target.node, action),
            None => {
                self.set_caret(Caret::at(target.node, 0))?;
                Ok(EditorEffect::None)
            }
        }
    }

    pub fn apply_action(&mut self, node: usize, action: BlockAction) -> Result<EditorEffect, EditorError> {
        if node >= self.doc.len() {
            return Err(EditorError::NoSuchNode(node));
        }
        debug!(node, action = action.name(), "block action");
        match action {
            BlockAction::MoveUp => {
                self.block_mut(node)?;
                if let Some(to) = (0..node).rev().find(|&i| self.doc.nodes[i].is_block()) {
                    self.move_node(node, to);
                    self.after_structural_change(to);
                }
            }
            BlockAction::MoveDown => {
                self.block_mut(node)?;
                if let Some(to) = (node + 1..self.doc.len()).find(|&i| self.doc.nodes[i].is_block()) {
                    self.move_node(node, to);
                    self.after_structural_change(to);
                }
            }
            BlockAction::Delete => {
                self.splice_nodes(node..node + 1, Vec::new());
                let caret = node.min(self.doc.len().saturating_sub(1));
                self.after_structural_change(caret);
            }
            BlockAction::ToggleCheck { item } => self.toggle_check(node, item)?,
            BlockAction::AddChip => self
                .list_mut(node, "add_chip", |b| b.fields.chips_mut())?
                .push(DEFAULT_CHIP.to_string()),
            BlockAction::RemoveChip { index } => {
                let chips = self.list_mut(node, "remove_chip", |b| b.fields.chips_mut())?;
                if index >= chips.len() {
                    return Err(EditorError::NoSuchItem(index));
                }
                chips.remove(index);
            }
            BlockAction::AddBullet => self
                .list_mut(node, "add_bullet", |b| b.fields.bullets_mut())?
                .push(DEFAULT_BULLET.to_string()),
            BlockAction::RemoveBullet { index } => {
                let bullets = self.list_mut(node, "remove_bullet", |b| b.fields.bullets_mut())?;
                if index >= bullets.len() {
                    return Err(EditorError::NoSuchItem(index));
                }
                bullets.remove(index);
            }
            BlockAction::SwitchVariant { variant } => {
                let block = self.block_mut(node)?;
                if !block.kind().has_variants() {
                    return Err(EditorError::Unsupported {
                        action: "switch_variant",
                        target: block.kind().as_str().to_string(),
                    });
                }
                block.switch_variant(variant);
            }
            BlockAction::UploadImage { field } => {
                let block = self.block_mut(node)?;
                let kind = block.kind().as_str();
                if block.fields.image_slot(&field).is_none() {
                    return Err(EditorError::UnknownField { kind, field });
                }
                self.upload_target = Some(UploadTarget { node, field });
                return Ok(EditorEffect::OpenFilePicker);
            }
        }
        Ok(EditorEffect::None)
    }

    /// Applies a finished file read to the pending upload target. The target
    /// is consumed whether or not the payload is usable.
    pub fn complete_upload(&mut self, data_url: &str) -> Result<(), EditorError> {
        let target = self.upload_target.take().ok_or(EditorError::NoUploadTarget)?;
        if !data_url.starts_with("data:image/") {
            self.status = Some(UPLOAD_FAILED_MESSAGE.to_string());
            return Err(EditorError::NotAnImage);
        }
        let block = self.block_mut(target.node)?;
        let kind = block.kind().as_str();
        let slot = block
            .fields
            .image_slot(&target.field)
            .ok_or(EditorError::UnknownField {
                kind,
                field: target.field.clone(),
            })?;
        *slot = data_url.to_string();
        self.status = None;
        Ok(())
    }

    pub fn fail_upload(&mut self) {
        self.upload_target = None;
        self.status = Some(UPLOAD_FAILED_MESSAGE.to_string());
    }

    /// Direct in-place edit of a block field.
    pub fn set_field(&mut self, node: usize, name: &str, value: &str) -> Result<(), EditorError> {
        let block = self.block_mut(node)?;
        let kind = block.kind().as_str();
        if block.fields.set_field(name, value) {
            Ok(())
        } else {
            Err(EditorError::UnknownField {
                kind,
                field: name.to_string(),
            })
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Internals
    // ────────────────────────────────────────────────────────────────────────

    fn ensure_line(&mut self) {
        if self.doc.is_empty() {
            self.doc.nodes.push(DocNode::Element(Element::new("p")));
            self.caret = Caret::default();
        }
    }

    fn insert_doc_nodes(&mut self, nodes: Vec<DocNode>) -> usize {
        self.selection = None;
        if nodes.is_empty() {
            return self.caret.node;
        }
        let count = nodes.len();
        let replaced = if self.doc.is_empty() {
            0..0
        } else if self
            .doc
            .nodes
            .get(self.caret.node)
            .is_some_and(DocNode::is_empty_line)
        {
            self.caret.node..self.caret.node + 1
        } else {
            let after = (self.caret.node + 1).min(self.doc.len());
            after..after
        };
        let at = replaced.start;
        self.splice_nodes(replaced, nodes);
        self.caret = Caret::at(at + count - 1, 0);
        at
    }

    /// Replaces a range of top-level nodes. A pending upload follows its
    /// block to the new index and is dropped if the block is removed.
    fn splice_nodes(&mut self, range: Range<usize>, nodes: Vec<DocNode>) {
        if self
            .upload_target
            .as_ref()
            .is_some_and(|target| range.contains(&target.node))
        {
            self.upload_target = None;
        }
        if let Some(target) = &mut self.upload_target {
            if target.node >= range.end {
                target.node = target.node - range.len() + nodes.len();
            }
        }
        self.doc.nodes.splice(range, nodes);
    }

    fn move_node(&mut self, from: usize, to: usize) {
        let moved = self.doc.nodes.remove(from);
        self.doc.nodes.insert(to, moved);
        if let Some(target) = &mut self.upload_target {
            if target.node == from {
                target.node = to;
            } else if from < to && (from + 1..=to).contains(&target.node) {
                target.node -= 1;
            } else if to < from && (to..from).contains(&target.node) {
                target.node += 1;
            }
        }
    }

    fn insert_inline_at_caret(&mut self, nodes: Vec<Node>) -> Result<(), EditorError> {
        let caret = self.caret;
        let added: usize = nodes.iter().map(Node::char_len).sum();
        let line = self.line_mut(caret)?;
        insert_inline(&mut line.children, caret.offset, nodes);
        self.caret.offset += added;
        Ok(())
    }

    fn cut_text_selection(&mut self) -> Result<(), EditorError> {
        let Some(Selection::Text { start, end }) = self.selection else {
            return Ok(());
        };
        let line = self.line_mut(self.caret)?;
        let (mut left, rest) = split_at(std::mem::take(&mut line.children), start);
        let (_, right) = split_at(rest, end - start);
        left.extend(right);
        normalize_text(&mut left);
        line.children = left;
        self.selection = None;
        self.caret.offset = start;
        Ok(())
    }

    fn convert_line(&mut self, conversion: LineConversion, consumed: usize) -> Result<(), EditorError> {
        let caret = self.caret;
        let line = self.line_mut(caret)?;
        remove_leading_chars(&mut line.children, consumed);

        if line.tag == "li" {
            line.set_attr("data-checked", "false");
            if let Some(DocNode::Element(list)) = self.doc.nodes.get_mut(caret.node) {
                list.set_attr("data-checklist", "1");
            }
            self.caret.offset = 0;
            return Ok(());
        }

        let children = std::mem::take(&mut line.children);
        let replacement = match conversion {
            LineConversion::Heading(level) => wrap(&format!("h{}", level.clamp(1, 3)), children),
            LineConversion::Quote => wrap("blockquote", children),
            LineConversion::BulletList => Element::new("ul").with_child(wrap("li", children)),
            LineConversion::OrderedList => Element::new("ol").with_child(wrap("li", children)),
            LineConversion::Checklist => checklist(children),
        };
        let is_list = matches!(replacement.tag.as_str(), "ul" | "ol");
        self.doc.nodes[caret.node] = DocNode::Element(replacement);
        self.caret = Caret {
            node: caret.node,
            item: is_list.then_some(0),
            offset: 0,
        };
        Ok(())
    }

    /// Enter inside a list item: split it, or leave the list from an empty item.
    fn split_list_item(&mut self, caret: Caret) -> Result<(), EditorError> {
        let index = caret.item.unwrap_or(0);
        let Some(DocNode::Element(list)) = self.doc.nodes.get_mut(caret.node) else {
            return Err(EditorError::NoSuchNode(caret.node));
        };
        let items = li_positions(list);
        let pos = *items.get(index).ok_or(EditorError::NoSuchItem(index))?;
        let Some(li) = list.children[pos].as_element_mut() else {
            return Err(EditorError::NoSuchItem(index));
        };

        if li.text_content().trim().is_empty() {
            list.children.remove(pos);
            let paragraph = DocNode::Element(Element::new("p"));
            if items.len() == 1 {
                self.splice_nodes(caret.node..caret.node + 1, vec![paragraph]);
                self.caret = Caret::at(caret.node, 0);
            } else {
                let next = caret.node + 1;
                self.splice_nodes(next..next, vec![paragraph]);
                self.caret = Caret::at(next, 0);
            }
            return Ok(());
        }

        let (left, right) = split_at(std::mem::take(&mut li.children), caret.offset);
        li.children = left;
        let mut next = Element {
            tag: "li".to_string(),
            attrs: li.attrs.clone(),
            children: right,
        };
        if next.has_attr("data-checked") {
            next.set_attr("data-checked", "false");
        }
        list.children.insert(pos + 1, next.into());
        self.caret = Caret {
            node: caret.node,
            item: Some(index + 1),
            offset: 0,
        };
        Ok(())
    }

    fn toggle_check(&mut self, node: usize, item: usize) -> Result<(), EditorError> {
        let Some(DocNode::Element(list)) = self.doc.nodes.get_mut(node) else {
            return Err(EditorError::Unsupported {
                action: "toggle_check",
                target: format!("node {node}"),
            });
        };
        if list.attr("data-checklist").is_none() {
            return Err(EditorError::Unsupported {
                action: "toggle_check",
                target: list.tag.clone(),
            });
        }
        let li = list
            .children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .filter(|el| el.tag == "li")
            .nth(item)
            .ok_or(EditorError::NoSuchItem(item))?;
        let checked = li.attr("data-checked") == Some("true");
        li.set_attr("data-checked", if checked { "false" } else { "true" });
        Ok(())
    }

    fn after_structural_change(&mut self, caret_node: usize) {
        self.selection = None;
        self.caret = Caret::at(caret_node, 0);
    }

    fn block_mut(&mut self, node: usize) -> Result<&mut Block, EditorError> {
        self.doc
            .nodes
            .get_mut(node)
            .ok_or(EditorError::NoSuchNode(node))?
            .as_block_mut()
            .ok_or(EditorError::NotABlock(node))
    }

    fn list_mut(
        &mut self,
        node: usize,
        action: &'static str,
        pick: impl FnOnce(&mut Block) -> Option<&mut Vec<String>>,
    ) -> Result<&mut Vec<String>, EditorError> {
        let block = self.block_mut(node)?;
        let target = block.kind().as_str().to_string();
        pick(block).ok_or(EditorError::Unsupported { action, target })
    }

    fn line_mut(&mut self, caret: Caret) -> Result<&mut Element, EditorError> {
        let node = self
            .doc
            .nodes
            .get_mut(caret.node)
            .ok_or(EditorError::NoSuchNode(caret.node))?;
        if node.is_block() {
            return Err(EditorError::NotALine(caret.node));
        }
        line_element_mut(node, caret.item).ok_or(EditorError::NoSuchItem(caret.item.unwrap_or(0)))
    }

    fn line_children(&self, caret: Caret) -> Result<Vec<Node>, EditorError> {
        match self.doc.nodes.get(caret.node) {
            None => Err(EditorError::NoSuchNode(caret.node)),
            Some(DocNode::Block(_)) => Err(EditorError::NotALine(caret.node)),
            Some(DocNode::Text(s)) => Ok(vec![Node::text(s.clone())]),
            Some(DocNode::Element(el)) => line_element(el, caret.item)
                .map(|line| line.children.clone())
                .ok_or(EditorError::NoSuchItem(caret.item.unwrap_or(0))),
        }
    }

    fn line_text(&self, caret: Caret) -> Result<String, EditorError> {
        Ok(self
            .line_children(caret)?
            .iter()
            .map(Node::text_content)
            .collect())
    }

    /// Tag of the caret line: bare text reads as `p`, list items as `li`.
    fn line_tag(&self, caret: Caret) -> Result<String, EditorError> {
        match self.doc.nodes.get(caret.node) {
            None => Err(EditorError::NoSuchNode(caret.node)),
            Some(DocNode::Block(_)) => Err(EditorError::NotALine(caret.node)),
            Some(DocNode::Text(_)) => Ok("p".to_string()),
            Some(DocNode::Element(el)) => Ok(match el.tag.as_str() {
                "ul" | "ol" => "li".to_string(),
                other => other.to_string(),
            }),
        }
    }
}

fn wrap(tag: &str, children: Vec<Node>) -> Element {
    let mut el = Element::new(tag);
    el.children = children;
    el
}

fn checklist(children: Vec<Node>) -> Element {
    Element::new("ul")
        .with_attr("data-checklist", "1")
        .with_child(wrap("li", children).with_attr("data-checked", "false"))
}

fn is_inline(node: &Node) -> bool {
    match node {
        Node::Text(_) => true,
        Node::Element(el) => INLINE_TAGS.contains(&el.tag.as_str()) && !el.has_attr("data-block"),
    }
}

fn li_positions(list: &Element) -> Vec<usize> {
    list.children
        .iter()
        .enumerate()
        .filter(|(_, n)| n.as_element().is_some_and(|el| el.tag == "li"))
        .map(|(i, _)| i)
        .collect()
}

fn line_element(el: &Element, item: Option<usize>) -> Option<&Element> {
    match el.tag.as_str() {
        "ul" | "ol" => el
            .children
            .iter()
            .filter_map(Node::as_element)
            .filter(|li| li.tag == "li")
            .nth(item.unwrap_or(0)),
        "pre" => Some(
            el.children
                .iter()
                .filter_map(Node::as_element)
                .find(|c| c.tag == "code")
                .unwrap_or(el),
        ),
        _ => Some(el),
    }
}

/// Mutable line lookup. A bare text node is promoted to a paragraph first.
fn line_element_mut(node: &mut DocNode, item: Option<usize>) -> Option<&mut Element> {
    if let DocNode::Text(s) = node {
        let text = std::mem::take(s);
        *node = DocNode::Element(Element::new("p").with_text(&text));
    }
    let DocNode::Element(el) = node else {
        return None;
    };
    let tag = el.tag.clone();
    match tag.as_str() {
        "ul" | "ol" => el
            .children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .filter(|li| li.tag == "li")
            .nth(item.unwrap_or(0)),
        "pre" => {
            let has_code = el
                .children
                .iter()
                .filter_map(Node::as_element)
                .any(|c| c.tag == "code");
            if has_code {
                el.children
                    .iter_mut()
                    .filter_map(Node::as_element_mut)
                    .find(|c| c.tag == "code")
            } else {
                Some(el)
            }
        }
        _ => Some(el),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::blocks::{BlockFields, SectionKind, Variant};
    use pretty_assertions::assert_eq;

    fn type_chars(editor: &mut Editor, text: &str) {
        for c in text.chars() {
            editor.type_text(&c.to_string()).unwrap();
        }
    }

    fn bullets_of(editor: &Editor, node: usize) -> Vec<String> {
        match &editor.document().nodes[node] {
            DocNode::Block(Block {
                fields: BlockFields::Experience(f),
                ..
            }) => f.bullets.clone(),
            other => panic!("expected experience block, got {other:?}"),
        }
    }

    #[test]
    fn test_experience_bullets_survive_variant_round_trip() {
        let mut editor = Editor::default();
        let node = editor.insert_block(BlockKind::Experience);
        editor.apply_action(node, BlockAction::AddBullet).unwrap();
        editor.apply_action(node, BlockAction::AddBullet).unwrap();
        assert_eq!(bullets_of(&editor, node).len(), 5);

        for variant in [Variant::Text, Variant::Card] {
            editor
                .apply_action(node, BlockAction::SwitchVariant { variant })
                .unwrap();
        }
        assert_eq!(bullets_of(&editor, node).len(), 5);

        let reloaded = Editor::from_html(&editor.to_html());
        assert_eq!(bullets_of(&reloaded, node).len(), 5);
        assert!(editor.to_html().contains("data-variant=\"card\""));
    }

    #[test]
    fn test_hash_space_makes_empty_heading() {
        let mut editor = Editor::default();
        type_chars(&mut editor, "# ");
        assert_eq!(editor.to_html(), "<h1></h1>");

        let mut editor = Editor::from_html("<p></p>");
        editor.type_text("## ").unwrap();
        assert_eq!(editor.to_html(), "<h2></h2>");
    }

    #[test]
    fn test_plain_paste_escapes_and_breaks_lines() {
        let mut editor = Editor::default();
        editor.paste(Clipboard::Text("a\nb".to_string())).unwrap();
        assert_eq!(editor.to_html(), "<p>a<br>b</p>");

        let mut editor = Editor::default();
        editor.paste(Clipboard::Text("<b>x</b>".to_string())).unwrap();
        assert_eq!(editor.to_html(), "<p>&lt;b&gt;x&lt;/b&gt;</p>");
    }

    #[test]
    fn test_html_paste_is_sanitized_and_inserted_as_blocks() {
        let mut editor = Editor::from_html("<p>first</p>");
        editor.set_caret(Caret::at(0, 5)).unwrap();
        editor
            .paste(Clipboard::Html(
                "<p onclick=\"x()\">second</p><script>alert(1)</script>".to_string(),
            ))
            .unwrap();
        assert_eq!(editor.to_html(), "<p>first</p><p>second</p>");
    }

    #[test]
    fn test_inline_html_paste_goes_into_the_line() {
        let mut editor = Editor::from_html("<p>ab</p>");
        editor.set_caret(Caret::at(0, 1)).unwrap();
        editor
            .paste(Clipboard::Html("<b style=\"x\">X</b>".to_string()))
            .unwrap();
        assert_eq!(editor.to_html(), "<p>a<b>X</b>b</p>");
        assert_eq!(editor.caret().offset, 2);
    }

    #[test]
    fn test_slash_on_empty_line_opens_menu() {
        let mut editor = Editor::from_html("<p></p>");
        assert_eq!(editor.type_text("/").unwrap(), EditorEffect::OpenSlashMenu);
        assert_eq!(editor.to_html(), "<p></p>");
        editor
            .choose_slash_item(SlashItem::Heading { level: 2 })
            .unwrap();
        assert_eq!(editor.to_html(), "<h2></h2>");

        let mut editor = Editor::from_html("<p>x</p>");
        editor.set_caret(Caret::at(0, 1)).unwrap();
        assert_eq!(editor.type_text("/").unwrap(), EditorEffect::None);
        assert_eq!(editor.to_html(), "<p>x/</p>");
    }

    #[test]
    fn test_slash_block_item_inserts_block() {
        let mut editor = Editor::from_html("<p></p>");
        editor
            .choose_slash_item(SlashItem::Block {
                kind: BlockKind::Skills,
            })
            .unwrap();
        assert_eq!(editor.document().len(), 1);
        assert!(editor.document().nodes[0].is_block());
    }

    #[test]
    fn test_code_fence_then_enter() {
        let mut editor = Editor::default();
        type_chars(&mut editor, "```");
        editor.press_enter().unwrap();
        assert_eq!(editor.to_html(), "<pre><code></code></pre>");
        type_chars(&mut editor, "a");
        editor.press_enter().unwrap();
        type_chars(&mut editor, "b");
        assert_eq!(editor.to_html(), "<pre><code>a\nb</code></pre>");
    }

    #[test]
    fn test_enter_splits_paragraph() {
        let mut editor = Editor::from_html("<p>he<b>llo</b></p>");
        editor.set_caret(Caret::at(0, 3)).unwrap();
        editor.press_enter().unwrap();
        assert_eq!(editor.to_html(), "<p>he<b>l</b></p><p><b>lo</b></p>");
        assert_eq!(editor.caret(), Caret::at(1, 0));
    }

    #[test]
    fn test_bullet_list_typing_and_exit() {
        let mut editor = Editor::default();
        type_chars(&mut editor, "- x");
        editor.press_enter().unwrap();
        type_chars(&mut editor, "y");
        editor.press_enter().unwrap();
        editor.press_enter().unwrap();
        assert_eq!(editor.to_html(), "<ul><li>x</li><li>y</li></ul><p></p>");
        assert_eq!(editor.caret(), Caret::at(1, 0));
    }

    #[test]
    fn test_ordered_and_quote_prefixes() {
        let mut editor = Editor::default();
        type_chars(&mut editor, "1. one");
        assert_eq!(editor.to_html(), "<ol><li>one</li></ol>");

        let mut editor = Editor::default();
        type_chars(&mut editor, "> cite");
        assert_eq!(editor.to_html(), "<blockquote>cite</blockquote>");
    }

    #[test]
    fn test_checklist_prefix_and_toggle() {
        let mut editor = Editor::default();
        type_chars(&mut editor, "- [ ] task");
        assert_eq!(
            editor.to_html(),
            "<ul data-checklist=\"1\"><li data-checked=\"false\">task</li></ul>"
        );

        let target = ClickTarget {
            node: 0,
            check_item: Some(0),
            ..ClickTarget::default()
        };
        editor.click(&target).unwrap();
        assert!(editor.to_html().contains("data-checked=\"true\""));
        editor.click(&target).unwrap();
        assert!(editor.to_html().contains("data-checked=\"false\""));
    }

    #[test]
    fn test_checklist_typed_in_one_go() {
        let mut editor = Editor::default();
        editor.type_text("- [ ] ").unwrap();
        assert_eq!(
            editor.to_html(),
            "<ul data-checklist=\"1\"><li data-checked=\"false\"></li></ul>"
        );
    }

    #[test]
    fn test_bold_shortcut_wraps_selection() {
        let mut editor = Editor::from_html("<p>hello world</p>");
        editor.set_caret(Caret::at(0, 0)).unwrap();
        editor.select(Selection::Text { start: 0, end: 5 }).unwrap();
        assert_eq!(
            editor.key_down(&KeyChord::with_mod("b")).unwrap(),
            EditorEffect::None
        );
        assert_eq!(editor.to_html(), "<p><b>hello</b> world</p>");
        assert_eq!(
            editor.key_down(&KeyChord::with_mod("s")).unwrap(),
            EditorEffect::SaveRequested
        );
        assert_eq!(
            editor.key_down(&KeyChord::with_mod("k").shifted()).unwrap(),
            EditorEffect::PromptKpiBadge
        );
    }

    #[test]
    fn test_kpi_badge_inserted_inline() {
        let mut editor = Editor::from_html("<p>매출 </p>");
        editor.set_caret(Caret::at(0, 3)).unwrap();
        editor.insert_kpi_badge("+35%").unwrap();
        assert_eq!(
            editor.to_html(),
            "<p>매출 <span class=\"kpi-badge\" data-kpi-badge=\"1\" contenteditable=\"false\">+35%</span></p>"
        );
    }

    #[test]
    fn test_move_skips_non_block_siblings() {
        let mut editor = Editor::default();
        editor.insert_block(BlockKind::Quote);
        editor.insert_nodes(vec![Element::new("p").with_text("between").into()]);
        let skills = editor.insert_block(BlockKind::Skills);
        assert_eq!(skills, 2);

        editor.apply_action(2, BlockAction::MoveUp).unwrap();
        let kinds: Vec<_> = editor
            .document()
            .nodes
            .iter()
            .map(|n| n.as_block().map(Block::kind))
            .collect();
        assert_eq!(
            kinds,
            vec![Some(BlockKind::Skills), Some(BlockKind::Quote), None]
        );

        editor.apply_action(0, BlockAction::MoveDown).unwrap();
        assert_eq!(
            editor.document().nodes[1].as_block().map(Block::kind),
            Some(BlockKind::Skills)
        );
        assert_eq!(
            editor.apply_action(2, BlockAction::MoveUp),
            Err(EditorError::NotABlock(2))
        );
    }

    #[test]
    fn test_delete_block() {
        let mut editor = Editor::default();
        editor.insert_block(BlockKind::Quote);
        editor.insert_block(BlockKind::Kpi);
        editor.apply_action(0, BlockAction::Delete).unwrap();
        assert_eq!(editor.document().len(), 1);
        assert_eq!(editor.caret().node, 0);
    }

    #[test]
    fn test_chip_add_and_modifier_remove() {
        let mut editor = Editor::default();
        let node = editor.insert_block(BlockKind::Skills);
        let chips = |e: &Editor| match &e.document().nodes[node] {
            DocNode::Block(Block {
                fields: BlockFields::Skills(f),
                ..
            }) => f.chips.clone(),
            _ => panic!("expected skills"),
        };
        let before = chips(&editor).len();
        editor
            .click(&ClickTarget {
                node,
                action: Some("add-chip".to_string()),
                ..ClickTarget::default()
            })
            .unwrap();
        assert_eq!(chips(&editor).len(), before + 1);
        assert_eq!(chips(&editor).last().map(String::as_str), Some(DEFAULT_CHIP));

        editor
            .click(&ClickTarget {
                node,
                chip: Some(0),
                modifier: true,
                ..ClickTarget::default()
            })
            .unwrap();
        assert_eq!(chips(&editor).len(), before);
        assert_eq!(
            editor.apply_action(node, BlockAction::RemoveChip { index: 99 }),
            Err(EditorError::NoSuchItem(99))
        );
    }

    #[test]
    fn test_chip_action_on_wrong_kind_is_unsupported() {
        let mut editor = Editor::default();
        let node = editor.insert_block(BlockKind::Quote);
        assert!(matches!(
            editor.apply_action(node, BlockAction::AddChip),
            Err(EditorError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_upload_flow_consumes_target() {
        let mut editor = Editor::default();
        let node = editor.insert_block(BlockKind::Experience);
        let effect = editor
            .click(&ClickTarget {
                node,
                action: Some("upload-logo".to_string()),
                ..ClickTarget::default()
            })
            .unwrap();
        assert_eq!(effect, EditorEffect::OpenFilePicker);
        assert!(editor.upload_target().is_some());

        editor.complete_upload("data:image/png;base64,AAAA").unwrap();
        assert!(editor.upload_target().is_none());
        assert!(editor.to_html().contains("src=\"data:image/png;base64,AAAA\""));
        assert_eq!(
            editor.complete_upload("data:image/png;base64,BBBB"),
            Err(EditorError::NoUploadTarget)
        );
    }

    #[test]
    fn test_failed_upload_sets_status_and_clears_target() {
        let mut editor = Editor::default();
        let node = editor.insert_block(BlockKind::Contact);
        editor
            .apply_action(
                node,
                BlockAction::UploadImage {
                    field: "avatar".to_string(),
                },
            )
            .unwrap();
        editor.fail_upload();
        assert!(editor.upload_target().is_none());
        assert_eq!(editor.status(), Some(UPLOAD_FAILED_MESSAGE));

        editor
            .apply_action(
                node,
                BlockAction::UploadImage {
                    field: "avatar".to_string(),
                },
            )
            .unwrap();
        assert_eq!(
            editor.complete_upload("data:text/plain,hi"),
            Err(EditorError::NotAnImage)
        );
        assert!(editor.upload_target().is_none());
    }

    fn logos(editor: &Editor) -> Vec<String> {
        editor
            .document()
            .nodes
            .iter()
            .filter_map(|node| match node {
                DocNode::Block(Block {
                    fields: BlockFields::Experience(f),
                    ..
                }) => Some(f.logo.clone()),
                _ => None,
            })
            .collect()
    }

    fn intro_and_two_experiences() -> Editor {
        let experience = Block::default_for(BlockKind::Experience).to_html();
        Editor::from_html(&format!("<p>intro</p>{experience}{experience}"))
    }

    fn upload_logo(editor: &mut Editor, node: usize) {
        editor
            .apply_action(
                node,
                BlockAction::UploadImage {
                    field: "logo".to_string(),
                },
            )
            .unwrap();
    }

    #[test]
    fn test_upload_target_follows_block_after_enter() {
        let mut editor = intro_and_two_experiences();
        upload_logo(&mut editor, 2);
        editor.set_caret(Caret::at(0, 5)).unwrap();
        editor.press_enter().unwrap();
        assert_eq!(editor.upload_target().map(|t| t.node), Some(3));

        editor.complete_upload("data:image/png;base64,AAAA").unwrap();
        assert_eq!(logos(&editor), vec![String::new(), "data:image/png;base64,AAAA".to_string()]);
    }

    #[test]
    fn test_upload_target_follows_block_after_list_exit_and_insert() {
        let experience = Block::default_for(BlockKind::Experience).to_html();
        let mut editor = Editor::from_html(&format!("<ul><li>a</li><li></li></ul>{experience}"));
        upload_logo(&mut editor, 1);

        editor.set_caret(Caret { node: 0, item: Some(1), offset: 0 }).unwrap();
        editor.press_enter().unwrap();
        assert_eq!(editor.upload_target().map(|t| t.node), Some(2));

        editor.set_caret(Caret::at(0, 0)).unwrap();
        editor.insert_block(BlockKind::Section(SectionKind::Divider));
        assert_eq!(editor.upload_target().map(|t| t.node), Some(3));

        editor.complete_upload("data:image/png;base64,AAAA").unwrap();
        assert_eq!(logos(&editor), vec!["data:image/png;base64,AAAA".to_string()]);
    }

    #[test]
    fn test_upload_target_moves_with_block_and_dies_with_it() {
        let mut editor = intro_and_two_experiences();
        upload_logo(&mut editor, 2);
        editor.apply_action(2, BlockAction::MoveUp).unwrap();
        assert_eq!(editor.upload_target().map(|t| t.node), Some(1));

        editor.apply_action(2, BlockAction::Delete).unwrap();
        assert_eq!(editor.upload_target().map(|t| t.node), Some(1));

        editor.apply_action(1, BlockAction::Delete).unwrap();
        assert!(editor.upload_target().is_none());
        assert_eq!(
            editor.complete_upload("data:image/png;base64,AAAA"),
            Err(EditorError::NoUploadTarget)
        );
    }

    #[test]
    fn test_upload_on_block_without_image_field() {
        let mut editor = Editor::default();
        let node = editor.insert_block(BlockKind::Quote);
        assert!(matches!(
            editor.apply_action(
                node,
                BlockAction::UploadImage {
                    field: "logo".to_string()
                }
            ),
            Err(EditorError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_replace_selection_fills_placeholders() {
        let mut editor = Editor::from_html("<p>draft text here</p>");
        editor.set_context(PlaceholderContext {
            company: Some("토스".to_string()),
            role: None,
        });
        editor.set_caret(Caret::at(0, 0)).unwrap();
        editor.select(Selection::Text { start: 6, end: 10 }).unwrap();
        assert_eq!(editor.selection_text().as_deref(), Some("text"));
        editor.replace_selection("{{company}} {{role}}").unwrap();
        assert_eq!(editor.to_html(), "<p>draft 토스 {{role}} here</p>");
        assert!(editor.selection().is_none());
    }

    #[test]
    fn test_replace_node_selection_with_paragraphs() {
        let mut editor = Editor::from_html("<p>a</p><p>b</p><p>c</p>");
        editor.select(Selection::Nodes { start: 0, end: 2 }).unwrap();
        assert_eq!(editor.selection_text().as_deref(), Some("a\nb"));
        assert_eq!(editor.selection_html().as_deref(), Some("<p>a</p><p>b</p>"));
        editor.replace_selection("x\ny\nz").unwrap();
        assert_eq!(editor.to_html(), "<p>x</p><p>y</p><p>z</p><p>c</p>");
    }

    #[test]
    fn test_set_field_updates_block() {
        let mut editor = Editor::default();
        let node = editor.insert_block(BlockKind::Education);
        editor.set_field(node, "school", "서울대학교").unwrap();
        assert!(editor.to_html().contains("서울대학교"));
        assert!(matches!(
            editor.set_field(node, "logo", "x"),
            Err(EditorError::UnknownField { .. })
        ));
    }
}
