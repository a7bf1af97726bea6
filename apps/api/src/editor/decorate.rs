//! Editor-only decorations: a hover toolbar and a highlight overlay on every
//! top-level block. They are added when rendering the editing surface and
//! must never reach persisted content.

use crate::editor::html::{Element, Node};

const UI_ATTR: &str = "data-ui";

fn toolbar() -> Element {
    let button = |action: &str, label: &str| {
        Element::new("button")
            .with_attr("data-action", action)
            .with_text(label)
    };
    Element::new("div")
        .with_attr(UI_ATTR, "toolbar")
        .with_attr("contenteditable", "false")
        .with_child(button("move-up", "↑"))
        .with_child(button("move-down", "↓"))
        .with_child(button("delete", "✕"))
}

fn overlay() -> Element {
    Element::new("div")
        .with_attr(UI_ATTR, "overlay")
        .with_attr("contenteditable", "false")
}

fn has_ui_child(el: &Element, kind: &str) -> bool {
    el.children
        .iter()
        .filter_map(Node::as_element)
        .any(|child| child.attr(UI_ATTR) == Some(kind))
}

/// Adds the toolbar and overlay unless already present.
pub fn decorate(el: &mut Element) {
    if !has_ui_child(el, "overlay") {
        el.children.insert(0, overlay().into());
    }
    if !has_ui_child(el, "toolbar") {
        el.children.insert(0, toolbar().into());
    }
}

/// Removes every decoration element, at any depth.
pub fn strip_decorations(nodes: &mut Vec<Node>) {
    nodes.retain(|node| match node {
        Node::Element(el) => !el.has_attr(UI_ATTR),
        Node::Text(_) => true,
    });
    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            strip_decorations(&mut el.children);
        }
    }
}
