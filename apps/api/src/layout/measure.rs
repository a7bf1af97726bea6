//! Height estimation for top-level nodes.

use crate::editor::html::{Element, Node};
use crate::layout::font_metrics::{get_metrics, PageGeometry};

/// Reserved height for an image that declares no `height`.
pub const IMAGE_PLACEHOLDER_PX: f32 = 160.0;
pub const RULE_HEIGHT_PX: f32 = 25.0;
/// Vertical margin after a paragraph-like element.
const PARAGRAPH_GAP_PX: f32 = 8.0;
/// Padding and border around a structured block card.
const BLOCK_CHROME_PX: f32 = 24.0;
const MONOSPACE_EM: f32 = 0.6;

/// Measures the rendered height of a top-level node in CSS pixels.
/// Implementations must be deterministic for pagination to be.
pub trait Measurer {
    fn measure(&self, node: &Node, geometry: &PageGeometry) -> f32;
}

/// Estimates heights from the static font-metric tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricMeasurer;

impl Measurer for MetricMeasurer {
    fn measure(&self, node: &Node, geometry: &PageGeometry) -> f32 {
        match node {
            Node::Text(text) => text_height(text, geometry, 1.0) + PARAGRAPH_GAP_PX,
            Node::Element(el) => element_height(el, geometry),
        }
    }
}

fn heading_scale(tag: &str) -> Option<f32> {
    match tag {
        "h1" => Some(1.8),
        "h2" => Some(1.4),
        "h3" => Some(1.2),
        _ => None,
    }
}

fn is_block_level(el: &Element) -> bool {
    matches!(
        el.tag.as_str(),
        "p" | "div" | "section" | "ul" | "ol" | "li" | "h1" | "h2" | "h3" | "blockquote" | "pre"
            | "table" | "thead" | "tbody" | "tr" | "hr"
    )
}

fn element_height(el: &Element, geo: &PageGeometry) -> f32 {
    if let Some(scale) = heading_scale(&el.tag) {
        return inline_height(el, geo, scale) + PARAGRAPH_GAP_PX * scale;
    }
    match el.tag.as_str() {
        "hr" => RULE_HEIGHT_PX,
        "img" => image_height(el),
        "br" => geo.line_px(1.0),
        "pre" => {
            let width_em = geo.text_width_em(1.0) / MONOSPACE_EM;
            let lines: u32 = el
                .text_content()
                .split('\n')
                .map(|line| (line.chars().count() as f32 / width_em).ceil().max(1.0) as u32)
                .sum();
            lines as f32 * geo.line_px(1.0) + PARAGRAPH_GAP_PX * 2.0
        }
        "tr" => el
            .children
            .iter()
            .filter_map(Node::as_element)
            .map(|cell| inline_height(cell, geo, 1.0))
            .fold(geo.line_px(1.0), f32::max),
        _ => {
            let block_children: Vec<&Element> = el
                .children
                .iter()
                .filter_map(Node::as_element)
                .filter(|child| is_block_level(child))
                .collect();
            if block_children.is_empty() {
                return inline_height(el, geo, 1.0) + PARAGRAPH_GAP_PX;
            }
            let inner: f32 = el
                .children
                .iter()
                .map(|child| match child {
                    Node::Element(c) if is_block_level(c) || c.tag == "img" => {
                        element_height(c, geo)
                    }
                    Node::Element(c) => inline_height(c, geo, 1.0),
                    Node::Text(t) if !t.trim().is_empty() => text_height(t, geo, 1.0),
                    Node::Text(_) => 0.0,
                })
                .sum();
            let chrome = if el.has_attr("data-block") {
                BLOCK_CHROME_PX
            } else {
                0.0
            };
            inner + chrome
        }
    }
}

/// Lines of inline content, with `<br>` starting a new line and images
/// stacked at their own height.
fn inline_height(el: &Element, geo: &PageGeometry, scale: f32) -> f32 {
    let mut segments = vec![String::new()];
    let mut images = 0.0;
    collect_inline(el, &mut segments, &mut images);
    let lines: f32 = segments
        .iter()
        .map(|s| text_height(s, geo, scale))
        .sum();
    lines + images
}

fn collect_inline(el: &Element, segments: &mut Vec<String>, images: &mut f32) {
    for child in &el.children {
        match child {
            Node::Text(t) => {
                if let Some(last) = segments.last_mut() {
                    last.push_str(t);
                }
            }
            Node::Element(c) if c.tag == "br" => segments.push(String::new()),
            Node::Element(c) if c.tag == "img" => *images += image_height(c),
            Node::Element(c) => collect_inline(c, segments, images),
        }
    }
}

/// An empty line still takes one line of height.
fn text_height(text: &str, geo: &PageGeometry, scale: f32) -> f32 {
    let metrics = get_metrics(geo.font);
    let lines = metrics.estimated_lines(text, geo.text_width_em(scale)).max(1);
    lines as f32 * geo.line_px(scale)
}

fn image_height(el: &Element) -> f32 {
    if el.attr("src").map_or(true, str::is_empty) {
        return 0.0;
    }
    el.attr("height")
        .and_then(|h| h.trim().trim_end_matches("px").parse::<f32>().ok())
        .filter(|h| h.is_finite() && *h >= 0.0)
        .unwrap_or(IMAGE_PLACEHOLDER_PX)
}
