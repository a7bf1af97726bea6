//! Greedy pagination of serialized document HTML into A4 page frames.
//!
//! Whole top-level nodes are placed in order; nothing is ever split across
//! pages. A node taller than a full page sits alone on its own page.

use serde::Serialize;
use tracing::debug;

use crate::editor::decorate::strip_decorations;
use crate::editor::html::{parse_fragment, to_html, Element, Node};
use crate::layout::font_metrics::PageGeometry;
use crate::layout::measure::Measurer;

pub const PAGE_BREAK_ATTR: &str = "data-page-break";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub index: usize,
    /// Indices into the normalized node list.
    pub nodes: Vec<usize>,
    pub html: String,
    pub height_px: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakMarker {
    Before,
    After,
}

fn break_marker(node: &Node) -> Option<BreakMarker> {
    match node.as_element()?.attr(PAGE_BREAK_ATTR)? {
        "before" => Some(BreakMarker::Before),
        "after" => Some(BreakMarker::After),
        _ => None,
    }
}

const INLINE_TAGS: &[&str] = &["b", "strong", "i", "em", "u", "s", "a", "span", "br", "code"];

/// Wraps runs of bare top-level text and inline elements into `<p>`.
/// Whitespace-only runs are dropped.
pub fn normalize_nodes(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    let mut run: Vec<Node> = Vec::new();

    let flush = |run: &mut Vec<Node>, out: &mut Vec<Node>| {
        if run.iter().all(|n| n.is_whitespace() || is_bare_break(n)) {
            run.clear();
            return;
        }
        let mut p = Element::new("p");
        p.children = std::mem::take(run);
        out.push(Node::Element(p));
    };

    for node in nodes {
        let inline = match &node {
            Node::Text(_) => true,
            Node::Element(el) => INLINE_TAGS.contains(&el.tag.as_str()),
        };
        if inline {
            run.push(node);
        } else {
            flush(&mut run, &mut out);
            out.push(node);
        }
    }
    flush(&mut run, &mut out);
    out
}

fn is_bare_break(node: &Node) -> bool {
    matches!(node, Node::Element(el) if el.tag == "br")
}

/// Parses persisted HTML and paginates it.
pub fn paginate_html(html: &str, measurer: &dyn Measurer, geometry: &PageGeometry) -> Vec<Page> {
    let mut nodes = parse_fragment(html);
    strip_decorations(&mut nodes);
    paginate(&normalize_nodes(nodes), measurer, geometry)
}

/// Lays normalized nodes into pages. Always returns at least one page.
pub fn paginate(nodes: &[Node], measurer: &dyn Measurer, geometry: &PageGeometry) -> Vec<Page> {
    let limit = geometry.content_height_px();
    let mut pages: Vec<Page> = Vec::new();
    let mut current = PageBuilder::default();
    let mut break_pending = false;

    for (i, node) in nodes.iter().enumerate() {
        let marker = break_marker(node);
        let height = measurer.measure(node, geometry);

        let forced = break_pending || marker == Some(BreakMarker::Before);
        let overflow = current.height + height > limit;
        if !current.is_empty() && (forced || overflow) {
            pages.push(current.finish(pages.len()));
            current = PageBuilder::default();
        }
        current.push(i, node, height);
        break_pending = marker == Some(BreakMarker::After);
    }
    if !current.is_empty() || pages.is_empty() {
        pages.push(current.finish(pages.len()));
    }
    debug!(pages = pages.len(), nodes = nodes.len(), "paginated");
    pages
}

#[derive(Default)]
struct PageBuilder {
    nodes: Vec<usize>,
    content: Vec<Node>,
    height: f32,
}

impl PageBuilder {
    fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, index: usize, node: &Node, height: f32) {
        self.nodes.push(index);
        self.content.push(node.clone());
        self.height += height;
    }

    fn finish(self, index: usize) -> Page {
        Page {
            index,
            nodes: self.nodes,
            html: to_html(&self.content),
            height_px: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::{a4_geometry, FontFamily};
    use crate::layout::measure::MetricMeasurer;
    use proptest::prelude::*;

    /// Reads the height from a `data-h` attribute; everything else is 0.
    struct FixedMeasurer;

    impl Measurer for FixedMeasurer {
        fn measure(&self, node: &Node, _geometry: &PageGeometry) -> f32 {
            node.as_element()
                .and_then(|el| el.attr("data-h"))
                .and_then(|h| h.parse().ok())
                .unwrap_or(0.0)
        }
    }

    fn geo() -> PageGeometry {
        a4_geometry(FontFamily::Pretendard)
    }

    fn boxes(heights: &[u32]) -> String {
        heights
            .iter()
            .map(|h| format!("<div data-h=\"{h}\">x</div>"))
            .collect()
    }

    fn layout(html: &str) -> Vec<Vec<usize>> {
        paginate_html(html, &FixedMeasurer, &geo())
            .into_iter()
            .map(|p| p.nodes)
            .collect()
    }

    #[test]
    fn test_greedy_fill() {
        // Content height is 1011px.
        assert_eq!(layout(&boxes(&[500, 500, 500])), vec![vec![0, 1], vec![2]]);
        assert_eq!(layout(&boxes(&[1011])), vec![vec![0]]);
    }

    #[test]
    fn test_oversize_node_sits_alone() {
        assert_eq!(
            layout(&boxes(&[100, 3000, 100])),
            vec![vec![0], vec![1], vec![2]]
        );
        assert_eq!(layout(&boxes(&[3000])), vec![vec![0]]);
    }

    #[test]
    fn test_break_before_and_after_markers() {
        let html = r#"<div data-h="10">a</div><div data-h="10" data-page-break="before">b</div><div data-h="10" data-page-break="after">c</div><div data-h="10">d</div>"#;
        assert_eq!(layout(html), vec![vec![0], vec![1, 2], vec![3]]);
    }

    #[test]
    fn test_break_before_on_first_node_makes_no_empty_page() {
        let html = r#"<div data-h="10" data-page-break="before">a</div>"#;
        assert_eq!(layout(html), vec![vec![0]]);
    }

    #[test]
    fn test_empty_document_has_one_empty_page() {
        let pages = paginate_html("", &MetricMeasurer, &geo());
        assert_eq!(pages.len(), 1);
        assert!(pages[0].nodes.is_empty());
        assert_eq!(pages[0].html, "");
    }

    #[test]
    fn test_bare_text_runs_wrapped_in_paragraphs() {
        let nodes = normalize_nodes(parse_fragment("hello <b>world</b><br><h2>T</h2>  \n<p>x</p>"));
        assert_eq!(
            to_html(&nodes),
            "<p>hello <b>world</b><br></p><h2>T</h2><p>x</p>"
        );
    }

    #[test]
    fn test_decorations_do_not_reach_pages() {
        let html = r#"<section data-block="quote"><div data-ui="toolbar"></div><p>q</p></section>"#;
        let pages = paginate_html(html, &MetricMeasurer, &geo());
        assert!(!pages[0].html.contains("data-ui"));
    }

    #[test]
    fn test_metric_pagination_of_long_document() {
        let html = "<p>성과를 수치와 함께 입력하세요</p>".repeat(120);
        let pages = paginate_html(&html, &MetricMeasurer, &geo());
        assert!(pages.len() >= 3);
        for page in &pages {
            assert!(page.height_px <= geo().content_height_px());
        }
        let placed: usize = pages.iter().map(|p| p.nodes.len()).sum();
        assert_eq!(placed, 120);
    }

    proptest! {
        #[test]
        fn prop_pagination_is_deterministic_and_complete(
            heights in proptest::collection::vec(0u32..1500, 0..40),
        ) {
            let html = boxes(&heights);
            let first = paginate_html(&html, &FixedMeasurer, &geo());
            let second = paginate_html(&html, &FixedMeasurer, &geo());
            prop_assert_eq!(&first, &second);

            let order: Vec<usize> = first.iter().flat_map(|p| p.nodes.clone()).collect();
            prop_assert_eq!(order, (0..heights.len()).collect::<Vec<_>>());
            for page in &first {
                prop_assert!(page.nodes.len() == 1 || page.height_px <= geo().content_height_px());
            }
        }
    }
}
