//! Allow-list sanitizer for pasted or foreign HTML.
//!
//! Disallowed content degrades silently: unknown tags are unwrapped to their
//! children, dangerous containers are dropped with their contents, and
//! attributes are filtered per tag. Nothing here returns an error.

use crate::editor::html::{parse_fragment, Element, Node};

const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "b", "strong", "i", "em", "u", "s", "a", "ul", "ol", "li", "h1", "h2", "h3",
    "blockquote", "pre", "code", "table", "thead", "tbody", "tr", "th", "td", "img", "span",
    "div", "section", "hr",
];

/// Dropped together with everything inside them.
const DROPPED_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "template", "noscript", "head", "title",
];

/// Sanitizes an HTML string into an allow-listed node tree.
pub fn sanitize_html(input: &str) -> Vec<Node> {
    sanitize_nodes(parse_fragment(input))
}

pub fn sanitize_nodes(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        sanitize_into(node, &mut out);
    }
    crate::editor::html::normalize_text(&mut out);
    out
}

fn sanitize_into(node: Node, out: &mut Vec<Node>) {
    let el = match node {
        Node::Text(s) => {
            out.push(Node::Text(s));
            return;
        }
        Node::Element(el) => el,
    };

    if DROPPED_TAGS.contains(&el.tag.as_str()) {
        return;
    }

    let children = sanitize_nodes(el.children);

    if !ALLOWED_TAGS.contains(&el.tag.as_str()) {
        out.extend(children);
        return;
    }

    let attrs = el
        .attrs
        .into_iter()
        .filter(|(name, value)| keep_attr(&el.tag, name, value))
        .collect();

    out.push(Node::Element(Element {
        tag: el.tag,
        attrs,
        children,
    }));
}

fn keep_attr(tag: &str, name: &str, value: &str) -> bool {
    if name == "style" || name.starts_with("on") {
        return false;
    }
    match tag {
        "a" => match name {
            "href" => !is_script_url(value),
            "target" | "rel" => true,
            _ => false,
        },
        "img" => match name {
            "src" => !is_script_url(value),
            "alt" => true,
            _ => false,
        },
        _ => name.starts_with("data-") || matches!(name, "class" | "contenteditable"),
    }
}

fn is_script_url(value: &str) -> bool {
    let v: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    v.starts_with("javascript:") || v.starts_with("vbscript:")
}

/// Plain-text paste: escape, then turn newlines into `<br>`.
pub fn plain_text_to_html(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    normalized
        .split('\n')
        .map(crate::editor::html::escape_text)
        .collect::<Vec<_>>()
        .join("<br>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::html::to_html;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_script_and_style_removed_text_kept() {
        let out = sanitize_html("<p>hi</p><script>alert(1)</script><style>p{}</style>");
        let html = to_html(&out);
        assert_eq!(html, "<p>hi</p>");
        assert!(!html.contains("script"));
    }

    #[test]
    fn test_disallowed_tags_unwrapped() {
        let out = sanitize_html("<font color=\"red\">warm <marquee>words</marquee></font>");
        assert_eq!(to_html(&out), "warm words");
    }

    #[test]
    fn test_inline_styles_and_handlers_stripped() {
        let out = sanitize_html("<p style=\"color:red\" onclick=\"x()\" class=\"lead\">t</p>");
        assert_eq!(to_html(&out), "<p class=\"lead\">t</p>");
    }

    #[test]
    fn test_anchor_and_image_attribute_allow_list() {
        let out = sanitize_html(
            "<a href=\"https://a.io\" target=\"_blank\" rel=\"noopener\" id=\"x\">a</a>\
             <img src=\"p.png\" alt=\"p\" width=\"10\">",
        );
        assert_eq!(
            to_html(&out),
            "<a href=\"https://a.io\" rel=\"noopener\" target=\"_blank\">a</a><img alt=\"p\" src=\"p.png\">"
        );
    }

    #[test]
    fn test_javascript_href_dropped() {
        let out = sanitize_html("<a href=\" javascript:alert(1)\">x</a>");
        assert_eq!(to_html(&out), "<a>x</a>");
    }

    #[test]
    fn test_script_only_with_text_stays_non_empty() {
        let out = sanitize_html("before<script>evil()</script>after");
        assert_eq!(to_html(&out), "beforeafter");
    }

    #[test]
    fn test_loose_list_and_paragraph_markup_closed() {
        let out = sanitize_html("<ul><li>a<li>b</ul><p>one<p>two");
        assert_eq!(
            to_html(&out),
            "<ul><li>a</li><li>b</li></ul><p>one</p><p>two</p>"
        );
    }

    #[test]
    fn test_office_paste_wrapper_unwrapped() {
        let out = sanitize_html(
            "<html><head><style>p{}</style></head><body><o:p>x</o:p><p>y</p></body></html>",
        );
        assert_eq!(to_html(&out), "x<p>y</p>");
    }

    #[test]
    fn test_plain_text_escaped_with_breaks() {
        assert_eq!(plain_text_to_html("a\nb"), "a<br>b");
        assert_eq!(
            plain_text_to_html("<b>x</b>\r\ny"),
            "&lt;b&gt;x&lt;/b&gt;<br>y"
        );
    }
}
