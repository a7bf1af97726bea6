//! Zoomed page-frame preview markup.

use crate::editor::html::{Element, Node};
use crate::layout::font_metrics::PageGeometry;
use crate::layout::paginate::Page;

pub const MIN_ZOOM: f32 = 0.25;
pub const MAX_ZOOM: f32 = 3.0;

/// Zoom is a pure display transform; it never affects pagination.
pub fn clamp_zoom(zoom: f32) -> f32 {
    if zoom.is_nan() {
        return 1.0;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Renders every page as a fixed-size frame inside a `.preview` wrapper.
pub fn render_preview(pages: &[Page], geometry: &PageGeometry, zoom: f32) -> String {
    let zoom = clamp_zoom(zoom);
    let mut root = Element::new("div").with_attr("class", "preview");
    for page in pages {
        root.children.push(Node::Element(page_frame(page, geometry, zoom)));
    }
    root.to_html()
}

fn page_frame(page: &Page, geometry: &PageGeometry, zoom: f32) -> Element {
    let frame_style = format!(
        "width:{}px;height:{}px;transform:scale({});transform-origin:top left",
        geometry.width_px, geometry.height_px, zoom
    );
    let content_style = format!(
        "padding:{}px;font-size:{}px;line-height:{}",
        geometry.padding_px, geometry.font_size_px, geometry.line_height
    );
    let mut content = Element::new("div")
        .with_attr("class", "page-content")
        .with_attr("style", content_style);
    content.children = crate::editor::html::parse_fragment(&page.html);

    Element::new("div")
        .with_attr("class", "page")
        .with_attr("data-page", (page.index + 1).to_string())
        .with_attr("style", frame_style)
        .with_child(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::{a4_geometry, FontFamily};
    use crate::layout::measure::MetricMeasurer;
    use crate::layout::paginate::paginate_html;

    #[test]
    fn test_clamp_zoom() {
        assert_eq!(clamp_zoom(0.1), MIN_ZOOM);
        assert_eq!(clamp_zoom(10.0), MAX_ZOOM);
        assert_eq!(clamp_zoom(1.5), 1.5);
        assert_eq!(clamp_zoom(f32::NAN), 1.0);
        assert_eq!(clamp_zoom(f32::INFINITY), MAX_ZOOM);
    }

    #[test]
    fn test_preview_frames_each_page() {
        let geo = a4_geometry(FontFamily::Pretendard);
        let html = "<p>본문</p>".repeat(100);
        let pages = paginate_html(&html, &MetricMeasurer, &geo);
        let out = render_preview(&pages, &geo, 0.5);

        assert!(out.starts_with("<div class=\"preview\">"));
        assert_eq!(out.matches("class=\"page\"").count(), pages.len());
        assert!(out.contains("width:794px;height:1123px;transform:scale(0.5)"));
        assert!(out.contains("data-page=\"2\""));
        assert!(out.contains("<p>본문</p>"));
    }

    #[test]
    fn test_zoom_does_not_change_pages() {
        let geo = a4_geometry(FontFamily::NotoSerifKr);
        let pages = paginate_html(&"<p>x</p>".repeat(80), &MetricMeasurer, &geo);
        let small = render_preview(&pages, &geo, 0.25);
        let large = render_preview(&pages, &geo, 3.0);
        assert_eq!(
            small.matches("class=\"page\"").count(),
            large.matches("class=\"page\"").count()
        );
    }
}
