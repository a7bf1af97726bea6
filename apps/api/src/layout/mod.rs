// A4 pagination and preview.
// Measurement is pure and deterministic; callers on the request path run it
// inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod measure;
pub mod paginate;
pub mod preview;

pub use font_metrics::{a4_geometry, FontFamily, PageGeometry};
pub use measure::{Measurer, MetricMeasurer};
pub use paginate::{paginate, paginate_html, Page};
pub use preview::{clamp_zoom, render_preview};
