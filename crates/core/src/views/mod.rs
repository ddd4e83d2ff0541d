pub mod chart;
pub mod overlay;

pub use chart::render_chart;
pub use overlay::{BASELINE_LEGEND, Overlay, OverlayError, build_overlay};
