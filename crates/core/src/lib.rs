//! Bead-level overlays for two-channel weld sensor recordings.
//!
//! ```text
//!   series CSV ──▶ parse_series ─────▶ RawSeries ─┐
//!                                                 ├─▶ build_overlay ──▶ Overlay ──▶ render_chart ──▶ RenderCommand[] ──▶ SVG / terminal
//!   metadata CSV ─▶ parse_bead_table ─▶ BeadTable ─┘        ▲
//!                   (+ LabelTranslator)              ViewerConfig
//! ```

pub mod config;
pub mod model;
pub mod parsers;
pub mod source;
pub mod svg;
pub mod translate;
pub mod views;
