use serde::{Deserialize, Serialize};

use crate::segment::LineStyle;
use crate::theme::ThemeToken;
use crate::types::{Color, Point, Rect};

/// A single, stateless render instruction.
///
/// The chart view emits a `Vec<RenderCommand>` per render. Renderers consume
/// the list in order; every command carries all the data it needs, and a
/// command paints over whatever came before it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled rectangle (panel backgrounds).
    DrawRect {
        rect: Rect,
        color: ThemeToken,
        border_color: Option<ThemeToken>,
    },

    /// Draw a text string at a position.
    DrawText {
        position: Point,
        text: String,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    },

    /// Draw a chart-chrome line segment (axes, ticks).
    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
    },

    /// Draw a data trace in a data color.
    DrawPolyline {
        points: Vec<Point>,
        color: Color,
        width: f64,
        style: LineStyle,
        hover: Option<String>,
    },

    /// Begin a logical group (a panel, the legend). Renderers may use this
    /// for layering or accessibility.
    BeginGroup { id: String, label: Option<String> },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}
