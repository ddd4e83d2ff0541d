use serde::{Deserialize, Serialize};

/// Semantic color tokens for chart chrome, resolved by the renderer's active
/// theme. Data traces carry concrete [`Color`](crate::Color)s instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,
    PanelBackground,
    PanelBorder,

    Axis,
    TickText,

    TextPrimary,
    TextSecondary,

    LegendText,
}
