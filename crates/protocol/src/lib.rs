pub mod commands;
pub mod segment;
pub mod theme;
pub mod types;

pub use commands::{RenderCommand, TextAlign};
pub use segment::{Channel, IndexRange, LineStyle, Segment};
pub use theme::ThemeToken;
pub use types::{Color, Point, Rect, Viewport};
