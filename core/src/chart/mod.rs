pub mod draw;
pub mod layout;
pub mod probe;
pub mod render;
pub mod selection;

pub use draw::{DrawCommand, HAlign, Point, Rect, Rgba, TextAnchor, VAlign};
pub use layout::{ChartLayout, Margins, LOGICAL_HEIGHT, LOGICAL_WIDTH};
pub use probe::{probe_at, ProbeState, ProbeTracker, SurfaceGeometry};
pub use render::{axis_color, render_chart, ChartInput};
pub use selection::AxisSelector;
