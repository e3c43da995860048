/// Figure layer: declarative figure specs, pure composition, rasterization
/// and atomic export.
///
/// ```text
///   FigureSpec ──compose──▶ ComposedFigure ──render──▶ RgbImage ──export──▶ file
///   (entries,               (traces, ranges,            (plotters             (tmp + rename)
///    styles, ticks)          legend, corner)             bitmap)
/// ```

pub mod compose;
pub mod export;
pub mod render;
pub mod spec;

pub use compose::{compose, ComposedFigure};
pub use export::export;
pub use spec::{FigureSpec, PlotEntry, Style};
