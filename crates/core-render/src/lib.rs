//! Viewport, layout and coordinate queries for the caret engine.
//!
//! Exposed Components:
//! - `viewport`: the scroll model. Logical scroll is clamped to
//!   `[0, max_scroll]`; rendered offsets are re-based every `ROLLOVER` pixels
//!   so transforms stay small in very long documents.
//! - `layout`: editor box bounds behind an invalidate-on-resize cache.
//! - `coords`: `Projector`, composing measurement, buffer <-> screen
//!   translation and the viewport into `point_to_xy`, `x_to_column`,
//!   `y_to_line` and `xy_to_point`.
//! - `timing`: `delay` / `sleep` used by drivers to pace visual updates.
//!
//! Nothing here mutates cursors or buffers; `core-state` owns that and calls
//! in here for geometry.

pub mod coords;
pub mod layout;
pub mod timing;
pub mod viewport;

pub use coords::{Projector, Xy};
pub use layout::{BoxSource, EditorBox, LayoutCache, SharedBox};
pub use viewport::{ROLLOVER, ScrollbarGeometry, ScrollbarStyle, Viewport};
