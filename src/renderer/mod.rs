//! Rendering module
//!
//! Simulation code emits a `DisplayList`; the wasm build paints it onto a 2D
//! canvas context layered over the mirrored camera feed.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod display_list;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasPainter;
pub use display_list::{Baseline, Color, DisplayList, DrawCommand, Glyph, TextAlign};
