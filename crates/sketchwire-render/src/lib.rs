//! CPU rasterization of board elements.
//!
//! Rendering is a pure function of the element sequence and the surface
//! dimensions: [`renderer::redraw`] clears to white and paints every element
//! in order, so two surfaces fed the same sequence hold identical pixels.

pub mod renderer;
pub mod surface;
pub mod text;

pub use renderer::{paint, redraw, STROKE_WIDTH};
pub use surface::{RenderError, Surface};
pub use text::FontStore;
