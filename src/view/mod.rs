//! Viewport geometry: pixel points, viewports and the data-to-pixel transform.

mod transform;

pub use transform::{DEFAULT_PADDING, PixelPoint, Transform, Viewport};
