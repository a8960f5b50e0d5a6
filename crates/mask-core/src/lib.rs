//! Mask Draft core: the stroke model, the pan/zoom camera, and the
//! transforms between editor pixels and image pixels.

pub mod camera;
pub mod color;
pub mod settings;
pub mod stroke;
pub mod transform;

pub use camera::Camera;
pub use color::Color;
pub use settings::{FrameRate, Settings};
pub use stroke::{Stroke, StrokeCap, StrokeKind, line_width};
pub use transform::ImageTransform;

// Re-export kurbo geometry so downstream crates share one point type.
pub use kurbo::{Point, Rect, Size, Vec2};
