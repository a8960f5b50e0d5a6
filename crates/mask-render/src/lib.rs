//! Mask Draft render: CPU rasterization of strokes onto pixel surfaces,
//! the editor overlay, pending-point hit testing, and submission encoding.

pub mod hit;
pub mod overlay;
pub mod raster;
pub mod submit;
pub mod surface;

pub use hit::hit_test_point;
pub use overlay::{Preview, render_overlay};
pub use raster::{rasterize, rasterize_stroke};
pub use submit::{SubmissionImages, compile_submission, to_base64};
pub use surface::MaskSurface;
