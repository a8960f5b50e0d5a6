//! Hit testing: editor cursor → pending polygon point.
//!
//! Points live in image space; the test runs in editor space so the hit
//! radius stays constant on screen regardless of zoom.

use mask_core::{Camera, ImageTransform, Point};

/// Index of the first point whose editor-space position lies strictly within
/// `radius` of `cursor`. Returns `None` when nothing is hit.
pub fn hit_test_point(
    points: &[Point],
    cursor: Point,
    camera: &Camera,
    transform: &ImageTransform,
    radius: f64,
) -> Option<usize> {
    let r2 = radius * radius;
    points
        .iter()
        .position(|p| transform.to_editor_space(*p, camera).distance_squared(cursor) < r2)
}
