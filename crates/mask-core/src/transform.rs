//! Fit-to-canvas image layout and editor ↔ image coordinate conversion.
//!
//! Three spaces are involved:
//!
//! - **editor space**: device pixels of the editor canvas (pointer positions
//!   already multiplied by the resolution setting),
//! - **world space**: editor space with the camera removed,
//! - **image space**: pixels of the original image.
//!
//! [`ImageTransform`] places the image in world space; the camera maps world
//! space to editor space.

use crate::camera::Camera;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Fraction of the canvas the fitted image may occupy.
pub const FIT_RATIO: f64 = 0.9;

/// Hit radius for pending polygon points, in device pixels before resolution scaling.
pub const POINT_HIT_RADIUS: f64 = 7.5;

/// Radius of the pending polygon point markers, in device pixels before resolution scaling.
pub const POINT_MARKER_RADIUS: f64 = 5.0;

/// Placement of an image inside the editor's world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageTransform {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub width_scale: f64,
    pub height_scale: f64,
}

impl ImageTransform {
    /// Fit an image of `image` pixels into a canvas of `canvas` pixels.
    ///
    /// The image keeps its aspect ratio, takes at most [`FIT_RATIO`] of the
    /// canvas, and sits below `chrome_offset` pixels reserved at the top.
    pub fn fit(canvas: Size, image: Size, chrome_offset: f64) -> Self {
        let canvas_w = canvas.width.max(1.0);
        let canvas_h = canvas.height.max(1.0);
        let image_w = image.width.max(1.0);
        let image_h = image.height.max(1.0);

        let canvas_aspect = canvas_w / canvas_h;
        let image_aspect = image_w / image_h;

        let (mut width, mut height) = if image_aspect > canvas_aspect {
            (canvas_w, canvas_w / image_aspect)
        } else {
            (canvas_h * image_aspect, canvas_h)
        };

        width *= FIT_RATIO;
        height *= FIT_RATIO;

        let offset = chrome_offset.max(0.0);
        if offset > 0.0 {
            height = (height - offset / 2.0).max(1.0);
            width = height * image_aspect;
        }

        log::trace!(
            "fit {}x{} into {}x{} -> {:.1}x{:.1}",
            image_w,
            image_h,
            canvas_w,
            canvas_h,
            width,
            height
        );

        Self {
            x: (canvas_w - width) / 2.0,
            y: (canvas_h + offset - height) / 2.0,
            width,
            height,
            width_scale: width / image_w,
            height_scale: height / image_h,
        }
    }

    /// Editor pixels → image pixels.
    pub fn to_image_space(&self, editor: Point, camera: &Camera) -> Point {
        Point::new(
            (editor.x / camera.scale + (camera.x - self.x)) / self.width_scale,
            (editor.y / camera.scale + (camera.y - self.y)) / self.height_scale,
        )
    }

    /// Image pixels → editor pixels.
    pub fn to_editor_space(&self, image: Point, camera: &Camera) -> Point {
        Point::new(
            (self.x + image.x * self.width_scale - camera.x) * camera.scale,
            (self.y + image.y * self.height_scale - camera.y) * camera.scale,
        )
    }

    /// Where the image is drawn in editor pixels under `camera`.
    pub fn editor_rect(&self, camera: &Camera) -> Rect {
        let x0 = (self.x - camera.x) * camera.scale;
        let y0 = (self.y - camera.y) * camera.scale;
        Rect::new(
            x0,
            y0,
            x0 + self.width * camera.scale,
            y0 + self.height * camera.scale,
        )
    }
}
