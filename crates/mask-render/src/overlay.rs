//! Editor overlay: committed strokes plus the in-progress preview.
//!
//! The overlay is drawn in image space on a surface the size of the image,
//! then shown through the image transform like the image itself.

use mask_core::color::{EDITOR_PAINT, PREVIEW_ALPHA};
use mask_core::{Point, Stroke, StrokeCap, line_width};

use crate::raster::{fill_capsule, fill_polygon, rasterize};
use crate::surface::MaskSurface;

/// Stroke being drawn but not yet committed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Preview<'a> {
    #[default]
    None,
    /// Anchored capsule following the cursor.
    Capsule {
        cap: StrokeCap,
        size: f64,
        from: Point,
        to: Point,
    },
    /// Pending polygon points; drawn once at least three are placed.
    Polygon(&'a [Point]),
}

/// Redraw the overlay from scratch.
///
/// Committed strokes use the live `opacity`; the preview is always drawn at
/// [`PREVIEW_ALPHA`] so it stays visible while the overlay is hidden.
pub fn render_overlay(
    surface: &mut MaskSurface,
    strokes: &[Stroke],
    opacity: f32,
    preview: &Preview<'_>,
) {
    surface.clear();
    if opacity > 0.0 {
        rasterize(strokes, EDITOR_PAINT.with_alpha(opacity), surface);
    }

    let paint = EDITOR_PAINT.with_alpha(PREVIEW_ALPHA);
    match *preview {
        Preview::None => {}
        Preview::Capsule {
            cap,
            size,
            from,
            to,
        } => {
            let width = line_width(size, surface.size());
            fill_capsule(surface, cap, width, from, to, paint);
        }
        Preview::Polygon(points) => fill_polygon(surface, points, paint),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn square() -> Vec<Point> {
        vec![
            Point::new(2.0, 2.0),
            Point::new(8.0, 2.0),
            Point::new(8.0, 8.0),
            Point::new(2.0, 8.0),
        ]
    }

    #[test]
    fn committed_strokes_use_live_opacity() {
        let mut s = MaskSurface::new(10, 10);
        let strokes = vec![Stroke::polygon(square()).unwrap()];
        render_overlay(&mut s, &strokes, 1.0, &Preview::None);
        assert_eq!(s.pixel(5, 5), [0, 255, 0, 255]);

        render_overlay(&mut s, &strokes, 0.5, &Preview::None);
        assert_eq!(s.pixel(5, 5), [0, 255, 0, 128]);

        render_overlay(&mut s, &strokes, 0.0, &Preview::None);
        assert_eq!(s.pixel(5, 5), [0, 0, 0, 0]);
    }

    #[test]
    fn preview_drawn_at_half_alpha() {
        let mut s = MaskSurface::new(10, 10);
        let pending = square();
        render_overlay(&mut s, &[], 0.0, &Preview::Polygon(&pending));
        assert_eq!(s.pixel(5, 5), [0, 255, 0, 128]);

        render_overlay(
            &mut s,
            &[],
            1.0,
            &Preview::Capsule {
                cap: StrokeCap::Round,
                size: 100.0,
                from: Point::new(5.0, 5.0),
                to: Point::new(5.0, 5.0),
            },
        );
        assert_eq!(s.pixel(5, 5), [0, 255, 0, 128]);
        assert_eq!(s.pixel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn short_pending_polygon_not_filled() {
        let mut s = MaskSurface::new(10, 10);
        let pending = [Point::new(1.0, 1.0), Point::new(9.0, 9.0)];
        render_overlay(&mut s, &[], 1.0, &Preview::Polygon(&pending));
        assert!(s.as_image().pixels().all(|p| p.0[3] == 0));
    }
}
