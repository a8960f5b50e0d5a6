//! Stroke rasterization onto a [`MaskSurface`].
//!
//! Coverage is binary: a pixel is painted when its centre falls inside the
//! stroke footprint. Masks therefore only ever contain the transparent
//! background and the paint colour.

use kurbo::{BezPath, Point, Rect, Shape, Vec2};
use mask_core::{Color, Stroke, StrokeCap, line_width};

use crate::surface::MaskSurface;

/// Rasterize every stroke in order, each composited source-over in `paint`.
pub fn rasterize(strokes: &[Stroke], paint: Color, surface: &mut MaskSurface) {
    log::trace!("rasterize {} strokes", strokes.len());
    for stroke in strokes {
        rasterize_stroke(stroke, paint, surface);
    }
}

pub fn rasterize_stroke(stroke: &Stroke, paint: Color, surface: &mut MaskSurface) {
    match stroke {
        Stroke::Line { cap, size, p1, p2 } => {
            let width = line_width(*size, surface.size());
            fill_capsule(surface, *cap, width, *p1, *p2, paint);
        }
        Stroke::Polygon { points } => fill_polygon(surface, points, paint),
    }
}

/// Fill a capsule of full width `width` from `p1` to `p2`.
pub fn fill_capsule(
    surface: &mut MaskSurface,
    cap: StrokeCap,
    width: f64,
    p1: Point,
    p2: Point,
    paint: Color,
) {
    let half = width / 2.0;
    if half <= 0.0 {
        return;
    }

    let axis = p2 - p1;
    let len2 = axis.hypot2();
    if len2 == 0.0 && cap == StrokeCap::Butt {
        return;
    }

    let bounds = Rect::from_points(p1, p2).inflate(half, half);
    let len = len2.sqrt();
    let covers = |c: Point| -> bool {
        let rel = c - p1;
        match cap {
            StrokeCap::Round => segment_distance2(rel, axis, len2) <= half * half,
            StrokeCap::Butt => {
                let t = rel.dot(axis) / len2;
                (0.0..=1.0).contains(&t) && (axis.cross(rel) / len).abs() <= half
            }
        }
    };
    fill_where(surface, bounds, paint, covers);
}

/// Fill a closed polygon with the non-zero winding rule.
/// Fewer than three points paint nothing.
pub fn fill_polygon(surface: &mut MaskSurface, points: &[Point], paint: Color) {
    let Some(path) = polygon_path(points) else {
        return;
    };
    let bounds = path.bounding_box();
    fill_where(surface, bounds, paint, |c| path.winding(c) != 0);
}

fn polygon_path(points: &[Point]) -> Option<BezPath> {
    let (first, rest) = points.split_first()?;
    if rest.len() < 2 {
        return None;
    }
    let mut path = BezPath::new();
    path.move_to(*first);
    for p in rest {
        path.line_to(*p);
    }
    path.close_path();
    Some(path)
}

/// Squared distance from `rel` (relative to the segment start) to the segment `axis`.
fn segment_distance2(rel: Vec2, axis: Vec2, len2: f64) -> f64 {
    if len2 == 0.0 {
        return rel.hypot2();
    }
    let t = (rel.dot(axis) / len2).clamp(0.0, 1.0);
    (rel - axis * t).hypot2()
}

/// Visit every pixel whose centre lies in `bounds` (clipped to the surface) and
/// blend `paint` where `covers` holds.
fn fill_where(
    surface: &mut MaskSurface,
    bounds: Rect,
    paint: Color,
    covers: impl Fn(Point) -> bool,
) {
    let Some((x0, y0, x1, y1)) = pixel_span(bounds, surface.width(), surface.height()) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            let centre = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if covers(centre) {
                surface.blend(x, y, paint);
            }
        }
    }
}

/// Pixel index range `[x0, x1) × [y0, y1)` whose centres can fall inside `bounds`.
fn pixel_span(bounds: Rect, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    if !bounds.is_finite() || width == 0 || height == 0 {
        return None;
    }
    let clip = |lo: f64, hi: f64, max: u32| -> Option<(u32, u32)> {
        let start = (lo - 0.5).ceil().max(0.0);
        let end = ((hi - 0.5).floor() + 1.0).min(f64::from(max));
        (start < end).then(|| (start as u32, end as u32))
    };
    let (x0, x1) = clip(bounds.x0, bounds.x1, width)?;
    let (y0, y1) = clip(bounds.y0, bounds.y1, height)?;
    Some((x0, y0, x1, y1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mask_core::color::MASK_PAINT;
    use pretty_assertions::assert_eq;

    fn painted(surface: &MaskSurface) -> usize {
        surface.as_image().pixels().filter(|p| p.0[3] > 0).count()
    }

    #[test]
    fn butt_line_stops_at_endpoints() {
        let mut s = MaskSurface::new(20, 10);
        fill_capsule(
            &mut s,
            StrokeCap::Butt,
            4.0,
            Point::new(5.0, 5.0),
            Point::new(15.0, 5.0),
            MASK_PAINT,
        );
        assert_eq!(s.pixel(10, 5), [255, 255, 255, 255]);
        assert_eq!(s.pixel(5, 5), [255, 255, 255, 255]);
        assert_eq!(s.pixel(4, 5), [0, 0, 0, 0]);
        assert_eq!(s.pixel(15, 5), [0, 0, 0, 0]);
        // 10 columns × 4 rows
        assert_eq!(painted(&s), 40);
    }

    #[test]
    fn round_line_extends_past_endpoints() {
        let mut s = MaskSurface::new(20, 10);
        fill_capsule(
            &mut s,
            StrokeCap::Round,
            4.0,
            Point::new(5.0, 5.0),
            Point::new(15.0, 5.0),
            MASK_PAINT,
        );
        assert_eq!(s.pixel(3, 5), [255, 255, 255, 255]);
        assert_eq!(s.pixel(16, 5), [255, 255, 255, 255]);
        assert_eq!(s.pixel(1, 5), [0, 0, 0, 0]);
    }

    #[test]
    fn zero_length_lines() {
        let p = Point::new(5.0, 5.0);
        let mut s = MaskSurface::new(10, 10);
        fill_capsule(&mut s, StrokeCap::Butt, 4.0, p, p, MASK_PAINT);
        assert_eq!(painted(&s), 0);

        fill_capsule(&mut s, StrokeCap::Round, 4.0, p, p, MASK_PAINT);
        assert!(painted(&s) > 0);
        assert_eq!(s.pixel(5, 5), [255, 255, 255, 255]);
    }

    #[test]
    fn polygon_fills_interior() {
        let mut s = MaskSurface::new(10, 10);
        let square = [
            Point::new(2.0, 2.0),
            Point::new(8.0, 2.0),
            Point::new(8.0, 8.0),
            Point::new(2.0, 8.0),
        ];
        fill_polygon(&mut s, &square, MASK_PAINT);
        assert_eq!(painted(&s), 36);
        assert_eq!(s.pixel(1, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn degenerate_polygon_paints_nothing() {
        let mut s = MaskSurface::new(10, 10);
        fill_polygon(&mut s, &[Point::new(1.0, 1.0), Point::new(8.0, 8.0)], MASK_PAINT);
        assert_eq!(painted(&s), 0);
    }

    #[test]
    fn strokes_outside_surface_are_clipped() {
        let mut s = MaskSurface::new(10, 10);
        fill_capsule(
            &mut s,
            StrokeCap::Round,
            6.0,
            Point::new(-20.0, -20.0),
            Point::new(-10.0, -10.0),
            MASK_PAINT,
        );
        assert_eq!(painted(&s), 0);

        fill_capsule(
            &mut s,
            StrokeCap::Butt,
            2.0,
            Point::new(-5.0, 5.0),
            Point::new(50.0, 5.0),
            MASK_PAINT,
        );
        assert_eq!(painted(&s), 20);
    }

    #[test]
    fn stroke_width_follows_surface_size() {
        // (80 + 20) * 4 * 0.0025 = 1 px wide
        let mut s = MaskSurface::new(80, 20);
        let stroke = Stroke::line(
            StrokeCap::Butt,
            4.0,
            Point::new(10.0, 10.5),
            Point::new(20.0, 10.5),
        );
        rasterize(&[stroke], MASK_PAINT, &mut s);
        assert_eq!(painted(&s), 10);
    }
}
