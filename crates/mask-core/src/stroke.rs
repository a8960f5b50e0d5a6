//! Mask strokes: capsule lines and closed polygons, in image space.
//!
//! Strokes are stored in image pixels so the mask resolution always matches
//! the original image, whatever the canvas size or zoom level.

use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Line width per unit of stroke size, relative to `width + height` of the image.
pub const LINE_WIDTH_FACTOR: f64 = 0.0025;

/// Minimum number of points for a committable polygon.
pub const MIN_POLYGON_POINTS: usize = 3;

/// End cap of a capsule stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeCap {
    Butt,
    Round,
}

/// Stroke type, used both as the drawing mode and as the stroke discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StrokeKind {
    /// Capsule with flat ends (type 1).
    #[default]
    Butt,
    /// Capsule with round ends (type 2).
    Round,
    /// Filled closed polygon (type 3).
    Polygon,
}

impl StrokeKind {
    pub fn code(self) -> u8 {
        match self {
            Self::Butt => 1,
            Self::Round => 2,
            Self::Polygon => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Butt),
            2 => Some(Self::Round),
            3 => Some(Self::Polygon),
            _ => None,
        }
    }

    /// Cap style for capsule kinds; `None` for polygons.
    pub fn cap(self) -> Option<StrokeCap> {
        match self {
            Self::Butt => Some(StrokeCap::Butt),
            Self::Round => Some(StrokeCap::Round),
            Self::Polygon => None,
        }
    }
}

impl From<StrokeCap> for StrokeKind {
    fn from(cap: StrokeCap) -> Self {
        match cap {
            StrokeCap::Butt => Self::Butt,
            StrokeCap::Round => Self::Round,
        }
    }
}

/// A committed mask stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "StrokeRecord", try_from = "StrokeRecord")]
pub enum Stroke {
    Line {
        cap: StrokeCap,
        size: f64,
        p1: Point,
        p2: Point,
    },
    Polygon {
        points: Vec<Point>,
    },
}

impl Stroke {
    pub fn line(cap: StrokeCap, size: f64, p1: Point, p2: Point) -> Self {
        Self::Line { cap, size, p1, p2 }
    }

    /// A closed polygon, or `None` with fewer than [`MIN_POLYGON_POINTS`] points.
    pub fn polygon(points: Vec<Point>) -> Option<Self> {
        (points.len() >= MIN_POLYGON_POINTS).then_some(Self::Polygon { points })
    }

    pub fn kind(&self) -> StrokeKind {
        match self {
            Self::Line { cap, .. } => (*cap).into(),
            Self::Polygon { .. } => StrokeKind::Polygon,
        }
    }

    /// End point of a line stroke, used to chain the next capsule.
    pub fn end_point(&self) -> Option<Point> {
        match self {
            Self::Line { p2, .. } => Some(*p2),
            Self::Polygon { .. } => None,
        }
    }
}

/// Line width in image pixels for a stroke of `size` on an image of `image` pixels.
pub fn line_width(size: f64, image: Size) -> f64 {
    (image.width + image.height) * size * LINE_WIDTH_FACTOR
}

// ─── Wire record ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PointRecord {
    x: f64,
    y: f64,
}

/// Flat record layout: `{type: 1|2, size, x1, y1, x2, y2}` or `{type: 3, points}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StrokeRecord {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    points: Option<Vec<PointRecord>>,
}

impl From<Stroke> for StrokeRecord {
    fn from(stroke: Stroke) -> Self {
        let kind = stroke.kind().code();
        match stroke {
            Stroke::Line { size, p1, p2, .. } => Self {
                kind,
                size: Some(size),
                x1: Some(p1.x),
                y1: Some(p1.y),
                x2: Some(p2.x),
                y2: Some(p2.y),
                points: None,
            },
            Stroke::Polygon { points } => Self {
                kind,
                size: None,
                x1: None,
                y1: None,
                x2: None,
                y2: None,
                points: Some(points.iter().map(|p| PointRecord { x: p.x, y: p.y }).collect()),
            },
        }
    }
}

impl TryFrom<StrokeRecord> for Stroke {
    type Error = String;

    fn try_from(record: StrokeRecord) -> Result<Self, Self::Error> {
        let kind = StrokeKind::from_code(record.kind)
            .ok_or_else(|| format!("unknown stroke type {}", record.kind))?;

        match kind.cap() {
            Some(cap) => match (record.size, record.x1, record.y1, record.x2, record.y2) {
                (Some(size), Some(x1), Some(y1), Some(x2), Some(y2)) => Ok(Stroke::line(
                    cap,
                    size,
                    Point::new(x1, y1),
                    Point::new(x2, y2),
                )),
                _ => Err(format!("line stroke of type {} is missing fields", record.kind)),
            },
            None => {
                let points = record
                    .points
                    .unwrap_or_default()
                    .into_iter()
                    .map(|p| Point::new(p.x, p.y))
                    .collect();
                Stroke::polygon(points).ok_or_else(|| {
                    format!("polygon stroke needs at least {MIN_POLYGON_POINTS} points")
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kind_codes() {
        for kind in [StrokeKind::Butt, StrokeKind::Round, StrokeKind::Polygon] {
            assert_eq!(StrokeKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(StrokeKind::from_code(0), None);
        assert_eq!(StrokeKind::from_code(4), None);
    }

    #[test]
    fn polygon_needs_three_points() {
        assert!(Stroke::polygon(vec![Point::ZERO, Point::new(1.0, 0.0)]).is_none());
        let tri = Stroke::polygon(vec![
            Point::ZERO,
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ])
        .unwrap();
        assert_eq!(tri.kind(), StrokeKind::Polygon);
        assert_eq!(tri.end_point(), None);
    }

    #[test]
    fn line_width_scales_with_image() {
        let w = line_width(2.0, Size::new(800.0, 600.0));
        assert!((w - 7.0).abs() < 1e-12);
    }

    #[test]
    fn decode_line_record() {
        let stroke: Stroke =
            serde_json::from_str(r#"{"type":2,"size":3,"x1":1,"y1":2,"x2":3,"y2":4}"#).unwrap();
        assert_eq!(
            stroke,
            Stroke::line(StrokeCap::Round, 3.0, Point::new(1.0, 2.0), Point::new(3.0, 4.0))
        );
    }

    #[test]
    fn encode_polygon_record() {
        let stroke = Stroke::polygon(vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 4.0),
        ])
        .unwrap();
        let json = serde_json::to_value(&stroke).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": 3,
                "points": [{"x": 0.0, "y": 0.0}, {"x": 4.0, "y": 0.0}, {"x": 0.0, "y": 4.0}]
            })
        );
    }

    #[test]
    fn reject_malformed_records() {
        assert!(serde_json::from_str::<Stroke>(r#"{"type":1,"size":3,"x1":1}"#).is_err());
        assert!(serde_json::from_str::<Stroke>(r#"{"type":3,"points":[{"x":0,"y":0}]}"#).is_err());
        assert!(serde_json::from_str::<Stroke>(r#"{"type":9}"#).is_err());
    }
}
