//! Drawing tools.
//!
//! Each tool turns the per-tick mouse gesture into edits on the committed
//! stroke list (and on its own pending state). Only one gesture is handled
//! per tick, chosen by [`Gesture::from_buttons`].
//!
//! | Gesture | Capsule tool | Polygon tool |
//! |---------|--------------|--------------|
//! | **Left press** | Anchor at cursor | Grab nearby point, else append one |
//! | **Right press** | Chain from last same-cap stroke | Commit pending (≥3), or reopen last polygon |
//! | **Left held** | (none) | Drag grabbed point |
//! | **Release** | Commit anchor → cursor | Drop grabbed point |

use mask_core::{Camera, ImageTransform, Point, Stroke, StrokeCap, StrokeKind};
use mask_render::{Preview, hit_test_point};

use crate::input::ButtonState;

/// The one mouse gesture a tool sees this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    LeftPress,
    RightPress,
    LeftHeld,
    Release,
    None,
}

impl Gesture {
    /// Left press wins over right press, which wins over a held left button;
    /// a release of either button comes last.
    pub fn from_buttons(left: ButtonState, right: ButtonState) -> Self {
        if left == ButtonState::JustPressed {
            Self::LeftPress
        } else if right == ButtonState::JustPressed {
            Self::RightPress
        } else if left == ButtonState::Held {
            Self::LeftHeld
        } else if left == ButtonState::JustReleased || right == ButtonState::JustReleased {
            Self::Release
        } else {
            Self::None
        }
    }
}

/// What a tool did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeEvent {
    /// A stroke was appended to the committed list.
    Committed,
    /// The last committed polygon was moved back into pending points.
    Reopened,
    PointAdded,
    PointMoved,
}

impl StrokeEvent {
    /// Whether the committed stroke list changed.
    pub fn changes_strokes(self) -> bool {
        matches!(self, Self::Committed | Self::Reopened)
    }
}

/// Everything a tool can read or edit during one tick.
pub struct ToolContext<'a> {
    /// Cursor in editor pixels.
    pub cursor_editor: Point,
    /// Cursor in image pixels.
    pub cursor_image: Point,
    pub strokes: &'a mut Vec<Stroke>,
    pub camera: &'a Camera,
    pub transform: &'a ImageTransform,
    /// Point grab radius in editor pixels.
    pub hit_radius: f64,
    /// Current stroke size.
    pub size: f64,
}

/// Trait for tools that turn gestures into stroke edits.
pub trait Tool {
    fn kind(&self) -> StrokeKind;

    /// Handle this tick's gesture.
    fn handle(&mut self, gesture: Gesture, ctx: &mut ToolContext<'_>) -> Option<StrokeEvent>;

    /// In-progress stroke to draw under the cursor.
    fn preview(&self, cursor_image: Point, size: f64) -> Preview<'_>;

    /// Drop all pending state.
    fn reset(&mut self);
}

// ─── Capsule Tool ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CapsuleTool {
    pub cap: StrokeCap,
    anchor: Option<Point>,
}

impl CapsuleTool {
    pub fn new(cap: StrokeCap) -> Self {
        Self { cap, anchor: None }
    }

    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }
}

impl Tool for CapsuleTool {
    fn kind(&self) -> StrokeKind {
        self.cap.into()
    }

    fn handle(&mut self, gesture: Gesture, ctx: &mut ToolContext<'_>) -> Option<StrokeEvent> {
        match gesture {
            Gesture::LeftPress => {
                self.anchor = Some(ctx.cursor_image);
                None
            }
            Gesture::RightPress => {
                // Continue from where the previous stroke of this cap ended.
                if let Some(Stroke::Line { cap, p2, .. }) = ctx.strokes.last()
                    && *cap == self.cap
                {
                    self.anchor = Some(*p2);
                }
                None
            }
            Gesture::Release => {
                let start = self.anchor.take()?;
                ctx.strokes
                    .push(Stroke::line(self.cap, ctx.size, start, ctx.cursor_image));
                log::trace!("capsule committed, {} strokes", ctx.strokes.len());
                Some(StrokeEvent::Committed)
            }
            Gesture::LeftHeld | Gesture::None => None,
        }
    }

    fn preview(&self, cursor_image: Point, size: f64) -> Preview<'_> {
        match self.anchor {
            Some(from) => Preview::Capsule {
                cap: self.cap,
                size,
                from,
                to: cursor_image,
            },
            None => Preview::None,
        }
    }

    fn reset(&mut self) {
        self.anchor = None;
    }
}

// ─── Polygon Tool ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct PolygonTool {
    points: Vec<Point>,
    /// Index of the point being dragged.
    dragging: Option<usize>,
}

impl PolygonTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending points in image space.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Remove the last pending point. Returns `false` if there was none.
    pub fn pop_point(&mut self) -> bool {
        self.dragging = None;
        self.points.pop().is_some()
    }
}

impl Tool for PolygonTool {
    fn kind(&self) -> StrokeKind {
        StrokeKind::Polygon
    }

    fn handle(&mut self, gesture: Gesture, ctx: &mut ToolContext<'_>) -> Option<StrokeEvent> {
        match gesture {
            Gesture::LeftPress => {
                self.dragging = hit_test_point(
                    &self.points,
                    ctx.cursor_editor,
                    ctx.camera,
                    ctx.transform,
                    ctx.hit_radius,
                );
                if self.dragging.is_some() {
                    return None;
                }
                self.points.push(ctx.cursor_image);
                Some(StrokeEvent::PointAdded)
            }
            Gesture::RightPress => {
                if self.points.is_empty() {
                    if !matches!(ctx.strokes.last(), Some(Stroke::Polygon { .. })) {
                        return None;
                    }
                    let Some(Stroke::Polygon { points }) = ctx.strokes.pop() else {
                        return None;
                    };
                    self.points = points;
                    return Some(StrokeEvent::Reopened);
                }
                let points = std::mem::take(&mut self.points);
                self.dragging = None;
                let stroke = Stroke::polygon(points)?;
                ctx.strokes.push(stroke);
                log::trace!("polygon committed, {} strokes", ctx.strokes.len());
                Some(StrokeEvent::Committed)
            }
            Gesture::LeftHeld => {
                let point = self.points.get_mut(self.dragging?)?;
                *point = ctx.cursor_image;
                Some(StrokeEvent::PointMoved)
            }
            Gesture::Release => {
                self.dragging = None;
                None
            }
            Gesture::None => None,
        }
    }

    fn preview(&self, _cursor_image: Point, _size: f64) -> Preview<'_> {
        Preview::Polygon(&self.points)
    }

    fn reset(&mut self) {
        self.points.clear();
        self.dragging = None;
    }
}
