//! The per-tick editor: input sampling, drawing tools, shortcuts, long-press
//! confirmations, and camera integration.
//!
//! The editor never owns the image or its strokes. Each tick borrows them
//! through an [`EditTarget`], and anything that needs the session (skipping
//! or submitting the image) comes back as an [`EditorAction`].

use std::f64::consts::PI;

use mask_core::stroke::LINE_WIDTH_FACTOR;
use mask_core::transform::{POINT_HIT_RADIUS, POINT_MARKER_RADIUS};
use mask_core::{
    Camera, ImageTransform, Point, Rect, Settings, Stroke, StrokeCap, StrokeKind, Vec2,
};
use mask_render::Preview;

use crate::confirm::HoldConfirm;
use crate::input::{InputEvent, InputState, MouseButton};
use crate::shortcuts::{Keybinds, ShortcutAction};
use crate::tools::{CapsuleTool, Gesture, PolygonTool, Tool, ToolContext};

/// Pan velocity set by the move keys, before the move-speed multiplier.
pub const PAN_SPEED: f64 = 2.5;
/// Zoom velocity set by the zoom keys, before the scale-speed multiplier.
pub const ZOOM_SPEED: f64 = 0.005;
/// Zoom velocity per wheel delta unit.
pub const WHEEL_ZOOM: f64 = 0.002;
/// Wheel deltas closer than this to the previous one do not restart the zoom.
pub const WHEEL_ZOOM_THRESHOLD: f64 = 0.2;

pub const DEFAULT_STROKE_SIZE: f64 = 2.0;
/// Stroke size bounds at scale 1; both shrink as the camera zooms in.
pub const MIN_STROKE_SIZE: f64 = 1.0;
pub const MAX_STROKE_SIZE: f64 = 250.0;

/// Smoothing applied to the butt brush orientation each tick.
const BRUSH_ANGLE_EASE: f64 = 0.25;
/// Minimum cursor travel, in image pixels, that turns the butt brush.
const BRUSH_ANGLE_MIN_TRAVEL: f64 = 0.1;

/// The current image as seen by one tick.
pub struct EditTarget<'a> {
    /// Load generation of the image; a change resets camera and tools.
    pub generation: u64,
    pub transform: ImageTransform,
    pub strokes: &'a mut Vec<Stroke>,
}

/// Requests the editor hands back to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    SkipImage,
    SubmitImage,
    /// The committed stroke list changed; the overlay needs a redraw.
    StrokesChanged,
}

/// Cursor affordance for the capsule tools before a stroke is anchored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Brush {
    /// Flat-cap brush: a bar across the direction of travel.
    Bar { from: Point, to: Point, width: f64 },
    /// Round-cap brush: a disc the size of the stroke.
    Disc { center: Point, radius: f64 },
}

/// Everything needed to draw one frame, in editor pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Where the image and overlay are drawn; `None` while loading.
    pub image_rect: Option<Rect>,
    pub overlay_opacity: f32,
    pub brush: Option<Brush>,
    /// Pending polygon points.
    pub markers: Vec<Point>,
    pub marker_radius: f64,
    /// White flash alpha while the submit key is held.
    pub flash: f64,
}

pub struct Editor {
    pub input: InputState,
    pub keybinds: Keybinds,
    camera: Camera,
    kind: StrokeKind,
    capsule: CapsuleTool,
    polygon: PolygonTool,
    size: f64,
    opacity: f32,
    skip: HoldConfirm,
    submit: HoldConfirm,
    cursor_image: Point,
    last_wheel_dy: f64,
    brush_angle: f64,
    generation: Option<u64>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Keybinds::default())
    }
}

impl Editor {
    pub fn new(keybinds: Keybinds) -> Self {
        Self {
            input: InputState::new(),
            keybinds,
            camera: Camera::default(),
            kind: StrokeKind::Butt,
            capsule: CapsuleTool::new(StrokeCap::Butt),
            polygon: PolygonTool::new(),
            size: DEFAULT_STROKE_SIZE,
            opacity: 1.0,
            skip: HoldConfirm::default(),
            submit: HoldConfirm::default(),
            cursor_image: Point::ZERO,
            last_wheel_dy: 0.0,
            brush_angle: 0.0,
            generation: None,
        }
    }

    pub fn handle_event(&mut self, event: &InputEvent, settings: &Settings) {
        self.input.handle(event, settings.resolution);
    }

    /// Run one tick of `dt` milliseconds.
    pub fn tick(
        &mut self,
        dt: f64,
        settings: &Settings,
        mut target: Option<EditTarget<'_>>,
    ) -> Vec<EditorAction> {
        let mut actions = Vec::new();

        if let Some(target) = target.as_mut() {
            // The first image starts from the initial state; only a switch resets.
            if let Some(previous) = self.generation.replace(target.generation)
                && previous != target.generation
            {
                log::debug!("editor switched to image generation {}", target.generation);
                self.camera.reset();
                self.cancel();
            }
            self.apply_tools(settings, target, &mut actions);
        }
        self.clamp_size();

        self.apply_shortcuts(settings, target.as_mut(), &mut actions);
        self.apply_wheel(settings);

        if target.is_some() {
            if self.skip.update(self.pressed(ShortcutAction::SkipImage), dt) {
                actions.push(EditorAction::SkipImage);
            }
            if self.submit.update(self.pressed(ShortcutAction::SubmitImage), dt) {
                actions.push(EditorAction::SubmitImage);
            }
        }

        self.camera
            .update(dt, self.input.cursor(), settings.resolution);
        self.input.end_tick();

        if !actions.is_empty() {
            log::trace!("tick actions: {actions:?}");
        }
        actions
    }

    fn apply_tools(
        &mut self,
        settings: &Settings,
        target: &mut EditTarget<'_>,
        actions: &mut Vec<EditorAction>,
    ) {
        let cursor_editor = self.input.cursor();
        let cursor_image = target.transform.to_image_space(cursor_editor, &self.camera);
        self.turn_brush(cursor_image);
        self.cursor_image = cursor_image;

        let gesture = Gesture::from_buttons(
            self.input.button(MouseButton::Left),
            self.input.button(MouseButton::Right),
        );
        let tool: &mut dyn Tool = match self.kind {
            StrokeKind::Polygon => &mut self.polygon,
            StrokeKind::Butt | StrokeKind::Round => &mut self.capsule,
        };
        let mut ctx = ToolContext {
            cursor_editor,
            cursor_image,
            strokes: &mut *target.strokes,
            camera: &self.camera,
            transform: &target.transform,
            hit_radius: POINT_HIT_RADIUS * settings.resolution,
            size: self.size,
        };
        if let Some(event) = tool.handle(gesture, &mut ctx)
            && event.changes_strokes()
        {
            actions.push(EditorAction::StrokesChanged);
        }
    }

    fn apply_shortcuts(
        &mut self,
        settings: &Settings,
        target: Option<&mut EditTarget<'_>>,
        actions: &mut Vec<EditorAction>,
    ) {
        use ShortcutAction as A;

        if self.clicked(A::Cancel) {
            self.cancel();
        } else if self.clicked(A::StrokeButt) {
            self.set_kind(StrokeKind::Butt);
        } else if self.clicked(A::StrokeRound) {
            self.set_kind(StrokeKind::Round);
        } else if self.clicked(A::StrokePolygon) {
            self.set_kind(StrokeKind::Polygon);
        }

        if self.clicked(A::DecreaseSize) {
            self.size -= 1.0;
            self.clamp_size();
        } else if self.clicked(A::IncreaseSize) {
            self.size += 1.0;
            self.clamp_size();
        }

        let pan = PAN_SPEED * settings.move_speed;
        if self.pressed(A::MoveLeft) {
            self.camera.x_speed = -pan;
        } else if self.pressed(A::MoveRight) {
            self.camera.x_speed = pan;
        }
        if self.pressed(A::MoveUp) {
            self.camera.y_speed = -pan;
        } else if self.pressed(A::MoveDown) {
            self.camera.y_speed = pan;
        }
        let zoom = ZOOM_SPEED * settings.scale_speed;
        if self.pressed(A::ZoomOut) {
            self.camera.scale_speed = -zoom;
        } else if self.pressed(A::ZoomIn) {
            self.camera.scale_speed = zoom;
        }

        if self.clicked(A::ResetCamera) {
            self.camera.reset();
        } else if self.clicked(A::ToggleOpacity) {
            self.toggle_opacity();
        } else if self.clicked(A::Undo) && self.undo(target) {
            actions.push(EditorAction::StrokesChanged);
        }
    }

    fn clicked(&self, action: ShortcutAction) -> bool {
        self.keybinds.is_clicked(action, &self.input)
    }

    fn pressed(&self, action: ShortcutAction) -> bool {
        self.keybinds.is_pressed(action, &self.input)
    }

    fn apply_wheel(&mut self, settings: &Settings) {
        for wheel in self.input.take_wheel() {
            if wheel.ctrl || settings.trackpad {
                if (wheel.delta_y - self.last_wheel_dy).abs() > WHEEL_ZOOM_THRESHOLD {
                    self.camera.scale_speed = WHEEL_ZOOM * -wheel.delta_y;
                    self.last_wheel_dy = wheel.delta_y;
                }
            } else {
                self.size += -wheel.delta_y / (10.0 * self.camera.scale);
                self.clamp_size();
            }
        }
    }

    /// Ease the butt brush towards the direction of cursor travel.
    fn turn_brush(&mut self, cursor_image: Point) {
        let travel = cursor_image - self.cursor_image;
        if travel.hypot() <= BRUSH_ANGLE_MIN_TRAVEL {
            return;
        }
        let mut diff = travel.atan2() - self.brush_angle;
        while diff < -PI {
            diff += 2.0 * PI;
        }
        while diff > PI {
            diff -= 2.0 * PI;
        }
        self.brush_angle += diff * BRUSH_ANGLE_EASE;
    }

    fn clamp_size(&mut self) {
        let scale = self.camera.scale;
        self.size = self
            .size
            .clamp(MIN_STROKE_SIZE / scale, MAX_STROKE_SIZE / scale);
    }

    fn set_kind(&mut self, kind: StrokeKind) {
        self.kind = kind;
        match kind.cap() {
            Some(cap) => {
                self.capsule.cap = cap;
                self.polygon.reset();
            }
            None => self.capsule.reset(),
        }
    }

    /// Opacity steps 1 → 0.5 → 0 → 1.
    fn toggle_opacity(&mut self) {
        self.opacity -= 0.5;
        if self.opacity < 0.0 {
            self.opacity = 1.0;
        }
    }

    /// Pop the last pending point, else the last committed stroke.
    /// Returns `true` if a committed stroke was removed.
    fn undo(&mut self, target: Option<&mut EditTarget<'_>>) -> bool {
        if self.polygon.pop_point() {
            return false;
        }
        target.is_some_and(|t| t.strokes.pop().is_some())
    }

    /// Drop pending points and the capsule anchor. Confirmation keys that
    /// are still held must be released before they can fire again.
    pub fn cancel(&mut self) {
        self.capsule.reset();
        self.polygon.reset();
        let skip_held = self.pressed(ShortcutAction::SkipImage);
        let submit_held = self.pressed(ShortcutAction::SubmitImage);
        self.skip.disarm_if_held(skip_held);
        self.submit.disarm_if_held(submit_held);
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn stroke_kind(&self) -> StrokeKind {
        self.kind
    }

    pub fn stroke_size(&self) -> f64 {
        self.size
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Cursor in image pixels as of the last tick with an image.
    pub fn cursor_image(&self) -> Point {
        self.cursor_image
    }

    pub fn pending_points(&self) -> &[Point] {
        self.polygon.points()
    }

    pub fn anchor(&self) -> Option<Point> {
        self.capsule.anchor()
    }

    /// The in-progress stroke of the active tool.
    pub fn preview(&self) -> Preview<'_> {
        match self.kind {
            StrokeKind::Polygon => self.polygon.preview(self.cursor_image, self.size),
            StrokeKind::Butt | StrokeKind::Round => {
                self.capsule.preview(self.cursor_image, self.size)
            }
        }
    }

    /// Describe the next frame. `transform` is `None` while no image is ready.
    pub fn frame(&self, transform: Option<&ImageTransform>, settings: &Settings) -> Frame {
        let mut frame = Frame {
            image_rect: None,
            overlay_opacity: self.opacity,
            brush: None,
            markers: Vec::new(),
            marker_radius: POINT_MARKER_RADIUS * settings.resolution,
            flash: 0.0,
        };
        let Some(transform) = transform else {
            return frame;
        };

        frame.image_rect = Some(transform.editor_rect(&self.camera));
        frame.flash = self.submit.progress();

        let cursor = self.input.cursor();
        let half_width = (transform.width + transform.height)
            * (self.size / 2.0 * LINE_WIDTH_FACTOR)
            * self.camera.scale;
        match self.kind {
            StrokeKind::Butt if self.capsule.anchor().is_none() => {
                let angle = self.brush_angle + PI / 2.0;
                let offset = Vec2::from_angle(angle) * half_width;
                frame.brush = Some(Brush::Bar {
                    from: cursor + offset,
                    to: cursor - offset,
                    width: self.size * 0.25 * self.camera.scale,
                });
            }
            StrokeKind::Round if self.capsule.anchor().is_none() => {
                frame.brush = Some(Brush::Disc {
                    center: cursor,
                    radius: half_width,
                });
            }
            StrokeKind::Polygon => {
                frame.markers = self
                    .polygon
                    .points()
                    .iter()
                    .map(|p| transform.to_editor_space(*p, &self.camera))
                    .collect();
            }
            StrokeKind::Butt | StrokeKind::Round => {}
        }
        frame
    }
}
