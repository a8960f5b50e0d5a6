//! Integration tests: raw input events driven through the editor tick
//! (mask-editor).
//!
//! Exercises the full path from window events to committed strokes,
//! undo, and long-press actions, the way a host loop would.

use mask_core::{ImageTransform, Point, Settings, Size, Stroke, StrokeCap, StrokeKind};
use mask_editor::{EditTarget, Editor, EditorAction, FocusTarget, InputEvent, MouseButton};
use pretty_assertions::assert_eq;

const TICK_MS: f64 = 16.0;

struct Host {
    editor: Editor,
    settings: Settings,
    strokes: Vec<Stroke>,
    transform: ImageTransform,
    generation: u64,
}

impl Host {
    fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            editor: Editor::default(),
            settings: Settings::default(),
            strokes: Vec::new(),
            // 900×900 image shown 1:1, offset by 50 px.
            transform: ImageTransform::fit(
                Size::new(1000.0, 1000.0),
                Size::new(900.0, 900.0),
                0.0,
            ),
            generation: 1,
        }
    }

    fn send(&mut self, event: InputEvent) {
        self.editor.handle_event(&event, &self.settings);
    }

    fn tick(&mut self) -> Vec<EditorAction> {
        let target = EditTarget {
            generation: self.generation,
            transform: self.transform,
            strokes: &mut self.strokes,
        };
        self.editor.tick(TICK_MS, &self.settings, Some(target))
    }

    /// Move to an image-space point.
    fn move_to(&mut self, image: Point) {
        let editor = self.transform.to_editor_space(image, self.editor.camera());
        self.send(InputEvent::MouseMove {
            x: editor.x,
            y: editor.y,
        });
    }

    fn click(&mut self, button: MouseButton, image: Point) -> Vec<EditorAction> {
        self.move_to(image);
        self.send(InputEvent::MouseDown { button });
        let mut actions = self.tick();
        self.send(InputEvent::MouseUp { button });
        actions.extend(self.tick());
        actions
    }

    fn tap(&mut self, key: &str) -> Vec<EditorAction> {
        self.send(InputEvent::KeyDown {
            key: key.to_string(),
            target: FocusTarget::Body,
        });
        let actions = self.tick();
        self.send(InputEvent::KeyUp {
            key: key.to_string(),
        });
        actions
    }
}

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

// ─── Capsules ───────────────────────────────────────────────────────────

#[test]
fn drag_commits_butt_capsule() {
    let mut host = Host::new();
    host.tick();

    host.move_to(p(100.0, 100.0));
    host.send(InputEvent::MouseDown {
        button: MouseButton::Left,
    });
    host.tick();
    host.move_to(p(300.0, 200.0));
    host.tick();
    host.send(InputEvent::MouseUp {
        button: MouseButton::Left,
    });
    let actions = host.tick();

    assert_eq!(actions, vec![EditorAction::StrokesChanged]);
    assert_eq!(host.strokes.len(), 1);
    let Stroke::Line { cap, size, p1, p2 } = host.strokes[0] else {
        panic!("expected a line stroke");
    };
    assert_eq!(cap, StrokeCap::Butt);
    assert_eq!(size, 2.0);
    assert!((p1 - p(100.0, 100.0)).hypot() < 1e-9);
    assert!((p2 - p(300.0, 200.0)).hypot() < 1e-9);
}

#[test]
fn right_click_chains_round_capsules() {
    let mut host = Host::new();
    host.tap("2");
    host.move_to(p(10.0, 10.0));
    host.send(InputEvent::MouseDown {
        button: MouseButton::Left,
    });
    host.tick();
    host.move_to(p(50.0, 10.0));
    host.send(InputEvent::MouseUp {
        button: MouseButton::Left,
    });
    host.tick();

    host.click(MouseButton::Right, p(50.0, 80.0));
    assert_eq!(host.strokes.len(), 2);
    assert_eq!(host.strokes[1].kind(), StrokeKind::Round);
    let Stroke::Line { p1, .. } = host.strokes[1] else {
        panic!("expected a line stroke");
    };
    assert!((p1 - p(50.0, 10.0)).hypot() < 1e-9);
}

#[test]
fn escape_drops_anchor() {
    let mut host = Host::new();
    host.move_to(p(10.0, 10.0));
    host.send(InputEvent::MouseDown {
        button: MouseButton::Left,
    });
    host.tick();
    assert!(host.editor.anchor().is_some());

    host.tap("Escape");
    host.send(InputEvent::MouseUp {
        button: MouseButton::Left,
    });
    host.tick();
    assert!(host.strokes.is_empty());
}

// ─── Polygons and undo ──────────────────────────────────────────────────

#[test]
fn polygon_commit_requires_three_points() {
    let mut host = Host::new();
    host.tap("3");
    host.click(MouseButton::Left, p(10.0, 10.0));
    host.click(MouseButton::Left, p(200.0, 10.0));
    host.click(MouseButton::Right, p(0.0, 0.0));
    assert!(host.strokes.is_empty());
    assert!(host.editor.pending_points().is_empty());

    host.click(MouseButton::Left, p(10.0, 10.0));
    host.click(MouseButton::Left, p(200.0, 10.0));
    host.click(MouseButton::Left, p(10.0, 200.0));
    let actions = host.click(MouseButton::Right, p(0.0, 0.0));
    assert_eq!(actions, vec![EditorAction::StrokesChanged]);
    assert_eq!(host.strokes.len(), 1);
    assert_eq!(host.strokes[0].kind(), StrokeKind::Polygon);
}

#[test]
fn undo_removes_pending_point_before_strokes() {
    let mut host = Host::new();
    for i in 0..3 {
        let y = 20.0 + 40.0 * f64::from(i);
        host.move_to(p(10.0, y));
        host.send(InputEvent::MouseDown {
            button: MouseButton::Left,
        });
        host.tick();
        host.move_to(p(100.0, y));
        host.send(InputEvent::MouseUp {
            button: MouseButton::Left,
        });
        host.tick();
    }
    assert_eq!(host.strokes.len(), 3);

    host.tap("3");
    host.click(MouseButton::Left, p(400.0, 400.0));
    host.click(MouseButton::Left, p(500.0, 400.0));
    assert_eq!(host.editor.pending_points().len(), 2);

    assert!(host.tap("x").is_empty());
    assert_eq!(host.editor.pending_points().len(), 1);
    assert_eq!(host.strokes.len(), 3);

    host.tap("x");
    assert!(host.editor.pending_points().is_empty());
    assert_eq!(host.strokes.len(), 3);

    assert_eq!(host.tap("x"), vec![EditorAction::StrokesChanged]);
    assert_eq!(host.strokes.len(), 2);
}

// ─── Long-press actions ─────────────────────────────────────────────────

#[test]
fn holding_submit_fires_once() {
    let mut host = Host::new();
    host.send(InputEvent::KeyDown {
        key: "c".to_string(),
        target: FocusTarget::Body,
    });

    let mut submits = 0;
    for _ in 0..200 {
        submits += host
            .tick()
            .iter()
            .filter(|a| **a == EditorAction::SubmitImage)
            .count();
    }
    assert_eq!(submits, 1);

    host.send(InputEvent::KeyUp {
        key: "c".to_string(),
    });
    host.tick();
    let mut again = 0;
    host.send(InputEvent::KeyDown {
        key: "c".to_string(),
        target: FocusTarget::Body,
    });
    for _ in 0..30 {
        again += host
            .tick()
            .iter()
            .filter(|a| **a == EditorAction::SubmitImage)
            .count();
    }
    assert_eq!(again, 1);
}

#[test]
fn short_tap_does_not_skip() {
    let mut host = Host::new();
    for _ in 0..10 {
        assert!(host.tap("z").is_empty());
    }
}

#[test]
fn new_image_keeps_held_confirmation_disarmed() {
    let mut host = Host::new();
    host.send(InputEvent::KeyDown {
        key: "z".to_string(),
        target: FocusTarget::Body,
    });
    let fired: usize = (0..30)
        .map(|_| host.tick().contains(&EditorAction::SkipImage) as usize)
        .sum();
    assert_eq!(fired, 1);

    // The next image arrives while z is still down.
    host.generation += 1;
    let fired: usize = (0..100)
        .map(|_| host.tick().contains(&EditorAction::SkipImage) as usize)
        .sum();
    assert_eq!(fired, 0);
}
