//! Integration tests: camera integration and editor ↔ image coordinates.

use mask_core::camera::{MAX_SCALE, MIN_SCALE};
use mask_core::{Camera, ImageTransform, Point, Size};
use proptest::prelude::*;

fn camera(x: f64, y: f64, scale: f64) -> Camera {
    Camera {
        x,
        y,
        scale,
        ..Camera::default()
    }
}

fn any_camera() -> impl Strategy<Value = Camera> {
    (-2000.0f64..2000.0, -2000.0f64..2000.0, 0.05f64..40.0).prop_map(|(x, y, s)| camera(x, y, s))
}

fn any_transform() -> impl Strategy<Value = ImageTransform> {
    (
        320.0f64..3840.0,
        240.0f64..2160.0,
        16.0f64..8000.0,
        16.0f64..8000.0,
        0.0f64..120.0,
    )
        .prop_map(|(vw, vh, iw, ih, offset)| {
            ImageTransform::fit(Size::new(vw, vh), Size::new(iw, ih), offset)
        })
}

// ─── Round trips ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn image_point_survives_round_trip(
        camera in any_camera(),
        transform in any_transform(),
        x in -500.0f64..9000.0,
        y in -500.0f64..9000.0,
    ) {
        let p = Point::new(x, y);
        let back = transform.to_image_space(transform.to_editor_space(p, &camera), &camera);
        let tolerance = 1e-6 * (1.0 + x.abs().max(y.abs()));
        prop_assert!(
            (back - p).hypot() < tolerance,
            "{:?} came back as {:?} (camera {:?})", p, back, camera
        );
    }

    #[test]
    fn fitted_image_corners_match_editor_rect(
        camera in any_camera(),
        transform in any_transform(),
    ) {
        let rect = transform.editor_rect(&camera);
        let image_w = transform.width / transform.width_scale;
        let image_h = transform.height / transform.height_scale;

        let top_left = transform.to_editor_space(Point::ZERO, &camera);
        let bottom_right = transform.to_editor_space(Point::new(image_w, image_h), &camera);
        prop_assert!((top_left - Point::new(rect.x0, rect.y0)).hypot() < 1e-6);
        prop_assert!((bottom_right - Point::new(rect.x1, rect.y1)).hypot() < 1e-6);
    }
}

// ─── Camera ──────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn scale_stays_clamped_under_any_zoom(
        steps in prop::collection::vec(
            (-1.0f64..1.0, 0.0f64..250.0, 0.0f64..1920.0, 0.0f64..1080.0),
            1..200,
        ),
    ) {
        let mut camera = Camera::default();
        for (speed, dt, cx, cy) in steps {
            camera.scale_speed = speed;
            camera.update(dt, Point::new(cx, cy), 1.0);
            prop_assert!(camera.scale >= MIN_SCALE && camera.scale <= MAX_SCALE);
        }
    }

    #[test]
    fn zoom_keeps_cursor_point_fixed(
        x in -2000.0f64..2000.0,
        y in -2000.0f64..2000.0,
        scale in 0.5f64..10.0,
        scale_speed in -0.004f64..0.004,
        cx in 0.0f64..1920.0,
        cy in 0.0f64..1080.0,
    ) {
        let mut camera = Camera {
            scale_speed,
            ..camera(x, y, scale)
        };
        let cursor = Point::new(cx, cy);

        let world = camera.screen_to_world(cursor);
        camera.update(16.0, cursor, 1.0);
        let screen = camera.world_to_screen(world);
        prop_assert!(
            (screen - cursor).hypot() < 1e-6,
            "cursor {:?} drifted to {:?}", cursor, screen
        );
    }
}

#[test]
fn velocities_decay_towards_rest() {
    let mut camera = Camera {
        x_speed: 2.5,
        y_speed: -2.5,
        scale_speed: 0.005,
        ..Camera::default()
    };
    for _ in 0..2000 {
        camera.update(16.0, Point::ZERO, 1.0);
    }
    assert!(camera.x_speed.abs() < 1e-9);
    assert!(camera.y_speed.abs() < 1e-9);
    assert!(camera.scale_speed.abs() < 1e-9);
}
