//! Pan/zoom camera with velocity integration.
//!
//! The camera is driven purely by its velocity fields. Input handling sets
//! `x_speed`, `y_speed` and `scale_speed`; [`Camera::update`] integrates them
//! once per tick and lets them decay geometrically.
//!
//! `x` / `y` are the world-space coordinates of the viewport's top-left
//! corner; `scale` is editor pixels per world unit.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Upper zoom bound.
pub const MAX_SCALE: f64 = 500.0;

/// Lower zoom bound. Keeps `scale` strictly positive for any velocity.
pub const MIN_SCALE: f64 = 0.001;

/// Per-millisecond velocity decay factor.
pub const DAMPING: f64 = 0.99;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub x_speed: f64,
    pub y_speed: f64,
    pub scale_speed: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            x_speed: 0.0,
            y_speed: 0.0,
            scale_speed: 0.0,
        }
    }
}

impl Camera {
    /// Back to the identity view with no motion.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Integrate one tick of `dt` milliseconds.
    ///
    /// `cursor` is the pointer position in editor pixels; zoom keeps the
    /// world point under it fixed. `resolution` scales panning so the
    /// on-screen pan speed does not depend on zoom or pixel density.
    ///
    /// Order matters: scale, then re-center on the cursor, then pan, then decay.
    pub fn update(&mut self, dt: f64, cursor: Point, resolution: f64) {
        let old_x = self.x;
        let old_y = self.y;
        let old_scale = self.scale;

        self.scale *= 1.0 + self.scale_speed * dt;
        self.scale = self.scale.clamp(MIN_SCALE, MAX_SCALE);

        let center_x = old_x + cursor.x / old_scale;
        let center_y = old_y + cursor.y / old_scale;
        let scale_change = self.scale / old_scale;

        self.x = center_x + (old_x - center_x) / scale_change;
        self.y = center_y + (old_y - center_y) / scale_change;
        self.x += (self.x_speed * dt / self.scale) * resolution;
        self.y += (self.y_speed * dt / self.scale) * resolution;

        let decay = DAMPING.powf(dt);
        self.x_speed *= decay;
        self.y_speed *= decay;
        self.scale_speed *= decay;
    }

    /// Editor pixels → world coordinates.
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(self.x + screen.x / self.scale, self.y + screen.y / self.scale)
    }

    /// World coordinates → editor pixels.
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new((world.x - self.x) * self.scale, (world.y - self.y) * self.scale)
    }
}
