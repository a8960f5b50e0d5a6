//! User settings consumed by the editor as a read-only snapshot.

use serde::{Deserialize, Serialize};

/// How the tick loop is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRate {
    /// Driven by the display's refresh signal.
    DisplayRefresh,
    /// Fixed number of ticks per second.
    Fixed(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Author tag attached to submissions.
    pub username: String,
    /// Ticks per second; `0` follows the display refresh.
    pub fps: u32,
    /// Device pixels per CSS pixel.
    pub resolution: f64,
    /// Read-ahead depth requested from drivers.
    pub preload: usize,
    pub move_speed: f64,
    pub scale_speed: f64,
    /// Treat every wheel event as zoom.
    pub trackpad: bool,
    /// Height reserved for the navbar, in CSS pixels.
    pub chrome_offset_px: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            username: "unknown".to_string(),
            fps: 0,
            resolution: 1.0,
            preload: 5,
            move_speed: 1.0,
            scale_speed: 1.0,
            trackpad: false,
            chrome_offset_px: 56.0,
        }
    }
}

impl Settings {
    pub fn frame_rate(&self) -> FrameRate {
        match self.fps {
            0 => FrameRate::DisplayRefresh,
            fps => FrameRate::Fixed(fps),
        }
    }

    /// Chrome offset in device pixels.
    pub fn chrome_offset(&self) -> f64 {
        self.chrome_offset_px * self.resolution
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
