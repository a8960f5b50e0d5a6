//! Long-press confirmation for destructive actions.

/// Progress gained per millisecond while the key is held.
pub const CONFIRM_RATE: f64 = 0.003;

/// Progress value after firing; blocks re-triggering until the key is released.
const SPENT: f64 = -1.0;

/// Accumulates while a key is held and fires once when it crosses 1.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HoldConfirm {
    progress: f64,
}

impl HoldConfirm {
    /// Advance by `dt` milliseconds. Returns `true` on the tick the threshold
    /// is crossed.
    pub fn update(&mut self, held: bool, dt: f64) -> bool {
        if !held {
            self.progress = 0.0;
            return false;
        }
        if self.progress < 0.0 {
            return false;
        }
        self.progress += CONFIRM_RATE * dt;
        if self.progress > 1.0 {
            self.progress = SPENT;
            return true;
        }
        false
    }

    /// Block the confirmation until the key is released, if it is held now.
    pub fn disarm_if_held(&mut self, held: bool) {
        if held {
            self.progress = SPENT;
        }
    }

    /// Progress in `[0, 1]`, for the confirmation flash.
    pub fn progress(&self) -> f64 {
        self.progress.clamp(0.0, 1.0)
    }
}
