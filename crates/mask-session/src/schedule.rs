//! Tick scheduling: one callback per frame, never overlapping.

use std::ops::ControlFlow;
use std::time::Duration;

use mask_core::FrameRate;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

/// What paces the ticks.
#[derive(Debug)]
pub enum FrameSource {
    Fixed { fps: u32 },
    /// One message per display refresh; the loop ends when the sender drops.
    DisplayRefresh(mpsc::Receiver<()>),
}

impl FrameSource {
    /// `Fixed` for a fixed rate; otherwise the caller's refresh signal.
    pub fn from_rate(rate: FrameRate, refresh: mpsc::Receiver<()>) -> Self {
        match rate {
            FrameRate::Fixed(fps) => Self::Fixed { fps },
            FrameRate::DisplayRefresh => Self::DisplayRefresh(refresh),
        }
    }
}

pub struct TickLoop {
    source: FrameSource,
}

impl TickLoop {
    pub fn new(source: FrameSource) -> Self {
        Self { source }
    }

    /// Call `tick(dt_ms)` once per frame until it breaks or the refresh
    /// signal closes. The first tick sees `dt = 0`.
    pub async fn run(self, mut tick: impl FnMut(f64) -> ControlFlow<()>) {
        let mut last = Instant::now();
        let mut elapsed = move || {
            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f64() * 1000.0;
            last = now;
            dt
        };

        match self.source {
            FrameSource::Fixed { fps } => {
                let period = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    interval.tick().await;
                    if tick(elapsed()).is_break() {
                        break;
                    }
                }
            }
            FrameSource::DisplayRefresh(mut refresh) => {
                while refresh.recv().await.is_some() {
                    if tick(elapsed()).is_break() {
                        break;
                    }
                }
            }
        }
        log::debug!("tick loop ended");
    }
}
