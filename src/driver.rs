//! Frame-driven animation: advances the crank once per rendered frame.

use crate::state::AppState;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Crank advance per frame at 1x, radians.
///
/// The advance is per frame, not per second, so the rotation rate follows the
/// frame rate set by the [`FramePacer`].
pub const BASE_INCREMENT: f64 = 0.05;

/// Advances the playback angle on each tick while started and playing
#[derive(Debug, Default)]
pub struct AnimationDriver {
    running: bool,
    ticks: u64,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        if !self.running {
            debug!("animation driver started");
        }
        self.running = true;
    }

    /// Stop scheduling; later ticks leave the state untouched
    pub fn stop(&mut self) {
        if self.running {
            debug!(ticks = self.ticks, "animation driver stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Called once per frame. Returns `true` if the angle moved.
    pub fn tick(&mut self, state: &mut AppState) -> bool {
        if !self.running {
            return false;
        }
        self.ticks += 1;
        if !state.playback.is_playing {
            return false;
        }
        let increment = BASE_INCREMENT * state.playback.speed.multiplier();
        state.advance(increment);
        trace!(angle = state.playback.angle, "tick");
        true
    }
}

/// Sleeps out the rest of each frame period
#[derive(Debug)]
pub struct FramePacer {
    period: Duration,
    last_present: Instant,
}

impl FramePacer {
    pub fn new(fps: u32) -> Self {
        FramePacer {
            period: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            last_present: Instant::now(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left in the current frame
    pub fn remaining(&self) -> Duration {
        self.period.saturating_sub(self.last_present.elapsed())
    }

    pub fn wait(&mut self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
        self.last_present = Instant::now();
    }
}

/// Frames per second averaged over roughly one-second windows
#[derive(Debug)]
pub struct FpsCounter {
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl Default for FpsCounter {
    fn default() -> Self {
        FpsCounter {
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        }
    }
}

impl FpsCounter {
    pub fn frame(&mut self) {
        self.frame_at(Instant::now());
    }

    fn frame_at(&mut self, now: Instant) {
        self.frames_since_last_update += 1;
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }
}
