use crate::camera::OrbitCamera;
use crate::part::Part;
use crate::stroke::{cycle_degrees, Stroke, FULL_CYCLE_DEGREES};
use tracing::{debug, info};

/// Supported playback multipliers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Speed {
    Half,
    #[default]
    Normal,
    Double,
}

impl Speed {
    pub const ALL: [Speed; 3] = [Speed::Half, Speed::Normal, Speed::Double];

    pub fn multiplier(self) -> f64 {
        match self {
            Speed::Half => 0.5,
            Speed::Normal => 1.0,
            Speed::Double => 2.0,
        }
    }

    pub fn from_multiplier(value: f64) -> Option<Speed> {
        Speed::ALL.into_iter().find(|s| s.multiplier() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            Speed::Half => "0.5x",
            Speed::Normal => "1x",
            Speed::Double => "2x",
        }
    }

    pub fn faster(self) -> Speed {
        match self {
            Speed::Half => Speed::Normal,
            _ => Speed::Double,
        }
    }

    pub fn slower(self) -> Speed {
        match self {
            Speed::Double => Speed::Normal,
            _ => Speed::Half,
        }
    }
}

/// Crank angle and play state. Mutated only through the setters below.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    /// Radians since the epoch; not wrapped
    pub angle: f64,
    pub is_playing: bool,
    pub speed: Speed,
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState {
            angle: 0.0,
            is_playing: true,
            speed: Speed::Normal,
        }
    }
}

/// Application state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub playback: PlaybackState,
    /// Part under the pointer, if any
    pub hovered: Option<Part>,
    pub camera: OrbitCamera,
    /// Enable debug overlay
    pub debug: bool,
    /// Wireframe mode enabled
    pub wireframe: bool,
}

impl AppState {
    pub fn stroke(&self) -> Stroke {
        Stroke::from_angle(self.playback.angle)
    }

    /// Crank angle as the slider shows it, whole degrees in `0..=720`
    pub fn slider_degrees(&self) -> u32 {
        cycle_degrees(self.playback.angle).round() as u32
    }

    pub fn toggle_play(&mut self) {
        self.playback.is_playing = !self.playback.is_playing;
        info!(playing = self.playback.is_playing, "toggled playback");
    }

    pub fn set_speed(&mut self, speed: Speed) {
        if self.playback.speed != speed {
            info!(speed = speed.multiplier(), "speed changed");
        }
        self.playback.speed = speed;
    }

    /// Scrubbing: jump to `degrees` (clamped to the slider range) and pause
    pub fn seek_degrees(&mut self, degrees: f64) {
        let degrees = if degrees.is_finite() {
            degrees.round().clamp(0.0, FULL_CYCLE_DEGREES)
        } else {
            0.0
        };
        self.playback.angle = degrees.to_radians();
        self.playback.is_playing = false;
        debug!(degrees, "seek");
    }

    /// Step the slider by whole degrees from its displayed value
    pub fn nudge_degrees(&mut self, delta: i32) {
        let current = self.slider_degrees() as f64;
        self.seek_degrees(current + delta as f64);
    }

    /// Jump to the start of `stroke` and pause
    pub fn select_stroke(&mut self, stroke: Stroke) {
        self.playback.angle = stroke.start_radians();
        self.playback.is_playing = false;
        info!(?stroke, "jumped to stroke");
    }

    pub fn reset(&mut self) {
        self.playback.angle = 0.0;
        self.playback.is_playing = false;
        info!("reset cycle");
    }

    /// Advance the crank by `delta` radians
    pub fn advance(&mut self, delta: f64) {
        self.playback.angle += delta;
    }

    /// Last hover event wins; `None` clears
    pub fn set_hovered(&mut self, part: Option<Part>) {
        if self.hovered != part {
            debug!(part = part.map(Part::id), "hover changed");
            self.hovered = part;
        }
    }

    pub fn toggle_debug(&mut self) {
        self.debug = !self.debug;
    }

    pub fn toggle_wireframe(&mut self) {
        self.wireframe = !self.wireframe;
    }
}
