//! Command line arguments and the validated startup configuration.

use crate::error::EngineError;
use crate::state::{AppState, PlaybackState, Speed};
use crate::stroke::FULL_CYCLE_DEGREES;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Interactive four-stroke engine cycle visualizer")]
pub struct Args {
    /// Starting crank angle in degrees (0-720)
    #[arg(long, default_value_t = 0.0)]
    pub angle: f64,
    /// Playback speed multiplier: 0.5, 1 or 2
    #[arg(long, default_value_t = 1.0)]
    pub speed: f64,
    /// Start paused
    #[arg(long)]
    pub paused: bool,
    /// Target frames per second; the crank advances once per frame
    #[arg(long, default_value_t = 60)]
    pub fps: u32,
    /// Start in wireframe mode
    #[arg(long)]
    pub wireframe: bool,
    /// Show the debug overlay
    #[arg(long)]
    pub debug: bool,
    /// Print a single frame at --angle to stdout and exit
    #[arg(long)]
    pub snapshot: bool,
    /// Write logs to this file (the terminal is taken by the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// Log filter, e.g. "info" or "fourstroke=debug"
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Validated startup settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Starting angle, degrees
    pub angle: f64,
    pub speed: Speed,
    pub paused: bool,
    pub fps: u32,
    pub wireframe: bool,
    pub debug: bool,
    pub snapshot: bool,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
}

impl TryFrom<Args> for Config {
    type Error = EngineError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let speed =
            Speed::from_multiplier(args.speed).ok_or(EngineError::UnsupportedSpeed(args.speed))?;
        if args.fps == 0 {
            return Err(EngineError::InvalidFrameRate(args.fps));
        }
        if !args.angle.is_finite() || !(0.0..=FULL_CYCLE_DEGREES).contains(&args.angle) {
            return Err(EngineError::InvalidAngle(args.angle));
        }
        Ok(Config {
            angle: args.angle,
            speed,
            paused: args.paused,
            fps: args.fps,
            wireframe: args.wireframe,
            debug: args.debug,
            snapshot: args.snapshot,
            log_file: args.log_file,
            log_level: args.log_level,
        })
    }
}

impl Config {
    /// Initial application state for this configuration
    pub fn initial_state(&self) -> AppState {
        AppState {
            playback: PlaybackState {
                angle: self.angle.to_radians(),
                is_playing: !self.paused,
                speed: self.speed,
            },
            debug: self.debug,
            wireframe: self.wireframe,
            ..AppState::default()
        }
    }
}
