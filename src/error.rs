//! Error types for the visualizer.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while configuring or running the visualizer.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Terminal I/O failed.
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    /// Playback speed is not one of the supported multipliers.
    #[error("unsupported speed: {0} (expected 0.5, 1 or 2)")]
    UnsupportedSpeed(f64),

    /// Frame rate must be positive.
    #[error("invalid frame rate: {0} (must be > 0)")]
    InvalidFrameRate(u32),

    /// Starting angle outside the slider range.
    #[error("invalid crank angle: {0}° (must be within 0..=720)")]
    InvalidAngle(f64),

    /// Log file could not be created.
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for visualizer operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::UnsupportedSpeed(3.0);
        assert_eq!(format!("{err}"), "unsupported speed: 3 (expected 0.5, 1 or 2)");

        let err = EngineError::InvalidFrameRate(0);
        assert!(format!("{err}").contains("must be > 0"));

        let err = EngineError::InvalidAngle(800.0);
        assert!(format!("{err}").contains("800"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err: EngineError = io.into();
        assert!(matches!(err, EngineError::Terminal(_)));
        assert!(format!("{err}").contains("boom"));
    }
}
