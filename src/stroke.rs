//! The four strokes of the cycle and the single angle classifier.

use crate::color::Rgb;
use std::f64::consts::PI;

/// One full four-stroke cycle: two crank revolutions (720°)
pub const FULL_CYCLE: f64 = 4.0 * PI;

/// Degrees in one full cycle
pub const FULL_CYCLE_DEGREES: f64 = 720.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stroke {
    Intake,
    Compression,
    Power,
    Exhaust,
}

/// Static description of a stroke
#[derive(Debug, Clone, Copy)]
pub struct StrokeInfo {
    pub id: Stroke,
    pub title: &'static str,
    pub description: &'static str,
    pub color: Rgb,
    /// Glyph shown next to the title in the info panel
    pub icon: &'static str,
    /// Degrees, inclusive
    pub start_angle: f64,
    /// Degrees, exclusive
    pub end_angle: f64,
}

pub const STROKES: [StrokeInfo; 4] = [
    StrokeInfo {
        id: Stroke::Intake,
        title: "Intake",
        description: "The intake valve opens while the exhaust valve stays shut. The piston \
                      moves down, the pressure in the cylinder drops and the air/fuel mixture \
                      is drawn in.",
        color: Rgb::hex(0x3b82f6),
        icon: "≋",
        start_angle: 0.0,
        end_angle: 180.0,
    },
    StrokeInfo {
        id: Stroke::Compression,
        title: "Compression",
        description: "Both valves are closed. The piston moves up and squeezes the mixture, \
                      raising its temperature and pressure.",
        color: Rgb::hex(0xeab308),
        icon: "⇣",
        start_angle: 180.0,
        end_angle: 360.0,
    },
    StrokeInfo {
        id: Stroke::Power,
        title: "Power",
        description: "The spark plug ignites the compressed mixture. The hot, high-pressure \
                      gas drives the piston down hard, and the connecting rod turns the \
                      crankshaft to deliver work.",
        color: Rgb::hex(0xef4444),
        icon: "ϟ",
        start_angle: 360.0,
        end_angle: 540.0,
    },
    StrokeInfo {
        id: Stroke::Exhaust,
        title: "Exhaust",
        description: "The intake valve stays shut and the exhaust valve opens. The piston moves \
                      up and pushes the burnt gas out, ready for the next cycle.",
        color: Rgb::hex(0x64748b),
        icon: "☁",
        start_angle: 540.0,
        end_angle: 720.0,
    },
];

/// Wraps any angle into `[0, 4π)`; non-finite input becomes `0`
pub fn normalize(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let cycle = angle.rem_euclid(FULL_CYCLE);
    // rem_euclid can round up to the modulus for tiny negative inputs
    if cycle >= FULL_CYCLE {
        0.0
    } else {
        cycle
    }
}

/// Normalized cycle position in degrees, `[0, 720)`
pub fn cycle_degrees(angle: f64) -> f64 {
    normalize(angle).to_degrees()
}

impl Stroke {
    pub const ALL: [Stroke; 4] = [
        Stroke::Intake,
        Stroke::Compression,
        Stroke::Power,
        Stroke::Exhaust,
    ];

    /// Classifies a crank angle (radians, any range) into its stroke
    pub fn from_angle(angle: f64) -> Stroke {
        Stroke::from_degrees(cycle_degrees(angle))
    }

    /// Classifies normalized degrees in `[0, 720)`
    fn from_degrees(degrees: f64) -> Stroke {
        STROKES
            .iter()
            .find(|s| degrees >= s.start_angle && degrees < s.end_angle)
            .map(|s| s.id)
            // only reachable if to_degrees rounds a value just under 4π up to 720
            .unwrap_or(Stroke::Exhaust)
    }

    pub fn info(self) -> &'static StrokeInfo {
        &STROKES[self.index()]
    }

    pub fn index(self) -> usize {
        match self {
            Stroke::Intake => 0,
            Stroke::Compression => 1,
            Stroke::Power => 2,
            Stroke::Exhaust => 3,
        }
    }

    /// Start of the stroke's band in radians
    pub fn start_radians(self) -> f64 {
        self.info().start_angle.to_radians()
    }

    /// Fractional progress through this stroke's band, `[0, 1)`
    pub fn progress(self, angle: f64) -> f64 {
        let info = self.info();
        (cycle_degrees(angle) - info.start_angle) / (info.end_angle - info.start_angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn deg(d: f64) -> f64 {
        d.to_radians()
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(Stroke::from_angle(deg(0.0)), Stroke::Intake);
        assert_eq!(Stroke::from_angle(deg(179.9)), Stroke::Intake);
        assert_eq!(Stroke::from_angle(deg(180.0)), Stroke::Compression);
        assert_eq!(Stroke::from_angle(deg(359.9)), Stroke::Compression);
        assert_eq!(Stroke::from_angle(deg(360.0)), Stroke::Power);
        assert_eq!(Stroke::from_angle(deg(540.0)), Stroke::Exhaust);
        assert_eq!(Stroke::from_angle(deg(719.9)), Stroke::Exhaust);
        assert_eq!(Stroke::from_angle(deg(720.0)), Stroke::Intake);
    }

    #[test]
    fn test_negative_angles_wrap() {
        assert_eq!(Stroke::from_angle(deg(-90.0)), Stroke::Exhaust);
        assert_abs_diff_eq!(cycle_degrees(deg(-90.0)), 630.0, epsilon = 1e-9);
        assert_abs_diff_eq!(normalize(-FULL_CYCLE), 0.0);
    }

    #[test]
    fn test_non_finite_falls_back_to_zero() {
        assert_eq!(normalize(f64::NAN), 0.0);
        assert_eq!(normalize(f64::INFINITY), 0.0);
        assert_eq!(Stroke::from_angle(f64::NEG_INFINITY), Stroke::Intake);
    }

    #[test]
    fn test_tiny_negative_stays_in_range() {
        let n = normalize(-1e-18);
        assert!((0.0..FULL_CYCLE).contains(&n));
    }

    #[test]
    fn test_table_is_contiguous() {
        assert_eq!(STROKES[0].start_angle, 0.0);
        for pair in STROKES.windows(2) {
            assert_eq!(pair[0].end_angle, pair[1].start_angle);
        }
        assert_eq!(STROKES[3].end_angle, FULL_CYCLE_DEGREES);
        for (i, s) in Stroke::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
            assert_eq!(s.info().id, *s);
        }
    }

    #[test]
    fn test_progress() {
        assert_abs_diff_eq!(Stroke::Compression.progress(deg(270.0)), 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(Stroke::Power.progress(deg(360.0)), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(Stroke::Exhaust.start_radians(), 3.0 * PI, epsilon = 1e-12);
    }
}
