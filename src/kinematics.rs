//! Kinematic model: crank angle to piston, rod, valve and chamber state.
//!
//! Everything here is a pure function of the crank angle. Only `angle mod 4π`
//! matters, so `EngineFrame::at(a) == EngineFrame::at(a + 4π·k)`.

use crate::color::Rgb;
use crate::stroke::{normalize, Stroke};
use std::f64::consts::PI;

/// Crank throw radius (r). Twice this is the stroke length.
pub const CRANK_RADIUS: f64 = 1.5;
/// Connecting rod length (l), center to center
pub const ROD_LENGTH: f64 = 5.5;
/// Maximum valve lift
pub const VALVE_TRAVEL: f64 = 0.4;
pub const PISTON_HEIGHT: f64 = 1.5;
pub const PISTON_RADIUS: f64 = 1.8;
pub const CYLINDER_HEIGHT: f64 = 8.5;
pub const CYLINDER_RADIUS: f64 = 2.0;
/// Horizontal distance of each valve from the bore axis
pub const VALVE_OFFSET: f64 = 0.8;
/// Underside of the combustion chamber roof
pub const HEAD_Y: f64 = 7.5;
/// Half-width of the ignition window around top dead center of compression
pub const SPARK_WINDOW: f64 = 0.15;
/// Thinnest gas column drawn when the piston is at the top
pub const MIN_GAS_HEIGHT: f64 = 0.1;
/// Fraction of the power stroke spent in the initial flash
pub const FLASH_FRACTION: f64 = 0.15;

// sqrt(l^2 - r^2 sin^2) stays real only while the rod outreaches the crank
const _: () = assert!(ROD_LENGTH > CRANK_RADIUS);

/// Visual state of the gas in the combustion chamber
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasVisual {
    pub color: Rgb,
    pub emissive: Rgb,
    pub emissive_intensity: f64,
    pub opacity: f64,
}

/// Everything the renderer and the info panel need for one crank angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineFrame {
    /// Crank angle wrapped into `[0, 4π)`
    pub cycle_angle: f64,
    pub stroke: Stroke,
    /// Crankshaft rotation; one cycle is two turns
    pub crank_rotation: f64,
    /// Height of the piston pin above the crank axis
    pub piston_y: f64,
    /// Connecting rod obliquity from vertical
    pub rod_angle: f64,
    pub intake_lift: f64,
    pub exhaust_lift: f64,
    pub spark: bool,
    pub gas: GasVisual,
    /// Top face of the piston
    pub piston_top: f64,
    pub gas_height: f64,
    pub gas_center: f64,
    /// Crank pin center in the crank plane, `(x, y)` relative to the crank axis
    pub crank_pin: [f64; 2],
}

impl EngineFrame {
    /// Evaluates the mechanism at `angle` radians. Non-finite input is treated as `0`.
    pub fn at(angle: f64) -> Self {
        let cycle_angle = normalize(angle);
        let stroke = Stroke::from_angle(cycle_angle);

        let piston_y = piston_position(cycle_angle);
        let piston_top = piston_y + PISTON_HEIGHT / 2.0;
        let gas_height = (HEAD_Y - piston_top).max(MIN_GAS_HEIGHT);
        let spark = is_sparking(cycle_angle);

        let (sin_a, cos_a) = cycle_angle.sin_cos();

        EngineFrame {
            cycle_angle,
            stroke,
            crank_rotation: cycle_angle,
            piston_y,
            rod_angle: rod_angle(cycle_angle),
            intake_lift: intake_lift(cycle_angle),
            exhaust_lift: exhaust_lift(cycle_angle),
            spark,
            gas: gas_visual(cycle_angle, stroke, spark),
            piston_top,
            gas_height,
            gas_center: piston_top + gas_height / 2.0,
            crank_pin: [CRANK_RADIUS * sin_a, CRANK_RADIUS * cos_a],
        }
    }

    pub fn intake_open(&self) -> bool {
        self.cycle_angle < PI
    }

    pub fn exhaust_open(&self) -> bool {
        self.cycle_angle > 3.0 * PI
    }
}

/// Slider-crank displacement: r·cos(a) + sqrt(l² − r²·sin²(a))
pub fn piston_position(cycle_angle: f64) -> f64 {
    let r = CRANK_RADIUS;
    let l = ROD_LENGTH;
    let (sin_a, cos_a) = cycle_angle.sin_cos();
    // clamp guards against a -0.0ulp term, never a real negative
    let term = (l * l - r * r * sin_a * sin_a).max(0.0);
    r * cos_a + term.sqrt()
}

pub fn rod_angle(cycle_angle: f64) -> f64 {
    (CRANK_RADIUS * cycle_angle.sin() / ROD_LENGTH).asin()
}

/// Open on `[0, π)`, closed elsewhere
pub fn intake_lift(cycle_angle: f64) -> f64 {
    if (0.0..PI).contains(&cycle_angle) {
        VALVE_TRAVEL * cycle_angle.sin()
    } else {
        0.0
    }
}

/// Open on `(3π, 4π)`, closed elsewhere
pub fn exhaust_lift(cycle_angle: f64) -> f64 {
    if cycle_angle > 3.0 * PI && cycle_angle < 4.0 * PI {
        VALVE_TRAVEL * (cycle_angle - 3.0 * PI).sin()
    } else {
        0.0
    }
}

pub fn is_sparking(cycle_angle: f64) -> bool {
    (cycle_angle - 2.0 * PI).abs() < SPARK_WINDOW
}

/// Chamber gas color for the given stroke; the spark flash overrides all strokes
pub fn gas_visual(cycle_angle: f64, stroke: Stroke, spark: bool) -> GasVisual {
    if spark {
        let flash = Rgb::hex(0xfff700);
        return GasVisual {
            color: flash,
            emissive: flash,
            emissive_intensity: 5.0,
            opacity: 1.0,
        };
    }

    match stroke {
        Stroke::Intake => GasVisual {
            color: Rgb::hex(0x0ea5e9),
            emissive: Rgb::BLACK,
            emissive_intensity: 0.0,
            opacity: 0.3,
        },
        Stroke::Compression => {
            // heating up as the mixture is squeezed
            let t = (cycle_angle - PI) / PI;
            GasVisual {
                color: Rgb::hex(0x38bdf8).lerp(Rgb::hex(0xf59e0b), t),
                emissive: Rgb::hex(0xf59e0b),
                emissive_intensity: 0.5 * t,
                opacity: 0.4 + 0.4 * t,
            }
        }
        Stroke::Power => {
            let progress = (cycle_angle - 2.0 * PI) / PI;
            if progress < FLASH_FRACTION {
                GasVisual {
                    color: Rgb::hex(0xffff00),
                    emissive: Rgb::hex(0xffffaa),
                    emissive_intensity: 4.0,
                    opacity: 0.9,
                }
            } else {
                let cool_down = (progress - FLASH_FRACTION) / (1.0 - FLASH_FRACTION);
                GasVisual {
                    color: Rgb::hex(0xf59e0b).lerp(Rgb::hex(0xef4444), cool_down),
                    emissive: Rgb::hex(0xff4400).lerp(Rgb::hex(0x330000), cool_down),
                    emissive_intensity: 2.0 * (1.0 - cool_down),
                    opacity: 0.8 * (1.0 - cool_down),
                }
            }
        }
        Stroke::Exhaust => GasVisual {
            color: Rgb::hex(0x64748b),
            emissive: Rgb::BLACK,
            emissive_intensity: 0.0,
            opacity: 0.5,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn deg(d: f64) -> EngineFrame {
        EngineFrame::at(d.to_radians())
    }

    #[test]
    fn piston_extremes() {
        // top dead center: r + l
        assert_relative_eq!(deg(0.0).piston_y, CRANK_RADIUS + ROD_LENGTH);
        // bottom dead center: l - r
        assert_relative_eq!(deg(180.0).piston_y, ROD_LENGTH - CRANK_RADIUS, epsilon = 1e-12);
        assert_relative_eq!(deg(360.0).piston_y, CRANK_RADIUS + ROD_LENGTH, epsilon = 1e-12);
    }

    #[test]
    fn rod_is_vertical_at_dead_centers() {
        assert_abs_diff_eq!(deg(0.0).rod_angle, 0.0);
        assert_abs_diff_eq!(deg(180.0).rod_angle, 0.0, epsilon = 1e-12);
        let max = (CRANK_RADIUS / ROD_LENGTH).asin();
        assert_relative_eq!(deg(90.0).rod_angle, max, epsilon = 1e-12);
    }

    #[test]
    fn rod_lower_end_meets_crank_pin() {
        for d in [0.0, 37.0, 90.0, 200.0, 451.0, 700.0] {
            let f = deg(d);
            let end_x = ROD_LENGTH * f.rod_angle.sin();
            let end_y = f.piston_y - ROD_LENGTH * f.rod_angle.cos();
            assert_abs_diff_eq!(end_x, f.crank_pin[0], epsilon = 1e-9);
            assert_abs_diff_eq!(end_y, f.crank_pin[1], epsilon = 1e-9);
        }
    }

    #[test]
    fn valves_open_in_their_strokes() {
        assert_relative_eq!(deg(90.0).intake_lift, VALVE_TRAVEL);
        assert_eq!(deg(90.0).exhaust_lift, 0.0);
        assert_eq!(deg(0.0).intake_lift, 0.0);
        assert_eq!(deg(180.0).intake_lift, 0.0);
        assert_eq!(deg(540.0).exhaust_lift, 0.0);
        assert_relative_eq!(deg(630.0).exhaust_lift, VALVE_TRAVEL, epsilon = 1e-12);
        assert_eq!(deg(300.0).intake_lift, 0.0);
        assert_eq!(deg(300.0).exhaust_lift, 0.0);
        assert!(deg(10.0).intake_open());
        assert!(!deg(10.0).exhaust_open());
        assert!(deg(600.0).exhaust_open());
    }

    #[test]
    fn spark_window() {
        assert!(deg(360.0).spark);
        assert!(deg(361.0).spark);
        assert!(deg(355.0).spark);
        // 0.15 rad is about 8.6°
        assert!(!deg(369.0).spark);
        assert!(!deg(351.0).spark);
        assert!(!deg(0.0).spark);
    }

    #[test]
    fn intake_gas_is_translucent_blue() {
        let gas = deg(0.0).gas;
        assert_eq!(gas.color, Rgb::hex(0x0ea5e9));
        assert_abs_diff_eq!(gas.opacity, 0.3);
        assert_eq!(gas.emissive_intensity, 0.0);
    }

    #[test]
    fn compression_heats_toward_amber() {
        let gas = deg(270.0).gas;
        let expected = Rgb::hex(0x38bdf8).lerp(Rgb::hex(0xf59e0b), 0.5);
        assert_abs_diff_eq!(gas.color.r, expected.r, epsilon = 1e-9);
        assert_abs_diff_eq!(gas.color.g, expected.g, epsilon = 1e-9);
        assert_abs_diff_eq!(gas.color.b, expected.b, epsilon = 1e-9);
        assert_abs_diff_eq!(gas.opacity, 0.6, epsilon = 1e-9);
        assert!(deg(300.0).gas.opacity > deg(200.0).gas.opacity);
    }

    #[test]
    fn power_flash_then_cooldown() {
        // past the spark window but inside the flash
        let flash = deg(380.0).gas;
        assert_eq!(flash.color, Rgb::hex(0xffff00));
        assert_eq!(flash.emissive_intensity, 4.0);
        assert_abs_diff_eq!(flash.opacity, 0.9);

        let early = deg(420.0).gas;
        let late = deg(530.0).gas;
        assert!(early.opacity > late.opacity);
        assert!(early.emissive_intensity > late.emissive_intensity);
        assert!(late.opacity < 0.1);
    }

    #[test]
    fn spark_overrides_stroke_color() {
        let gas = deg(361.0).gas;
        assert_eq!(gas.color, Rgb::hex(0xfff700));
        assert_eq!(gas.opacity, 1.0);
        assert_eq!(gas.emissive_intensity, 5.0);
    }

    #[test]
    fn exhaust_gas_is_grey() {
        let gas = deg(600.0).gas;
        assert_eq!(gas.color, Rgb::hex(0x64748b));
        assert_abs_diff_eq!(gas.opacity, 0.5);
    }

    #[test]
    fn chamber_never_collapses() {
        let top = deg(0.0);
        assert_abs_diff_eq!(top.gas_height, MIN_GAS_HEIGHT);
        let bottom = deg(180.0);
        assert_relative_eq!(
            bottom.gas_height,
            HEAD_Y - (ROD_LENGTH - CRANK_RADIUS) - PISTON_HEIGHT / 2.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(bottom.gas_center, bottom.piston_top + bottom.gas_height / 2.0);
    }

    #[test]
    fn non_finite_angle_is_zero() {
        assert_eq!(EngineFrame::at(f64::NAN), EngineFrame::at(0.0));
        assert_eq!(EngineFrame::at(f64::INFINITY), EngineFrame::at(0.0));
    }

    #[test]
    fn full_cycle_is_identity() {
        assert_eq!(deg(720.0), deg(0.0));
        let a = EngineFrame::at(1.234);
        let b = EngineFrame::at(1.234 + 4.0 * PI);
        assert_eq!(a.stroke, b.stroke);
        assert_abs_diff_eq!(a.piston_y, b.piston_y, epsilon = 1e-9);
    }
}
