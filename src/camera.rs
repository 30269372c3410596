//! Orbit camera: rotates around a target, no panning.

use crate::math::{add, cross, dot, normalize, sub, Vec3};
use std::f64::consts::PI;

pub const MIN_POLAR: f64 = PI / 6.0;
pub const MAX_POLAR: f64 = PI / 1.8;
pub const MIN_DISTANCE: f64 = 8.0;
pub const MAX_DISTANCE: f64 = 25.0;
/// Nothing closer than this to the eye is drawn
pub const NEAR_PLANE: f64 = 0.1;

const DEFAULT_EYE: Vec3 = [0.0, 4.0, 14.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    /// Rotation around the vertical axis
    pub yaw: f64,
    /// Angle from straight up
    pub polar: f64,
    pub distance: f64,
    /// Vertical field of view (radians)
    pub fov_y: f64,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let [x, y, z] = DEFAULT_EYE;
        let distance = (x * x + y * y + z * z).sqrt();
        OrbitCamera {
            target: [0.0; 3],
            yaw: x.atan2(z),
            polar: (y / distance).acos().clamp(MIN_POLAR, MAX_POLAR),
            distance: distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
            fov_y: 40f64.to_radians(),
        }
    }
}

impl OrbitCamera {
    pub fn eye(&self) -> Vec3 {
        let (sin_p, cos_p) = self.polar.sin_cos();
        let (sin_y, cos_y) = self.yaw.sin_cos();
        add(
            &self.target,
            &[
                self.distance * sin_p * sin_y,
                self.distance * cos_p,
                self.distance * sin_p * cos_y,
            ],
        )
    }

    /// Rotate by a drag delta (radians); polar stays within its clamp
    pub fn orbit(&mut self, delta_yaw: f64, delta_polar: f64) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(2.0 * PI);
        self.polar = (self.polar + delta_polar).clamp(MIN_POLAR, MAX_POLAR);
    }

    /// Scale the distance; `factor < 1` moves closer
    pub fn zoom(&mut self, factor: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }

    /// Right, up and forward unit vectors
    fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = normalize(&sub(&self.target, &self.eye()));
        let right = normalize(&cross(&forward, &[0.0, 1.0, 0.0]));
        let up = cross(&right, &forward);
        (right, up, forward)
    }

    /// Projects a world point to pixel coordinates and view depth.
    /// Returns `None` for points behind the near plane.
    pub fn project(&self, point: &Vec3, width: f64, height: f64) -> Option<([f64; 2], f64)> {
        let (right, up, forward) = self.basis();
        let rel = sub(point, &self.eye());
        let depth = dot(&rel, &forward);
        if depth < NEAR_PLANE {
            return None;
        }
        let focal = (height / 2.0) / (self.fov_y / 2.0).tan();
        let x = dot(&rel, &right) / depth * focal + width / 2.0;
        let y = height / 2.0 - dot(&rel, &up) / depth * focal;
        Some(([x, y], depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn default_eye_matches_initial_position() {
        let cam = OrbitCamera::default();
        let eye = cam.eye();
        assert_abs_diff_eq!(eye[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(eye[1], 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(eye[2], 14.0, epsilon = 1e-9);
    }

    #[test]
    fn target_projects_to_center() {
        let cam = OrbitCamera::default();
        let (p, depth) = cam.project(&cam.target, 80.0, 40.0).unwrap();
        assert_abs_diff_eq!(p[0], 40.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p[1], 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(depth, cam.distance, epsilon = 1e-9);
    }

    #[test]
    fn up_is_up_on_screen() {
        let cam = OrbitCamera::default();
        let (p, _) = cam.project(&[0.0, 2.0, 0.0], 80.0, 40.0).unwrap();
        assert!(p[1] < 20.0);
        let (p, _) = cam.project(&[2.0, 0.0, 0.0], 80.0, 40.0).unwrap();
        assert!(p[0] > 40.0);
    }

    #[test]
    fn points_behind_eye_are_culled() {
        let cam = OrbitCamera::default();
        assert!(cam.project(&[0.0, 8.0, 28.0], 80.0, 40.0).is_none());
    }

    #[test]
    fn orbit_and_zoom_are_clamped() {
        let mut cam = OrbitCamera::default();
        cam.orbit(0.0, 10.0);
        assert_eq!(cam.polar, MAX_POLAR);
        cam.orbit(0.0, -10.0);
        assert_eq!(cam.polar, MIN_POLAR);
        cam.zoom(100.0);
        assert_eq!(cam.distance, MAX_DISTANCE);
        cam.zoom(0.001);
        assert_eq!(cam.distance, MIN_DISTANCE);
        cam.zoom(f64::NAN);
        assert_eq!(cam.distance, MIN_DISTANCE);
    }
}
