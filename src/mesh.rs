//! Triangle meshes for the primitives the engine is built from.
//!
//! All primitives are centered on the origin; cylinders and cones run along Y.

use crate::math::{normalize, Vec3};
use std::f64::consts::{PI, TAU};

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub triangles: Vec<[usize; 3]>,
    /// Outline segments for wireframe mode
    pub edges: Vec<[usize; 2]>,
}

impl Mesh {
    fn push(&mut self, position: Vec3, normal: Vec3) -> usize {
        self.positions.push(position);
        self.normals.push(normal);
        self.positions.len() - 1
    }

    /// Axis-aligned box with flat-shaded faces
    pub fn cuboid(width: f64, height: f64, depth: f64) -> Mesh {
        let (hx, hy, hz) = (width / 2.0, height / 2.0, depth / 2.0);
        // (normal, two in-plane axes scaled to the half extents)
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            ([1.0, 0.0, 0.0], [0.0, hy, 0.0], [0.0, 0.0, hz]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, hz], [0.0, hy, 0.0]),
            ([0.0, 1.0, 0.0], [0.0, 0.0, hz], [hx, 0.0, 0.0]),
            ([0.0, -1.0, 0.0], [hx, 0.0, 0.0], [0.0, 0.0, hz]),
            ([0.0, 0.0, 1.0], [hx, 0.0, 0.0], [0.0, hy, 0.0]),
            ([0.0, 0.0, -1.0], [0.0, hy, 0.0], [hx, 0.0, 0.0]),
        ];

        let mut mesh = Mesh::default();
        for (n, u, v) in faces {
            let center = [n[0] * hx, n[1] * hy, n[2] * hz];
            let corner = |su: f64, sv: f64| {
                [
                    center[0] + u[0] * su + v[0] * sv,
                    center[1] + u[1] * su + v[1] * sv,
                    center[2] + u[2] * su + v[2] * sv,
                ]
            };
            let a = mesh.push(corner(-1.0, -1.0), n);
            let b = mesh.push(corner(1.0, -1.0), n);
            let c = mesh.push(corner(1.0, 1.0), n);
            let d = mesh.push(corner(-1.0, 1.0), n);
            mesh.triangles.push([a, b, c]);
            mesh.triangles.push([a, c, d]);
            mesh.edges.extend([[a, b], [b, c], [c, d], [d, a]]);
        }
        mesh
    }

    /// Cylinder (or frustum) along Y. `open_ended` leaves out the caps.
    pub fn cylinder(
        radius_top: f64,
        radius_bottom: f64,
        height: f64,
        segments: usize,
        open_ended: bool,
    ) -> Mesh {
        let segments = segments.max(3);
        let half = height / 2.0;
        // side normals tilt for a frustum
        let slope = (radius_bottom - radius_top) / height;

        let mut mesh = Mesh::default();
        let mut top_ring = Vec::with_capacity(segments);
        let mut bottom_ring = Vec::with_capacity(segments);
        for i in 0..segments {
            let theta = i as f64 / segments as f64 * TAU;
            let (sin_t, cos_t) = theta.sin_cos();
            let normal = normalize(&[sin_t, slope, cos_t]);
            top_ring.push(mesh.push([radius_top * sin_t, half, radius_top * cos_t], normal));
            bottom_ring.push(mesh.push(
                [radius_bottom * sin_t, -half, radius_bottom * cos_t],
                normal,
            ));
        }

        for i in 0..segments {
            let j = (i + 1) % segments;
            let (t0, t1, b0, b1) = (top_ring[i], top_ring[j], bottom_ring[i], bottom_ring[j]);
            mesh.triangles.push([t0, b0, b1]);
            mesh.triangles.push([t0, b1, t1]);
            mesh.edges.push([b0, b1]);
            if radius_top > 0.0 {
                mesh.edges.push([t0, t1]);
            }
            mesh.edges.push([t0, b0]);
        }

        if !open_ended {
            if radius_top > 0.0 {
                mesh.cap(half, radius_top, segments, 1.0);
            }
            if radius_bottom > 0.0 {
                mesh.cap(-half, radius_bottom, segments, -1.0);
            }
        }
        mesh
    }

    fn cap(&mut self, y: f64, radius: f64, segments: usize, facing: f64) {
        let normal = [0.0, facing, 0.0];
        let center = self.push([0.0, y, 0.0], normal);
        let ring: Vec<usize> = (0..segments)
            .map(|i| {
                let theta = i as f64 / segments as f64 * TAU;
                let (sin_t, cos_t) = theta.sin_cos();
                self.push([radius * sin_t, y, radius * cos_t], normal)
            })
            .collect();
        for i in 0..segments {
            let j = (i + 1) % segments;
            if facing > 0.0 {
                self.triangles.push([center, ring[i], ring[j]]);
            } else {
                self.triangles.push([center, ring[j], ring[i]]);
            }
        }
    }

    /// Cone with its apex at +Y
    pub fn cone(radius: f64, height: f64, segments: usize) -> Mesh {
        Mesh::cylinder(0.0, radius, height, segments, false)
    }

    pub fn sphere(radius: f64, width_segments: usize, height_segments: usize) -> Mesh {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let mut mesh = Mesh::default();
        let mut grid = Vec::with_capacity(height_segments + 1);
        for iy in 0..=height_segments {
            let phi = iy as f64 / height_segments as f64 * PI;
            let row: Vec<usize> = (0..width_segments)
                .map(|ix| {
                    let theta = ix as f64 / width_segments as f64 * TAU;
                    let n = [phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos()];
                    mesh.push([n[0] * radius, n[1] * radius, n[2] * radius], n)
                })
                .collect();
            grid.push(row);
        }
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let jx = (ix + 1) % width_segments;
                let (a, b) = (grid[iy][ix], grid[iy][jx]);
                let (c, d) = (grid[iy + 1][ix], grid[iy + 1][jx]);
                mesh.triangles.push([a, c, d]);
                mesh.triangles.push([a, d, b]);
                mesh.edges.push([a, c]);
            }
        }
        mesh
    }
}
