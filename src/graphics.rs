use crate::color::Rgb;
use crate::math::{dot, edge_function, normalize, shade, Material, PointLight};
use crate::part::Part;
use crate::vertex::Vertex;

/// Lighting environment shared by every triangle in a frame
#[derive(Debug, Clone)]
pub struct Lighting {
    pub ambient: f64,
    pub lights: Vec<PointLight>,
    /// Normals are flipped toward this point so surfaces are two-sided
    pub eye: [f64; 3],
    pub fog: Option<Fog>,
}

/// Linear distance fog from the eye
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Rgb,
    pub near: f64,
    pub far: f64,
}

impl Fog {
    /// Blends `color` toward the fog color for a point `distance` from the eye
    pub fn apply(&self, color: Rgb, distance: f64) -> Rgb {
        let span = self.far - self.near;
        let amount = if span > 0.0 {
            ((distance - self.near) / span).clamp(0.0, 1.0)
        } else if distance >= self.far {
            1.0
        } else {
            0.0
        };
        self.color.over(color, amount)
    }
}

/// Color, depth and part-id buffers for one frame
pub struct Framebuffer {
    pub width: usize,
    pub height: usize,
    pub color: Vec<Rgb>,
    pub depth: Vec<f64>,
    /// Frontmost hoverable part per pixel
    pub pick: Vec<Option<Part>>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize, background: Rgb) -> Self {
        Framebuffer {
            width,
            height,
            color: vec![background; width * height],
            depth: vec![f64::INFINITY; width * height],
            pick: vec![None; width * height],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        (x < self.width && y < self.height).then(|| self.color[y * self.width + x])
    }

    pub fn part_at(&self, x: usize, y: usize) -> Option<Part> {
        if x < self.width && y < self.height {
            self.pick[y * self.width + x]
        } else {
            None
        }
    }

    /// Draws a single depth-tested dot, used for particles
    pub fn plot(&mut self, x: f64, y: f64, depth: f64, color: Rgb, alpha: f64) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = y * self.width + x;
        if depth < self.depth[offset] {
            self.color[offset] = color.over(self.color[offset], alpha);
        }
    }
}

/// Draws a triangle with per-pixel lighting.
///
/// Opaque materials write depth and the pick buffer. Translucent materials are
/// depth-tested, blended over what is already there, and only claim pick
/// pixels that nothing opaque has claimed.
pub fn draw_triangle(
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
    fb: &mut Framebuffer,
    lighting: &Lighting,
    material: &Material,
    part: Option<Part>,
) {
    let width = fb.width;
    let height = fb.height;
    if width == 0 || height == 0 {
        return;
    }

    // Compute bounding box of the triangle
    let min_x = v0.screen_position[0]
        .min(v1.screen_position[0])
        .min(v2.screen_position[0])
        .floor()
        .max(0.0);
    let max_x = v0.screen_position[0]
        .max(v1.screen_position[0])
        .max(v2.screen_position[0])
        .ceil()
        .min(width as f64 - 1.0);
    let min_y = v0.screen_position[1]
        .min(v1.screen_position[1])
        .min(v2.screen_position[1])
        .floor()
        .max(0.0);
    let max_y = v0.screen_position[1]
        .max(v1.screen_position[1])
        .max(v2.screen_position[1])
        .ceil()
        .min(height as f64 - 1.0);
    if min_x > max_x || min_y > max_y {
        return;
    }
    let (min_x, max_x, min_y, max_y) = (min_x as usize, max_x as usize, min_y as usize, max_y as usize);

    // Precompute area of the triangle
    let area = edge_function(&v0.screen_position, &v1.screen_position, &v2.screen_position);
    if area == 0.0 {
        return;
    }

    let translucent = material.is_translucent();

    // For each pixel in the bounding box
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = [x as f64 + 0.5, y as f64 + 0.5];

            // Normalized barycentric coordinates; all non-negative inside, for either winding
            let w0 = edge_function(&v1.screen_position, &v2.screen_position, &p) / area;
            let w1 = edge_function(&v2.screen_position, &v0.screen_position, &p) / area;
            let w2 = edge_function(&v0.screen_position, &v1.screen_position, &p) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            // Depth test
            let depth = v0.depth * w0 + v1.depth * w1 + v2.depth * w2;
            let offset = y * width + x;
            if depth >= fb.depth[offset] {
                continue;
            }

            // Interpolate position
            let position = [
                v0.position[0] * w0 + v1.position[0] * w1 + v2.position[0] * w2,
                v0.position[1] * w0 + v1.position[1] * w1 + v2.position[1] * w2,
                v0.position[2] * w0 + v1.position[2] * w1 + v2.position[2] * w2,
            ];

            // Interpolate normal, facing the viewer
            let mut normal = normalize(&[
                v0.normal[0] * w0 + v1.normal[0] * w1 + v2.normal[0] * w2,
                v0.normal[1] * w0 + v1.normal[1] * w1 + v2.normal[1] * w2,
                v0.normal[2] * w0 + v1.normal[2] * w1 + v2.normal[2] * w2,
            ]);
            let to_eye = [
                lighting.eye[0] - position[0],
                lighting.eye[1] - position[1],
                lighting.eye[2] - position[2],
            ];
            if normal[0] * to_eye[0] + normal[1] * to_eye[1] + normal[2] * to_eye[2] < 0.0 {
                normal = [-normal[0], -normal[1], -normal[2]];
            }

            let mut shaded = shade(material, &normal, &position, lighting.ambient, &lighting.lights);
            if let Some(fog) = &lighting.fog {
                shaded = fog.apply(shaded, dot(&to_eye, &to_eye).sqrt());
            }

            if translucent {
                fb.color[offset] = shaded.over(fb.color[offset], material.opacity);
                if fb.pick[offset].is_none() {
                    fb.pick[offset] = part;
                }
            } else {
                fb.depth[offset] = depth;
                fb.color[offset] = shaded;
                fb.pick[offset] = part;
            }
        }
    }
}

/// Draws a line between two points in the color buffer using Bresenham's algorithm.
/// Lines ignore depth; a `part` claims every pixel the line touches.
#[allow(clippy::too_many_arguments)]
pub fn draw_line(
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    fb: &mut Framebuffer,
    color: Rgb,
    alpha: f64,
    part: Option<Part>,
) {
    let (mut x0, mut y0, x1, y1) = (
        x0.round() as isize,
        y0.round() as isize,
        x1.round() as isize,
        y1.round() as isize,
    );
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy; // error value e_xy

    loop {
        if x0 >= 0 && x0 < fb.width as isize && y0 >= 0 && y0 < fb.height as isize {
            let offset = y0 as usize * fb.width + x0 as usize;
            fb.color[offset] = color.over(fb.color[offset], alpha);
            if part.is_some() {
                fb.pick[offset] = part;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f64, y: f64, depth: f64) -> Vertex {
        Vertex {
            position: [x, y, 0.0],
            screen_position: [x, y],
            depth,
            normal: [0.0, 0.0, 1.0],
        }
    }

    fn lighting() -> Lighting {
        Lighting {
            ambient: 1.0,
            lights: Vec::new(),
            eye: [0.0, 0.0, 10.0],
            fog: None,
        }
    }

    fn fill(fb: &mut Framebuffer, depth: f64, material: Material, part: Option<Part>) {
        let (a, b, c, d) = (
            vertex(0.0, 0.0, depth),
            vertex(8.0, 0.0, depth),
            vertex(8.0, 8.0, depth),
            vertex(0.0, 8.0, depth),
        );
        draw_triangle(&a, &b, &c, fb, &lighting(), &material, part);
        // opposite winding
        draw_triangle(&a, &d, &c, fb, &lighting(), &material, part);
    }

    #[test]
    fn nearer_opaque_surface_wins() {
        let mut fb = Framebuffer::new(8, 8, Rgb::BLACK);
        fill(&mut fb, 5.0, Material::solid(Rgb::hex(0xff0000)), Some(Part::Head));
        fill(&mut fb, 2.0, Material::solid(Rgb::hex(0x00ff00)), Some(Part::Piston));
        fill(&mut fb, 9.0, Material::solid(Rgb::hex(0x0000ff)), Some(Part::Crank));
        assert_eq!(fb.pixel(4, 4).map(Rgb::to_rgb8), Some((0, 255, 0)));
        assert_eq!(fb.part_at(4, 4), Some(Part::Piston));
        assert_eq!(fb.part_at(0, 7), Some(Part::Piston));
    }

    #[test]
    fn translucent_blends_and_keeps_opaque_pick() {
        let mut fb = Framebuffer::new(8, 8, Rgb::BLACK);
        fill(&mut fb, 5.0, Material::solid(Rgb::hex(0xff0000)), Some(Part::Piston));
        let mut glass = Material::solid(Rgb::WHITE);
        glass.opacity = 0.5;
        fill(&mut fb, 1.0, glass, Some(Part::Cylinder));
        // off the shared diagonal, so blended exactly once
        let (r, g, _) = fb.pixel(5, 2).map(Rgb::to_rgb8).unwrap();
        assert_eq!(r, 255);
        assert_eq!(g, 128);
        assert_eq!(fb.part_at(5, 2), Some(Part::Piston));
        assert_eq!(fb.depth[2 * 8 + 5], 5.0);
    }

    #[test]
    fn translucent_claims_empty_pixels() {
        let mut fb = Framebuffer::new(8, 8, Rgb::BLACK);
        let mut glass = Material::solid(Rgb::WHITE);
        glass.opacity = 0.2;
        fill(&mut fb, 1.0, glass, Some(Part::Cylinder));
        assert_eq!(fb.part_at(2, 2), Some(Part::Cylinder));
        assert_eq!(fb.depth[2 * 8 + 2], f64::INFINITY);
    }

    #[test]
    fn fog_ramps_between_near_and_far() {
        let fog = Fog {
            color: Rgb::BLACK,
            near: 20.0,
            far: 40.0,
        };
        assert_eq!(fog.apply(Rgb::WHITE, 10.0).to_rgb8(), (255, 255, 255));
        assert_eq!(fog.apply(Rgb::WHITE, 30.0).to_rgb8(), (128, 128, 128));
        assert_eq!(fog.apply(Rgb::WHITE, 90.0).to_rgb8(), (0, 0, 0));
    }

    #[test]
    fn distant_surface_fades_into_fog() {
        let mut fb = Framebuffer::new(8, 8, Rgb::BLACK);
        let lighting = Lighting {
            eye: [0.0, 0.0, 100.0],
            fog: Some(Fog {
                color: Rgb::hex(0x0000ff),
                near: 20.0,
                far: 45.0,
            }),
            ..lighting()
        };
        let (a, b, c) = (vertex(0.0, 0.0, 1.0), vertex(8.0, 0.0, 1.0), vertex(8.0, 8.0, 1.0));
        draw_triangle(&a, &b, &c, &mut fb, &lighting, &Material::solid(Rgb::WHITE), None);
        assert_eq!(fb.pixel(6, 2).map(Rgb::to_rgb8), Some((0, 0, 255)));
    }

    #[test]
    fn offscreen_triangle_is_ignored() {
        let mut fb = Framebuffer::new(4, 4, Rgb::BLACK);
        let (a, b, c) = (vertex(-10.0, -10.0, 1.0), vertex(-5.0, -10.0, 1.0), vertex(-5.0, -5.0, 1.0));
        draw_triangle(&a, &b, &c, &mut fb, &lighting(), &Material::solid(Rgb::WHITE), None);
        assert!(fb.color.iter().all(|c| *c == Rgb::BLACK));
    }

    #[test]
    fn line_is_clipped() {
        let mut fb = Framebuffer::new(4, 4, Rgb::BLACK);
        draw_line(-2.0, 1.0, 10.0, 1.0, &mut fb, Rgb::WHITE, 1.0, Some(Part::Rod));
        for x in 0..4 {
            assert_eq!(fb.pixel(x, 1), Some(Rgb::WHITE));
            assert_eq!(fb.part_at(x, 1), Some(Part::Rod));
        }
        assert_eq!(fb.pixel(0, 0), Some(Rgb::BLACK));
        assert_eq!(fb.part_at(0, 0), None);
    }
}
