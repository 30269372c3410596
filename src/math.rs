use crate::color::Rgb;

pub type Vec3 = [f64; 3];
pub type Mat3 = [[f64; 3]; 3];

pub const IDENTITY: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Edge function used in rasterization
pub fn edge_function(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> f64 {
    (c[0] - a[0]) * (b[1] - a[1]) - (c[1] - a[1]) * (b[0] - a[0])
}

/// Multiplies a 3x3 matrix by a 3-dimensional vector
pub fn multiply_matrix_vector(matrix: &Mat3, vector: &Vec3) -> Vec3 {
    let mut result = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i] += matrix[i][j] * vector[j];
        }
    }
    result
}

/// Multiplies two 3x3 matrices
pub fn multiply_matrices(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

pub fn rotation_x(angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]]
}

pub fn rotation_z(angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]]
}

pub fn add(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(u: &Vec3, v: &Vec3) -> Vec3 {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

/// Unit vector in the direction of `v`; the zero vector stays zero
pub fn normalize(v: &Vec3) -> Vec3 {
    let length = dot(v, v).sqrt();
    if length == 0.0 {
        return [0.0; 3];
    }
    [v[0] / length, v[1] / length, v[2] / length]
}

/// Lambert term for a point light at `light_pos`
pub fn calculate_light_intensity(normal: &Vec3, position: &Vec3, light_pos: &Vec3) -> f64 {
    let light_dir = normalize(&sub(light_pos, position));
    dot(normal, &light_dir).max(0.0)
}

/// A colored point light
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Rgb,
    pub intensity: f64,
    /// Distance at which the light fades out completely; `None` never fades
    pub range: Option<f64>,
}

impl PointLight {
    /// Quadratic falloff to zero at `range`
    pub fn attenuation(&self, position: &Vec3) -> f64 {
        match self.range {
            Some(range) if range > 0.0 => {
                let d = sub(&self.position, position);
                let distance = dot(&d, &d).sqrt();
                (1.0 - distance / range).clamp(0.0, 1.0).powi(2)
            }
            _ => 1.0,
        }
    }
}

/// Surface response used by the shader
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Rgb,
    pub emissive: Rgb,
    pub emissive_intensity: f64,
    pub opacity: f64,
}

impl Material {
    pub const fn solid(color: Rgb) -> Self {
        Material {
            color,
            emissive: Rgb::BLACK,
            emissive_intensity: 0.0,
            opacity: 1.0,
        }
    }

    pub fn is_translucent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// Ambient plus diffuse from each light, plus emission
pub fn shade(
    material: &Material,
    normal: &Vec3,
    position: &Vec3,
    ambient: f64,
    lights: &[PointLight],
) -> Rgb {
    let mut light = Rgb::WHITE.scale(ambient);
    for l in lights {
        let diffuse = calculate_light_intensity(normal, position, &l.position);
        light = light.add(l.color.scale(diffuse * l.intensity * l.attenuation(position)));
    }
    material
        .color
        .modulate(light)
        .add(material.emissive.scale(material.emissive_intensity))
}
