//! Scene assembly: turns an [`EngineFrame`] into positioned, colored primitives.

use crate::color::Rgb;
use crate::graphics::Fog;
use crate::kinematics::{
    EngineFrame, CRANK_RADIUS, CYLINDER_HEIGHT, CYLINDER_RADIUS, PISTON_HEIGHT, PISTON_RADIUS,
    ROD_LENGTH, VALVE_OFFSET,
};
use crate::math::{
    add, multiply_matrices, multiply_matrix_vector, normalize, rotation_x, rotation_z, Mat3,
    Material, PointLight, Vec3, IDENTITY,
};
use crate::mesh::Mesh;
use crate::part::Part;
use crate::stroke::Stroke;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f64::consts::{FRAC_PI_2, PI};

/// The whole assembly sits this far below the scene origin
pub const MODEL_OFFSET_Y: f64 = -4.5;
/// Center of the cylinder bore, model space
const CYLINDER_CENTER_Y: f64 = 5.5;
const HEAD_CENTER_Y: f64 = 9.75;
const SPARKLE_COUNT: usize = 30;

pub const BACKGROUND: Rgb = Rgb::hex(0x0b101a);
pub const HIGHLIGHT: Rgb = Rgb::hex(0xfde047);
/// Distance fog fading into the background
pub const FOG: Fog = Fog {
    color: BACKGROUND,
    near: 20.0,
    far: 45.0,
};
const CLOSED_VALVE: Rgb = Rgb::hex(0x94a3b8);

/// Rotation, then non-uniform scale in local space, then translation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub rotation: Mat3,
    pub translation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            rotation: IDENTITY,
            translation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl Transform {
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Transform {
            translation: [x, y, z],
            ..Default::default()
        }
    }

    pub fn rotated(mut self, rotation: Mat3) -> Self {
        self.rotation = multiply_matrices(&self.rotation, &rotation);
        self
    }

    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Composes a child placed in this transform's frame. Parents never scale.
    pub fn child(&self, local: Transform) -> Transform {
        Transform {
            rotation: multiply_matrices(&self.rotation, &local.rotation),
            translation: add(
                &self.translation,
                &multiply_matrix_vector(&self.rotation, &local.translation),
            ),
            scale: local.scale,
        }
    }

    pub fn apply_point(&self, p: &Vec3) -> Vec3 {
        let scaled = [p[0] * self.scale[0], p[1] * self.scale[1], p[2] * self.scale[2]];
        add(&multiply_matrix_vector(&self.rotation, &scaled), &self.translation)
    }

    pub fn apply_normal(&self, n: &Vec3) -> Vec3 {
        let inv = [n[0] / self.scale[0], n[1] / self.scale[1], n[2] / self.scale[2]];
        normalize(&multiply_matrix_vector(&self.rotation, &inv))
    }
}

/// Meshes built once and shared by every frame
pub struct MeshLibrary {
    pub glass: Mesh,
    /// Unit height; scaled to the chamber each frame
    pub gas: Mesh,
    pub head: Mesh,
    pub plug_body: Mesh,
    pub plug_tip: Mesh,
    pub valve_stem: Mesh,
    pub valve_head: Mesh,
    pub piston: Mesh,
    pub piston_ring: Mesh,
    pub piston_pin: Mesh,
    pub rod: Mesh,
    pub rod_bearing: Mesh,
    pub main_shaft: Mesh,
    pub counterweight: Mesh,
    pub crank_pin: Mesh,
    pub crank_arm: Mesh,
}

impl MeshLibrary {
    pub fn new() -> Self {
        MeshLibrary {
            glass: Mesh::cylinder(CYLINDER_RADIUS, CYLINDER_RADIUS, CYLINDER_HEIGHT, 24, true),
            gas: Mesh::cylinder(PISTON_RADIUS - 0.02, PISTON_RADIUS - 0.02, 1.0, 24, false),
            head: Mesh::cuboid(5.0, 0.5, 5.0),
            plug_body: Mesh::cylinder(0.15, 0.15, 1.5, 10, false),
            plug_tip: Mesh::sphere(0.15, 8, 6),
            valve_stem: Mesh::cylinder(0.08, 0.08, 2.0, 8, false),
            valve_head: Mesh::cone(0.6, 0.15, 16),
            piston: Mesh::cylinder(PISTON_RADIUS, PISTON_RADIUS, PISTON_HEIGHT, 24, false),
            piston_ring: Mesh::cylinder(PISTON_RADIUS + 0.01, PISTON_RADIUS + 0.01, 0.1, 24, true),
            piston_pin: Mesh::cylinder(0.4, 0.4, 3.0, 12, false),
            rod: Mesh::cuboid(0.5, ROD_LENGTH, 0.4),
            rod_bearing: Mesh::cylinder(0.5, 0.5, 0.45, 12, false),
            main_shaft: Mesh::cylinder(0.4, 0.4, 3.0, 12, false),
            counterweight: Mesh::cuboid(1.2, CRANK_RADIUS * 1.2, 0.4),
            crank_pin: Mesh::cylinder(0.38, 0.38, 1.6, 12, false),
            crank_arm: Mesh::cuboid(1.0, CRANK_RADIUS + 1.0, 0.4),
        }
    }
}

impl Default for MeshLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// One positioned primitive
pub struct SceneObject<'a> {
    pub mesh: &'a Mesh,
    pub transform: Transform,
    pub material: Material,
    pub part: Option<Part>,
    /// Edge overlay color and opacity, drawn in every render mode
    pub outline: Option<(Rgb, f64)>,
}

/// A glowing particle inside the combustion chamber
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sparkle {
    pub position: Vec3,
    pub color: Rgb,
    pub opacity: f64,
}

pub struct Scene<'a> {
    pub objects: Vec<SceneObject<'a>>,
    pub ambient: f64,
    pub lights: Vec<PointLight>,
    pub fog: Fog,
    pub sparkles: Vec<Sparkle>,
}

/// Material for a hoverable part, swapped for the highlight while hovered
fn part_material(part: Part, hovered: Option<Part>, base: Rgb) -> Material {
    if hovered == Some(part) {
        Material {
            color: HIGHLIGHT,
            emissive: HIGHLIGHT,
            emissive_intensity: 0.4,
            opacity: 1.0,
        }
    } else {
        Material::solid(base)
    }
}

struct Builder<'a> {
    objects: Vec<SceneObject<'a>>,
    hovered: Option<Part>,
}

impl<'a> Builder<'a> {
    fn part(&mut self, part: Part, mesh: &'a Mesh, transform: Transform, base: Rgb) {
        self.objects.push(SceneObject {
            mesh,
            transform,
            material: part_material(part, self.hovered, base),
            part: Some(part),
            outline: None,
        });
    }

    /// Belongs to `part` for hover, but keeps its own material
    fn fixed(&mut self, part: Option<Part>, mesh: &'a Mesh, transform: Transform, material: Material) {
        self.objects.push(SceneObject {
            mesh,
            transform,
            material,
            part,
            outline: None,
        });
    }
}

/// Assembles the engine for one frame
pub fn build<'a>(frame: &EngineFrame, hovered: Option<Part>, meshes: &'a MeshLibrary) -> Scene<'a> {
    let model = Transform::at(0.0, MODEL_OFFSET_Y, 0.0);
    let mut b = Builder {
        objects: Vec::with_capacity(32),
        hovered,
    };

    // Cylinder head
    let head = model.child(Transform::at(0.0, HEAD_CENTER_Y, 0.0));
    b.part(Part::Head, &meshes.head, head, Rgb::hex(0xcbd5e1));

    // Spark plug
    b.part(
        Part::SparkPlug,
        &meshes.plug_body,
        head.child(Transform::at(0.0, 0.5, 0.0)),
        Rgb::hex(0xf1f5f9),
    );
    let tip = if frame.spark {
        Material {
            color: Rgb::hex(0xffff00),
            emissive: Rgb::hex(0xffff00),
            emissive_intensity: 5.0,
            opacity: 1.0,
        }
    } else {
        Material::solid(Rgb::hex(0x333333))
    };
    b.fixed(
        Some(Part::SparkPlug),
        &meshes.plug_tip,
        head.child(Transform::at(0.0, -0.2, 0.0)),
        tip,
    );

    // Valves open downward into the chamber
    let valves = [
        (Part::IntakeValve, -VALVE_OFFSET, frame.intake_lift, frame.intake_open(), Rgb::hex(0x3b82f6)),
        (Part::ExhaustValve, VALVE_OFFSET, frame.exhaust_lift, frame.exhaust_open(), Rgb::hex(0xef4444)),
    ];
    for (part, x, lift, open, open_color) in valves {
        let group = head.child(Transform::at(x, 0.0, 0.0));
        b.part(
            part,
            &meshes.valve_stem,
            group.child(Transform::at(0.0, 1.0 - lift, 0.0)),
            Rgb::hex(0xe2e8f0),
        );
        b.part(
            part,
            &meshes.valve_head,
            group.child(Transform::at(0.0, -lift - 0.2, 0.0).rotated(rotation_x(PI))),
            if open { open_color } else { CLOSED_VALVE },
        );
    }

    // Piston
    let piston = model.child(Transform::at(0.0, frame.piston_y, 0.0));
    b.part(Part::Piston, &meshes.piston, piston, Rgb::WHITE);
    for ring_y in [0.4, 0.1] {
        b.fixed(
            Some(Part::Piston),
            &meshes.piston_ring,
            piston.child(Transform::at(0.0, ring_y, 0.0)),
            Material::solid(Rgb::hex(0x334155)),
        );
    }
    b.part(
        Part::Piston,
        &meshes.piston_pin,
        piston.child(Transform::at(0.0, -0.2, 0.0).rotated(rotation_z(FRAC_PI_2))),
        Rgb::hex(0xcbd5e1),
    );

    // Connecting rod swings about the piston pin
    let rod = piston.child(Transform::default().rotated(rotation_z(frame.rod_angle)));
    b.part(
        Part::Rod,
        &meshes.rod,
        rod.child(Transform::at(0.0, -ROD_LENGTH / 2.0, 0.0)),
        Rgb::hex(0x94a3b8),
    );
    b.part(
        Part::Rod,
        &meshes.rod_bearing,
        rod.child(Transform::at(0.0, -ROD_LENGTH, 0.0).rotated(rotation_x(FRAC_PI_2))),
        Rgb::hex(0x64748b),
    );

    // Crankshaft
    b.part(
        Part::Crank,
        &meshes.main_shaft,
        model.child(Transform::default().rotated(rotation_x(FRAC_PI_2))),
        Rgb::hex(0x475569),
    );
    let throw = model.child(Transform::default().rotated(rotation_z(-frame.crank_rotation)));
    let r = CRANK_RADIUS;
    for z in [0.6, -0.6] {
        b.part(
            Part::Crank,
            &meshes.counterweight,
            throw.child(Transform::at(0.0, -r / 2.0, z)),
            Rgb::hex(0x334155),
        );
        b.part(
            Part::Crank,
            &meshes.crank_arm,
            throw.child(Transform::at(0.0, r / 2.0, z)),
            Rgb::hex(0x475569),
        );
    }
    b.part(
        Part::Crank,
        &meshes.crank_pin,
        throw.child(Transform::at(0.0, r, 0.0).rotated(rotation_x(FRAC_PI_2))),
        Rgb::hex(0xcbd5e1),
    );

    // Translucent last: the gas, then the glass around it
    let gas = model.child(
        Transform::at(0.0, frame.gas_center, 0.0).scaled([1.0, frame.gas_height, 1.0]),
    );
    b.fixed(
        None,
        &meshes.gas,
        gas,
        Material {
            color: frame.gas.color,
            emissive: frame.gas.emissive,
            emissive_intensity: frame.gas.emissive_intensity,
            opacity: frame.gas.opacity,
        },
    );
    let glass = model.child(Transform::at(0.0, CYLINDER_CENTER_Y, 0.0));
    b.objects.push(SceneObject {
        mesh: &meshes.glass,
        transform: glass,
        material: Material {
            opacity: 0.2,
            ..Material::solid(Rgb::hex(0xe0f2fe))
        },
        part: Some(Part::Cylinder),
        outline: Some((Rgb::hex(0x94a3b8), 0.2)),
    });

    let chamber = [0.0, MODEL_OFFSET_Y + frame.gas_center, 0.0];
    let mut lights = vec![
        PointLight {
            position: [10.0, 10.0, 10.0],
            color: Rgb::WHITE,
            intensity: 0.8,
            range: None,
        },
        PointLight {
            position: [-10.0, 5.0, -10.0],
            color: Rgb::hex(0x3b82f6),
            intensity: 0.4,
            range: None,
        },
        // Rim light behind and above the head
        PointLight {
            position: [0.0, 10.0, -5.0],
            color: Rgb::hex(0xf8fafc),
            intensity: 0.5,
            range: None,
        },
    ];
    if frame.stroke == Stroke::Power {
        lights.push(PointLight {
            position: chamber,
            color: Rgb::hex(0xffaa00),
            intensity: 0.15 * frame.gas.emissive_intensity,
            range: Some(6.0),
        });
    }
    if frame.spark {
        lights.push(PointLight {
            position: head.child(Transform::at(0.0, -0.5, 0.0)).translation,
            color: Rgb::hex(0xffff00),
            intensity: 0.5,
            range: Some(8.0),
        });
    }

    Scene {
        objects: b.objects,
        ambient: 0.35,
        lights,
        fog: FOG,
        sparkles: sparkles(frame, chamber),
    }
}

/// Explosion particles, reproducible for a given crank degree
fn sparkles(frame: &EngineFrame, chamber: Vec3) -> Vec<Sparkle> {
    if frame.stroke != Stroke::Power {
        return Vec::new();
    }
    let seed = frame.cycle_angle.to_degrees().floor() as u64;
    let mut rng = StdRng::seed_from_u64(seed);
    let spread = [PISTON_RADIUS * 1.2, frame.gas_height * 0.8, PISTON_RADIUS * 1.2];
    (0..SPARKLE_COUNT)
        .map(|_| {
            let offset: [f64; 3] = [
                rng.gen_range(-0.5..0.5) * spread[0],
                rng.gen_range(-0.5..0.5) * spread[1],
                rng.gen_range(-0.5..0.5) * spread[2],
            ];
            Sparkle {
                position: add(&chamber, &offset),
                color: frame.gas.color,
                opacity: frame.gas.opacity,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn frame(deg: f64) -> EngineFrame {
        EngineFrame::at(deg.to_radians())
    }

    #[test]
    fn child_composes_rotation_then_translation() {
        let parent = Transform::at(1.0, 0.0, 0.0).rotated(rotation_z(FRAC_PI_2));
        let child = parent.child(Transform::at(0.0, 2.0, 0.0));
        // local +y turned to -x by the parent
        assert_abs_diff_eq!(child.translation[0], -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(child.translation[1], 0.0, epsilon = 1e-12);
        let p = child.apply_point(&[0.0, 1.0, 0.0]);
        assert_abs_diff_eq!(p[0], -2.0, epsilon = 1e-12);
    }

    #[test]
    fn scaled_normals_stay_unit() {
        let t = Transform::default().scaled([1.0, 0.1, 1.0]);
        let n = t.apply_normal(&[0.0, 1.0, 0.0]);
        assert_abs_diff_eq!(n[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn rod_end_tracks_crank_pin() {
        let meshes = MeshLibrary::new();
        for deg in [0.0, 45.0, 130.0, 400.0, 610.0] {
            let f = frame(deg);
            let scene = build(&f, None, &meshes);
            let bearing = scene
                .objects
                .iter()
                .find(|o| std::ptr::eq(o.mesh, &meshes.rod_bearing))
                .unwrap();
            let pin = scene
                .objects
                .iter()
                .find(|o| std::ptr::eq(o.mesh, &meshes.crank_pin))
                .unwrap();
            assert_abs_diff_eq!(bearing.transform.translation[0], pin.transform.translation[0], epsilon = 1e-9);
            assert_abs_diff_eq!(bearing.transform.translation[1], pin.transform.translation[1], epsilon = 1e-9);
        }
    }

    #[test]
    fn every_part_is_in_the_scene() {
        let meshes = MeshLibrary::new();
        let scene = build(&frame(100.0), None, &meshes);
        for part in Part::ALL {
            assert!(scene.objects.iter().any(|o| o.part == Some(part)), "{part:?} missing");
        }
    }

    #[test]
    fn hovered_part_is_highlighted() {
        let meshes = MeshLibrary::new();
        let scene = build(&frame(100.0), Some(Part::Rod), &meshes);
        let rod = scene.objects.iter().filter(|o| o.part == Some(Part::Rod));
        for o in rod {
            assert_eq!(o.material.color, HIGHLIGHT);
        }
        let head = scene.objects.iter().find(|o| o.part == Some(Part::Head)).unwrap();
        assert_ne!(head.material.color, HIGHLIGHT);
    }

    #[test]
    fn translucent_objects_come_last() {
        let meshes = MeshLibrary::new();
        let scene = build(&frame(200.0), None, &meshes);
        let first_translucent = scene
            .objects
            .iter()
            .position(|o| o.material.is_translucent())
            .unwrap();
        assert!(scene.objects[first_translucent..]
            .iter()
            .all(|o| o.material.is_translucent()));
    }

    #[test]
    fn intake_valve_drops_while_open() {
        let meshes = MeshLibrary::new();
        let closed = build(&frame(0.0), None, &meshes);
        let open = build(&frame(90.0), None, &meshes);
        let stem_y = |s: &Scene<'_>| {
            s.objects
                .iter()
                .find(|o| o.part == Some(Part::IntakeValve))
                .unwrap()
                .transform
                .translation[1]
        };
        assert_abs_diff_eq!(stem_y(&closed) - stem_y(&open), 0.4, epsilon = 1e-9);
    }

    #[test]
    fn sparkles_only_in_power_and_reproducible() {
        assert!(sparkles(&frame(100.0), [0.0; 3]).is_empty());
        let a = sparkles(&frame(450.0), [0.0; 3]);
        let b = sparkles(&frame(450.0), [0.0; 3]);
        assert_eq!(a.len(), SPARKLE_COUNT);
        assert_eq!(a, b);
    }

    #[test]
    fn power_stroke_adds_explosion_light() {
        let meshes = MeshLibrary::new();
        assert_eq!(build(&frame(100.0), None, &meshes).lights.len(), 3);
        let power = build(&frame(450.0), None, &meshes);
        assert_eq!(power.lights.len(), 4);
        assert_eq!(power.lights[3].range, Some(6.0));
        assert!(power.lights[..3].iter().all(|l| l.range.is_none()));
        // spark light on top of the explosion light
        assert_eq!(build(&frame(362.0), None, &meshes).lights.len(), 5);
        assert_eq!(power.fog, FOG);
    }
}
