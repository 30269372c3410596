use crate::camera::OrbitCamera;
use crate::color::Rgb;
use crate::driver::FpsCounter;
use crate::graphics::{draw_line, draw_triangle, Framebuffer, Lighting};
use crate::kinematics::EngineFrame;
use crate::math::{dot, sub};
use crate::part::Part;
use crate::scene::{self, MeshLibrary, Scene, SceneObject, BACKGROUND};
use crate::state::AppState;
use crate::term::{Cell, CellBuffer};
use crate::ui::Rect;
use crate::vertex::Vertex;
use crossterm::style::Color;
use tracing::trace;

/// Orbit sensitivity per terminal cell dragged
const ORBIT_PER_COLUMN: f64 = 0.04;
const ORBIT_PER_ROW: f64 = 0.08;
/// Distance factor per wheel notch
pub const ZOOM_STEP: f64 = 0.9;

/// Projects every vertex of `object` for a `width × height` pixel target.
/// Vertices behind the near plane come back as `None`.
fn project_object(
    object: &SceneObject<'_>,
    camera: &OrbitCamera,
    width: f64,
    height: f64,
) -> Vec<Option<Vertex>> {
    let mesh = object.mesh;
    mesh.positions
        .iter()
        .zip(mesh.normals.iter())
        .map(|(position, normal)| {
            let position = object.transform.apply_point(position);
            let normal = object.transform.apply_normal(normal);
            camera
                .project(&position, width, height)
                .map(|(screen_position, depth)| Vertex {
                    position,
                    screen_position,
                    depth,
                    normal,
                })
        })
        .collect()
}

fn draw_object(
    object: &SceneObject<'_>,
    vertices: &[Option<Vertex>],
    fb: &mut Framebuffer,
    lighting: &Lighting,
    wireframe: bool,
) {
    if wireframe {
        let alpha = object.material.opacity;
        for &[a, b] in &object.mesh.edges {
            if let (Some(v0), Some(v1)) = (&vertices[a], &vertices[b]) {
                draw_line(
                    v0.screen_position[0],
                    v0.screen_position[1],
                    v1.screen_position[0],
                    v1.screen_position[1],
                    fb,
                    object.material.color,
                    alpha,
                    object.part.filter(|_| alpha >= 1.0),
                );
            }
        }
        return;
    }
    for &[a, b, c] in &object.mesh.triangles {
        if let (Some(v0), Some(v1), Some(v2)) = (&vertices[a], &vertices[b], &vertices[c]) {
            draw_triangle(v0, v1, v2, fb, lighting, &object.material, object.part);
        }
    }
}

/// Rasterizes the scene: opaque geometry first, then translucent geometry back
/// to front, then outlines and particles.
pub fn rasterize(
    scene: &Scene<'_>,
    camera: &OrbitCamera,
    width: usize,
    height: usize,
    wireframe: bool,
) -> Framebuffer {
    let mut fb = Framebuffer::new(width, height, BACKGROUND);
    if width == 0 || height == 0 {
        return fb;
    }
    let (w, h) = (width as f64, height as f64);
    let eye = camera.eye();
    let lighting = Lighting {
        ambient: scene.ambient,
        lights: scene.lights.clone(),
        eye,
        fog: Some(scene.fog),
    };

    let projected: Vec<Vec<Option<Vertex>>> = scene
        .objects
        .iter()
        .map(|o| project_object(o, camera, w, h))
        .collect();

    let (opaque, mut translucent): (Vec<usize>, Vec<usize>) =
        (0..scene.objects.len()).partition(|&i| !scene.objects[i].material.is_translucent());
    let forward = sub(&camera.target, &eye);
    let view_depth = |i: usize| dot(&sub(&scene.objects[i].transform.translation, &eye), &forward);
    translucent.sort_by(|&a, &b| view_depth(b).total_cmp(&view_depth(a)));

    for i in opaque.into_iter().chain(translucent) {
        draw_object(&scene.objects[i], &projected[i], &mut fb, &lighting, wireframe);
    }

    for (object, vertices) in scene.objects.iter().zip(&projected) {
        let Some((color, alpha)) = object.outline else {
            continue;
        };
        for &[a, b] in &object.mesh.edges {
            if let (Some(v0), Some(v1)) = (&vertices[a], &vertices[b]) {
                draw_line(
                    v0.screen_position[0],
                    v0.screen_position[1],
                    v1.screen_position[0],
                    v1.screen_position[1],
                    &mut fb,
                    color,
                    alpha,
                    None,
                );
            }
        }
    }

    for sparkle in &scene.sparkles {
        if let Some((p, depth)) = camera.project(&sparkle.position, w, h) {
            fb.plot(p[0], p[1], depth, sparkle.color, sparkle.opacity);
        }
    }
    fb
}

/// Copies a framebuffer into cells, two pixels per cell stacked with `▀`
pub fn to_cells(fb: &Framebuffer, buf: &mut CellBuffer, area: Rect) {
    for row in 0..area.height {
        for col in 0..area.width {
            let top = fb.pixel(col, row * 2).unwrap_or(BACKGROUND);
            let bottom = fb.pixel(col, row * 2 + 1).unwrap_or(BACKGROUND);
            buf.set(
                area.x + col,
                area.y + row,
                Cell {
                    ch: '▀',
                    fg: top.into(),
                    bg: bottom.into(),
                },
            );
        }
    }
}

/// 3D engine view
pub struct EngineWidget {
    meshes: MeshLibrary,
    fps: FpsCounter,
    /// Is the user currently dragging to orbit?
    dragging_rotation: bool,
    /// Last mouse position, in cells
    last_mouse_pos: (usize, usize),
    /// Last rendered frame, kept for picking
    framebuffer: Option<Framebuffer>,
    /// Where the last frame was drawn
    area: Rect,
}

impl Default for EngineWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineWidget {
    pub fn new() -> Self {
        EngineWidget {
            meshes: MeshLibrary::new(),
            fps: FpsCounter::default(),
            dragging_rotation: false,
            last_mouse_pos: (0, 0),
            framebuffer: None,
            area: Rect::default(),
        }
    }

    /// Renders the engine into `area` of `buf`
    pub fn paint(&mut self, buf: &mut CellBuffer, area: Rect, data: &AppState) {
        self.fps.frame();
        self.area = area;

        let frame = EngineFrame::at(data.playback.angle);
        let scene = scene::build(&frame, data.hovered, &self.meshes);
        let fb = rasterize(&scene, &data.camera, area.width, area.height * 2, data.wireframe);
        to_cells(&fb, buf, area);
        self.framebuffer = Some(fb);
        trace!(cycle = frame.cycle_angle, objects = scene.objects.len(), "painted");

        if data.debug {
            self.paint_debug(buf, area, data, &frame, &scene);
        }
    }

    fn paint_debug(
        &self,
        buf: &mut CellBuffer,
        area: Rect,
        data: &AppState,
        frame: &EngineFrame,
        scene: &Scene<'_>,
    ) {
        let lines = [
            format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            format!("Angle: {:.3} rad, cycle {:.1}°", data.playback.angle, frame.cycle_angle.to_degrees()),
            format!(
                "Stroke: {} {:.0}%",
                frame.stroke.info().title,
                frame.stroke.progress(frame.cycle_angle) * 100.0
            ),
            format!("Piston Y: {:.3}, rod {:.3} rad", frame.piston_y, frame.rod_angle),
            format!("Crank pin: ({:.2}, {:.2})", frame.crank_pin[0], frame.crank_pin[1]),
            format!(
                "Camera yaw {:.2}, polar {:.2}, distance {:.2}",
                data.camera.yaw, data.camera.polar, data.camera.distance
            ),
            format!("Objects: {}, lights: {}", scene.objects.len(), scene.lights.len()),
            format!("FPS: {:.2}", self.fps.fps()),
        ];
        for (row, line) in lines.iter().enumerate().take(area.height) {
            buf.put_str(area.x + 1, area.y + row, line, Color::White, Rgb::BLACK.into(), area.width.saturating_sub(1));
        }
    }

    /// Part under the given terminal cell in the last painted frame
    pub fn pick(&self, col: usize, row: usize) -> Option<Part> {
        let fb = self.framebuffer.as_ref()?;
        if !self.area.contains(col, row) {
            return None;
        }
        let x = col - self.area.x;
        let y = (row - self.area.y) * 2;
        fb.part_at(x, y).or_else(|| fb.part_at(x, y + 1))
    }

    /// Starts an orbit drag if the press lands in the viewport
    pub fn mouse_down(&mut self, col: usize, row: usize) -> bool {
        if self.area.contains(col, row) {
            self.dragging_rotation = true;
            self.last_mouse_pos = (col, row);
        }
        self.dragging_rotation
    }

    pub fn mouse_drag(&mut self, col: usize, row: usize, data: &mut AppState) {
        if !self.dragging_rotation {
            return;
        }
        let dx = col as f64 - self.last_mouse_pos.0 as f64;
        let dy = row as f64 - self.last_mouse_pos.1 as f64;
        // Dragging right swings the camera left around the engine
        data.camera.orbit(-dx * ORBIT_PER_COLUMN, -dy * ORBIT_PER_ROW);
        self.last_mouse_pos = (col, row);
    }

    pub fn mouse_up(&mut self) {
        self.dragging_rotation = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging_rotation
    }

    /// Wheel zoom; positive `notches` zooms in
    pub fn wheel(&mut self, notches: i32, data: &mut AppState) {
        data.camera.zoom(ZOOM_STEP.powi(notches));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn painted(state: &AppState) -> (EngineWidget, CellBuffer, Rect) {
        let mut widget = EngineWidget::new();
        let area = Rect::new(0, 0, 60, 30);
        let mut buf = CellBuffer::new(60, 30, Color::Black);
        widget.paint(&mut buf, area, state);
        (widget, buf, area)
    }

    #[test]
    fn engine_is_drawn_over_background() {
        let (_, buf, _) = painted(&AppState::default());
        let bg: Color = BACKGROUND.into();
        let drawn = (0..30)
            .flat_map(|y| (0..60).map(move |x| (x, y)))
            .filter(|&(x, y)| buf.get(x, y).is_some_and(|c| c.fg != bg))
            .count();
        assert!(drawn > 100, "only {drawn} cells drawn");
        assert_eq!(buf.get(0, 0).map(|c| c.ch), Some('▀'));
    }

    #[test]
    fn center_of_view_picks_a_part() {
        let (widget, _, area) = painted(&AppState::default());
        let hits: Vec<Part> = (0..area.height)
            .filter_map(|row| widget.pick(area.width / 2, row))
            .collect();
        assert!(hits.contains(&Part::Piston));
        assert!(hits.contains(&Part::Rod));
        assert_eq!(widget.pick(0, 0), None);
        assert_eq!(widget.pick(500, 5), None);
    }

    #[test]
    fn wireframe_still_picks() {
        let mut state = AppState::default();
        state.toggle_wireframe();
        let (widget, _, area) = painted(&state);
        let any = (0..area.height)
            .flat_map(|row| (0..area.width).map(move |col| (col, row)))
            .any(|(col, row)| widget.pick(col, row).is_some());
        assert!(any);
    }

    #[test]
    fn drag_orbits_only_after_press_in_view() {
        let mut state = AppState::default();
        let (mut widget, _, _) = painted(&state);
        let yaw = state.camera.yaw;

        widget.mouse_drag(20, 10, &mut state);
        assert_eq!(state.camera.yaw, yaw);

        assert!(widget.mouse_down(10, 10));
        widget.mouse_drag(20, 10, &mut state);
        assert_ne!(state.camera.yaw, yaw);
        widget.mouse_up();
        assert!(!widget.is_dragging());

        assert!(!widget.mouse_down(100, 10));
    }

    #[test]
    fn wheel_zooms_in_and_out() {
        let mut state = AppState::default();
        let mut widget = EngineWidget::new();
        let start = state.camera.distance;
        widget.wheel(1, &mut state);
        assert!(state.camera.distance < start);
        widget.wheel(-2, &mut state);
        assert!(state.camera.distance > start);
    }

    #[test]
    fn debug_overlay_prints_name() {
        let mut state = AppState::default();
        state.toggle_debug();
        let (_, buf, _) = painted(&state);
        assert!(buf.row_text(0).contains(env!("CARGO_PKG_NAME")));
    }
}
