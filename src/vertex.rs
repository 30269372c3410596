/// Vertex structure with world position, screen position, depth, and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: [f64; 3],
    pub screen_position: [f64; 2],
    /// Distance along the camera's view axis
    pub depth: f64,
    pub normal: [f64; 3],
}
