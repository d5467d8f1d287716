use glam::Vec3;
use glow::HasContext;

pub const VERTEX_COUNT: usize = 12;

const PRIMARY: [Vec3; VERTEX_COUNT] = [
    // bottom right
    Vec3::new(0.0, -1.0, 0.0),
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, -1.0, 0.0),
    // top right
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    // top left
    Vec3::new(0.0, 1.0, 0.0),
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(-1.0, 1.0, 0.0),
    // bottom left
    Vec3::new(-1.0, 0.0, 0.0),
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(-1.0, -1.0, 0.0),
];

const ALTERNATE: [Vec3; VERTEX_COUNT] = [
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(-1.0, 1.0, 0.0),
    Vec3::new(1.0, -1.0, 0.0),
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(-1.0, -1.0, 0.0),
    Vec3::new(-1.0, 0.5, 0.0),
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(-1.0, -0.5, 0.0),
    Vec3::new(1.0, 0.5, 0.0),
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, -0.5, 0.0),
];

/// Which of the two fixed triangle layouts is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriangleSet {
    /// Four triangles fanning out into the quadrants
    #[default]
    Primary,
    /// Shown while the shape key is held
    Alternate,
}

impl TriangleSet {
    pub fn vertices(self) -> &'static [Vec3; VERTEX_COUNT] {
        match self {
            TriangleSet::Primary => &PRIMARY,
            TriangleSet::Alternate => &ALTERNATE,
        }
    }

    pub fn as_bytes(self) -> &'static [u8] {
        bytemuck::cast_slice(self.vertices())
    }
}

/// One VAO/VBO pair, allocated once and rewritten in place when the set changes
pub struct TriangleMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    uploaded: TriangleSet,
}

impl TriangleMesh {
    pub fn new(gl: &glow::Context, initial: TriangleSet) -> Result<Self, String> {
        unsafe {
            let vao = gl.create_vertex_array()?;
            let vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(e) => {
                    gl.delete_vertex_array(vao);
                    return Err(e);
                }
            };

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, initial.as_bytes(), glow::DYNAMIC_DRAW);

            // attribute 0: tightly packed vec3 position
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, 0, 0);

            gl.bind_vertex_array(None);

            Ok(Self {
                vao,
                vbo,
                uploaded: initial,
            })
        }
    }

    /// Rewrites the buffer contents if `set` differs from what is on the GPU.
    /// Returns whether an upload happened.
    pub fn upload(&mut self, gl: &glow::Context, set: TriangleSet) -> bool {
        if set == self.uploaded {
            return false;
        }
        unsafe {
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            gl.buffer_sub_data_u8_slice(glow::ARRAY_BUFFER, 0, set.as_bytes());
        }
        log::debug!("Uploaded {:?} triangle set", set);
        self.uploaded = set;
        true
    }

    pub fn draw(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_arrays(glow::TRIANGLES, 0, VERTEX_COUNT as i32);
            gl.bind_vertex_array(None);
        }
    }

    pub fn destroy(self, gl: &glow::Context) {
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
        }
    }
}
