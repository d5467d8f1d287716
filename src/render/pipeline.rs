use crate::config::{DemoConfig, ShaderPaths};
use crate::input::KeyState;
use crate::render::backend::{ShaderBackend, StageKind};
use crate::render::mesh::{TriangleMesh, TriangleSet};
use crate::render::shaders::{embedded, LinkedProgram, ShaderError, ShaderProgramBuilder, ShaderSource};
use glow::HasContext;
use log::{error, info, warn};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error("Failed to allocate vertex buffers: {0}")]
    Mesh(String),
}

/// Builds the program from the configured files, falling back to the
/// embedded shaders when either file cannot be read.
pub fn load_program<B: ShaderBackend>(
    backend: &B,
    paths: &ShaderPaths,
) -> Result<LinkedProgram<B::Program>, ShaderError> {
    let builder = ShaderProgramBuilder::new(backend);
    match builder.build(&paths.vertex, &paths.fragment) {
        Err(err @ (ShaderError::FileNotFound { .. } | ShaderError::Io { .. })) => {
            error!("{}", err);
            warn!("Falling back to embedded shaders");
            builder.build_from_sources(
                &ShaderSource::inline(StageKind::Vertex, embedded::VERTEX_SRC),
                &ShaderSource::inline(StageKind::Fragment, embedded::FRAGMENT_SRC),
            )
        }
        other => other,
    }
}

pub struct Renderer {
    gl: Arc<glow::Context>,
    program: LinkedProgram<glow::Program>,
    mesh: Option<TriangleMesh>,
}

impl Renderer {
    /// The GL context behind `gl` must be current.
    pub fn new(gl: Arc<glow::Context>, config: &DemoConfig) -> Result<Self, RenderError> {
        let program = load_program(gl.as_ref(), &config.shaders)?;
        if !program.is_usable() {
            error!("Shader program is not usable, triangles will not be drawn");
        }

        let mesh = match TriangleMesh::new(&gl, TriangleSet::default()) {
            Ok(mesh) => mesh,
            Err(e) => {
                program.delete(gl.as_ref());
                return Err(RenderError::Mesh(e));
            }
        };

        let [r, g, b, a] = config.clear_color;
        unsafe {
            gl.clear_color(r, g, b, a);
        }

        info!("Renderer ready");
        Ok(Self {
            gl,
            program,
            mesh: Some(mesh),
        })
    }

    pub fn resize(&self, width: u32, height: u32) {
        unsafe {
            self.gl.viewport(0, 0, width as i32, height as i32);
        }
    }

    pub fn render(&mut self, keys: &KeyState) {
        let gl = &self.gl;
        unsafe {
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let Some(handle) = self.program.usable_handle() else {
            return;
        };
        let Some(mesh) = self.mesh.as_mut() else {
            return;
        };

        mesh.upload(gl, keys.triangle_set());
        unsafe {
            gl.use_program(Some(handle));
        }
        mesh.draw(gl);
        unsafe {
            gl.use_program(None);
        }
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Some(mesh) = self.mesh.take() {
            mesh.destroy(&self.gl);
        }
        if let Some(handle) = self.program.handle() {
            unsafe { HasContext::delete_program(self.gl.as_ref(), handle) };
        }
    }
}
