pub mod backend;
pub mod mesh;
pub mod pipeline;
pub mod shaders;

pub use backend::{ShaderBackend, StageKind};
pub use pipeline::Renderer;
pub use shaders::{LinkedProgram, ShaderError, ShaderProgramBuilder};
