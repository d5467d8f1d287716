pub mod config;
pub mod input;
pub mod render;

// Re-export commonly used types
pub use config::core::DemoConfig;
pub use input::KeyState;
pub use render::mesh::{TriangleMesh, TriangleSet};
pub use render::pipeline::{load_program, RenderError, Renderer};
pub use render::shaders::{LinkedProgram, ShaderError, ShaderProgramBuilder, ShaderSource, StageReport};
pub use render::backend::{ShaderBackend, StageKind};
