// backend.rs - Driver calls the shader builder depends on

use glow::HasContext;
use std::fmt::Debug;

/// Pipeline stage a piece of shader source compiles into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl StageKind {
    pub fn gl_enum(self) -> u32 {
        match self {
            StageKind::Vertex => glow::VERTEX_SHADER,
            StageKind::Fragment => glow::FRAGMENT_SHADER,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StageKind::Vertex => "vertex",
            StageKind::Fragment => "fragment",
        }
    }
}

/// Graphics context able to compile stages and link them into programs.
///
/// Every call takes the context explicitly; nothing relies on a
/// thread-local "current" context.
pub trait ShaderBackend {
    type Stage: Copy + Eq + Debug;
    type Program: Copy + Eq + Debug;

    fn create_stage(&self, kind: StageKind) -> Result<Self::Stage, String>;
    fn set_source(&self, stage: Self::Stage, source: &str);
    fn compile(&self, stage: Self::Stage);
    fn compile_status(&self, stage: Self::Stage) -> bool;
    fn stage_log(&self, stage: Self::Stage) -> String;

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach(&self, program: Self::Program, stage: Self::Stage);
    fn link(&self, program: Self::Program);
    fn link_status(&self, program: Self::Program) -> bool;
    fn program_log(&self, program: Self::Program) -> String;

    fn detach(&self, program: Self::Program, stage: Self::Stage);
    fn delete_stage(&self, stage: Self::Stage);
    fn delete_program(&self, program: Self::Program);
}

// The context must be current on the calling thread for as long as the
// renderer holds it; glutin's PossiblyCurrentContext guarantees that in main.
impl ShaderBackend for glow::Context {
    type Stage = glow::Shader;
    type Program = glow::Program;

    fn create_stage(&self, kind: StageKind) -> Result<Self::Stage, String> {
        unsafe { self.create_shader(kind.gl_enum()) }
    }

    fn set_source(&self, stage: Self::Stage, source: &str) {
        unsafe { self.shader_source(stage, source) }
    }

    fn compile(&self, stage: Self::Stage) {
        unsafe { self.compile_shader(stage) }
    }

    fn compile_status(&self, stage: Self::Stage) -> bool {
        unsafe { self.get_shader_compile_status(stage) }
    }

    fn stage_log(&self, stage: Self::Stage) -> String {
        unsafe { self.get_shader_info_log(stage) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach(&self, program: Self::Program, stage: Self::Stage) {
        unsafe { self.attach_shader(program, stage) }
    }

    fn link(&self, program: Self::Program) {
        unsafe { self.link_program(program) }
    }

    fn link_status(&self, program: Self::Program) -> bool {
        unsafe { self.get_program_link_status(program) }
    }

    fn program_log(&self, program: Self::Program) -> String {
        unsafe { self.get_program_info_log(program) }
    }

    fn detach(&self, program: Self::Program, stage: Self::Stage) {
        unsafe { self.detach_shader(program, stage) }
    }

    fn delete_stage(&self, stage: Self::Stage) {
        unsafe { self.delete_shader(stage) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }
}
