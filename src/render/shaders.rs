// shaders.rs - Vertex/fragment program building

use crate::render::backend::{ShaderBackend, StageKind};
use log::{info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("Impossible to open {}: {source}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to create {} stage: {reason}", .kind.name())]
    CreateStage { kind: StageKind, reason: String },
    #[error("Failed to create program: {0}")]
    CreateProgram(String),
}

/// Source text of one stage, alive only for the duration of a build
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub kind: StageKind,
    pub path: Option<PathBuf>,
    pub text: String,
}

impl ShaderSource {
    pub fn read(kind: StageKind, path: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let path = path.as_ref().to_path_buf();
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Self {
                kind,
                path: Some(path),
                text,
            }),
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                Err(ShaderError::FileNotFound { path, source })
            }
            Err(source) => Err(ShaderError::Io { path, source }),
        }
    }

    pub fn inline(kind: StageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            path: None,
            text: text.into(),
        }
    }

    fn label(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => format!("<embedded {}>", self.kind.name()),
        }
    }
}

/// Status of one compiled stage. The stage object itself never outlives the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub kind: StageKind,
    pub compiled: bool,
    pub log: Option<String>,
}

/// Program object produced by a build, plus everything the driver said about it.
///
/// The caller owns the handle and must release it with
/// [`LinkedProgram::delete`] (or `delete_program` on the backend).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedProgram<P> {
    handle: Option<P>,
    pub vertex: StageReport,
    pub fragment: StageReport,
    pub linked: bool,
    pub link_log: Option<String>,
}

impl<P: Copy> LinkedProgram<P> {
    /// Raw handle, present whenever the driver created a program object,
    /// even if compilation or linking failed.
    pub fn handle(&self) -> Option<P> {
        self.handle
    }

    pub fn is_usable(&self) -> bool {
        self.handle.is_some() && self.vertex.compiled && self.fragment.compiled && self.linked
    }

    pub fn usable_handle(&self) -> Option<P> {
        if self.is_usable() {
            self.handle
        } else {
            None
        }
    }

    pub fn delete<B>(self, backend: &B)
    where
        B: ShaderBackend<Program = P>,
    {
        if let Some(handle) = self.handle {
            backend.delete_program(handle);
        }
    }
}

pub struct ShaderProgramBuilder<'a, B: ShaderBackend> {
    backend: &'a B,
}

impl<'a, B: ShaderBackend> ShaderProgramBuilder<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Reads both stage files, then compiles and links them.
    ///
    /// Both files are read before any driver object is created, so a missing
    /// file never leaves stages behind. Compile and link failures do not
    /// abort the build; check [`LinkedProgram::is_usable`].
    pub fn build(
        &self,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<LinkedProgram<B::Program>, ShaderError> {
        let vertex = ShaderSource::read(StageKind::Vertex, vertex_path)?;
        let fragment = ShaderSource::read(StageKind::Fragment, fragment_path)?;
        self.build_from_sources(&vertex, &fragment)
    }

    pub fn build_from_sources(
        &self,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
    ) -> Result<LinkedProgram<B::Program>, ShaderError> {
        let (vertex_stage, vertex_report) = self.compile_stage(vertex)?;
        let (fragment_stage, fragment_report) = match self.compile_stage(fragment) {
            Ok(compiled) => compiled,
            Err(err) => {
                self.backend.delete_stage(vertex_stage);
                return Err(err);
            }
        };

        info!("Linking program");
        let program = match self.backend.create_program() {
            Ok(program) => program,
            Err(reason) => {
                self.backend.delete_stage(vertex_stage);
                self.backend.delete_stage(fragment_stage);
                return Err(ShaderError::CreateProgram(reason));
            }
        };

        self.backend.attach(program, vertex_stage);
        self.backend.attach(program, fragment_stage);
        self.backend.link(program);

        let linked = self.backend.link_status(program);
        let link_log = non_empty(self.backend.program_log(program));
        if let Some(text) = &link_log {
            surface("program link", linked, text);
        }

        self.backend.detach(program, vertex_stage);
        self.backend.detach(program, fragment_stage);
        self.backend.delete_stage(vertex_stage);
        self.backend.delete_stage(fragment_stage);

        Ok(LinkedProgram {
            handle: Some(program),
            vertex: vertex_report,
            fragment: fragment_report,
            linked,
            link_log,
        })
    }

    fn compile_stage(&self, source: &ShaderSource) -> Result<(B::Stage, StageReport), ShaderError> {
        let label = source.label();
        info!("Compiling shader : {}", label);

        let stage = self
            .backend
            .create_stage(source.kind)
            .map_err(|reason| ShaderError::CreateStage {
                kind: source.kind,
                reason,
            })?;
        self.backend.set_source(stage, &source.text);
        self.backend.compile(stage);

        let compiled = self.backend.compile_status(stage);
        let log = non_empty(self.backend.stage_log(stage));
        if let Some(text) = &log {
            surface(&label, compiled, text);
        }

        Ok((
            stage,
            StageReport {
                kind: source.kind,
                compiled,
                log,
            },
        ))
    }
}

fn non_empty(log: String) -> Option<String> {
    let trimmed = log.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn surface(what: &str, ok: bool, text: &str) {
    if ok {
        info!("{}:\n{}", what, text);
    } else {
        warn!("{} failed:\n{}", what, text);
    }
}

/// Shaders compiled into the binary, used when the configured files are missing
pub mod embedded {
    pub const VERTEX_SRC: &str = r#"#version 330 core
layout(location = 0) in vec3 vertexPosition_modelspace;

void main() {
    gl_Position.xyz = vertexPosition_modelspace;
    gl_Position.w = 1.0;
}
"#;

    pub const FRAGMENT_SRC: &str = r#"#version 330 core
out vec3 color;

void main() {
    color = vec3(1, 0, 0);
}
"#;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::recording::RecordingBackend;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn shader_file(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_build_success() {
        let backend = RecordingBackend::new();
        let vs = shader_file(embedded::VERTEX_SRC);
        let fs = shader_file(embedded::FRAGMENT_SRC);

        let program = ShaderProgramBuilder::new(&backend)
            .build(vs.path(), fs.path())
            .unwrap();

        assert!(program.is_usable());
        assert!(program.vertex.compiled && program.fragment.compiled && program.linked);
        assert_eq!(program.vertex.log, None);
        assert_eq!(program.link_log, None);
        assert!(program.usable_handle().is_some());
    }

    #[test]
    fn test_vertex_syntax_error_keeps_fragment_status() {
        let backend = RecordingBackend::new();
        let vs = shader_file("#version 330 core\nvoid mian( {");
        let fs = shader_file(embedded::FRAGMENT_SRC);

        let program = ShaderProgramBuilder::new(&backend)
            .build(vs.path(), fs.path())
            .unwrap();

        assert!(!program.vertex.compiled);
        assert!(program.vertex.log.as_deref().is_some_and(|l| l.contains("error")));
        assert!(program.fragment.compiled);
        assert!(!program.linked);
        assert!(program.link_log.is_some());
        assert!(!program.is_usable());
        // Legacy callers still get the (unusable) program object
        assert!(program.handle().is_some());
        assert_eq!(program.usable_handle(), None);
    }

    #[test]
    fn test_missing_vertex_file() {
        let backend = RecordingBackend::new();
        let dir = TempDir::new().unwrap();
        let fragment = dir.path().join("never_opened.frag");

        let err = ShaderProgramBuilder::new(&backend)
            .build(dir.path().join("missing.vert"), &fragment)
            .unwrap_err();

        match err {
            ShaderError::FileNotFound { path, .. } => assert!(path.ends_with("missing.vert")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(backend.calls.borrow().is_empty());
    }

    #[test]
    fn test_missing_fragment_file_fails_too() {
        let backend = RecordingBackend::new();
        let vs = shader_file(embedded::VERTEX_SRC);
        let dir = TempDir::new().unwrap();

        let err = ShaderProgramBuilder::new(&backend)
            .build(vs.path(), dir.path().join("missing.frag"))
            .unwrap_err();

        assert!(matches!(err, ShaderError::FileNotFound { .. }));
        assert!(err.to_string().contains("missing.frag"));
        assert!(backend.calls.borrow().is_empty());
    }

    #[test]
    fn test_stages_released_regardless_of_outcome() {
        let backend = RecordingBackend::new();
        let builder = ShaderProgramBuilder::new(&backend);

        let good = builder
            .build_from_sources(
                &ShaderSource::inline(StageKind::Vertex, embedded::VERTEX_SRC),
                &ShaderSource::inline(StageKind::Fragment, embedded::FRAGMENT_SRC),
            )
            .unwrap();
        let bad = builder
            .build_from_sources(
                &ShaderSource::inline(StageKind::Vertex, "garbage"),
                &ShaderSource::inline(StageKind::Fragment, "more garbage"),
            )
            .unwrap();

        assert_eq!(backend.live_stages(), 0);
        assert_eq!(backend.live_programs().len(), 2);
        assert_eq!(backend.attached_to(good.handle().unwrap()), 0);
        assert_eq!(backend.attached_to(bad.handle().unwrap()), 0);

        good.delete(&backend);
        bad.delete(&backend);
        assert!(backend.live_programs().is_empty());
    }

    #[test]
    fn test_detach_and_delete_follow_link() {
        let backend = RecordingBackend::new();
        ShaderProgramBuilder::new(&backend)
            .build_from_sources(
                &ShaderSource::inline(StageKind::Vertex, embedded::VERTEX_SRC),
                &ShaderSource::inline(StageKind::Fragment, embedded::FRAGMENT_SRC),
            )
            .unwrap();

        let calls = backend.calls.borrow();
        let tail: Vec<_> = calls.iter().rev().take(5).rev().copied().collect();
        assert_eq!(tail, ["link", "detach", "detach", "delete_stage", "delete_stage"]);
    }

    #[test]
    fn test_repeated_builds_are_independent() {
        let backend = RecordingBackend::new();
        let vs = shader_file(embedded::VERTEX_SRC);
        let fs = shader_file(embedded::FRAGMENT_SRC);
        let builder = ShaderProgramBuilder::new(&backend);

        let first = builder.build(vs.path(), fs.path()).unwrap();
        let second = builder.build(vs.path(), fs.path()).unwrap();

        assert_ne!(first.handle(), second.handle());
        assert!(first.is_usable() && second.is_usable());
        assert_eq!(first.vertex, second.vertex);
        assert_eq!(
            backend.calls.borrow().iter().filter(|c| **c == "create_stage").count(),
            4
        );
    }

    #[test]
    fn test_warning_surfaced_on_success() {
        let backend = RecordingBackend::new();
        let vertex = format!("{}// warn\n", embedded::VERTEX_SRC);

        let program = ShaderProgramBuilder::new(&backend)
            .build_from_sources(
                &ShaderSource::inline(StageKind::Vertex, vertex),
                &ShaderSource::inline(StageKind::Fragment, embedded::FRAGMENT_SRC),
            )
            .unwrap();

        assert!(program.is_usable());
        assert_eq!(
            program.vertex.log.as_deref(),
            Some("0:2(1): warning: extension directive ignored")
        );
        assert_eq!(program.fragment.log, None);
    }

    #[test]
    fn test_program_creation_failure_releases_stages() {
        let backend = RecordingBackend::new();
        backend.fail_program_creation.set(true);

        let err = ShaderProgramBuilder::new(&backend)
            .build_from_sources(
                &ShaderSource::inline(StageKind::Vertex, embedded::VERTEX_SRC),
                &ShaderSource::inline(StageKind::Fragment, embedded::FRAGMENT_SRC),
            )
            .unwrap_err();

        assert!(matches!(err, ShaderError::CreateProgram(_)));
        assert_eq!(backend.live_stages(), 0);
    }

    #[test]
    fn test_fragment_stage_creation_failure_releases_vertex() {
        let backend = RecordingBackend::new();
        backend.fail_stage_after.set(Some(1));

        let err = ShaderProgramBuilder::new(&backend)
            .build_from_sources(
                &ShaderSource::inline(StageKind::Vertex, embedded::VERTEX_SRC),
                &ShaderSource::inline(StageKind::Fragment, embedded::FRAGMENT_SRC),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            ShaderError::CreateStage {
                kind: StageKind::Fragment,
                ..
            }
        ));
        assert_eq!(backend.live_stages(), 0);
        assert!(backend.live_programs().is_empty());
        assert!(!backend.calls.borrow().contains(&"create_program"));
    }

    #[test]
    fn test_unreadable_vertex_file_is_io_error() {
        let backend = RecordingBackend::new();
        let vs = NamedTempFile::new().unwrap();
        std::fs::write(vs.path(), [0xff, 0xfe, 0x00, 0xc3]).unwrap();
        let fs = shader_file(embedded::FRAGMENT_SRC);

        let err = ShaderProgramBuilder::new(&backend)
            .build(vs.path(), fs.path())
            .unwrap_err();

        match err {
            ShaderError::Io { path, .. } => assert_eq!(path, vs.path()),
            other => panic!("unexpected error: {other}"),
        }
        assert!(backend.calls.borrow().is_empty());
    }
}
