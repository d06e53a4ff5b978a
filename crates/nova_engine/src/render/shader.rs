//! Shader program management
//!
//! A [`Shader`] owns the source paths for two or three stages and the program
//! linked from them. Compilation reads every stage from disk, compiles all of them
//! so that every broken stage is reported at once, and only links when all stages
//! compiled. Recompiling a linked shader releases the old program first.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use super::device::{GraphicsDevice, ProgramHandle, ShaderStage};

/// Source files for one program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderPaths {
    /// Vertex stage source
    pub vertex: String,
    /// Optional geometry stage source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<String>,
    /// Fragment stage source
    pub fragment: String,
}

impl ShaderPaths {
    /// Vertex + fragment program
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            geometry: None,
            fragment: fragment.into(),
        }
    }

    /// Vertex + geometry + fragment program
    pub fn with_geometry(
        vertex: impl Into<String>,
        geometry: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Self {
        Self {
            vertex: vertex.into(),
            geometry: Some(geometry.into()),
            fragment: fragment.into(),
        }
    }

    /// Stages to build, in pipeline order. An empty geometry path is skipped.
    pub fn stages(&self) -> Vec<(ShaderStage, &str)> {
        let mut stages = vec![(ShaderStage::Vertex, self.vertex.as_str())];
        if let Some(geometry) = self.geometry.as_deref().filter(|p| !p.is_empty()) {
            stages.push((ShaderStage::Geometry, geometry));
        }
        stages.push((ShaderStage::Fragment, self.fragment.as_str()));
        stages
    }
}

/// Lifecycle of a shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderState {
    /// Never compiled
    Uninitialized,
    /// Last compile produced a linked program
    Linked,
    /// Last compile failed; no program
    Failed,
}

/// One compile, link or read failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderDiagnostic {
    /// Failing stage, `None` for link errors
    pub stage: Option<ShaderStage>,
    /// Driver log or IO error text
    pub message: String,
}

impl std::fmt::Display for ShaderDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.stage {
            Some(stage) => write!(f, "[{stage}] {}", self.message),
            None => write!(f, "[link] {}", self.message),
        }
    }
}

/// Shader errors
#[derive(Error, Debug, Clone)]
pub enum ShaderError {
    /// Compile requested before any paths were set
    #[error("Shader '{0}' has no source paths")]
    NoSources(String),

    /// At least one stage failed to read, compile or link
    #[error("Shader '{name}' failed to build ({} diagnostics)", .diagnostics.len())]
    Build {
        /// Shader name
        name: String,
        /// Everything that went wrong
        diagnostics: Vec<ShaderDiagnostic>,
    },
}

/// Compiled shader program
#[derive(Debug)]
pub struct Shader {
    name: String,
    paths: Option<ShaderPaths>,
    program: ProgramHandle,
    state: ShaderState,
    diagnostics: Vec<ShaderDiagnostic>,
}

impl Shader {
    /// Empty shader with no sources
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            paths: None,
            program: ProgramHandle::INVALID,
            state: ShaderState::Uninitialized,
            diagnostics: Vec::new(),
        }
    }

    /// Shader with sources set, not yet compiled
    pub fn with_paths(name: impl Into<String>, paths: ShaderPaths) -> Self {
        let mut shader = Self::new(name);
        shader.paths = Some(paths);
        shader
    }

    /// Display name used in logs and reports
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source paths, if set
    pub fn paths(&self) -> Option<&ShaderPaths> {
        self.paths.as_ref()
    }

    /// Replace the source paths. Takes effect on the next compile.
    pub fn set_paths(&mut self, paths: ShaderPaths) {
        self.paths = Some(paths);
    }

    /// Linked program, or [`ProgramHandle::INVALID`] unless the last compile succeeded
    pub fn program(&self) -> ProgramHandle {
        if self.state == ShaderState::Linked {
            self.program
        } else {
            ProgramHandle::INVALID
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ShaderState {
        self.state
    }

    /// Whether a usable program is present
    pub fn is_linked(&self) -> bool {
        self.state == ShaderState::Linked
    }

    /// Diagnostics from the last compile
    pub fn diagnostics(&self) -> &[ShaderDiagnostic] {
        &self.diagnostics
    }

    /// Build (or rebuild) the program from the current paths
    pub fn compile(&mut self, device: &mut dyn GraphicsDevice) -> Result<ProgramHandle, ShaderError> {
        let Some(paths) = self.paths.clone() else {
            log::error!("Shader '{}' compiled without source paths", self.name);
            return Err(ShaderError::NoSources(self.name.clone()));
        };

        self.release(device);
        self.diagnostics.clear();

        log::info!("Compiling shader '{}'", self.name);
        let mut compiled = Vec::new();
        for (stage, path) in paths.stages() {
            log::debug!("  {stage}: {path}");

            let source = match std::fs::read_to_string(path) {
                Ok(source) => source,
                Err(e) => {
                    self.diagnostics.push(ShaderDiagnostic {
                        stage: Some(stage),
                        message: format!("failed to read {path}: {e}"),
                    });
                    continue;
                }
            };

            match device.compile_stage(stage, &source) {
                Ok(handle) => compiled.push(handle),
                Err(message) => self.diagnostics.push(ShaderDiagnostic {
                    stage: Some(stage),
                    message,
                }),
            }
        }

        if self.diagnostics.is_empty() {
            match device.link_program(&compiled) {
                Ok(program) => self.program = program,
                Err(message) => self.diagnostics.push(ShaderDiagnostic { stage: None, message }),
            }
        }

        for handle in compiled {
            device.delete_stage(handle);
        }

        if self.diagnostics.is_empty() {
            self.state = ShaderState::Linked;
            log::info!("Shader '{}' linked as program {}", self.name, self.program.0);
            Ok(self.program)
        } else {
            for diagnostic in &self.diagnostics {
                log::error!("Shader '{}': {}", self.name, diagnostic);
            }
            self.state = ShaderState::Failed;
            self.program = ProgramHandle::INVALID;
            Err(ShaderError::Build {
                name: self.name.clone(),
                diagnostics: self.diagnostics.clone(),
            })
        }
    }

    /// Delete the GPU program. The shader keeps its paths and can be compiled again.
    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) {
        self.release(device);
        self.state = ShaderState::Uninitialized;
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if self.program.is_valid() {
            log::debug!("Deleting program {} of shader '{}'", self.program.0, self.name);
            device.delete_program(self.program);
            self.program = ProgramHandle::INVALID;
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    use super::ShaderPaths;

    /// Minimal valid vertex stage
    pub const VERTEX: &str = "#version 330 core\nlayout (location = 0) in vec3 aPos;\nvoid main() {\n    gl_Position = vec4(aPos, 1.0);\n}\n";

    /// Minimal valid fragment stage
    pub const FRAGMENT: &str = "#version 330 core\nout vec4 FragColor;\nvoid main() {\n    FragColor = vec4(1.0);\n}\n";

    /// Fragment stage with a missing closing brace
    pub const BROKEN_FRAGMENT: &str = "#version 330 core\nout vec4 FragColor;\nvoid main() {\n    FragColor = vec4(1.0);\n";

    /// Write `source` into a unique temp file and return its path
    pub fn write_temp(tag: &str, source: &str) -> String {
        static COUNTER: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let path: PathBuf = std::env::temp_dir()
            .join(format!("nova_shader_{}_{}_{}.glsl", std::process::id(), n, tag));
        std::fs::write(&path, source).unwrap();
        path.to_string_lossy().into_owned()
    }

    /// Paths of a valid vertex + fragment program on disk
    pub fn valid_paths(tag: &str) -> ShaderPaths {
        ShaderPaths::new(
            write_temp(&format!("{tag}_vs"), VERTEX),
            write_temp(&format!("{tag}_fs"), FRAGMENT),
        )
    }
}
