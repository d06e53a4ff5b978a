//! Graphics device abstraction
//!
//! The engine drives a single fixed pipeline model: programs built from named
//! stages, named uniforms set per program, 2D textures bound to numbered units,
//! and indexed triangle draws. A concrete GPU binding implements
//! [`GraphicsDevice`]; [`RecordingDevice`] implements it without a GPU by
//! recording every command.

use std::any::Any;
use std::collections::{HashMap, HashSet};

use crate::assets::DecodedImage;
use crate::foundation::math::{Mat4, Vec3};

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage
    Vertex,
    /// Optional geometry stage
    Geometry,
    /// Fragment stage
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Vertex => "vertex",
            Self::Geometry => "geometry",
            Self::Fragment => "fragment",
        };
        f.write_str(name)
    }
}

/// Compiled, unlinked stage object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageHandle(pub u32);

/// Linked program object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

impl ProgramHandle {
    /// No program
    pub const INVALID: Self = Self(0);

    /// Whether this names a program object
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

/// 2D texture object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Vertex-array / vertex-buffer / index-buffer triple for an uploaded mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuMesh {
    /// Vertex array object
    pub vao: u32,
    /// Vertex buffer object
    pub vbo: u32,
    /// Element buffer object
    pub ebo: u32,
    /// Number of indices uploaded
    pub index_count: u32,
}

/// Value for a named uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// 4x4 column-major matrix
    Mat4(Mat4),
    /// 3-vector
    Vec3(Vec3),
    /// Scalar float
    Float(f32),
    /// Scalar int
    Int(i32),
}

/// Fixed-pipeline command surface
pub trait GraphicsDevice {
    /// Compile one stage. The error is the driver's info log.
    fn compile_stage(&mut self, stage: ShaderStage, source: &str) -> Result<StageHandle, String>;

    /// Link compiled stages into a program. The error is the link info log.
    fn link_program(&mut self, stages: &[StageHandle]) -> Result<ProgramHandle, String>;

    /// Release a stage object
    fn delete_stage(&mut self, stage: StageHandle);

    /// Release a program object
    fn delete_program(&mut self, program: ProgramHandle);

    /// Make `program` current for subsequent draws
    fn use_program(&mut self, program: ProgramHandle);

    /// Set a named uniform on `program`
    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: UniformValue);

    /// Create a mipmapped 2D texture with repeat wrapping
    fn create_texture(&mut self, image: &DecodedImage) -> TextureHandle;

    /// Release a texture
    fn delete_texture(&mut self, texture: TextureHandle);

    /// Bind `texture` to texture unit `unit`
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle);

    /// Upload interleaved vertex bytes and a `u32` index list
    fn upload_mesh(&mut self, vertex_bytes: &[u8], indices: &[u32]) -> GpuMesh;

    /// Release an uploaded mesh
    fn delete_mesh(&mut self, mesh: &GpuMesh);

    /// Draw `index_count` indices from the given vertex array as triangles
    fn draw_indexed(&mut self, vao: u32, index_count: u32);

    /// Clear colour and depth
    fn clear(&mut self, color: [f32; 4]);

    /// Downcast to the concrete device
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast to the concrete device
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    /// Successful stage compile
    CompileStage {
        /// Stage kind
        stage: ShaderStage,
        /// Resulting handle
        handle: StageHandle,
    },
    /// Successful link
    LinkProgram {
        /// Resulting program
        program: ProgramHandle,
        /// Stages linked
        stages: Vec<StageHandle>,
    },
    /// Stage release
    DeleteStage(StageHandle),
    /// Program release
    DeleteProgram(ProgramHandle),
    /// Program bind
    UseProgram(ProgramHandle),
    /// Uniform write
    SetUniform {
        /// Target program
        program: ProgramHandle,
        /// Uniform name
        name: String,
        /// Value written
        value: UniformValue,
    },
    /// Texture creation
    CreateTexture {
        /// Resulting texture
        texture: TextureHandle,
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
    /// Texture release
    DeleteTexture(TextureHandle),
    /// Texture bind
    BindTexture {
        /// Texture unit
        unit: u32,
        /// Texture bound
        texture: TextureHandle,
    },
    /// Mesh upload
    UploadMesh {
        /// Vertex array created
        vao: u32,
        /// Index count uploaded
        index_count: u32,
    },
    /// Mesh release
    DeleteMesh {
        /// Vertex array released
        vao: u32,
    },
    /// Indexed draw
    DrawIndexed {
        /// Vertex array drawn
        vao: u32,
        /// Index count drawn
        index_count: u32,
    },
    /// Framebuffer clear
    Clear([f32; 4]),
}

/// Headless device that records every command and tracks uniform state per program
#[derive(Debug, Default)]
pub struct RecordingDevice {
    commands: Vec<DeviceCommand>,
    next_object: u32,
    stages: HashMap<StageHandle, ShaderStage>,
    programs: HashSet<ProgramHandle>,
    textures: HashSet<TextureHandle>,
    meshes: HashSet<u32>,
    uniforms: HashMap<ProgramHandle, HashMap<String, UniformValue>>,
}

impl RecordingDevice {
    /// Create an empty device
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command recorded so far
    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    /// Drain the command log, keeping object and uniform state
    pub fn take_commands(&mut self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Last value written to `name` on `program`
    pub fn uniform(&self, program: ProgramHandle, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(&program).and_then(|u| u.get(name))
    }

    /// `(vao, index_count)` for every draw recorded
    pub fn draws(&self) -> Vec<(u32, u32)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::DrawIndexed { vao, index_count } => Some((*vao, *index_count)),
                _ => None,
            })
            .collect()
    }

    /// Whether `program` is currently a live program object
    pub fn is_program_live(&self, program: ProgramHandle) -> bool {
        self.programs.contains(&program)
    }

    /// Number of live program objects
    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    /// Number of live textures
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Number of live meshes
    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    fn allocate(&mut self) -> u32 {
        self.next_object += 1;
        self.next_object
    }

    /// Minimal front-end check standing in for a driver compiler
    fn validate_source(source: &str) -> Result<(), String> {
        if !source.contains("#version") {
            return Err("0:1: error: missing #version directive".to_string());
        }
        if !source.contains("void main") {
            return Err("0:0: error: no entry point 'main' defined".to_string());
        }

        let mut depth = 0i32;
        for (index, line) in source.lines().enumerate() {
            for c in line.chars() {
                match c {
                    '{' => depth += 1,
                    '}' => depth -= 1,
                    _ => {}
                }
                if depth < 0 {
                    return Err(format!("0:{}: error: unexpected '}}'", index + 1));
                }
            }
        }
        if depth != 0 {
            return Err("0:0: error: unexpected end of file, unbalanced braces".to_string());
        }

        Ok(())
    }
}

impl GraphicsDevice for RecordingDevice {
    fn compile_stage(&mut self, stage: ShaderStage, source: &str) -> Result<StageHandle, String> {
        Self::validate_source(source)?;
        let handle = StageHandle(self.allocate());
        self.stages.insert(handle, stage);
        self.commands.push(DeviceCommand::CompileStage { stage, handle });
        Ok(handle)
    }

    fn link_program(&mut self, stages: &[StageHandle]) -> Result<ProgramHandle, String> {
        let mut kinds = Vec::with_capacity(stages.len());
        for handle in stages {
            match self.stages.get(handle) {
                Some(kind) => kinds.push(*kind),
                None => return Err(format!("stage object {} does not exist", handle.0)),
            }
        }

        for required in [ShaderStage::Vertex, ShaderStage::Fragment] {
            if !kinds.contains(&required) {
                return Err(format!("link error: missing {required} stage"));
            }
        }

        let program = ProgramHandle(self.allocate());
        self.programs.insert(program);
        self.commands.push(DeviceCommand::LinkProgram {
            program,
            stages: stages.to_vec(),
        });
        Ok(program)
    }

    fn delete_stage(&mut self, stage: StageHandle) {
        self.stages.remove(&stage);
        self.commands.push(DeviceCommand::DeleteStage(stage));
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
        self.uniforms.remove(&program);
        self.commands.push(DeviceCommand::DeleteProgram(program));
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.commands.push(DeviceCommand::UseProgram(program));
    }

    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: UniformValue) {
        if self.programs.contains(&program) {
            self.uniforms
                .entry(program)
                .or_default()
                .insert(name.to_string(), value);
        }
        self.commands.push(DeviceCommand::SetUniform {
            program,
            name: name.to_string(),
            value,
        });
    }

    fn create_texture(&mut self, image: &DecodedImage) -> TextureHandle {
        let texture = TextureHandle(self.allocate());
        self.textures.insert(texture);
        self.commands.push(DeviceCommand::CreateTexture {
            texture,
            width: image.width,
            height: image.height,
        });
        texture
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
        self.commands.push(DeviceCommand::DeleteTexture(texture));
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        self.commands.push(DeviceCommand::BindTexture { unit, texture });
    }

    fn upload_mesh(&mut self, _vertex_bytes: &[u8], indices: &[u32]) -> GpuMesh {
        let mesh = GpuMesh {
            vao: self.allocate(),
            vbo: self.allocate(),
            ebo: self.allocate(),
            index_count: indices.len() as u32,
        };
        self.meshes.insert(mesh.vao);
        self.commands.push(DeviceCommand::UploadMesh {
            vao: mesh.vao,
            index_count: mesh.index_count,
        });
        mesh
    }

    fn delete_mesh(&mut self, mesh: &GpuMesh) {
        self.meshes.remove(&mesh.vao);
        self.commands.push(DeviceCommand::DeleteMesh { vao: mesh.vao });
    }

    fn draw_indexed(&mut self, vao: u32, index_count: u32) {
        self.commands.push(DeviceCommand::DrawIndexed { vao, index_count });
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.commands.push(DeviceCommand::Clear(color));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
