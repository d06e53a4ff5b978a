//! Mesh component

use crate::foundation::collections::{MeshKey, TextureKey};
use crate::render::device::GpuMesh;
use crate::render::mesh::{Geometry, Vertex};

/// Geometry attached to an entity.
///
/// Texture keys bind to texture units in list order when the mesh is drawn.
#[derive(Debug, Clone)]
pub enum MeshComponent {
    /// Geometry owned by this entity
    Inline {
        /// Vertices, indices and the GPU triple once uploaded
        geometry: Geometry,
        /// Textures bound when drawing
        textures: Vec<TextureKey>,
    },
    /// Geometry registered once in the mesh registry
    Shared {
        /// Registry key
        mesh: MeshKey,
        /// Textures bound when drawing
        textures: Vec<TextureKey>,
    },
}

impl Default for MeshComponent {
    fn default() -> Self {
        Self::Inline {
            geometry: Geometry::default(),
            textures: Vec::new(),
        }
    }
}

impl MeshComponent {
    /// Entity-owned geometry, not yet uploaded
    pub fn inline(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self::Inline {
            geometry: Geometry::new(vertices, indices),
            textures: Vec::new(),
        }
    }

    /// Reference to shared geometry
    pub fn shared(mesh: MeshKey) -> Self {
        Self::Shared {
            mesh,
            textures: Vec::new(),
        }
    }

    /// Builder pattern: Set textures
    pub fn with_textures(mut self, keys: Vec<TextureKey>) -> Self {
        *self.textures_mut() = keys;
        self
    }

    /// Texture keys in unit order
    pub fn textures(&self) -> &[TextureKey] {
        match self {
            Self::Inline { textures, .. } | Self::Shared { textures, .. } => textures,
        }
    }

    /// Mutable texture list
    pub fn textures_mut(&mut self) -> &mut Vec<TextureKey> {
        match self {
            Self::Inline { textures, .. } | Self::Shared { textures, .. } => textures,
        }
    }

    /// Registry key for shared geometry
    pub fn mesh_key(&self) -> Option<MeshKey> {
        match self {
            Self::Shared { mesh, .. } => Some(*mesh),
            Self::Inline { .. } => None,
        }
    }

    /// Device buffers this component owns, present for uploaded inline meshes
    pub fn owned_gpu(&self) -> Option<GpuMesh> {
        match self {
            Self::Inline { geometry, .. } => geometry.gpu().copied(),
            Self::Shared { .. } => None,
        }
    }

    /// Owned geometry for inline meshes
    pub fn inline_geometry_mut(&mut self) -> Option<&mut Geometry> {
        match self {
            Self::Inline { geometry, .. } => Some(geometry),
            Self::Shared { .. } => None,
        }
    }
}
