//! Mesh data and the shared mesh registry
//!
//! Geometry is uploaded to the device at most once. Shared meshes are registered
//! by name so scene files can reference them; `builtin:` paths name primitives
//! generated in code, anything else is read as a Wavefront OBJ file.

use bytemuck::{Pod, Zeroable};

use super::device::{GpuMesh, GraphicsDevice};
use crate::assets::{AssetError, ObjLoader};
use crate::foundation::collections::{MeshKey, OrderedSlotMap};

/// Path prefix for generated primitives
pub const BUILTIN_PREFIX: &str = "builtin:";

/// Path of the built-in unit cube
pub const BUILTIN_CUBE: &str = "builtin:cube";

/// Interleaved vertex: position, normal, uv
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    /// Object space position
    pub position: [f32; 3],
    /// Object space normal
    pub normal: [f32; 3],
    /// Texture coordinate
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a vertex
    pub const fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self { position, normal, tex_coord }
    }
}

/// Vertices and indices plus the GPU triple once uploaded
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    /// Vertex data
    pub vertices: Vec<Vertex>,
    /// Triangle list
    pub indices: Vec<u32>,
    gpu: Option<GpuMesh>,
}

impl Geometry {
    /// Geometry not yet uploaded
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices, gpu: None }
    }

    /// GPU handles, present after upload
    pub fn gpu(&self) -> Option<&GpuMesh> {
        self.gpu.as_ref()
    }

    /// Whether the geometry lives on the device
    pub fn is_uploaded(&self) -> bool {
        self.gpu.is_some()
    }

    /// Number of indices to draw
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Upload to the device. A second upload is ignored.
    pub fn upload(&mut self, device: &mut dyn GraphicsDevice) -> bool {
        if self.gpu.is_some() {
            log::warn!("Mesh already uploaded, ignoring second upload");
            return false;
        }
        let bytes: &[u8] = bytemuck::cast_slice(&self.vertices);
        self.gpu = Some(device.upload_mesh(bytes, &self.indices));
        true
    }

    /// Release GPU buffers, keeping the CPU copy
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(gpu) = self.gpu.take() {
            device.delete_mesh(&gpu);
        }
    }
}

/// 16-vertex, 36-index unit cube centred on the origin
pub fn cube_geometry() -> Geometry {
    const CORNERS: [([f32; 3], [f32; 2]); 16] = [
        ([-0.5, -0.5, -0.5], [0.0, 0.0]),
        ([0.5, -0.5, -0.5], [1.0, 0.0]),
        ([0.5, 0.5, -0.5], [1.0, 1.0]),
        ([-0.5, 0.5, -0.5], [0.0, 1.0]),
        ([-0.5, -0.5, 0.5], [0.0, 0.0]),
        ([0.5, -0.5, 0.5], [1.0, 0.0]),
        ([0.5, 0.5, 0.5], [1.0, 1.0]),
        ([-0.5, 0.5, 0.5], [0.0, 1.0]),
        ([-0.5, 0.5, 0.5], [1.0, 0.0]),
        ([-0.5, 0.5, -0.5], [1.0, 1.0]),
        ([-0.5, -0.5, -0.5], [0.0, 1.0]),
        ([0.5, 0.5, 0.5], [1.0, 0.0]),
        ([0.5, -0.5, -0.5], [0.0, 1.0]),
        ([0.5, -0.5, 0.5], [0.0, 0.0]),
        ([0.5, -0.5, -0.5], [1.0, 1.0]),
        ([-0.5, 0.5, 0.5], [0.0, 0.0]),
    ];

    const INDICES: [u32; 36] = [
        0, 1, 2, 2, 3, 0, // back
        4, 5, 6, 6, 7, 4, // front
        8, 9, 10, 10, 4, 8, // left
        11, 2, 12, 12, 13, 11, // right
        10, 14, 5, 5, 4, 10, // bottom
        3, 2, 11, 11, 15, 3, // top
    ];

    // Corner vertices are shared between faces, so normals point out of the corner
    let inv_sqrt3 = 1.0 / 3.0_f32.sqrt();
    let vertices = CORNERS
        .iter()
        .map(|&(p, uv)| {
            let normal = [
                p[0].signum() * inv_sqrt3,
                p[1].signum() * inv_sqrt3,
                p[2].signum() * inv_sqrt3,
            ];
            Vertex::new(p, normal, uv)
        })
        .collect();

    Geometry::new(vertices, INDICES.to_vec())
}

/// Generate a `builtin:` primitive
pub fn builtin_geometry(path: &str) -> Result<Geometry, AssetError> {
    match path {
        BUILTIN_CUBE => Ok(cube_geometry()),
        other => Err(AssetError::UnknownBuiltin(other.to_string())),
    }
}

/// Registered shared mesh
#[derive(Debug)]
pub struct MeshEntry {
    /// Unique display name
    pub name: String,
    /// Source path or `builtin:` name
    pub path: String,
    /// Uploaded geometry
    pub geometry: Geometry,
}

/// Shared geometry addressed by generation-checked keys
#[derive(Debug, Default)]
pub struct MeshRegistry {
    entries: OrderedSlotMap<MeshKey, MeshEntry>,
}

impl MeshRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load geometry from `path` and register it under `name`.
    ///
    /// A name already registered with the same path returns the existing key;
    /// with a different path the load is rejected.
    pub fn load(&mut self, name: &str, path: &str, device: &mut dyn GraphicsDevice) -> Option<MeshKey> {
        if let Some(key) = self.key_of(name) {
            return self.reuse(key, name, path);
        }

        let loaded = if path.starts_with(BUILTIN_PREFIX) {
            builtin_geometry(path)
        } else {
            ObjLoader::load_obj(path).map(|obj| Geometry::new(obj.vertices, obj.indices))
        };

        match loaded {
            Ok(geometry) => Some(self.insert(name, path, geometry, device)),
            Err(e) => {
                log::error!("Failed to load mesh '{name}' from {path}: {e}");
                None
            }
        }
    }

    /// Register geometry built in code under `name`
    pub fn register(
        &mut self,
        name: &str,
        path: &str,
        geometry: Geometry,
        device: &mut dyn GraphicsDevice,
    ) -> Option<MeshKey> {
        match self.key_of(name) {
            Some(key) => self.reuse(key, name, path),
            None => Some(self.insert(name, path, geometry, device)),
        }
    }

    /// Key of the built-in cube, registering it as "Cube" on first use
    pub fn cube(&mut self, device: &mut dyn GraphicsDevice) -> Option<MeshKey> {
        let existing = self
            .entries
            .iter()
            .find(|(_, entry)| entry.path == BUILTIN_CUBE)
            .map(|(key, _)| key);

        match existing {
            Some(key) => Some(key),
            None => self.register("Cube", BUILTIN_CUBE, cube_geometry(), device),
        }
    }

    fn reuse(&self, key: MeshKey, name: &str, path: &str) -> Option<MeshKey> {
        let entry = self.entries.get(key)?;
        if entry.path == path {
            log::debug!("Mesh '{name}' already registered");
            Some(key)
        } else {
            log::error!(
                "Failed to load mesh '{name}' from {path}: name already used by {}",
                entry.path
            );
            None
        }
    }

    fn insert(&mut self, name: &str, path: &str, mut geometry: Geometry, device: &mut dyn GraphicsDevice) -> MeshKey {
        geometry.upload(device);
        log::debug!("Registered mesh '{name}' ({} indices)", geometry.index_count());
        self.entries.insert(MeshEntry {
            name: name.to_string(),
            path: path.to_string(),
            geometry,
        })
    }

    fn key_of(&self, name: &str) -> Option<MeshKey> {
        self.entries.iter().find(|(_, e)| e.name == name).map(|(key, _)| key)
    }

    /// Key registered under `name`
    pub fn find(&self, name: &str) -> Option<MeshKey> {
        let key = self.key_of(name);
        if key.is_none() {
            log::warn!("No mesh named '{name}'");
        }
        key
    }

    /// Entry for a key, `None` when stale
    pub fn get(&self, key: MeshKey) -> Option<&MeshEntry> {
        self.entries.get(key)
    }

    /// Entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = (MeshKey, &MeshEntry)> {
        self.entries.iter()
    }

    /// Number of registered meshes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no meshes are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove one mesh and release its buffers
    pub fn remove(&mut self, key: MeshKey, device: &mut dyn GraphicsDevice) -> bool {
        match self.entries.remove(key) {
            Some(mut entry) => {
                entry.geometry.release(device);
                true
            }
            None => false,
        }
    }

    /// Release every mesh. All keys become stale.
    pub fn clear(&mut self, device: &mut dyn GraphicsDevice) {
        for mut entry in self.entries.drain() {
            entry.geometry.release(device);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::RecordingDevice;

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<Vertex>(), 8 * 4);
    }

    #[test]
    fn test_cube_shape() {
        let cube = cube_geometry();
        assert_eq!(cube.vertices.len(), 16);
        assert_eq!(cube.index_count(), 36);
        assert!(cube.indices.iter().all(|&i| (i as usize) < cube.vertices.len()));
    }

    #[test]
    fn test_upload_once() {
        let mut device = RecordingDevice::new();
        let mut geometry = cube_geometry();
        assert!(geometry.upload(&mut device));
        assert!(!geometry.upload(&mut device));
        assert_eq!(device.live_meshes(), 1);
        assert_eq!(geometry.gpu().unwrap().index_count, 36);
    }

    #[test]
    fn test_cube_registered_once() {
        let mut device = RecordingDevice::new();
        let mut registry = MeshRegistry::new();
        let a = registry.cube(&mut device).unwrap();
        let b = registry.cube(&mut device).unwrap();
        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(a).unwrap().name, "Cube");
    }

    #[test]
    fn test_load_obj_and_name_clash() {
        let path = std::env::temp_dir().join(format!("nova_tri_{}.obj", std::process::id()));
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let path = path.to_string_lossy().into_owned();

        let mut device = RecordingDevice::new();
        let mut registry = MeshRegistry::new();
        let key = registry.load("Tri", &path, &mut device).unwrap();
        assert_eq!(registry.get(key).unwrap().geometry.index_count(), 3);

        assert_eq!(registry.load("Tri", &path, &mut device), Some(key));
        assert!(registry.load("Tri", BUILTIN_CUBE, &mut device).is_none());
        assert!(registry.load("Bad", "builtin:teapot", &mut device).is_none());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_clear_invalidates_keys() {
        let mut device = RecordingDevice::new();
        let mut registry = MeshRegistry::new();
        let key = registry.cube(&mut device).unwrap();
        registry.clear(&mut device);

        assert!(registry.get(key).is_none());
        assert_eq!(device.live_meshes(), 0);
    }
}
