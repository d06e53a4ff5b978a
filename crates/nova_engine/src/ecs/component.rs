//! Component trait and storage wiring

use bitflags::bitflags;

use super::components::{CameraComponent, DirectionalLight, MeshComponent, PointLight, Transform};
use super::sparse_set::SparseSet;
use crate::render::device::GpuMesh;

bitflags! {
    /// Which component types an entity carries
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ComponentMask: u32 {
        /// [`Transform`]
        const TRANSFORM = 1 << 0;
        /// [`MeshComponent`]
        const MESH = 1 << 1;
        /// [`CameraComponent`]
        const CAMERA = 1 << 2;
        /// [`PointLight`]
        const POINT_LIGHT = 1 << 3;
        /// [`DirectionalLight`]
        const DIRECTIONAL_LIGHT = 1 << 4;
    }
}

/// One sparse set per component type
#[derive(Debug, Default)]
pub struct ComponentStorages {
    pub(crate) transforms: SparseSet<Transform>,
    pub(crate) meshes: SparseSet<MeshComponent>,
    pub(crate) cameras: SparseSet<CameraComponent>,
    pub(crate) point_lights: SparseSet<PointLight>,
    pub(crate) directional_lights: SparseSet<DirectionalLight>,
}

impl ComponentStorages {
    /// Drop every component stored at `index`, returning device buffers the mesh owned
    pub(crate) fn remove_all(&mut self, index: u32) -> Option<GpuMesh> {
        let orphan = self.meshes.remove(index).and_then(|mesh| mesh.owned_gpu());
        self.transforms.remove(index);
        self.cameras.remove(index);
        self.point_lights.remove(index);
        self.directional_lights.remove(index);
        orphan
    }

    /// Device buffers owned by every stored mesh
    pub(crate) fn owned_gpu_meshes(&self) -> Vec<GpuMesh> {
        self.meshes.iter().filter_map(|(_, mesh)| mesh.owned_gpu()).collect()
    }

    pub(crate) fn clear(&mut self) {
        self.transforms.clear();
        self.meshes.clear();
        self.cameras.clear();
        self.point_lights.clear();
        self.directional_lights.clear();
    }
}

/// A type that can be attached to an entity
pub trait Component: 'static + Sized {
    /// Presence bit for this type
    const MASK: ComponentMask;

    /// Storage for this type
    fn storage(storages: &ComponentStorages) -> &SparseSet<Self>;

    /// Mutable storage for this type
    fn storage_mut(storages: &mut ComponentStorages) -> &mut SparseSet<Self>;

    /// Device buffers owned by this component
    fn owned_gpu_mesh(&self) -> Option<GpuMesh> {
        None
    }
}

macro_rules! impl_component {
    (@impl $ty:ty, $mask:ident, $field:ident, $($extra:tt)*) => {
        impl Component for $ty {
            const MASK: ComponentMask = ComponentMask::$mask;

            fn storage(storages: &ComponentStorages) -> &SparseSet<Self> {
                &storages.$field
            }

            fn storage_mut(storages: &mut ComponentStorages) -> &mut SparseSet<Self> {
                &mut storages.$field
            }

            $($extra)*
        }
    };
    ($ty:ty, $mask:ident, $field:ident, owns_gpu) => {
        impl_component!(@impl $ty, $mask, $field,
            fn owned_gpu_mesh(&self) -> Option<GpuMesh> {
                self.owned_gpu()
            }
        );
    };
    ($ty:ty, $mask:ident, $field:ident) => {
        impl_component!(@impl $ty, $mask, $field,);
    };
}

impl_component!(Transform, TRANSFORM, transforms);
impl_component!(MeshComponent, MESH, meshes, owns_gpu);
impl_component!(CameraComponent, CAMERA, cameras);
impl_component!(PointLight, POINT_LIGHT, point_lights);
impl_component!(DirectionalLight, DIRECTIONAL_LIGHT, directional_lights);
