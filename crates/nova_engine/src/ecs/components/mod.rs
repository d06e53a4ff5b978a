//! ECS Components module

pub mod transform;
pub mod mesh;
pub mod camera;
pub mod lighting;

pub use transform::Transform;
pub use mesh::MeshComponent;
pub use camera::CameraComponent;
pub use lighting::{LightBase, PointLight, DirectionalLight};
