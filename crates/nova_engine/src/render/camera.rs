//! Free-fly editor camera
//!
//! Not an entity. The transform's rotation holds pitch in `x` and yaw in `y`,
//! both in degrees; roll is unused. Pitch is clamped to +/-89 degrees so the
//! basis never degenerates.

use crate::config::CameraSettings;
use crate::ecs::components::{CameraComponent, Transform};
use crate::foundation::math::{self, Mat4, Vec3};

/// Pitch limit in degrees
pub const PITCH_LIMIT: f32 = 89.0;

/// Movement directions relative to the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    /// Along `front`
    Forward,
    /// Against `front`
    Backward,
    /// Against `right`
    Left,
    /// Along `right`
    Right,
}

/// Editor camera state
#[derive(Debug, Clone)]
pub struct EditorCamera {
    transform: Transform,
    properties: CameraComponent,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    world_up: Vec3,
    move_speed: f32,
    sensitivity: f32,
}

impl Default for EditorCamera {
    fn default() -> Self {
        Self::new(&CameraSettings::default())
    }
}

impl EditorCamera {
    /// Camera at (0, 0, 3) looking down -Z
    pub fn new(settings: &CameraSettings) -> Self {
        let mut camera = Self {
            transform: Transform::from_position(Vec3::new(0.0, 0.0, 3.0))
                .with_rotation(Vec3::new(0.0, -90.0, 0.0)),
            properties: CameraComponent {
                fov: settings.fov,
                near: settings.near,
                far: settings.far,
            },
            front: -Vec3::z(),
            right: Vec3::x(),
            up: Vec3::y(),
            world_up: Vec3::y(),
            move_speed: settings.move_speed,
            sensitivity: settings.sensitivity,
        };
        camera.update_basis();
        camera
    }

    /// Position and rotation (pitch in x, yaw in y)
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Projection properties
    pub fn properties(&self) -> &CameraComponent {
        &self.properties
    }

    /// Mutable projection properties
    pub fn properties_mut(&mut self) -> &mut CameraComponent {
        &mut self.properties
    }

    /// World position
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Move to a new position without changing orientation
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    /// Pitch in degrees
    pub fn pitch(&self) -> f32 {
        self.transform.rotation.x
    }

    /// Yaw in degrees
    pub fn yaw(&self) -> f32 {
        self.transform.rotation.y
    }

    /// Viewing direction
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Camera right vector
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Camera up vector
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Units per second
    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    /// Degrees per unit of cursor offset
    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    /// Translate by `speed * dt` along a view-relative direction
    pub fn move_in(&mut self, direction: CameraMovement, dt: f32) {
        let distance = self.move_speed * dt;
        let offset = match direction {
            CameraMovement::Forward => self.front * distance,
            CameraMovement::Backward => -self.front * distance,
            CameraMovement::Left => -self.right * distance,
            CameraMovement::Right => self.right * distance,
        };
        self.transform.position += offset;
    }

    /// Apply a cursor offset to yaw and pitch
    pub fn look(&mut self, xoffset: f32, yoffset: f32) {
        self.transform.rotation.y += xoffset * self.sensitivity;
        self.transform.rotation.x =
            (self.transform.rotation.x + yoffset * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_basis();
    }

    fn update_basis(&mut self) {
        let yaw = math::utils::deg_to_rad(self.yaw());
        let pitch = math::utils::deg_to_rad(self.pitch());

        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize();
        self.right = self.front.cross(&self.world_up).normalize();
        self.up = self.right.cross(&self.front).normalize();
    }

    /// World to view transform
    pub fn view_matrix(&self) -> Mat4 {
        let position = self.transform.position;
        math::look_at(position, position + self.front, self.up)
    }

    /// Perspective projection for the given aspect ratio
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        self.properties.projection(aspect)
    }
}
