//! Input handling
//!
//! The window backend is an external collaborator; this module only reads its
//! polled state and turns it into editor camera motion.

use crate::render::{CameraMovement, EditorCamera};

/// Keys the editor reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// W key
    W,
    /// A key
    A,
    /// S key
    S,
    /// D key
    D,
    /// Escape key
    Escape,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
}

/// Window and input surface supplied by the windowing layer
pub trait WindowBackend {
    /// Pump pending window events
    fn poll_events(&mut self);

    /// Whether a key is held
    fn is_key_pressed(&self, key: Key) -> bool;

    /// Whether a mouse button is held
    fn is_mouse_button_pressed(&self, button: MouseButton) -> bool;

    /// Cursor position in window coordinates
    fn cursor_position(&self) -> (f64, f64);

    /// Framebuffer size in pixels
    fn framebuffer_size(&self) -> (u32, u32);

    /// Whether the window was asked to close
    fn should_close(&self) -> bool;

    /// Request or cancel closing
    fn set_should_close(&mut self, close: bool);

    /// Present the frame
    fn swap_buffers(&mut self);
}

const MOVEMENT_KEYS: [(Key, CameraMovement); 4] = [
    (Key::W, CameraMovement::Forward),
    (Key::S, CameraMovement::Backward),
    (Key::A, CameraMovement::Left),
    (Key::D, CameraMovement::Right),
];

/// Drives the editor camera from polled input.
///
/// Holding the right mouse button enables fly mode: WASD moves and cursor
/// motion turns the camera. The cursor anchor resets each time the button goes
/// down so the first frame of a drag never jumps.
#[derive(Debug, Clone, Default)]
pub struct InputController {
    last_cursor: Option<(f64, f64)>,
}

impl InputController {
    /// Create a controller with no cursor anchor
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether fly mode was active last frame
    pub fn is_flying(&self) -> bool {
        self.last_cursor.is_some()
    }

    /// Apply one frame of input
    pub fn update(&mut self, window: &mut dyn WindowBackend, camera: &mut EditorCamera, delta_time: f32) {
        if window.is_key_pressed(Key::Escape) {
            log::debug!("Escape pressed, closing");
            window.set_should_close(true);
        }

        if !window.is_mouse_button_pressed(MouseButton::Right) {
            self.last_cursor = None;
            return;
        }

        for (key, movement) in MOVEMENT_KEYS {
            if window.is_key_pressed(key) {
                camera.move_in(movement, delta_time);
            }
        }

        let (x, y) = window.cursor_position();
        if let Some((last_x, last_y)) = self.last_cursor {
            // Window y grows downward
            let dx = (x - last_x) as f32;
            let dy = (last_y - y) as f32;
            if dx != 0.0 || dy != 0.0 {
                camera.look(dx, dy);
            }
        }
        self.last_cursor = Some((x, y));
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::MockWindow;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_escape_requests_close() {
        let mut window = MockWindow::default();
        window.keys.insert(Key::Escape);
        let mut camera = EditorCamera::default();
        InputController::new().update(&mut window, &mut camera, 0.016);
        assert!(window.should_close());
    }

    #[test]
    fn test_keys_ignored_without_right_button() {
        let mut window = MockWindow::default();
        window.keys.insert(Key::W);
        let mut camera = EditorCamera::default();
        let start = camera.position();

        InputController::new().update(&mut window, &mut camera, 1.0);
        assert_relative_eq!(camera.position(), start);
    }

    #[test]
    fn test_fly_mode_moves_forward() {
        let mut window = MockWindow::default();
        window.keys.insert(Key::W);
        window.buttons.insert(MouseButton::Right);
        let mut camera = EditorCamera::default();
        let start = camera.position();

        InputController::new().update(&mut window, &mut camera, 1.0);
        assert!(camera.position().z < start.z);
    }

    #[test]
    fn test_first_drag_frame_does_not_turn() {
        let mut window = MockWindow::default();
        window.buttons.insert(MouseButton::Right);
        window.cursor = (400.0, 300.0);
        let mut camera = EditorCamera::default();
        let mut input = InputController::new();

        input.update(&mut window, &mut camera, 0.016);
        assert_relative_eq!(camera.yaw(), -90.0);
        assert!(input.is_flying());

        window.cursor = (410.0, 290.0);
        input.update(&mut window, &mut camera, 0.016);
        assert_relative_eq!(camera.yaw(), -90.0 + 10.0 * camera.sensitivity(), epsilon = 1e-4);
        assert_relative_eq!(camera.pitch(), 10.0 * camera.sensitivity(), epsilon = 1e-4);
    }

    #[test]
    fn test_anchor_resets_on_release() {
        let mut window = MockWindow::default();
        window.buttons.insert(MouseButton::Right);
        let mut camera = EditorCamera::default();
        let mut input = InputController::new();
        input.update(&mut window, &mut camera, 0.016);

        window.buttons.clear();
        input.update(&mut window, &mut camera, 0.016);
        assert!(!input.is_flying());

        window.buttons.insert(MouseButton::Right);
        window.cursor = (900.0, 900.0);
        input.update(&mut window, &mut camera, 0.016);
        assert_relative_eq!(camera.yaw(), -90.0);
    }
}
