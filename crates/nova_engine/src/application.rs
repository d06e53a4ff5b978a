//! Editor UI seam and frame loop

use crate::engine::EngineContext;
use crate::foundation::time::{FramePacer, Timer};
use crate::input::{InputController, WindowBackend};

/// Immediate-mode editor UI
///
/// Called once per frame after input. Implementations read and write scene
/// state through the context's accessors and entry points.
pub trait EditorUi {
    /// Build and handle this frame's widgets
    fn frame(&mut self, ctx: &mut EngineContext);
}

/// UI that draws nothing
impl EditorUi for () {
    fn frame(&mut self, _ctx: &mut EngineContext) {}
}

/// Frame-synchronous editor loop
///
/// Each frame: poll, update the camera from input, run the UI, render, present,
/// then sleep out the rest of the frame budget.
pub struct FrameLoop {
    timer: Timer,
    pacer: FramePacer,
    input: InputController,
}

impl FrameLoop {
    /// Loop paced to the context's configured frame rate
    pub fn new(ctx: &EngineContext) -> Self {
        Self {
            timer: Timer::new(),
            pacer: FramePacer::from_fps(ctx.config().frame.target_fps),
            input: InputController::new(),
        }
    }

    /// Frame timing
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Run one frame
    pub fn step(&mut self, ctx: &mut EngineContext, window: &mut dyn WindowBackend, ui: &mut dyn EditorUi) {
        self.pacer.begin_frame();
        self.timer.update();

        window.poll_events();
        self.input.update(window, ctx.camera_mut(), self.timer.delta_time());

        ui.frame(ctx);

        match ctx.render_frame(window.framebuffer_size()) {
            Ok(stats) => log::trace!(
                "Frame {}: {} objects, {} lights",
                self.timer.frame_count(),
                stats.objects,
                stats.lights
            ),
            Err(e) => log::error!("Frame {} failed to render: {e}", self.timer.frame_count()),
        }

        window.swap_buffers();
        self.pacer.end_frame();
    }

    /// Run frames until the window asks to close
    pub fn run(&mut self, ctx: &mut EngineContext, window: &mut dyn WindowBackend, ui: &mut dyn EditorUi) {
        log::info!("Entering frame loop at {:?} per frame", self.pacer.target());
        while !window.should_close() {
            self.step(ctx, window, ui);
        }
        log::info!(
            "Frame loop exited after {} frames",
            self.timer.frame_count()
        );
    }
}
