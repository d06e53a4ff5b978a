//! Time management utilities

use std::time::{Duration, Instant};

/// High-precision timer for frame timing
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the current FPS (based on last frame time)
    pub fn current_fps(&self) -> f32 {
        if self.delta_time > 0.0 {
            1.0 / self.delta_time
        } else {
            0.0
        }
    }
}

/// Spaces frames to a target duration by sleeping whatever time is left over.
#[derive(Debug, Clone)]
pub struct FramePacer {
    target: Duration,
    frame_start: Instant,
}

impl FramePacer {
    /// Pacer for the given frames-per-second target. Zero disables pacing.
    pub fn from_fps(fps: u32) -> Self {
        let target = if fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(1_000_000_000 / u64::from(fps))
        };
        Self {
            target,
            frame_start: Instant::now(),
        }
    }

    /// Target duration of one frame
    pub fn target(&self) -> Duration {
        self.target
    }

    /// Mark the start of a frame
    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    /// Time left in the current frame, given how long the frame has taken so far
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.target.saturating_sub(elapsed)
    }

    /// Block until the frame has used its full target duration
    pub fn end_frame(&self) {
        let remaining = self.remaining(self.frame_start.elapsed());
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_counts_frames() {
        let mut timer = Timer::new();
        timer.update();
        timer.update();
        assert_eq!(timer.frame_count(), 2);
        assert!(timer.total_time() >= timer.delta_time());
    }

    #[test]
    fn test_pacer_remaining_time() {
        let pacer = FramePacer::from_fps(50);
        assert_eq!(pacer.target(), Duration::from_millis(20));
        assert_eq!(pacer.remaining(Duration::from_millis(5)), Duration::from_millis(15));
        assert_eq!(pacer.remaining(Duration::from_millis(40)), Duration::ZERO);
    }

    #[test]
    fn test_zero_fps_disables_pacing() {
        let pacer = FramePacer::from_fps(0);
        assert_eq!(pacer.remaining(Duration::from_millis(1)), Duration::ZERO);
    }
}
