//! Frame pacing and timing.
//!
//! One clock per session is the source of truth for "now": tweens, noise
//! time and frame parity all read from it.
//!
//! # Example
//!
//! ```ignore
//! use dotfield::time::FrameClock;
//!
//! let mut clock = FrameClock::new(30.0);
//!
//! // In the event loop:
//! if clock.frame_due() {
//!     let now = clock.tick();
//!     session.frame(now, clock.frame());
//! }
//! event_loop.set_control_flow(ControlFlow::WaitUntil(clock.next_frame()));
//! ```

use std::time::{Duration, Instant};

/// Default frame rate.
pub const TARGET_FPS: f32 = 30.0;

#[derive(Debug)]
pub struct FrameClock {
    /// When the clock was created.
    start: Instant,
    /// When the last frame was ticked.
    last_frame: Instant,
    /// Time between frames.
    interval: Duration,
    /// Frames ticked since start.
    frame_count: u64,
    /// Measured frames per second, refreshed twice a second.
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
}

impl FrameClock {
    /// A clock pacing at `fps` frames per second.
    pub fn new(fps: f32) -> Self {
        let now = Instant::now();
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { TARGET_FPS };
        Self {
            start: now,
            last_frame: now,
            interval: Duration::from_secs_f32(1.0 / fps),
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
        }
    }

    /// When the next frame should be drawn.
    #[inline]
    pub fn next_frame(&self) -> Instant {
        self.last_frame + self.interval
    }

    /// Whether enough time has passed since the last tick.
    pub fn frame_due(&self) -> bool {
        self.frame_count == 0 || Instant::now() >= self.next_frame()
    }

    /// Start a new frame. Returns seconds since start.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// [`tick`](Self::tick) with an explicit timestamp.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        self.last_frame = now;
        self.frame_count += 1;

        let fps_elapsed = now.saturating_duration_since(self.fps_update_time);
        if fps_elapsed >= Duration::from_millis(500) {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        now.saturating_duration_since(self.start).as_secs_f32()
    }

    /// Frames ticked since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Measured frame rate, shown in the controls panel.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(TARGET_FPS)
    }
}
