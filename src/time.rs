//! Frame timing for the driver loop.
//!
//! [`Time`] measures the wall-clock gap between frames and turns it into the
//! delta fed to the simulation. The simulation clock only ever advances by
//! these deltas; there is no fixed-step catch-up.
//!
//! # Example
//!
//! ```ignore
//! use reverie::time::Time;
//!
//! let mut time = Time::new();
//!
//! // Once per redraw:
//! let dt = time.tick();
//! driver.step(dt);
//! ```

use std::time::{Duration, Instant};

/// Frame timer with pause and time-scale support.
#[derive(Debug)]
pub struct Time {
    /// When the previous tick happened.
    last_tick: Instant,
    /// Sum of all deltas handed out, in seconds.
    elapsed_secs: f32,
    /// Ticks since creation.
    frame_count: u64,
    /// Frames per second, refreshed every `fps_interval`.
    fps: f32,
    fps_frames: u64,
    fps_window_start: Instant,
    fps_interval: Duration,
    paused: bool,
    /// Multiplier applied to every measured delta.
    time_scale: f32,
}

impl Time {
    /// Create a timer whose first tick measures from now.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            last_tick: now,
            elapsed_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frames: 0,
            fps_window_start: now,
            fps_interval: Duration::from_millis(500),
            paused: false,
            time_scale: 1.0,
        }
    }

    /// Measure the time since the previous tick and return it in seconds.
    ///
    /// Returns 0 while paused.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let raw = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        self.frame_count += 1;

        self.fps_frames += 1;
        let window = now.saturating_duration_since(self.fps_window_start);
        if window >= self.fps_interval {
            self.fps = self.fps_frames as f32 / window.as_secs_f32();
            self.fps_frames = 0;
            self.fps_window_start = now;
        }

        let delta = if self.paused {
            0.0
        } else {
            raw.as_secs_f32() * self.time_scale
        };
        self.elapsed_secs += delta;
        delta
    }

    /// Simulated seconds handed out so far.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Number of ticks so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Measured frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Whether ticks currently return 0.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Multiplier applied to measured deltas.
    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Stop handing out time. Ticks keep counting frames.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Hand out time again from the next tick.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Pause if running, resume if paused.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Set the delta multiplier. Negative values clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
