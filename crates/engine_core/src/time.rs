//! Time management for the simulation loop.
//!
//! The flight integrator assumes the host hands it a step no larger than
//! [`MAX_SIM_STEP`]; `Time` is where that clamp lives.

use std::time::{Duration, Instant};

/// Largest step (seconds) handed to the integrator after a frame hitch.
pub const MAX_SIM_STEP: f32 = 0.05;

/// Manages frame timing and delta time calculation.
#[derive(Debug)]
pub struct Time {
    /// Time of the last wall-clock frame.
    last_frame: Instant,
    /// Duration of the last frame.
    delta: Duration,
    /// Total elapsed time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
    /// Fixed timestep for headless stepping (default 60 Hz).
    fixed_timestep: Duration,
    /// Accumulated time for fixed updates.
    accumulator: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            fixed_timestep: Duration::from_secs_f64(1.0 / 60.0),
            accumulator: Duration::ZERO,
        }
    }

    /// Update timing from the wall clock at the start of a new frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;
        self.advance(delta);
    }

    /// Advance by an explicit delta (headless or replayed runs).
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
        self.accumulator += delta;
    }

    /// Get the raw delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Delta time clamped to `[0, MAX_SIM_STEP]` for the flight integrator.
    pub fn sim_delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32().clamp(0.0, MAX_SIM_STEP)
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the fixed timestep as a Duration.
    pub fn fixed_timestep(&self) -> Duration {
        self.fixed_timestep
    }

    /// Get the fixed timestep in seconds.
    pub fn fixed_timestep_seconds(&self) -> f32 {
        self.fixed_timestep.as_secs_f32()
    }

    /// Check if a fixed update should run and consume the time.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.accumulator >= self.fixed_timestep {
            self.accumulator -= self.fixed_timestep;
            true
        } else {
            false
        }
    }

    /// Wall time left before the accumulator holds another fixed step.
    pub fn until_next_fixed_update(&self) -> Duration {
        self.fixed_timestep.saturating_sub(self.accumulator)
    }

    /// Set the fixed timestep rate in Hz. Non-positive rates are ignored.
    pub fn set_fixed_rate(&mut self, hz: f64) {
        if hz > 0.0 && hz.is_finite() {
            self.fixed_timestep = Duration::from_secs_f64(1.0 / hz);
        } else {
            log::warn!("Ignoring invalid fixed rate {} Hz", hz);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_delta_is_clamped_after_hitch() {
        let mut time = Time::new();
        time.advance(Duration::from_millis(400));
        assert!((time.delta_seconds() - 0.4).abs() < 1e-6);
        assert_eq!(time.sim_delta_seconds(), MAX_SIM_STEP);
    }

    #[test]
    fn fixed_update_consumes_accumulator() {
        let mut time = Time::new();
        time.set_fixed_rate(50.0);
        time.advance(Duration::from_millis(45));
        assert!(time.should_fixed_update());
        assert!(time.should_fixed_update());
        assert!(!time.should_fixed_update());
        assert_eq!(time.frame_count(), 1);
    }

    #[test]
    fn wait_shrinks_as_time_accumulates() {
        let mut time = Time::new();
        time.set_fixed_rate(50.0);
        assert_eq!(time.until_next_fixed_update(), Duration::from_millis(20));
        time.advance(Duration::from_millis(15));
        assert_eq!(time.until_next_fixed_update(), Duration::from_millis(5));
        time.advance(Duration::from_millis(10));
        assert!(time.should_fixed_update());
        assert_eq!(time.until_next_fixed_update(), Duration::from_millis(15));
        assert!((time.fixed_timestep_seconds() - 0.02).abs() < 1e-6);
    }

    #[test]
    fn wall_clock_update_counts_frames() {
        let mut time = Time::new();
        std::thread::sleep(Duration::from_millis(2));
        time.update();
        time.update();
        assert_eq!(time.frame_count(), 2);
        assert!(time.elapsed_seconds() >= 0.002);
    }

    #[test]
    fn invalid_fixed_rate_is_ignored() {
        let mut time = Time::new();
        let before = time.fixed_timestep();
        time.set_fixed_rate(0.0);
        assert_eq!(time.fixed_timestep(), before);
    }
}
