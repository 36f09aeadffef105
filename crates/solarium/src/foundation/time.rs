//! Time management utilities

use std::time::Instant;

/// High-precision timer for frame timing
pub struct Timer {
    start: Instant,
    last_frame: Instant,
    delta_time: f32,
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
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Seconds since the timer was created
    pub fn elapsed_since_start(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Seconds between creation and the last [`Self::update`]
    pub fn total_time(&self) -> f32 {
        self.last_frame.duration_since(self.start).as_secs_f32()
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average frames per second since creation
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f32 {
        let total = self.elapsed_since_start();
        if total > 0.0 {
            self.frame_count as f32 / total
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_counts_frames_and_measures_delta() {
        let mut timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        timer.update();

        assert_eq!(timer.frame_count(), 1);
        assert!(timer.delta_time() > 0.0);
        assert!(timer.elapsed_since_start() >= timer.delta_time());
        assert!(timer.total_time() >= timer.delta_time());
    }
}
