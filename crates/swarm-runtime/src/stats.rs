//! Frame statistics — FPS counter and frame timing

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Rolling one-second frame-rate counter, refreshed every 250 ms
pub struct FrameStats {
    frame_times: VecDeque<Instant>,
    fps: f32,
    last_update: Instant,
    started: Instant,
    total_frames: u64,
}

impl Default for FrameStats {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            frame_times: VecDeque::new(),
            fps: 0.0,
            last_update: now,
            started: now,
            total_frames: 0,
        }
    }
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a frame was drawn
    pub fn record_frame(&mut self) {
        self.record_frame_at(Instant::now());
    }

    fn record_frame_at(&mut self, now: Instant) {
        self.frame_times.push_back(now);
        self.total_frames += 1;

        // Keep only frames from the last second
        let cutoff = now.checked_sub(Duration::from_secs(1)).unwrap_or(self.started);
        while self.frame_times.front().is_some_and(|&t| t < cutoff) {
            self.frame_times.pop_front();
        }

        if now.duration_since(self.last_update).as_millis() > 250 {
            self.fps = self.frame_times.len() as f32;
            self.last_update = now;
        }
    }

    /// Frames drawn during the last second, as of the last refresh
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn frame_time_ms(&self) -> Option<f32> {
        (self.fps > 0.0).then(|| 1000.0 / self.fps)
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Average frame rate since creation
    pub fn mean_fps(&self) -> f32 {
        let elapsed = self.started.elapsed().as_secs_f32();
        if elapsed > 0.0 {
            self.total_frames as f32 / elapsed
        } else {
            0.0
        }
    }

    /// One-line readout, e.g. `FPS: 60 (16.7ms)`
    pub fn readout(&self) -> String {
        match self.frame_time_ms() {
            Some(ms) => format!("FPS: {:.0} ({:.1}ms)", self.fps, ms),
            None => format!("FPS: {:.0}", self.fps),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readout_before_any_refresh() {
        let stats = FrameStats::new();
        assert_eq!(stats.fps(), 0.0);
        assert_eq!(stats.readout(), "FPS: 0");
        assert!(stats.frame_time_ms().is_none());
    }

    #[test]
    fn counts_frames_in_last_second() {
        let mut stats = FrameStats::new();
        let start = stats.started;
        // 60 frames spread across 600 ms, then one past the refresh interval
        for i in 0..60 {
            stats.record_frame_at(start + Duration::from_millis(i * 10));
        }
        stats.record_frame_at(start + Duration::from_millis(900));
        assert_eq!(stats.total_frames(), 61);
        assert_eq!(stats.fps(), 61.0);
        assert!(stats.readout().starts_with("FPS: 61"));
    }

    #[test]
    fn old_frames_fall_out_of_window() {
        let mut stats = FrameStats::new();
        let start = stats.started;
        for i in 0..10 {
            stats.record_frame_at(start + Duration::from_millis(i * 10));
        }
        stats.record_frame_at(start + Duration::from_millis(2500));
        assert_eq!(stats.fps(), 1.0);
    }
}
