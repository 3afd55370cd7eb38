//! Game clock: fixed simulation step plus wall-clock pacing

use std::time::{Duration, Instant};

/// Tracks wall time between frames and hands out the fixed simulation step.
///
/// The simulation always advances by `timestep`, whatever the wall clock
/// says; wall time only drives pacing and the frame-rate readout.
pub struct GameClock {
    /// Simulation step per frame in seconds
    pub timestep: f32,
    /// Wall time of the last frame in seconds
    pub delta_time: f64,
    /// Frames stepped so far
    pub frame: u64,
    /// Minimum wall time per frame, if capped
    target_frame_time: Option<Duration>,
    /// Last tick instant
    last_instant: Instant,
    /// Whether this is the first tick
    first_tick: bool,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 60.0,
            delta_time: 0.0,
            frame: 0,
            target_frame_time: None,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl GameClock {
    /// Create a clock with the default 1/60 s step and no frame cap
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock with a custom simulation step
    pub fn with_timestep(timestep: f32) -> Self {
        Self {
            timestep,
            ..Self::default()
        }
    }

    /// Cap the frame rate at `fps` (0 disables the cap)
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_frame_time = (fps > 0).then(|| Duration::from_secs_f64(1.0 / fps as f64));
        self
    }

    /// Measure wall time since the previous tick. Call once per frame.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            return;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;

        // Clamp so one stall does not dominate the readout
        self.delta_time = elapsed.min(0.25);
    }

    /// Consume one simulation step
    pub fn step(&mut self) -> f32 {
        self.frame += 1;
        self.timestep
    }

    /// How long to sleep so the current frame meets the cap
    pub fn pacing_delay(&self) -> Option<Duration> {
        self.pacing_delay_at(Instant::now())
    }

    fn pacing_delay_at(&self, now: Instant) -> Option<Duration> {
        let target = self.target_frame_time?;
        let spent = now.saturating_duration_since(self.last_instant);
        target.checked_sub(spent).filter(|d| !d.is_zero())
    }
}
