//! Swarm Runtime - Frame loop infrastructure
//!
//! Provides the building blocks a host loop needs:
//! - `GameClock` — wall-clock measurement, fixed simulation step, frame pacing
//! - `FrameStats` — rolling frame-rate readout
//! - `RuntimeSystem` — trait for systems ticked by the host loop

mod clock;
mod stats;
mod system;

pub use clock::GameClock;
pub use stats::FrameStats;
pub use system::RuntimeSystem;
