//! Runtime system trait

use swarm_core::Result;
use swarm_ecs::SwarmWorld;

/// A system that can be ticked by the host loop
///
/// `fixed_update` advances the simulation by an explicit step supplied by the
/// caller; `update` runs once per rendered frame for anything that is not
/// simulation.
pub trait RuntimeSystem {
    /// Called once before the first frame
    fn initialize(&mut self, world: &mut SwarmWorld) -> Result<()>;

    /// Advance the simulation by `dt` seconds
    fn fixed_update(&mut self, world: &mut SwarmWorld, dt: f64) -> Result<()>;

    /// Called once per frame for variable-rate logic
    fn update(&mut self, world: &mut SwarmWorld, dt: f64) -> Result<()>;

    /// Called when the host loop exits
    fn shutdown(&mut self) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
