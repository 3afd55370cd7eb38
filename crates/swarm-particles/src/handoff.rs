//! Hand-off of the simulated transforms to an instanced renderer

use crate::components::{InstanceTransform, ParticleSystemAggregate};
use crate::lookup::ColorLookup;
use swarm_core::{EntityId, Result};
use swarm_ecs::SwarmWorld;

/// Renderer-issued id of a registered mesh
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// Renderer-issued id of a registered material (shader plus color lookup)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u32);

/// Mesh shapes the particle system asks for
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MeshDesc {
    /// Axis-aligned cube centred at the origin
    Cube { edge: f32 },
}

/// Everything one instanced draw call needs
#[derive(Debug)]
pub struct DrawPayload<'a> {
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    /// One model matrix per instance, index-aligned with the color lookup
    pub transforms: &'a [InstanceTransform],
    pub count: u32,
}

impl DrawPayload<'_> {
    /// The transforms as raw bytes for an instance buffer upload
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.transforms)
    }
}

/// The rendering backend the particle system feeds.
///
/// Window, camera, shader wiring and upload strategy are all the
/// implementor's business.
pub trait InstanceRenderer {
    fn register_mesh(&mut self, mesh: MeshDesc) -> Result<MeshHandle>;

    /// Upload the per-instance colors and return a material that samples them
    fn register_material(&mut self, colors: &ColorLookup) -> Result<MaterialHandle>;

    /// Issue one instanced draw
    fn draw_instanced(&mut self, payload: &DrawPayload<'_>) -> Result<()>;
}

/// Build the draw payload for the particle system anchored at `anchor` and
/// hand it to `f`.
///
/// Borrows the world immutably, so it cannot run while a pass holds columns.
pub fn with_draw_payload<R>(
    world: &SwarmWorld,
    anchor: EntityId,
    f: impl FnOnce(&DrawPayload<'_>) -> R,
) -> Result<R> {
    let aggregate = *world.get::<ParticleSystemAggregate>(anchor)?;

    world.with_child_column::<InstanceTransform, _>(anchor, |transforms| {
        let count = (aggregate.count as usize).min(transforms.len());
        let payload = DrawPayload {
            mesh: aggregate.mesh,
            material: aggregate.material,
            transforms: &transforms[..count],
            count: count as u32,
        };
        f(&payload)
    })
}
