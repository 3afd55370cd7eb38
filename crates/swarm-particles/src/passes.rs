//! Per-frame physics passes over the particle columns
//!
//! Four passes run in a fixed order every frame:
//! 1. integrate position and refresh the transform translation
//! 2. gravity (squared magnitude times dt, pulling towards -y)
//! 3. global velocity damping
//! 4. boundary reflection with per-particle damping, re-syncing the
//!    transform of every clamped particle
//!
//! Each pass walks every archetype carrying its components and splits the
//! rows across the current rayon pool. A pass returns only once every row is
//! done, so passes never overlap.

use crate::components::{
    Damping, GlobalDamping, Gravity, InstanceTransform, Position, Size, Velocity, WorldBounds,
};
use glam::Vec3;
use rayon::prelude::*;
use std::time::{Duration, Instant};
use swarm_core::Result;
use swarm_ecs::SwarmWorld;

/// Gap kept between a clamped particle and the boundary
pub const BOUNDARY_EPSILON: f32 = 0.01;

/// World-global values read once at frame start and shared by every pass
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameParams {
    pub dt: f32,
    pub gravity: f32,
    pub global_damping: f32,
    pub half_extent: Vec3,
}

impl FrameParams {
    pub fn from_world(world: &SwarmWorld, dt: f32) -> Result<Self> {
        Ok(Self {
            dt,
            gravity: world.singleton::<Gravity>()?.0,
            global_damping: world.singleton::<GlobalDamping>()?.0,
            half_extent: world.singleton::<WorldBounds>()?.half_extent,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassKind {
    IntegratePosition,
    ApplyGravity,
    ApplyDamping,
    ApplyBoundary,
}

impl PassKind {
    pub fn name(&self) -> &'static str {
        match self {
            PassKind::IntegratePosition => "integrate_position",
            PassKind::ApplyGravity => "apply_gravity",
            PassKind::ApplyDamping => "apply_damping",
            PassKind::ApplyBoundary => "apply_boundary",
        }
    }
}

/// One scheduled pass
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pass {
    pub kind: PassKind,
    /// Split rows across worker threads; otherwise the pass runs as one batch
    pub multi_threaded: bool,
}

/// Wall time spent in one pass during the last frame
#[derive(Clone, Copy, Debug)]
pub struct PassTiming {
    pub kind: PassKind,
    pub duration: Duration,
}

/// Ordered list of passes run once per frame
pub struct PhysicsPipeline {
    passes: Vec<Pass>,
    batch_size: usize,
    timings: Vec<PassTiming>,
}

impl PhysicsPipeline {
    /// The four passes in their required order, all multi-threaded
    pub fn standard(batch_size: usize) -> Self {
        let passes = [
            PassKind::IntegratePosition,
            PassKind::ApplyGravity,
            PassKind::ApplyDamping,
            PassKind::ApplyBoundary,
        ]
        .into_iter()
        .map(|kind| Pass {
            kind,
            multi_threaded: true,
        })
        .collect();

        Self {
            passes,
            batch_size: batch_size.max(1),
            timings: Vec::with_capacity(4),
        }
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// Toggle threading for every pass of `kind`
    pub fn set_multi_threaded(&mut self, kind: PassKind, multi_threaded: bool) {
        for pass in self.passes.iter_mut().filter(|p| p.kind == kind) {
            pass.multi_threaded = multi_threaded;
        }
    }

    pub fn last_timings(&self) -> &[PassTiming] {
        &self.timings
    }

    /// Run every pass in order
    pub fn run(&mut self, world: &mut SwarmWorld, params: &FrameParams) {
        self.timings.clear();
        for pass in &self.passes {
            let start = Instant::now();
            let batch = if pass.multi_threaded {
                self.batch_size
            } else {
                usize::MAX
            };
            match pass.kind {
                PassKind::IntegratePosition => integrate_position(world, params, batch),
                PassKind::ApplyGravity => apply_gravity(world, params, batch),
                PassKind::ApplyDamping => apply_damping(world, params, batch),
                PassKind::ApplyBoundary => apply_boundary(world, params, batch),
            }
            let duration = start.elapsed();
            log::trace!("{} took {:.3}ms", pass.kind.name(), duration.as_secs_f64() * 1000.0);
            self.timings.push(PassTiming {
                kind: pass.kind,
                duration,
            });
        }
    }
}

/// Smallest work item for a column of `rows` rows
fn min_len(batch: usize, rows: usize) -> usize {
    batch.min(rows).max(1)
}

/// `position += velocity * dt`, then mirror the position into the transform
pub fn integrate_position(world: &mut SwarmWorld, params: &FrameParams, batch: usize) {
    let dt = params.dt;
    for archetype in world.archetypes_mut() {
        let (Some(mut positions), Some(mut transforms), Some(velocities)) = (
            archetype.get::<&mut Position>(),
            archetype.get::<&mut InstanceTransform>(),
            archetype.get::<&Velocity>(),
        ) else {
            continue;
        };
        let positions: &mut [Position] = &mut positions;
        let transforms: &mut [InstanceTransform] = &mut transforms;
        let velocities: &[Velocity] = &velocities;

        let rows = positions.len();
        positions
            .par_iter_mut()
            .zip(transforms.par_iter_mut())
            .zip(velocities.par_iter())
            .with_min_len(min_len(batch, rows))
            .for_each(|((p, xf), v)| integrate(p, xf, v, dt));
    }
}

/// `velocity.y -= gravity² * dt`
pub fn apply_gravity(world: &mut SwarmWorld, params: &FrameParams, batch: usize) {
    let (g, dt) = (params.gravity, params.dt);
    for archetype in world.archetypes_mut() {
        let Some(mut velocities) = archetype.get::<&mut Velocity>() else {
            continue;
        };
        let velocities: &mut [Velocity] = &mut velocities;

        let rows = velocities.len();
        velocities
            .par_iter_mut()
            .with_min_len(min_len(batch, rows))
            .for_each(|v| gravitate(v, g, dt));
    }
}

/// `velocity *= global_damping`
pub fn apply_damping(world: &mut SwarmWorld, params: &FrameParams, batch: usize) {
    let c = params.global_damping;
    for archetype in world.archetypes_mut() {
        let Some(mut velocities) = archetype.get::<&mut Velocity>() else {
            continue;
        };
        let velocities: &mut [Velocity] = &mut velocities;

        let rows = velocities.len();
        velocities
            .par_iter_mut()
            .with_min_len(min_len(batch, rows))
            .for_each(|v| dampen(v, c));
    }
}

/// Reflect and clamp every particle poking out of the boundary box
pub fn apply_boundary(world: &mut SwarmWorld, params: &FrameParams, batch: usize) {
    let half = params.half_extent;
    for archetype in world.archetypes_mut() {
        let (
            Some(mut positions),
            Some(mut velocities),
            Some(mut transforms),
            Some(dampings),
            Some(sizes),
        ) = (
            archetype.get::<&mut Position>(),
            archetype.get::<&mut Velocity>(),
            archetype.get::<&mut InstanceTransform>(),
            archetype.get::<&Damping>(),
            archetype.get::<&Size>(),
        ) else {
            continue;
        };
        let positions: &mut [Position] = &mut positions;
        let velocities: &mut [Velocity] = &mut velocities;
        let transforms: &mut [InstanceTransform] = &mut transforms;
        let dampings: &[Damping] = &dampings;
        let sizes: &[Size] = &sizes;

        let rows = positions.len();
        positions
            .par_iter_mut()
            .zip(velocities.par_iter_mut())
            .zip(transforms.par_iter_mut())
            .zip(dampings.par_iter())
            .zip(sizes.par_iter())
            .with_min_len(min_len(batch, rows))
            .for_each(|((((p, v), xf), d), s)| reflect(p, v, xf, d, s, half));
    }
}

#[inline]
pub fn integrate(p: &mut Position, xf: &mut InstanceTransform, v: &Velocity, dt: f32) {
    p.0 += v.0 * dt;
    xf.set_translation(p.0);
}

#[inline]
pub fn gravitate(v: &mut Velocity, gravity: f32, dt: f32) {
    v.0.y -= gravity * gravity * dt;
}

#[inline]
pub fn dampen(v: &mut Velocity, coefficient: f32) {
    v.0 *= coefficient;
}

/// Axes are handled independently, so a corner hit flips every axis involved.
/// Comparisons are strict: touching the wall is not a collision. A clamped
/// particle gets its transform translation rewritten so the draw never shows
/// it outside the box.
#[inline]
pub fn reflect(
    p: &mut Position,
    v: &mut Velocity,
    xf: &mut InstanceTransform,
    d: &Damping,
    s: &Size,
    half: Vec3,
) {
    let mut hit = false;
    for axis in 0..3 {
        let (h, size, pos) = (half[axis], s.0[axis], p.0[axis]);
        if pos + size > h || pos - size < -h {
            v.0[axis] = -v.0[axis] * d.0;
            // Validated bounds keep lo <= hi
            let lo = -h + BOUNDARY_EPSILON + size;
            let hi = h - BOUNDARY_EPSILON - size;
            p.0[axis] = pos.max(lo).min(hi);
            hit = true;
        }
    }
    if hit {
        xf.set_translation(p.0);
    }
}
