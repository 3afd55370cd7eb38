//! Population initializer: samples every particle and spawns them under the anchor

use crate::components::{Damping, InstanceTransform, Position, Size, Tint, Velocity};
use crate::config::ParticleConfig;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use swarm_core::{EntityId, Result, SwarmError};
use swarm_ecs::{ChildOf, SwarmWorld};

/// Initial state of one particle, before it becomes an entity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSeed {
    pub position: Vec3,
    pub velocity: Vec3,
    pub size: f32,
    pub damping: f32,
    pub tint: Tint,
}

impl ParticleSeed {
    pub fn transform(&self) -> InstanceTransform {
        InstanceTransform::compose(self.position, Vec3::splat(self.size))
    }

    fn bundle(
        &self,
        link: ChildOf,
    ) -> (ChildOf, Position, Velocity, Size, Damping, InstanceTransform, Tint) {
        (
            link,
            Position(self.position),
            Velocity(self.velocity),
            Size(Vec3::splat(self.size)),
            Damping(self.damping),
            self.transform(),
            self.tint,
        )
    }
}

/// Draws particles from a seeded RNG.
///
/// Every value is an integer count of some fixed step (whole units, tenths,
/// hundredths), so populations compare exactly across platforms.
pub struct PopulationSampler {
    rng: StdRng,
    position: [i32; 3],
    velocity: i32,
    size: (i32, i32),
    damping: (i32, i32),
}

impl PopulationSampler {
    pub fn new(config: &ParticleConfig, half_extent: Vec3, seed: u64) -> Self {
        let to_steps = |[lo, hi]: [f32; 2], scale: f32| {
            ((lo * scale).round() as i32, (hi * scale).round() as i32)
        };
        Self {
            rng: StdRng::seed_from_u64(seed),
            position: half_extent.to_array().map(|h| h.floor() as i32),
            velocity: config.velocity_range as i32,
            size: to_steps(config.size_range, 10.0),
            damping: to_steps(config.damping_range, 100.0),
        }
    }

    /// Sample the next particle: position, velocity, size, damping, then color
    pub fn sample(&mut self) -> ParticleSeed {
        let rng = &mut self.rng;

        let [px, py, pz] = self.position.map(|h| rng.gen_range(-h..=h) as f32);
        let v = self.velocity;
        let [vx, vy, vz] = [(); 3].map(|_| rng.gen_range(-v..=v) as f32);
        let size = rng.gen_range(self.size.0..=self.size.1) as f32 / 10.0;
        let damping = rng.gen_range(self.damping.0..=self.damping.1) as f32 / 100.0;
        let [r, g, b] = [(); 3].map(|_| rng.gen_range(0..=100) as f32 / 100.0);

        ParticleSeed {
            position: Vec3::new(px, py, pz),
            velocity: Vec3::new(vx, vy, vz),
            size,
            damping,
            tint: Tint([r, g, b, 1.0]),
        }
    }
}

/// The configured seed, or a fresh one that gets logged so the run can be replayed
pub fn resolve_seed(config: &ParticleConfig) -> u64 {
    match config.seed {
        Some(seed) => seed,
        None => {
            let seed = rand::random();
            log::info!("no particle seed configured, using {seed}");
            seed
        }
    }
}

/// Sample `config.count` particles into a buffer reserved up front
pub fn sample_population(config: &ParticleConfig, half_extent: Vec3, seed: u64) -> Result<Vec<ParticleSeed>> {
    let count = config.count;
    let mut seeds = Vec::new();
    seeds
        .try_reserve_exact(count)
        .map_err(|source| SwarmError::Allocation {
            what: "particle buffer",
            count,
            source,
        })?;

    let mut sampler = PopulationSampler::new(config, half_extent, seed);
    seeds.extend((0..count).map(|_| sampler.sample()));
    Ok(seeds)
}

/// Spawn one child of `anchor` per seed, in seed order
pub fn spawn_particles(world: &mut SwarmWorld, anchor: EntityId, seeds: &[ParticleSeed]) -> Result<usize> {
    world.spawn_children(anchor, seeds.len(), |i, link| seeds[i].bundle(link))
}
