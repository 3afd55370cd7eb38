//! Swarm particles
//!
//! A large population of independently moving cubes: sampled once at
//! startup, advanced every frame by four data-parallel passes, and handed to
//! an instanced renderer as one contiguous transform buffer.

pub mod components;
pub mod config;
pub mod handoff;
pub mod lookup;
pub mod passes;
pub mod spawn;

pub use components::{
    Damping, GlobalDamping, Gravity, InstanceTransform, ParticleSystemAggregate, Position, Size,
    Tint, Velocity, WorldBounds,
};
pub use config::SwarmConfig;
pub use handoff::{with_draw_payload, DrawPayload, InstanceRenderer, MaterialHandle, MeshDesc, MeshHandle};
pub use lookup::ColorLookup;
pub use passes::{FrameParams, PassKind, PassTiming, PhysicsPipeline, BOUNDARY_EPSILON};
pub use spawn::ParticleSeed;

use swarm_core::{EntityId, Result, SwarmError};
use swarm_ecs::SwarmWorld;
use swarm_runtime::RuntimeSystem;

/// Name of the anchor entity every particle is grouped under
pub const ANCHOR_NAME: &str = "ParticleSystem";

/// What the host needs to know about a spawned population
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSystemHandle {
    pub anchor: EntityId,
    pub count: u32,
    pub lookup_size: (u32, u32),
    pub seed: u64,
}

/// Owns the pass pipeline and the worker pool that runs it
pub struct ParticleSystem {
    config: SwarmConfig,
    pipeline: PhysicsPipeline,
    pool: rayon::ThreadPool,
    handle: Option<ParticleSystemHandle>,
}

impl ParticleSystem {
    /// Validate `config` and start the worker pool
    pub fn new(config: SwarmConfig) -> Result<Self> {
        config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.simulation.threads)
            .thread_name(|i| format!("swarm-worker-{i}"))
            .build()
            .map_err(|e| SwarmError::RuntimeError(format!("failed to start worker pool: {e}")))?;
        log::info!("physics pool running {} threads", pool.current_num_threads());

        Ok(Self {
            pipeline: PhysicsPipeline::standard(config.simulation.batch_size),
            config,
            pool,
            handle: None,
        })
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    /// Populated once `spawn_population` succeeds
    pub fn handle(&self) -> Option<ParticleSystemHandle> {
        self.handle
    }

    pub fn pipeline(&self) -> &PhysicsPipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut PhysicsPipeline {
        &mut self.pipeline
    }

    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Create the whole population and register its mesh and colors.
    ///
    /// Everything that can fail (bounds, buffer reservation, renderer
    /// registration) happens before the first entity is spawned.
    pub fn spawn_population(
        &mut self,
        world: &mut SwarmWorld,
        renderer: &mut dyn InstanceRenderer,
    ) -> Result<ParticleSystemHandle> {
        if self.handle.is_some() {
            return Err(SwarmError::RuntimeError("particle population already spawned".to_string()));
        }

        let bounds = *world.singleton::<WorldBounds>()?;
        bounds.validate()?;
        let particles = &self.config.particles;
        particles.check_clearance(&bounds)?;

        let seed = spawn::resolve_seed(particles);
        let seeds = spawn::sample_population(particles, bounds.half_extent, seed)?;
        let lookup = ColorLookup::from_tints(seeds.iter().map(|s| &s.tint))?;
        log::info!(
            "sampled {} particles, color lookup {}x{}",
            seeds.len(),
            lookup.width(),
            lookup.height()
        );

        let mesh = renderer.register_mesh(MeshDesc::Cube { edge: 1.0 })?;
        let material = renderer.register_material(&lookup)?;

        let count = seeds.len() as u32;
        let lookup_size = (lookup.width(), lookup.height());
        let anchor = world.spawn_with(
            ANCHOR_NAME,
            (ParticleSystemAggregate {
                mesh,
                material,
                count,
                lookup_size,
            },),
        )?;
        spawn::spawn_particles(world, anchor, &seeds)?;

        let handle = ParticleSystemHandle {
            anchor,
            count,
            lookup_size,
            seed,
        };
        self.handle = Some(handle);
        Ok(handle)
    }

    /// Run the four passes once with step `dt`
    pub fn advance(&mut self, world: &mut SwarmWorld, dt: f32) -> Result<()> {
        let params = FrameParams::from_world(world, dt)?;
        let pipeline = &mut self.pipeline;
        self.pool.install(|| pipeline.run(world, &params));
        Ok(())
    }

    /// Lend the current draw payload to `f`
    pub fn with_draw_payload<R>(&self, world: &SwarmWorld, f: impl FnOnce(&DrawPayload<'_>) -> R) -> Result<R> {
        let handle = self.spawned()?;
        handoff::with_draw_payload(world, handle.anchor, f)
    }

    /// Issue this frame's instanced draw
    pub fn draw(&self, world: &SwarmWorld, renderer: &mut dyn InstanceRenderer) -> Result<()> {
        self.with_draw_payload(world, |payload| renderer.draw_instanced(payload))?
    }

    fn spawned(&self) -> Result<ParticleSystemHandle> {
        self.handle
            .ok_or_else(|| SwarmError::EntityNotFound(ANCHOR_NAME.to_string()))
    }
}

impl RuntimeSystem for ParticleSystem {
    /// Install the world-global values unless the host already set them
    fn initialize(&mut self, world: &mut SwarmWorld) -> Result<()> {
        if !world.has_singleton::<WorldBounds>() {
            world.set_singleton(self.config.world_bounds());
        }
        if !world.has_singleton::<Gravity>() {
            world.set_singleton(self.config.gravity());
        }
        if !world.has_singleton::<GlobalDamping>() {
            world.set_singleton(self.config.global_damping());
        }
        Ok(())
    }

    fn fixed_update(&mut self, world: &mut SwarmWorld, dt: f64) -> Result<()> {
        self.advance(world, dt as f32)
    }

    fn update(&mut self, _world: &mut SwarmWorld, _dt: f64) -> Result<()> {
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        if let Some(handle) = self.handle {
            log::debug!("particle system shutting down with {} particles", handle.count);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "particles"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    /// Keeps a copy of everything it is asked to draw
    #[derive(Default)]
    struct RecordingRenderer {
        meshes: Vec<MeshDesc>,
        lookups: Vec<ColorLookup>,
        draws: Vec<(MeshHandle, MaterialHandle, Vec<InstanceTransform>, u32)>,
    }

    impl InstanceRenderer for RecordingRenderer {
        fn register_mesh(&mut self, mesh: MeshDesc) -> Result<MeshHandle> {
            self.meshes.push(mesh);
            Ok(MeshHandle(self.meshes.len() as u32))
        }

        fn register_material(&mut self, colors: &ColorLookup) -> Result<MaterialHandle> {
            self.lookups.push(colors.clone());
            Ok(MaterialHandle(self.lookups.len() as u32))
        }

        fn draw_instanced(&mut self, payload: &DrawPayload<'_>) -> Result<()> {
            self.draws.push((
                payload.mesh,
                payload.material,
                payload.transforms.to_vec(),
                payload.count,
            ));
            Ok(())
        }
    }

    fn small_config(count: usize) -> SwarmConfig {
        let mut config = SwarmConfig::default();
        config.particles.count = count;
        config.particles.seed = Some(2024);
        config.world.half_extent = Vec3::splat(10.0);
        config.simulation.threads = 2;
        config.simulation.batch_size = 2;
        config
    }

    fn positions(world: &SwarmWorld, anchor: EntityId) -> Vec<Position> {
        world
            .with_child_column::<Position, _>(anchor, |c| c.to_vec())
            .unwrap()
    }

    #[test]
    fn one_frame_end_to_end() {
        let mut system = ParticleSystem::new(small_config(4)).unwrap();
        let mut world = SwarmWorld::new();
        let mut renderer = RecordingRenderer::default();

        system.initialize(&mut world).unwrap();
        let handle = system.spawn_population(&mut world, &mut renderer).unwrap();
        assert_eq!(handle.count, 4);
        assert_eq!(handle.lookup_size, (2, 2));
        assert_eq!(world.get_id(ANCHOR_NAME), Some(handle.anchor));
        assert_eq!(renderer.meshes, vec![MeshDesc::Cube { edge: 1.0 }]);

        system.advance(&mut world, 1.0 / 60.0).unwrap();
        system.draw(&world, &mut renderer).unwrap();

        assert_eq!(renderer.draws.len(), 1);
        let (mesh, material, transforms, count) = &renderer.draws[0];
        assert_eq!((*mesh, *material, *count), (MeshHandle(1), MaterialHandle(1), 4));

        let after = positions(&world, handle.anchor);
        let velocities = world
            .with_child_column::<Velocity, _>(handle.anchor, |c| c.to_vec())
            .unwrap();
        assert_eq!(after.len(), 4);
        for ((p, xf), v) in after.iter().zip(transforms).zip(&velocities) {
            assert_eq!(xf.translation(), p.0);
            assert!(v.0.is_finite());
            assert!(p.0.abs().max_element() <= 10.0);
        }
    }

    #[test]
    fn colors_follow_creation_order() {
        let mut system = ParticleSystem::new(small_config(10)).unwrap();
        let mut world = SwarmWorld::new();
        let mut renderer = RecordingRenderer::default();
        system.initialize(&mut world).unwrap();
        let handle = system.spawn_population(&mut world, &mut renderer).unwrap();

        let lookup = &renderer.lookups[0];
        assert_eq!((lookup.width(), lookup.height()), (4, 3));
        let tints = world
            .with_child_column::<Tint, _>(handle.anchor, |c| c.to_vec())
            .unwrap();
        for (i, tint) in tints.iter().enumerate() {
            assert_eq!(lookup.texel(i), Some(tint.to_rgba8()));
        }
    }

    #[test]
    fn seeded_population_is_reproducible() {
        let spawn = || {
            let mut system = ParticleSystem::new(small_config(32)).unwrap();
            let mut world = SwarmWorld::new();
            system.initialize(&mut world).unwrap();
            let handle = system
                .spawn_population(&mut world, &mut RecordingRenderer::default())
                .unwrap();
            positions(&world, handle.anchor)
        };
        assert_eq!(spawn(), spawn());
    }

    #[test]
    fn initialize_keeps_host_singletons() {
        let mut system = ParticleSystem::new(small_config(4)).unwrap();
        let mut world = SwarmWorld::new();
        world.set_singleton(Gravity(1.5));
        system.initialize(&mut world).unwrap();

        assert_eq!(world.singleton::<Gravity>().unwrap().0, 1.5);
        assert_eq!(world.singleton::<GlobalDamping>().unwrap().0, 0.98);
        assert_eq!(world.singleton::<WorldBounds>().unwrap().half_extent, Vec3::splat(10.0));
    }

    #[test]
    fn spawning_needs_bounds() {
        let mut system = ParticleSystem::new(small_config(4)).unwrap();
        let mut world = SwarmWorld::new();
        let mut renderer = RecordingRenderer::default();

        assert!(matches!(
            system.spawn_population(&mut world, &mut renderer),
            Err(SwarmError::SingletonNotFound(_))
        ));
        // Nothing was created or registered
        assert!(world.is_empty());
        assert!(renderer.meshes.is_empty());
    }

    #[test]
    fn host_bounds_too_small_for_particles_are_rejected() {
        let mut system = ParticleSystem::new(small_config(4)).unwrap();
        let mut world = SwarmWorld::new();
        let mut renderer = RecordingRenderer::default();
        world.set_singleton(WorldBounds {
            window_width: 800,
            window_height: 600,
            half_extent: Vec3::splat(3.0),
        });
        system.initialize(&mut world).unwrap();

        assert!(matches!(
            system.spawn_population(&mut world, &mut renderer),
            Err(SwarmError::Config(_))
        ));
        assert!(world.is_empty());
        assert!(renderer.meshes.is_empty());
        assert!(system.handle().is_none());
    }

    #[test]
    fn population_spawns_once() {
        let mut system = ParticleSystem::new(small_config(4)).unwrap();
        let mut world = SwarmWorld::new();
        let mut renderer = RecordingRenderer::default();
        system.initialize(&mut world).unwrap();
        system.spawn_population(&mut world, &mut renderer).unwrap();
        assert!(system.spawn_population(&mut world, &mut renderer).is_err());
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let mut config = small_config(0);
        assert!(ParticleSystem::new(config.clone()).is_err());
        config.particles.count = 4;
        config.simulation.timestep = -1.0;
        assert!(ParticleSystem::new(config).is_err());
    }

    #[test]
    fn draw_before_spawn_fails() {
        let system = ParticleSystem::new(small_config(4)).unwrap();
        let world = SwarmWorld::new();
        assert!(system.draw(&world, &mut RecordingRenderer::default()).is_err());
    }

    #[test]
    fn runtime_system_steps_the_passes() {
        let mut system = ParticleSystem::new(small_config(8)).unwrap();
        let mut world = SwarmWorld::new();
        system.initialize(&mut world).unwrap();
        let handle = system
            .spawn_population(&mut world, &mut RecordingRenderer::default())
            .unwrap();

        system.fixed_update(&mut world, 1.0 / 60.0).unwrap();
        assert_eq!(system.pipeline().last_timings().len(), 4);
        assert_eq!(system.name(), "particles");
        assert_eq!(world.child_count(handle.anchor), 8);
        system.shutdown().unwrap();
    }
}
