//! Run command — spawns the swarm and drives the headless frame loop

use super::{load_config, OutputFormat};
use anyhow::{Context, Result};
use serde::Serialize;
use std::time::{Duration, Instant};
use swarm_ecs::{EntityInfo, SwarmWorld};
use swarm_particles::{ParticleSystem, ParticleSystemAggregate, SwarmConfig};
use swarm_render::HeadlessRenderer;
use swarm_runtime::{FrameStats, GameClock, RuntimeSystem};

pub struct RunArgs {
    pub config: Option<String>,
    pub count: Option<usize>,
    pub frames: u64,
    pub seed: Option<u64>,
    pub threads: Option<usize>,
    pub dump_colors: Option<String>,
    pub format: OutputFormat,
    pub uncapped: bool,
}

/// What gets printed once the loop exits
#[derive(Debug, Serialize)]
struct RunSummary {
    frames: u64,
    particles: u32,
    seed: u64,
    threads: usize,
    lookup_size: (u32, u32),
    draw_calls: u64,
    mean_fps: f32,
    bounds_min: Option<[f32; 3]>,
    bounds_max: Option<[f32; 3]>,
    entities: Vec<EntityInfo>,
}

pub fn run(args: RunArgs) -> Result<()> {
    let config = effective_config(&args)?;

    let mut world = SwarmWorld::new();
    let mut renderer = HeadlessRenderer::new();
    let mut system = ParticleSystem::new(config.clone()).context("Failed to start particle system")?;

    system.initialize(&mut world)?;
    let handle = system
        .spawn_population(&mut world, &mut renderer)
        .context("Failed to spawn particle population")?;

    if let Some(path) = &args.dump_colors {
        let material = world.get::<ParticleSystemAggregate>(handle.anchor)?.material;
        renderer
            .export_lookup_png(material, path)
            .context(format!("Failed to write color lookup to {}", path))?;
    }

    let target_fps = if args.uncapped { 0 } else { config.simulation.target_fps };
    let mut clock = GameClock::with_timestep(config.simulation.timestep).with_target_fps(target_fps);
    let mut stats = FrameStats::new();
    let mut last_readout = Instant::now();

    log::info!(
        "running {} frames of {} particles (dt = {}s, cap = {})",
        args.frames,
        handle.count,
        clock.timestep,
        if target_fps > 0 { format!("{target_fps} fps") } else { "none".to_string() }
    );

    while clock.frame < args.frames {
        clock.tick();
        let dt = clock.step() as f64;

        system.fixed_update(&mut world, dt)?;
        system.update(&mut world, clock.delta_time)?;
        system.draw(&world, &mut renderer)?;
        stats.record_frame();

        if last_readout.elapsed() >= Duration::from_secs(1) {
            log::info!("{}", stats.readout());
            for timing in system.pipeline().last_timings() {
                log::debug!(
                    "  {:<20} {:.3}ms",
                    timing.kind.name(),
                    timing.duration.as_secs_f64() * 1000.0
                );
            }
            last_readout = Instant::now();
        }

        if let Some(delay) = clock.pacing_delay() {
            std::thread::sleep(delay);
        }
    }

    system.shutdown()?;

    let draw = renderer.stats();
    let summary = RunSummary {
        frames: clock.frame,
        particles: handle.count,
        seed: handle.seed,
        threads: system.thread_count(),
        lookup_size: handle.lookup_size,
        draw_calls: draw.draw_calls,
        mean_fps: stats.mean_fps(),
        bounds_min: draw.bounds_min,
        bounds_max: draw.bounds_max,
        entities: world.all_entities(),
    };
    print_summary(&summary, args.format)
}

/// Config file (or defaults) with command-line overrides applied
fn effective_config(args: &RunArgs) -> Result<SwarmConfig> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(count) = args.count {
        config.particles.count = count;
    }
    if let Some(seed) = args.seed {
        config.particles.seed = Some(seed);
    }
    if let Some(threads) = args.threads {
        config.simulation.threads = threads;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn print_summary(summary: &RunSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
        OutputFormat::Text => {
            println!("Frames:      {}", summary.frames);
            println!("Particles:   {}", summary.particles);
            println!("Seed:        {}", summary.seed);
            println!("Threads:     {}", summary.threads);
            println!(
                "Lookup:      {}x{}",
                summary.lookup_size.0, summary.lookup_size.1
            );
            println!("Draw calls:  {}", summary.draw_calls);
            println!("Mean FPS:    {:.1}", summary.mean_fps);
            if let (Some(min), Some(max)) = (summary.bounds_min, summary.bounds_max) {
                println!(
                    "Bounds:      [{:.2}, {:.2}, {:.2}] .. [{:.2}, {:.2}, {:.2}]",
                    min[0], min[1], min[2], max[0], max[1], max[2]
                );
            }
            for entity in &summary.entities {
                println!("Entity:      {} ({}, {} children)", entity.name, entity.id, entity.children);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            config: None,
            count: Some(16),
            frames: 3,
            seed: Some(9),
            threads: Some(1),
            dump_colors: None,
            format: OutputFormat::Json,
            uncapped: true,
        }
    }

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let config = effective_config(&args()).unwrap();
        assert_eq!(config.particles.count, 16);
        assert_eq!(config.particles.seed, Some(9));
        assert_eq!(config.simulation.threads, 1);
        assert_eq!(config.world.gravity, 9.8);
    }

    #[test]
    fn zero_count_override_is_rejected() {
        let mut a = args();
        a.count = Some(0);
        assert!(effective_config(&a).is_err());
    }

    #[test]
    fn short_run_completes() {
        run(args()).unwrap();
    }
}
