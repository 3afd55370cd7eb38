//! Swarm configuration (TOML) and validation

use crate::components::{GlobalDamping, Gravity, WorldBounds};
use crate::passes::BOUNDARY_EPSILON;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use swarm_core::{Result, SwarmError};

/// Root of a `swarm.toml` file. Every section and field is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    pub window: WindowConfig,
    pub world: WorldConfig,
    pub particles: ParticleConfig,
    pub simulation: SimulationConfig,
}

/// Display size. Has no influence on the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            title: "swarm".to_string(),
        }
    }
}

/// World-global physics values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Half extent of the boundary box centred at the origin
    pub half_extent: Vec3,
    /// Gravity magnitude
    pub gravity: f32,
    /// Global velocity damping per frame
    pub damping: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            half_extent: Vec3::new(100.0, 50.0, 100.0),
            gravity: 9.8,
            damping: 0.98,
        }
    }
}

/// Population size and sampling ranges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    /// Fixed seed for a reproducible population; random when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Initial velocity components are integers in `[-velocity_range, velocity_range]`
    pub velocity_range: u32,
    /// Uniform size bounds, sampled at tenths precision
    pub size_range: [f32; 2],
    /// Bounce damping bounds, sampled at hundredths precision
    pub damping_range: [f32; 2],
}

impl ParticleConfig {
    /// Fail unless every axis of `bounds` leaves room for the largest particle.
    ///
    /// The clamp window `[-h + eps + s, h - eps - s]` must not be empty.
    pub fn check_clearance(&self, bounds: &WorldBounds) -> Result<()> {
        let size_max = self.size_range[1];
        let needed = size_max + BOUNDARY_EPSILON;
        for (axis, half) in ['x', 'y', 'z'].into_iter().zip(bounds.half_extent.to_array()) {
            if half <= needed {
                return Err(SwarmError::Config(format!(
                    "half extent {axis} = {half} cannot hold particles of size {size_max} \
                     (needs more than {needed})"
                )));
            }
        }
        Ok(())
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 600_000,
            seed: None,
            velocity_range: 250,
            size_range: [1.0, 5.0],
            damping_range: [0.30, 0.70],
        }
    }
}

/// Frame loop and scheduling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation step per frame in seconds
    pub timestep: f32,
    /// Worker threads for the physics passes (0 = one per core)
    pub threads: usize,
    /// Minimum particles per parallel work item
    pub batch_size: usize,
    /// Frame cap for the host loop (0 = uncapped)
    pub target_fps: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep: 0.0167,
            threads: 0,
            batch_size: 4096,
            target_fps: 100,
        }
    }
}

impl SwarmConfig {
    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SwarmConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject anything that would make initialization or the passes misbehave
    pub fn validate(&self) -> Result<()> {
        let p = &self.particles;
        if p.count == 0 || p.count > u32::MAX as usize {
            return Err(SwarmError::InvalidParticleCount(p.count));
        }

        self.world_bounds().validate()?;

        let [size_min, size_max] = p.size_range;
        if !(size_min.is_finite() && size_max.is_finite()) || size_min <= 0.0 || size_min > size_max {
            return Err(SwarmError::Config(format!(
                "particles.size_range must satisfy 0 < min <= max, got [{size_min}, {size_max}]"
            )));
        }

        p.check_clearance(&self.world_bounds())?;

        let [damp_min, damp_max] = p.damping_range;
        for (field, value) in [("min", damp_min), ("max", damp_max)] {
            if !(value > 0.0 && value < 1.0) {
                return Err(SwarmError::ValueOutOfRange {
                    field: format!("particles.damping_range.{field}"),
                    min: 0.0,
                    max: 1.0,
                    value: value as f64,
                });
            }
        }
        if damp_min > damp_max {
            return Err(SwarmError::Config(format!(
                "particles.damping_range is inverted: [{damp_min}, {damp_max}]"
            )));
        }

        if p.velocity_range > i32::MAX as u32 {
            return Err(SwarmError::ValueOutOfRange {
                field: "particles.velocity_range".to_string(),
                min: 0.0,
                max: i32::MAX as f64,
                value: p.velocity_range as f64,
            });
        }

        if !self.world.gravity.is_finite() {
            return Err(SwarmError::Config("world.gravity must be finite".to_string()));
        }
        if !self.world.damping.is_finite() || self.world.damping < 0.0 {
            return Err(SwarmError::Config(format!(
                "world.damping must be a non-negative number, got {}",
                self.world.damping
            )));
        }

        let sim = &self.simulation;
        if !sim.timestep.is_finite() || sim.timestep <= 0.0 {
            return Err(SwarmError::Config(format!(
                "simulation.timestep must be positive, got {}",
                sim.timestep
            )));
        }
        if sim.batch_size == 0 {
            return Err(SwarmError::Config("simulation.batch_size must be at least 1".to_string()));
        }

        Ok(())
    }

    pub fn world_bounds(&self) -> WorldBounds {
        WorldBounds {
            window_width: self.window.width,
            window_height: self.window.height,
            half_extent: self.world.half_extent,
        }
    }

    pub fn gravity(&self) -> Gravity {
        Gravity(self.world.gravity)
    }

    pub fn global_damping(&self) -> GlobalDamping {
        GlobalDamping(self.world.damping)
    }
}
