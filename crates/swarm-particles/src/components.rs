//! Particle components, the aggregate, and world-global values

use crate::handoff::{MaterialHandle, MeshHandle};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use swarm_core::{Result, SwarmError};

/// World-space centre of a particle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position(pub Vec3);

/// World-space linear velocity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Velocity(pub Vec3);

/// Half-extent scale factors (uniform in practice)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size(pub Vec3);

/// Per-particle restitution used when bouncing off the boundary, in (0, 1)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Damping(pub f32);

/// RGBA color fixed at creation, normalized to [0, 1]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tint(pub [f32; 4]);

impl Tint {
    /// Convert to 8-bit channels, truncating like the shader-side lookup expects
    pub fn to_rgba8(&self) -> [u8; 4] {
        self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0) as u8)
    }
}

/// Per-instance model matrix consumed by the renderer.
///
/// Scale then translate; the translation column always mirrors `Position`.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceTransform(pub Mat4);

impl InstanceTransform {
    pub fn compose(position: Vec3, size: Vec3) -> Self {
        Self(Mat4::from_translation(position) * Mat4::from_scale(size))
    }

    pub fn translation(&self) -> Vec3 {
        self.0.w_axis.truncate()
    }

    /// Overwrite the translation column only
    #[inline]
    pub fn set_translation(&mut self, position: Vec3) {
        self.0.w_axis = position.extend(1.0);
    }
}

/// Everything one instanced draw needs besides the transforms.
/// Lives on the particle system anchor entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSystemAggregate {
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub count: u32,
    /// Width and height of the color lookup registered with `material`
    pub lookup_size: (u32, u32),
}

/// Simulation boundary and (cosmetic) window size
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldBounds {
    pub window_width: u32,
    pub window_height: u32,
    /// Half extent of the box centred at the origin
    pub half_extent: Vec3,
}

impl WorldBounds {
    pub fn validate(&self) -> Result<()> {
        for (axis, value) in ['x', 'y', 'z'].into_iter().zip(self.half_extent.to_array()) {
            if !value.is_finite() || value <= 0.0 {
                return Err(SwarmError::DegenerateBounds { axis, value });
            }
        }
        Ok(())
    }
}

/// Gravity magnitude. The vertical pass subtracts its square times dt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gravity(pub f32);

/// Coefficient multiplied into every velocity once per frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobalDamping(pub f32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_translation_is_position() {
        let xf = InstanceTransform::compose(Vec3::new(1.0, -2.0, 3.0), Vec3::splat(2.5));
        assert_eq!(xf.translation(), Vec3::new(1.0, -2.0, 3.0));
        // Scale stays on the diagonal, untouched by the translation
        assert_eq!(xf.0.x_axis.x, 2.5);
        assert_eq!(xf.0.y_axis.y, 2.5);
        assert_eq!(xf.0.z_axis.z, 2.5);
    }

    #[test]
    fn set_translation_keeps_scale() {
        let mut xf = InstanceTransform::compose(Vec3::ZERO, Vec3::splat(4.0));
        xf.set_translation(Vec3::new(7.0, 8.0, 9.0));
        assert_eq!(xf, InstanceTransform::compose(Vec3::new(7.0, 8.0, 9.0), Vec3::splat(4.0)));
    }

    #[test]
    fn transform_is_sixteen_floats() {
        assert_eq!(std::mem::size_of::<InstanceTransform>(), 64);
        let xf = [InstanceTransform::compose(Vec3::X, Vec3::ONE)];
        let bytes: &[u8] = bytemuck::cast_slice(&xf);
        assert_eq!(bytes.len(), 64);
    }

    #[test]
    fn tint_truncates_to_bytes() {
        assert_eq!(Tint([1.0, 0.5, 0.0, 1.0]).to_rgba8(), [255, 127, 0, 255]);
        assert_eq!(Tint([0.01, 0.99, 0.3, 1.0]).to_rgba8(), [2, 252, 76, 255]);
    }

    #[test]
    fn degenerate_bounds_name_the_axis() {
        let bounds = WorldBounds {
            window_width: 800,
            window_height: 600,
            half_extent: Vec3::new(10.0, 0.0, 10.0),
        };
        assert!(matches!(
            bounds.validate(),
            Err(SwarmError::DegenerateBounds { axis: 'y', .. })
        ));
        let nan = WorldBounds {
            half_extent: Vec3::new(f32::NAN, 1.0, 1.0),
            ..bounds
        };
        assert!(matches!(
            nan.validate(),
            Err(SwarmError::DegenerateBounds { axis: 'x', .. })
        ));
    }
}
