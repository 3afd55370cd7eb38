//! Headless renderer that stages instance data instead of drawing it

use crate::primitives::{create_cube_mesh, CubeMesh};
use glam::Vec3;
use serde::Serialize;
use std::path::Path;
use swarm_core::{Result, SwarmError};
use swarm_particles::{
    ColorLookup, DrawPayload, InstanceRenderer, MaterialHandle, MeshDesc, MeshHandle,
};

/// Running totals over every draw issued so far
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct DrawStats {
    pub draw_calls: u64,
    /// Instances in the most recent draw
    pub last_instances: u32,
    pub total_instances: u64,
    pub bytes_uploaded: u64,
    /// Axis-aligned box around the translations of the most recent draw
    pub bounds_min: Option<[f32; 3]>,
    pub bounds_max: Option<[f32; 3]>,
}

/// Renders nothing; records what a GPU renderer would upload and draw
#[derive(Default)]
pub struct HeadlessRenderer {
    meshes: Vec<CubeMesh>,
    materials: Vec<ColorLookup>,
    /// Mirror of the GPU instance buffer, grown on demand and reused
    instance_buffer: Vec<u8>,
    stats: DrawStats,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &DrawStats {
        &self.stats
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&CubeMesh> {
        self.meshes.get(handle.0 as usize)
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&ColorLookup> {
        self.materials.get(handle.0 as usize)
    }

    /// Bytes staged by the most recent draw
    pub fn staged_instances(&self) -> &[u8] {
        &self.instance_buffer
    }

    /// Write a registered color lookup to disk as an RGBA PNG
    pub fn export_lookup_png(&self, handle: MaterialHandle, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let lookup = self
            .material(handle)
            .ok_or_else(|| SwarmError::RenderError(format!("unknown material {}", handle.0)))?;

        let img = image::RgbaImage::from_raw(lookup.width(), lookup.height(), lookup.as_bytes().to_vec())
            .ok_or_else(|| SwarmError::RenderError("color lookup size mismatch".to_string()))?;
        img.save(path)
            .map_err(|e| SwarmError::RenderError(format!("failed to save {}: {e}", path.display())))?;

        log::info!(
            "wrote {}x{} color lookup to {}",
            lookup.width(),
            lookup.height(),
            path.display()
        );
        Ok(())
    }
}

impl InstanceRenderer for HeadlessRenderer {
    fn register_mesh(&mut self, mesh: MeshDesc) -> Result<MeshHandle> {
        let built = match mesh {
            MeshDesc::Cube { edge } => create_cube_mesh(edge),
        };
        log::debug!("registered cube mesh with {} triangles", built.triangle_count());
        self.meshes.push(built);
        Ok(MeshHandle(self.meshes.len() as u32 - 1))
    }

    fn register_material(&mut self, colors: &ColorLookup) -> Result<MaterialHandle> {
        log::debug!(
            "registered color lookup {}x{} for {} instances",
            colors.width(),
            colors.height(),
            colors.count()
        );
        self.materials.push(colors.clone());
        Ok(MaterialHandle(self.materials.len() as u32 - 1))
    }

    fn draw_instanced(&mut self, payload: &DrawPayload<'_>) -> Result<()> {
        if self.mesh(payload.mesh).is_none() {
            return Err(SwarmError::RenderError(format!("unknown mesh {}", payload.mesh.0)));
        }
        let lookup = self
            .material(payload.material)
            .ok_or_else(|| SwarmError::RenderError(format!("unknown material {}", payload.material.0)))?;
        if payload.count as usize > lookup.count() {
            return Err(SwarmError::RenderError(format!(
                "draw of {} instances exceeds color lookup of {}",
                payload.count,
                lookup.count()
            )));
        }

        let bytes = payload.instance_bytes();
        self.instance_buffer.clear();
        self.instance_buffer.extend_from_slice(bytes);

        let (min, max) = payload.transforms.iter().map(|t| t.translation()).fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(lo, hi), p| (lo.min(p), hi.max(p)),
        );
        let has_instances = !payload.transforms.is_empty();

        self.stats.draw_calls += 1;
        self.stats.last_instances = payload.count;
        self.stats.total_instances += payload.count as u64;
        self.stats.bytes_uploaded += bytes.len() as u64;
        self.stats.bounds_min = has_instances.then(|| min.to_array());
        self.stats.bounds_max = has_instances.then(|| max.to_array());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_particles::{InstanceTransform, Tint};

    fn lookup(n: usize) -> ColorLookup {
        let tints = vec![Tint([1.0, 0.0, 0.5, 1.0]); n];
        ColorLookup::from_tints(tints.iter()).unwrap()
    }

    #[test]
    fn handles_are_indices() {
        let mut renderer = HeadlessRenderer::new();
        let mesh = renderer.register_mesh(MeshDesc::Cube { edge: 1.0 }).unwrap();
        let material = renderer.register_material(&lookup(3)).unwrap();
        assert_eq!(mesh, MeshHandle(0));
        assert_eq!(material, MaterialHandle(0));
        assert_eq!(renderer.mesh(mesh).unwrap().vertices.len(), 24);
        assert_eq!(renderer.material(material).unwrap().count(), 3);
    }

    #[test]
    fn draw_stages_bytes_and_tracks_bounds() {
        let mut renderer = HeadlessRenderer::new();
        let mesh = renderer.register_mesh(MeshDesc::Cube { edge: 1.0 }).unwrap();
        let material = renderer.register_material(&lookup(2)).unwrap();

        let transforms = [
            InstanceTransform::compose(Vec3::new(-1.0, 2.0, 3.0), Vec3::ONE),
            InstanceTransform::compose(Vec3::new(4.0, -5.0, 0.0), Vec3::splat(2.0)),
        ];
        let payload = DrawPayload {
            mesh,
            material,
            transforms: &transforms,
            count: 2,
        };
        renderer.draw_instanced(&payload).unwrap();
        renderer.draw_instanced(&payload).unwrap();

        let stats = renderer.stats();
        assert_eq!(stats.draw_calls, 2);
        assert_eq!(stats.last_instances, 2);
        assert_eq!(stats.total_instances, 4);
        assert_eq!(stats.bytes_uploaded, 2 * 128);
        assert_eq!(stats.bounds_min, Some([-1.0, -5.0, 0.0]));
        assert_eq!(stats.bounds_max, Some([4.0, 2.0, 3.0]));
        assert_eq!(renderer.staged_instances().len(), 128);
    }

    #[test]
    fn unknown_handles_are_rejected() {
        let mut renderer = HeadlessRenderer::new();
        let payload = DrawPayload {
            mesh: MeshHandle(0),
            material: MaterialHandle(0),
            transforms: &[],
            count: 0,
        };
        assert!(matches!(
            renderer.draw_instanced(&payload),
            Err(SwarmError::RenderError(_))
        ));
    }

    #[test]
    fn draw_larger_than_lookup_fails() {
        let mut renderer = HeadlessRenderer::new();
        let mesh = renderer.register_mesh(MeshDesc::Cube { edge: 1.0 }).unwrap();
        let material = renderer.register_material(&lookup(1)).unwrap();
        let transforms = [InstanceTransform::compose(Vec3::ZERO, Vec3::ONE); 2];
        let payload = DrawPayload {
            mesh,
            material,
            transforms: &transforms,
            count: 2,
        };
        assert!(renderer.draw_instanced(&payload).is_err());
    }

    #[test]
    fn lookup_exports_as_png() {
        let mut renderer = HeadlessRenderer::new();
        let material = renderer.register_material(&lookup(5)).unwrap();
        let path = std::env::temp_dir().join(format!("swarm-lookup-{}.png", std::process::id()));

        renderer.export_lookup_png(material, &path).unwrap();
        let img = image::open(&path).unwrap().to_rgba8();
        std::fs::remove_file(&path).ok();

        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 127, 255]);
        assert_eq!(img.get_pixel(2, 1).0, [0, 0, 0, 0]);
    }
}
