//! Per-instance color lookup image

use crate::components::Tint;
use swarm_core::{Result, SwarmError};

/// RGBA8 image holding one texel per particle, keyed by instance index.
///
/// `height = floor(sqrt(n))` and `width = ceil(n / height)`, so the image
/// always covers every particle. Texels past `n` are transparent black.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorLookup {
    width: u32,
    height: u32,
    count: usize,
    texels: Vec<[u8; 4]>,
}

impl ColorLookup {
    /// Image size for `count` particles
    pub fn dimensions_for(count: usize) -> (u32, u32) {
        let height = isqrt(count).max(1);
        let width = count.div_ceil(height).max(1);
        (width as u32, height as u32)
    }

    /// Pack tints in instance order
    pub fn from_tints<'a>(tints: impl ExactSizeIterator<Item = &'a Tint>) -> Result<Self> {
        let count = tints.len();
        let (width, height) = Self::dimensions_for(count);
        let len = width as usize * height as usize;

        let mut texels = Vec::new();
        texels
            .try_reserve_exact(len)
            .map_err(|source| SwarmError::Allocation {
                what: "color lookup",
                count,
                source,
            })?;
        texels.extend(tints.map(Tint::to_rgba8));
        texels.resize(len, [0; 4]);

        Ok(Self {
            width,
            height,
            count,
            texels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of particles covered (texels beyond this are padding)
    pub fn count(&self) -> usize {
        self.count
    }

    /// Texel coordinates of instance `index`
    pub fn texel_coords(&self, index: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((index % w) as u32, (index / w) as u32)
    }

    pub fn texel(&self, index: usize) -> Option<[u8; 4]> {
        (index < self.count).then(|| self.texels[index])
    }

    /// Row-major texels including padding
    pub fn texels(&self) -> &[[u8; 4]] {
        &self.texels
    }

    /// Raw bytes ready for a texture upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }
}

/// Integer square root (floor)
fn isqrt(n: usize) -> usize {
    let mut r = (n as f64).sqrt() as usize;
    while r * r > n {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= n {
        r += 1;
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_cover_count() {
        assert_eq!(ColorLookup::dimensions_for(1), (1, 1));
        assert_eq!(ColorLookup::dimensions_for(4), (2, 2));
        // floor(sqrt(10)) = 3, 10 / 3 would truncate to 3 and miss a texel
        assert_eq!(ColorLookup::dimensions_for(10), (4, 3));
        assert_eq!(ColorLookup::dimensions_for(600_000), (776, 774));
        for n in [2usize, 3, 7, 99, 1023, 65_537] {
            let (w, h) = ColorLookup::dimensions_for(n);
            assert!(w as usize * h as usize >= n, "n = {n}");
        }
    }

    #[test]
    fn isqrt_exact_around_squares() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(15), 3);
        assert_eq!(isqrt(16), 4);
        assert_eq!(isqrt(17), 4);
    }

    #[test]
    fn texels_follow_instance_order_with_padding() {
        let tints: Vec<Tint> = (0..5)
            .map(|i| Tint([i as f32 / 10.0, 0.0, 1.0, 1.0]))
            .collect();
        let lookup = ColorLookup::from_tints(tints.iter()).unwrap();

        assert_eq!((lookup.width(), lookup.height()), (3, 2));
        assert_eq!(lookup.count(), 5);
        assert_eq!(lookup.texels().len(), 6);
        for (i, tint) in tints.iter().enumerate() {
            assert_eq!(lookup.texel(i), Some(tint.to_rgba8()));
        }
        assert_eq!(lookup.texel(5), None);
        assert_eq!(lookup.texels()[5], [0, 0, 0, 0]);
        assert_eq!(lookup.texel_coords(4), (1, 1));
        assert_eq!(lookup.as_bytes().len(), 24);
    }
}
