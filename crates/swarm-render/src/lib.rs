//! Swarm Render - headless instanced renderer
//!
//! Implements the particle system's renderer contract without a GPU: the
//! cube mesh is built on the CPU, instance data is staged into a byte buffer
//! exactly as it would be uploaded, and each draw is summarised in
//! `DrawStats`. The color lookup can be written out as a PNG.

mod headless;
mod primitives;

pub use headless::{DrawStats, HeadlessRenderer};
pub use primitives::{create_cube_mesh, CubeMesh, Vertex};
