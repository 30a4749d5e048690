//! wgpu render backend.
//!
//! Draws every (mesh, material) batch of the scene as one instanced draw,
//! shaded by view-space normal or a matcap texture. The camera orbits a
//! target with damped controls.
//!
//! # Invariants
//! - The renderer never mutates the scene or the asset store.
//! - Meshes and textures are uploaded once, by asset ID; a batch whose
//!   assets are not uploaded yet is skipped, not drawn with stand-ins.
//! - Camera motion is host-side state, separate from the scene.

mod camera;
mod gpu;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::{RenderStats, WgpuRenderer};
