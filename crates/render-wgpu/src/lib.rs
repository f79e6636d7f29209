//! wgpu render backend for the demo scene.
//!
//! Draws opaque objects first, then transparent ones back to front. Shader
//! materials use the three-point-light Blinn-Phong program; standard
//! materials use a fixed key light. Meshes and textures are uploaded once and
//! cached by geometry key and asset id.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Per-object data lives in one dynamic-offset uniform buffer per frame.

mod gpu;
mod mesh;
mod shaders;
mod texture;
mod uniforms;

pub use gpu::WgpuRenderer;
