//! Scene model for the fly-through demo.
//!
//! A [`Scene`] owns nodes and materials in id-keyed maps so iteration order is
//! deterministic. The [`LightRig`] is plain data: shader materials copy it
//! into their uniforms on every frame through [`ShaderMaterial::sync_lights`]
//! instead of holding references into it.
//!
//! # Invariants
//! - [`ObjectRegistry`] entries exist only for objects whose load completed.
//! - Every operation that looks an object up treats absence as a no-op.

pub mod demo;
pub mod geometry;
pub mod graph;
pub mod lights;
pub mod material;
pub mod registry;

pub use demo::{AssetPaths, DemoParams, PopulationStatus, RequiredAsset, ScenePopulation};
pub use geometry::Geometry;
pub use graph::{DrawItem, MaterialId, Node, NodeId, Scene};
pub use lights::{AmbientLight, Light, LightRig, PointLight};
pub use material::{Material, ShaderMaterial, ShaderUniforms, Side, StandardMaterial};
pub use registry::{ObjectName, ObjectRegistry, UnknownObjectName};
