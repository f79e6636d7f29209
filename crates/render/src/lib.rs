//! Per-frame scene loop and the renderer-agnostic drawing interface.
//!
//! [`SceneContext`] owns everything the loop touches: scene, object registry,
//! light rig, camera, movement intent, panel parameters and pending loads.
//! Each call to [`SceneContext::frame`] applies finished loads, advances
//! shader time, syncs lights, moves the camera, spins objects and hands the
//! result to a [`Renderer`].
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - Camera pitch stays within `±MotionConfig::max_pitch`.
//! - Movement is applied per tick unless `MotionConfig::time_scaled` is set.

mod camera;
mod clock;
mod config;
mod context;
mod motion;
mod renderer;

pub use camera::FlyCamera;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{AssetConfig, CameraConfig, ConfigError, DemoConfig};
pub use context::{FrameStats, SceneContext};
pub use motion::{MotionConfig, rotate, translate};
pub use renderer::{DebugTextRenderer, RenderError, Renderer};
