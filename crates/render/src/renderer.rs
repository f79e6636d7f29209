use std::fmt::Write as _;

use flyscene_scene::{Material, Scene};

use crate::camera::FlyCamera;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("surface lost")]
    SurfaceLost,
    #[error("surface outdated")]
    SurfaceOutdated,
    #[error("timed out acquiring the next frame")]
    Timeout,
    #[error("GPU out of memory")]
    OutOfMemory,
    #[error("render backend error: {0}")]
    Backend(String),
}

impl RenderError {
    /// Errors cured by reconfiguring the surface at its current size.
    pub fn needs_reconfigure(&self) -> bool {
        matches!(self, RenderError::SurfaceLost | RenderError::SurfaceOutdated)
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads the scene and camera and produces output; it never
/// mutates the scene.
pub trait Renderer {
    /// Draw one frame.
    fn draw(&mut self, scene: &Scene, camera: &FlyCamera) -> Result<(), RenderError>;

    /// Resize the output. Called with non-zero sizes only.
    fn resize(&mut self, width: u32, height: u32);

    fn output_size(&self) -> (u32, u32);
}

/// Text renderer used by the CLI and tests.
///
/// Writes a human-readable summary of the drawable scene and keeps the
/// latest frame for inspection.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    size: (u32, u32),
    frames: u64,
    last: String,
}

impl DebugTextRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            ..Self::default()
        }
    }

    pub fn last_output(&self) -> &str {
        &self.last
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DebugTextRenderer {
    fn draw(&mut self, scene: &Scene, camera: &FlyCamera) -> Result<(), RenderError> {
        self.frames += 1;
        let items = scene.draw_list();
        let mut out = String::new();
        let p = camera.position;
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "=== Frame {} ({}x{}) ===",
            self.frames, self.size.0, self.size.1
        );
        let _ = writeln!(
            out,
            "Camera: pos=({:.2}, {:.2}, {:.2}) yaw={:.3} pitch={:.3} aspect={:.3}",
            p.x, p.y, p.z, camera.yaw, camera.pitch, camera.aspect
        );
        let _ = writeln!(out, "Drawables: {}", items.len());
        for item in &items {
            let Some(node) = scene.node(item.node) else {
                continue;
            };
            let kind = match scene.material(item.material) {
                Some(Material::Shader(m)) if m.transparent => "shader/transparent",
                Some(Material::Shader(_)) => "shader",
                Some(Material::Standard(_)) => "standard",
                None => "none",
            };
            let w = item.world.w_axis;
            let _ = writeln!(
                out,
                "  {} pos=({:.2}, {:.2}, {:.2}) material={}",
                node.name, w.x, w.y, w.z, kind
            );
        }
        self.last = out;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn output_size(&self) -> (u32, u32) {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flyscene_common::{Color, Transform};
    use flyscene_scene::{Geometry, Node, StandardMaterial};
    use glam::Vec3;

    #[test]
    fn debug_renderer_empty_scene() {
        let mut renderer = DebugTextRenderer::new(640, 480);
        renderer.draw(&Scene::new(), &FlyCamera::default()).unwrap();
        assert!(renderer.last_output().contains("Frame 1 (640x480)"));
        assert!(renderer.last_output().contains("Drawables: 0"));
    }

    #[test]
    fn debug_renderer_lists_drawables() {
        let mut scene = Scene::new();
        let mat = scene.add_material(StandardMaterial::new(Color::WHITE));
        scene.add_node(
            Node::mesh("regularCube", Geometry::cuboid(1.0, 4.0, 1.0), mat)
                .with_transform(Transform::from_position(Vec3::new(0.0, 10.0, 0.0))),
        );
        let mut renderer = DebugTextRenderer::default();
        renderer.draw(&scene, &FlyCamera::default()).unwrap();
        renderer.draw(&scene, &FlyCamera::default()).unwrap();
        let out = renderer.last_output();
        assert!(out.contains("Drawables: 1"));
        assert!(out.contains("regularCube pos=(0.00, 10.00, 0.00) material=standard"));
        assert_eq!(renderer.frames_drawn(), 2);
    }

    #[test]
    fn reconfigure_classification() {
        assert!(RenderError::SurfaceLost.needs_reconfigure());
        assert!(!RenderError::OutOfMemory.needs_reconfigure());
    }
}
