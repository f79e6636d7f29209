use anyhow::{Context as _, Result};
use clap::Parser;
use egui::Context as EguiContext;
use flyscene_assets::{AssetLoader, DirSource};
use flyscene_common::Color;
use flyscene_input::{KeyEvent as FlyKeyEvent, KeyState};
use flyscene_render::{DemoConfig, Renderer, SceneContext};
use flyscene_render_wgpu::WgpuRenderer;
use flyscene_scene::ObjectName;
use flyscene_scene::demo::SPIN_VELOCITY_RANGE;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::Key;
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "flyscene-desktop", about = "Fly through the lit demo scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Asset root directory, overriding the config
    #[arg(long)]
    assets: Option<PathBuf>,
}

/// DOM-style key name for a logical key: `"w"`, `"ArrowUp"`.
fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Character(c) => Some(c.to_string()),
        Key::Named(named) => Some(format!("{named:?}")),
        _ => None,
    }
}

fn to_rgb(color: Color) -> [f32; 3] {
    color.to_array()
}

fn from_rgb(rgb: [f32; 3]) -> Color {
    Color::new(rgb[0], rgb[1], rgb[2])
}

/// Debug panel bound to the demo's tunables.
fn draw_panel(ui_ctx: &EguiContext, ctx: &mut SceneContext) {
    egui::SidePanel::right("controls")
        .default_width(240.0)
        .show(ui_ctx, |ui| {
            ui.heading("flyscene");
            ui.separator();

            let mut cube = to_rgb(ctx.params.cube_color);
            ui.horizontal(|ui| {
                ui.label("cubeColor");
                if egui::color_picker::color_edit_button_rgb(ui, &mut cube).changed() {
                    ctx.params
                        .set_cube_color(from_rgb(cube), &mut ctx.scene, &ctx.registry);
                }
            });

            let mut plane = to_rgb(ctx.params.plane_color);
            ui.horizontal(|ui| {
                ui.label("planeColor");
                if egui::color_picker::color_edit_button_rgb(ui, &mut plane).changed() {
                    ctx.params
                        .set_plane_color(from_rgb(plane), &mut ctx.scene, &ctx.registry);
                }
            });

            let mut ambient = to_rgb(ctx.params.ambient_color);
            ui.horizontal(|ui| {
                ui.label("ambientColor");
                if egui::color_picker::color_edit_button_rgb(ui, &mut ambient).changed() {
                    ctx.params.set_ambient_color(from_rgb(ambient), &mut ctx.rig);
                }
            });

            let mut spin = ctx.params.spin_velocity;
            if ui
                .add(egui::Slider::new(&mut spin, SPIN_VELOCITY_RANGE).text("spinVelocity"))
                .changed()
            {
                ctx.params.set_spin_velocity(spin);
            }

            ui.separator();
            let cam = &ctx.camera;
            ui.label(format!("Frame: {}", ctx.frame_count()));
            ui.label(format!(
                "Camera: ({:.1}, {:.1}, {:.1})",
                cam.position.x, cam.position.y, cam.position.z
            ));
            ui.label(format!("Yaw {:.3}  Pitch {:.3}", cam.yaw, cam.pitch));
            ui.label(format!(
                "Objects: {}/{}  ready: {}",
                ctx.registry.len(),
                ObjectName::ALL.len(),
                ctx.objects_ready()
            ));

            ui.separator();
            ui.small("WASD: move | Q/E: up/down | Arrows: look");
        });
}

struct Gpu {
    window: Arc<Window>,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct FlysceneApp {
    ctx: SceneContext,
    egui_ctx: EguiContext,
    gpu: Option<Gpu>,
}

impl FlysceneApp {
    fn new(ctx: SceneContext) -> Self {
        Self {
            ctx,
            egui_ctx: EguiContext::default(),
            gpu: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("flyscene")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let size = window.inner_size();
        let mut renderer =
            pollster::block_on(WgpuRenderer::new(&instance, surface, size.width, size.height))
                .context("initialize renderer")?;
        self.ctx.resize(&mut renderer, size.width, size.height);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(renderer.device(), renderer.surface_format(), None, 1, false);

        self.gpu = Some(Gpu {
            window,
            renderer,
            egui_winit,
            egui_renderer,
        });
        Ok(())
    }

    fn redraw(&mut self) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        match self.ctx.frame(&mut gpu.renderer) {
            Ok(stats) => {
                if stats.population.ready.is_some() {
                    tracing::info!(frame = stats.frame, "scene objects ready");
                }
            }
            Err(e) if e.needs_reconfigure() => {
                tracing::debug!("{e}; reconfiguring surface");
                gpu.renderer.reconfigure();
                return;
            }
            Err(e) => {
                tracing::error!("frame failed: {e}");
                return;
            }
        }

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let ctx = &mut self.ctx;
        let full_output = self.egui_ctx.run(raw_input, |ui_ctx| draw_panel(ui_ctx, ctx));
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let (width, height) = gpu.renderer.output_size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let egui_renderer = &mut gpu.egui_renderer;
        gpu.renderer.overlay(|device, queue, view| {
            for (id, image_delta) in &full_output.textures_delta.set {
                egui_renderer.update_texture(device, queue, *id, image_delta);
            }
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
            egui_renderer.update_buffers(
                device,
                queue,
                &mut encoder,
                &paint_jobs,
                &screen_descriptor,
            );
            {
                let mut pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("egui_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    })
                    .forget_lifetime();
                egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
            }
            queue.submit(std::iter::once(encoder.finish()));
            for id in &full_output.textures_delta.free {
                egui_renderer.free_texture(id);
            }
        });

        gpu.renderer.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for FlysceneApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("startup failed: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    self.ctx
                        .resize(&mut gpu.renderer, new_size.width, new_size.height);
                }
            }
            WindowEvent::Focused(false) => {
                self.ctx.release_all();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state,
                        ..
                    },
                ..
            } => {
                let Some(name) = key_name(&logical_key) else {
                    return;
                };
                let state = match state {
                    ElementState::Pressed => KeyState::Pressed,
                    ElementState::Released => KeyState::Released,
                };
                self.ctx.handle_key(&FlyKeyEvent { key: name, state });
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("flyscene-desktop starting");

    let mut config = match &cli.config {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig::default(),
    };
    if let Some(root) = cli.assets {
        config.assets.root = root;
    }

    let mut ctx = SceneContext::new(&config, 16.0 / 9.0);
    let loader = AssetLoader::new(DirSource::new(config.assets.root.clone()));
    ctx.start_loading(&loader, &config.assets.paths);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = FlysceneApp::new(ctx);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::NamedKey;

    #[test]
    fn key_names_match_bindings() {
        assert_eq!(key_name(&Key::Character("w".into())).as_deref(), Some("w"));
        assert_eq!(
            key_name(&Key::Named(NamedKey::ArrowUp)).as_deref(),
            Some("ArrowUp")
        );
        assert_eq!(
            key_name(&Key::Named(NamedKey::ArrowLeft)).as_deref(),
            Some("ArrowLeft")
        );
    }

    #[test]
    fn bound_key_names_drive_intent() {
        let mut ctx = SceneContext::new(&DemoConfig::default(), 1.0);
        let name = key_name(&Key::Named(NamedKey::ArrowRight)).unwrap();
        ctx.handle_key(&FlyKeyEvent::pressed(name));
        assert!(ctx.intent.look_right);
    }

    #[test]
    fn panel_colors_roundtrip() {
        let c = Color::from_hex(0x102030);
        assert_eq!(from_rgb(to_rgb(c)), c);
    }
}
