use std::time::Duration;

use flyscene_assets::AssetLoader;
use flyscene_input::{KeyBindings, KeyEvent, Movement, MovementIntent};
use flyscene_scene::demo::{self, PopulationStatus, ScenePopulation};
use flyscene_scene::{AssetPaths, DemoParams, LightRig, ObjectRegistry, Scene};

use crate::camera::FlyCamera;
use crate::clock::{Clock, MonotonicClock};
use crate::config::DemoConfig;
use crate::motion::{self, MotionConfig};
use crate::renderer::{RenderError, Renderer};

/// What one frame did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// 1-based frame number.
    pub frame: u64,
    pub elapsed: Duration,
    pub dt: Duration,
    /// Spinning objects present this frame.
    pub spun: usize,
    pub population: PopulationStatus,
}

/// Application context for the demo: owns all state the frame loop reads or
/// writes.
pub struct SceneContext {
    pub scene: Scene,
    pub registry: ObjectRegistry,
    pub rig: LightRig,
    pub camera: FlyCamera,
    pub intent: MovementIntent,
    pub params: DemoParams,
    pub motion: MotionConfig,
    bindings: KeyBindings,
    clock: Box<dyn Clock>,
    last_elapsed: Option<Duration>,
    frame_count: u64,
    population: Option<ScenePopulation>,
}

impl std::fmt::Debug for SceneContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneContext")
            .field("nodes", &self.scene.node_count())
            .field("registry", &self.registry)
            .field("camera", &self.camera)
            .field("intent", &self.intent)
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

impl SceneContext {
    /// Build the static scene and camera. Asset loads start separately via
    /// [`SceneContext::start_loading`].
    pub fn new(config: &DemoConfig, aspect: f32) -> Self {
        let mut scene = Scene::new();
        let mut registry = ObjectRegistry::new();
        let mut params = config.params;
        params.set_spin_velocity(config.params.spin_velocity);
        let mut rig = LightRig::demo();
        rig.ambient.color = params.ambient_color;
        demo::build_static(&mut scene, &mut registry, &rig, &params);

        Self {
            scene,
            registry,
            rig,
            camera: config.camera.build(aspect),
            intent: MovementIntent::new(),
            params,
            motion: config.motion,
            bindings: config.bindings.clone(),
            clock: Box::new(MonotonicClock::new()),
            last_elapsed: None,
            frame_count: 0,
            population: None,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self.last_elapsed = None;
        self
    }

    pub fn start_loading(&mut self, loader: &AssetLoader, paths: &AssetPaths) {
        self.population = Some(ScenePopulation::start(loader, paths));
    }

    pub fn set_population(&mut self, population: ScenePopulation) {
        self.population = Some(population);
    }

    /// `true` once every required asset load has settled.
    pub fn objects_ready(&self) -> bool {
        self.population.as_ref().is_some_and(ScenePopulation::is_ready)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Route a key transition into the movement intent.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<Movement> {
        self.bindings.handle(&mut self.intent, event)
    }

    /// Drop all held keys, e.g. on focus loss.
    pub fn release_all(&mut self) {
        self.intent.clear();
    }

    /// Apply a viewport size to camera and renderer. Zero sizes are ignored.
    pub fn resize<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        width: u32,
        height: u32,
    ) -> bool {
        if !self.camera.set_viewport(width, height) {
            tracing::debug!(width, height, "ignoring zero-sized resize");
            return false;
        }
        renderer.resize(width, height);
        true
    }

    /// Advance the scene by one tick without drawing.
    pub fn update(&mut self) -> FrameStats {
        self.frame_count += 1;

        let population = match self.population.as_mut() {
            Some(p) => p.poll(&mut self.scene, &mut self.registry, &self.rig),
            None => PopulationStatus::default(),
        };

        let elapsed = self.clock.elapsed();
        let dt = elapsed.saturating_sub(self.last_elapsed.unwrap_or(elapsed));
        self.last_elapsed = Some(elapsed);

        let seconds = elapsed.as_secs_f32();
        let rig = self.rig;
        for material in self.scene.shader_materials_mut() {
            material.set_time(seconds);
            material.sync_lights(&rig);
        }

        let scale = self.motion.step_scale(dt.as_secs_f32());
        motion::translate(&mut self.camera, &self.intent, self.motion.speed * scale);
        motion::rotate(
            &mut self.camera,
            &self.intent,
            self.motion.rotation_step * scale,
            self.motion.max_pitch,
        );

        let spun = demo::spin(
            &mut self.scene,
            &self.registry,
            self.params.spin_velocity * scale,
        );

        FrameStats {
            frame: self.frame_count,
            elapsed,
            dt,
            spun,
            population,
        }
    }

    /// One full frame: update, then draw.
    pub fn frame<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
    ) -> Result<FrameStats, RenderError> {
        let stats = self.update();
        renderer.draw(&self.scene, &self.camera)?;
        Ok(stats)
    }
}
