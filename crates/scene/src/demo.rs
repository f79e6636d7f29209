//! The one demo scene: static objects built up front, textured and loaded
//! objects added as their assets arrive.

use std::ops::RangeInclusive;
use std::sync::Arc;

use flyscene_assets::{
    AssetError, AssetLoader, JoinReport, LoadJoin, ModelData, PendingLoad, TextureData, WrapMode,
};
use flyscene_common::{Color, Transform};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;
use crate::graph::{Node, Scene};
use crate::lights::LightRig;
use crate::material::{DEFAULT_SHININESS, Material, ShaderMaterial, StandardMaterial};
use crate::registry::{ObjectName, ObjectRegistry};

pub const SPIN_VELOCITY_RANGE: RangeInclusive<f32> = 0.0..=0.1;

/// Shininess of the imported model's material.
const MODEL_SHININESS: f32 = 1.0;

/// Live-editable parameters shown in the debug panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoParams {
    pub cube_color: Color,
    pub plane_color: Color,
    pub ambient_color: Color,
    /// Radians added to the spinning objects' x and y rotation each frame.
    pub spin_velocity: f32,
}

impl Default for DemoParams {
    fn default() -> Self {
        Self {
            cube_color: Color::from_hex(0x0000FF),
            plane_color: Color::from_hex(0x00FF00),
            ambient_color: Color::from_hex(0x102030),
            spin_velocity: 0.0005,
        }
    }
}

impl DemoParams {
    /// Recolor the regular cube's material. No-op while it is absent.
    pub fn set_cube_color(&mut self, color: Color, scene: &mut Scene, registry: &ObjectRegistry) {
        self.cube_color = color;
        match node_material(scene, registry, ObjectName::RegularCube) {
            Some(Material::Standard(m)) => m.color = color,
            Some(Material::Shader(m)) => m.uniforms.base_color = color,
            None => {}
        }
    }

    /// Tint the plane's material. No-op while it is absent.
    pub fn set_plane_color(&mut self, color: Color, scene: &mut Scene, registry: &ObjectRegistry) {
        self.plane_color = color;
        match node_material(scene, registry, ObjectName::Plane) {
            Some(Material::Shader(m)) => m.uniforms.base_color = color,
            Some(Material::Standard(m)) => m.color = color,
            None => {}
        }
    }

    /// Change the rig's ambient color; shaders pick it up on the next sync.
    pub fn set_ambient_color(&mut self, color: Color, rig: &mut LightRig) {
        self.ambient_color = color;
        rig.ambient.color = color;
    }

    pub fn set_spin_velocity(&mut self, velocity: f32) {
        self.spin_velocity =
            velocity.clamp(*SPIN_VELOCITY_RANGE.start(), *SPIN_VELOCITY_RANGE.end());
    }
}

fn node_material<'a>(
    scene: &'a mut Scene,
    registry: &ObjectRegistry,
    name: ObjectName,
) -> Option<&'a mut Material> {
    scene.node_material_mut(registry.get(name)?)
}

/// Paths of the three loaded assets, relative to the asset root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub wood_floor: String,
    pub brick: String,
    pub model: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            wood_floor: "/assets/WoodFloor051.png".into(),
            brick: "/assets/pexels-pixabay-220182.jpg".into(),
            model: "/assets/beveledcube.glb".into(),
        }
    }
}

/// Build the objects that need no assets: floor plane, ball, regular cube.
pub fn build_static(
    scene: &mut Scene,
    registry: &mut ObjectRegistry,
    rig: &LightRig,
    params: &DemoParams,
) {
    let plane_mat = scene.add_material(ShaderMaterial::lit(rig, DEFAULT_SHININESS, None));
    let plane = scene.add_node(
        Node::mesh(ObjectName::Plane.as_str(), Geometry::plane(500.0, 500.0), plane_mat)
            .with_transform(Transform::default().with_rotation(Vec3::new(
                -std::f32::consts::FRAC_PI_2,
                0.0,
                0.0,
            ))),
    );
    registry.insert(ObjectName::Plane, plane);

    let ball_mat = scene.add_material(ShaderMaterial::lit(rig, DEFAULT_SHININESS, None));
    let ball = scene.add_node(
        Node::mesh(ObjectName::Ball.as_str(), Geometry::sphere(10.0, 32, 32), ball_mat)
            .with_transform(Transform::from_position(Vec3::new(10.0, 15.0, -50.0))),
    );
    registry.insert(ObjectName::Ball, ball);

    let cube_mat = scene.add_material(StandardMaterial::new(params.cube_color));
    let cube = scene.add_node(
        Node::mesh(ObjectName::RegularCube.as_str(), Geometry::cuboid(1.0, 4.0, 1.0), cube_mat)
            .with_transform(Transform::from_position(Vec3::new(0.0, 10.0, 0.0))),
    );
    registry.insert(ObjectName::RegularCube, cube);

    tracing::debug!(nodes = scene.node_count(), "static objects built");
}

/// Bind the wood floor texture to the plane.
pub fn apply_wood_floor(scene: &mut Scene, registry: &ObjectRegistry, texture: TextureData) {
    let texture = Arc::new(texture.with_wrap(WrapMode::Repeat).with_repeat(1.0, 1.0));
    match node_material(scene, registry, ObjectName::Plane) {
        Some(material) => material.set_texture(texture),
        None => tracing::debug!("plane absent; wood floor texture unused"),
    }
}

/// Bind the brick texture to the ball and add the four nested transparent
/// shader cubes.
pub fn apply_brick(
    scene: &mut Scene,
    registry: &mut ObjectRegistry,
    rig: &LightRig,
    texture: TextureData,
) {
    let texture = Arc::new(texture.with_wrap(WrapMode::Repeat).with_repeat(1.0, 1.0));
    match node_material(scene, registry, ObjectName::Ball) {
        Some(material) => material.set_texture(texture),
        None => tracing::debug!("ball absent; brick texture not bound"),
    }

    let cubes = [
        (ObjectName::ShaderCube2, 300.0),
        (ObjectName::ShaderCube1, 350.0),
        (ObjectName::ShaderCube3, 400.0),
        (ObjectName::ShaderCube4, 450.0),
    ];
    for (name, size) in cubes {
        let material = scene.add_material(ShaderMaterial::lit_transparent(rig, DEFAULT_SHININESS));
        let node = scene.add_node(Node::mesh(name.as_str(), Geometry::cube(size), material));
        registry.insert(name, node);
    }
}

/// Add the imported model under one group node, each mesh with its own
/// opaque shader material.
pub fn apply_model(
    scene: &mut Scene,
    registry: &mut ObjectRegistry,
    rig: &LightRig,
    model: ModelData,
) {
    let group = scene.add_node(
        Node::new(ObjectName::BeveledCube1.as_str()).with_transform(
            Transform::from_position(Vec3::new(-10.0, -10.0, -30.0)).with_scale(Vec3::splat(10.0)),
        ),
    );
    for mesh in &model.meshes {
        let material = scene.add_material(ShaderMaterial::lit(rig, MODEL_SHININESS, None));
        scene.add_node(
            Node::mesh(mesh.name.clone(), Geometry::Mesh(Arc::clone(mesh)), material)
                .with_parent(group),
        );
    }
    registry.insert(ObjectName::BeveledCube1, group);
}

/// Add `angle` to the x and y rotation of every loaded spinning object.
/// Returns how many were present.
pub fn spin(scene: &mut Scene, registry: &ObjectRegistry, angle: f32) -> usize {
    let mut spun = 0;
    for name in ObjectName::SPINNING {
        let Some(node) = registry.get(name).and_then(|id| scene.node_mut(id)) else {
            continue;
        };
        node.transform.rotation.x += angle;
        node.transform.rotation.y += angle;
        spun += 1;
    }
    spun
}

/// The loads the scene waits on before it counts as ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequiredAsset {
    WoodFloor,
    Brick,
    Model,
}

/// What one [`ScenePopulation::poll`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationStatus {
    pub applied: Vec<RequiredAsset>,
    pub failed: Vec<RequiredAsset>,
    /// Set on the single poll where the last required load settled.
    pub ready: Option<JoinReport<RequiredAsset>>,
}

impl PopulationStatus {
    pub fn is_idle(&self) -> bool {
        self.applied.is_empty() && self.failed.is_empty() && self.ready.is_none()
    }
}

/// In-flight asset loads for the demo scene.
#[derive(Debug)]
pub struct ScenePopulation {
    wood: Option<PendingLoad<TextureData>>,
    brick: Option<PendingLoad<TextureData>>,
    model: Option<PendingLoad<ModelData>>,
    join: LoadJoin<RequiredAsset>,
}

impl ScenePopulation {
    pub fn start(loader: &AssetLoader, paths: &AssetPaths) -> Self {
        tracing::info!(source = %loader.source().describe(), "loading scene assets");
        Self::new(
            loader.load_texture(&paths.wood_floor),
            loader.load_texture(&paths.brick),
            loader.load_model(&paths.model),
        )
    }

    pub fn new(
        wood: PendingLoad<TextureData>,
        brick: PendingLoad<TextureData>,
        model: PendingLoad<ModelData>,
    ) -> Self {
        Self {
            wood: Some(wood),
            brick: Some(brick),
            model: Some(model),
            join: LoadJoin::new([
                RequiredAsset::WoodFloor,
                RequiredAsset::Brick,
                RequiredAsset::Model,
            ]),
        }
    }

    /// Apply every load that finished since the last poll. Never blocks.
    pub fn poll(
        &mut self,
        scene: &mut Scene,
        registry: &mut ObjectRegistry,
        rig: &LightRig,
    ) -> PopulationStatus {
        let mut status = PopulationStatus::default();

        if let Some(result) = take_ready(&mut self.wood) {
            let outcome = result.map(|tex| apply_wood_floor(scene, registry, tex));
            self.settle(RequiredAsset::WoodFloor, outcome, &mut status);
        }
        if let Some(result) = take_ready(&mut self.brick) {
            let outcome = result.map(|tex| apply_brick(scene, registry, rig, tex));
            self.settle(RequiredAsset::Brick, outcome, &mut status);
        }
        if let Some(result) = take_ready(&mut self.model) {
            let outcome = result.map(|model| apply_model(scene, registry, rig, model));
            self.settle(RequiredAsset::Model, outcome, &mut status);
        }

        status.ready = self.join.take_ready();
        if let Some(report) = &status.ready {
            tracing::info!(
                loaded = report.loaded.len(),
                failed = report.failed.len(),
                "scene objects ready"
            );
        }
        status
    }

    fn settle(
        &mut self,
        asset: RequiredAsset,
        outcome: Result<(), AssetError>,
        status: &mut PopulationStatus,
    ) {
        match outcome {
            Ok(()) => {
                tracing::debug!(?asset, "asset applied to scene");
                self.join.settle(&asset, true);
                status.applied.push(asset);
            }
            Err(error) => {
                tracing::error!(?asset, %error, "asset load failed");
                self.join.settle(&asset, false);
                status.failed.push(asset);
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.join.has_fired()
    }

    pub fn remaining(&self) -> usize {
        self.join.remaining()
    }
}

fn take_ready<T>(slot: &mut Option<PendingLoad<T>>) -> Option<Result<T, AssetError>> {
    let result = slot.as_mut()?.poll_ready()?;
    *slot = None;
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flyscene_assets::{LoadSender, MeshData};

    struct Harness {
        scene: Scene,
        registry: ObjectRegistry,
        rig: LightRig,
        params: DemoParams,
    }

    impl Harness {
        fn new() -> Self {
            let mut h = Self {
                scene: Scene::new(),
                registry: ObjectRegistry::new(),
                rig: LightRig::demo(),
                params: DemoParams::default(),
            };
            build_static(&mut h.scene, &mut h.registry, &h.rig, &h.params);
            h
        }

        fn poll(&mut self, population: &mut ScenePopulation) -> PopulationStatus {
            population.poll(&mut self.scene, &mut self.registry, &self.rig)
        }
    }

    fn manual_population() -> (
        LoadSender<TextureData>,
        LoadSender<TextureData>,
        LoadSender<ModelData>,
        ScenePopulation,
    ) {
        let (wood_tx, wood) = PendingLoad::channel("wood");
        let (brick_tx, brick) = PendingLoad::channel("brick");
        let (model_tx, model) = PendingLoad::channel("model");
        (wood_tx, brick_tx, model_tx, ScenePopulation::new(wood, brick, model))
    }

    fn model() -> ModelData {
        ModelData {
            id: flyscene_assets::AssetId(1),
            label: "beveledcube.glb".into(),
            meshes: vec![Arc::new(MeshData {
                name: "Cube_0".into(),
                ..MeshData::default()
            })],
        }
    }

    #[test]
    fn static_objects_are_registered() {
        let h = Harness::new();
        for name in [ObjectName::Plane, ObjectName::Ball, ObjectName::RegularCube] {
            assert!(h.registry.contains(name), "{name}");
        }
        for name in [ObjectName::ShaderCube1, ObjectName::BeveledCube1] {
            assert!(!h.registry.contains(name), "{name}");
        }
        let plane = h.scene.node(h.registry.get(ObjectName::Plane).unwrap()).unwrap();
        assert!((plane.transform.rotation.x + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn loaded_entries_appear_only_after_resolution() {
        let mut h = Harness::new();
        let (_wood_tx, brick_tx, _model_tx, mut population) = manual_population();

        assert!(h.poll(&mut population).is_idle());
        assert!(!h.registry.contains(ObjectName::ShaderCube1));

        brick_tx.complete(Ok(TextureData::solid("brick", [200, 80, 60, 255])));
        let status = h.poll(&mut population);
        assert_eq!(status.applied, vec![RequiredAsset::Brick]);
        assert!(status.ready.is_none());
        for name in [
            ObjectName::ShaderCube1,
            ObjectName::ShaderCube2,
            ObjectName::ShaderCube3,
            ObjectName::ShaderCube4,
        ] {
            assert!(h.registry.contains(name), "{name}");
        }
        assert!(!h.registry.contains(ObjectName::BeveledCube1));

        let ball = h.registry.get(ObjectName::Ball).unwrap();
        let ball_mat = h.scene.node_material_mut(ball).unwrap();
        assert_eq!(ball_mat.texture().unwrap().wrap, WrapMode::Repeat);
    }

    #[test]
    fn wood_floor_binds_to_plane_with_repeat_wrap() {
        let mut h = Harness::new();
        let (wood_tx, _brick_tx, _model_tx, mut population) = manual_population();

        let plane = h.registry.get(ObjectName::Plane).unwrap();
        assert!(h.scene.node_material_mut(plane).unwrap().texture().is_none());

        let clamped = TextureData::solid("wood", [120, 90, 40, 255])
            .with_wrap(WrapMode::ClampToEdge)
            .with_repeat(4.0, 4.0);
        wood_tx.complete(Ok(clamped));
        let status = h.poll(&mut population);
        assert_eq!(status.applied, vec![RequiredAsset::WoodFloor]);

        let texture = h.scene.node_material_mut(plane).unwrap().texture().unwrap();
        assert_eq!(texture.label, "wood");
        assert_eq!(texture.wrap, WrapMode::Repeat);
        assert_eq!(texture.repeat, [1.0, 1.0]);

        let ball = h.registry.get(ObjectName::Ball).unwrap();
        assert!(h.scene.node_material_mut(ball).unwrap().texture().is_none());
    }

    #[test]
    fn shader_cubes_are_transparent_and_sized() {
        let mut h = Harness::new();
        let rig = h.rig;
        apply_brick(&mut h.scene, &mut h.registry, &rig, TextureData::solid("b", [0; 4]));
        let id = h.registry.get(ObjectName::ShaderCube2).unwrap();
        let node = h.scene.node(id).unwrap();
        assert_eq!(node.geometry, Some(Geometry::cube(300.0)));
        let material = h.scene.material(node.material.unwrap()).unwrap();
        let shader = material.as_shader().unwrap();
        assert!(shader.transparent);
        assert_eq!(shader.uniforms.shininess, 32.0);
    }

    #[test]
    fn join_fires_once_after_all_settle_even_with_failures() {
        let mut h = Harness::new();
        let (wood_tx, brick_tx, model_tx, mut population) = manual_population();

        wood_tx.complete(Ok(TextureData::solid("wood", [120, 90, 40, 255])));
        assert!(h.poll(&mut population).ready.is_none());
        assert!(!population.is_ready());

        model_tx.complete(Err(AssetError::NotFound("/assets/beveledcube.glb".into())));
        let status = h.poll(&mut population);
        assert_eq!(status.failed, vec![RequiredAsset::Model]);
        assert!(status.ready.is_none());
        assert!(!h.registry.contains(ObjectName::BeveledCube1));

        brick_tx.complete(Ok(TextureData::solid("brick", [1, 1, 1, 255])));
        let report = h.poll(&mut population).ready.unwrap();
        assert_eq!(report.failed, vec![RequiredAsset::Model]);
        assert_eq!(report.loaded.len(), 2);
        assert!(population.is_ready());
        assert_eq!(population.remaining(), 0);

        assert!(h.poll(&mut population).is_idle());
    }

    #[test]
    fn model_meshes_hang_off_one_group() {
        let mut h = Harness::new();
        let rig = h.rig;
        apply_model(&mut h.scene, &mut h.registry, &rig, model());
        let group = h.registry.get(ObjectName::BeveledCube1).unwrap();
        let children: Vec<_> = h.scene.children(group).collect();
        assert_eq!(children.len(), 1);
        let child = h.scene.node(children[0]).unwrap();
        let shader = h
            .scene
            .material(child.material.unwrap())
            .and_then(Material::as_shader)
            .unwrap();
        assert_eq!(shader.uniforms.shininess, 1.0);
        assert!(!shader.transparent);
    }

    #[test]
    fn spin_skips_absent_objects() {
        let mut h = Harness::new();
        assert_eq!(spin(&mut h.scene, &h.registry, 0.0005), 1);
        let cube = h.registry.get(ObjectName::RegularCube).unwrap();
        let r = h.scene.node(cube).unwrap().transform.rotation;
        assert_eq!((r.x, r.y, r.z), (0.0005, 0.0005, 0.0));

        let empty = ObjectRegistry::new();
        assert_eq!(spin(&mut h.scene, &empty, 0.1), 0);
    }

    #[test]
    fn params_setters_rebind_materials() {
        let mut h = Harness::new();
        let red = Color::from_hex(0xFF0000);
        h.params.set_cube_color(red, &mut h.scene, &h.registry);
        let cube = h.registry.get(ObjectName::RegularCube).unwrap();
        match h.scene.node_material_mut(cube).unwrap() {
            Material::Standard(m) => assert_eq!(m.color, red),
            other => panic!("unexpected material {other:?}"),
        }

        h.params.set_plane_color(red, &mut h.scene, &h.registry);
        let plane = h.registry.get(ObjectName::Plane).unwrap();
        let tint = h
            .scene
            .node_material_mut(plane)
            .unwrap()
            .as_shader()
            .unwrap()
            .uniforms
            .base_color;
        assert_eq!(tint, red);

        h.params.set_ambient_color(red, &mut h.rig);
        assert_eq!(h.rig.ambient.color, red);

        h.params.set_spin_velocity(5.0);
        assert_eq!(h.params.spin_velocity, 0.1);
    }

    #[test]
    fn setters_tolerate_missing_objects() {
        let mut scene = Scene::new();
        let registry = ObjectRegistry::new();
        let mut params = DemoParams::default();
        params.set_cube_color(Color::WHITE, &mut scene, &registry);
        params.set_plane_color(Color::WHITE, &mut scene, &registry);
        assert_eq!(params.cube_color, Color::WHITE);
    }

    #[test]
    fn params_defaults_and_serde() {
        let params = DemoParams::default();
        assert_eq!(params.cube_color.to_hex(), 0x0000FF);
        assert_eq!(params.plane_color.to_hex(), 0x00FF00);
        assert_eq!(params.spin_velocity, 0.0005);

        let partial: DemoParams = serde_json::from_str(r##"{"cube_color":"#FF0000"}"##).unwrap();
        assert_eq!(partial.cube_color.to_hex(), 0xFF0000);
        assert_eq!(partial.ambient_color.to_hex(), 0x102030);
    }
}
