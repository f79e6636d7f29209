use bytemuck::{Pod, Zeroable};
use flyscene_render::FlyCamera;
use flyscene_scene::{DrawItem, Material, Scene};
use glam::{Mat4, Vec3};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
}

impl FrameUniforms {
    pub fn from_camera(camera: &FlyCamera) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
        }
    }
}

/// Per-object block; layout matches `Object` in the scene shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    pub light_color: [[f32; 4]; 3],
    pub light_pos: [[f32; 4]; 3],
    pub ambient: [f32; 4],
    pub params: [f32; 4],
    pub uv_transform: [f32; 4],
}

impl ObjectUniforms {
    pub fn new(material: &Material, world: Mat4) -> Self {
        let normal_matrix = world.inverse().transpose();
        let mut out = Self {
            model: world.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            base_color: [1.0; 4],
            light_color: [[0.0; 4]; 3],
            light_pos: [[0.0; 4]; 3],
            ambient: [0.0; 4],
            params: [0.0; 4],
            uv_transform: [1.0, 1.0, 0.0, 0.0],
        };

        let texture = material.texture();
        if let Some(t) = texture {
            out.uv_transform = [t.repeat[0], t.repeat[1], 0.0, 0.0];
        }
        let use_texture = if texture.is_some() { 1.0 } else { 0.0 };

        match material {
            Material::Shader(m) => {
                let u = &m.uniforms;
                out.base_color = u.base_color.to_vec3().extend(u.opacity).to_array();
                for i in 0..3 {
                    out.light_color[i] = u.light_colors[i].to_vec3().extend(1.0).to_array();
                    out.light_pos[i] = u.light_positions[i].extend(1.0).to_array();
                }
                out.ambient = u.ambient_color.to_vec3().extend(1.0).to_array();
                out.params = [u.time, u.shininess, use_texture, 0.0];
            }
            Material::Standard(m) => {
                out.base_color = m.color.to_vec3().extend(1.0).to_array();
                out.params = [0.0, 0.0, use_texture, 0.0];
            }
        }
        out
    }
}

pub(crate) fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

/// Opaque items in scene order, then transparent items farthest first.
pub(crate) fn draw_order(scene: &Scene, camera: &FlyCamera) -> Vec<DrawItem> {
    let (mut transparent, opaque): (Vec<DrawItem>, Vec<DrawItem>) = scene
        .draw_list()
        .into_iter()
        .partition(|item| scene.material(item.material).is_some_and(Material::is_transparent));

    let distance = |item: &DrawItem| -> f32 {
        let center: Vec3 = item.world.w_axis.truncate();
        center.distance_squared(camera.position)
    };
    transparent.sort_by(|a, b| distance(b).total_cmp(&distance(a)));

    let mut ordered = opaque;
    ordered.extend(transparent);
    ordered
}
