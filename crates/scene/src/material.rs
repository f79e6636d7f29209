use std::sync::Arc;

use flyscene_assets::TextureData;
use flyscene_common::Color;
use glam::Vec3;

use crate::lights::LightRig;

/// Default shininess for lit materials built without an explicit value.
pub const DEFAULT_SHININESS: f32 = 32.0;

/// Which triangle faces are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// Uniform block of the lit shader. Mirrors the GPU layout field for field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderUniforms {
    /// Seconds since the render loop started.
    pub time: f32,
    pub light_colors: [Color; 3],
    pub light_positions: [Vec3; 3],
    /// Ambient color already multiplied by the ambient intensity.
    pub ambient_color: Color,
    pub shininess: f32,
    pub base_color: Color,
    pub opacity: f32,
}

impl ShaderUniforms {
    fn from_rig(rig: &LightRig, shininess: f32) -> Self {
        let mut uniforms = Self {
            time: 0.0,
            light_colors: [Color::BLACK; 3],
            light_positions: [Vec3::ZERO; 3],
            ambient_color: Color::BLACK,
            shininess,
            base_color: Color::WHITE,
            opacity: 1.0,
        };
        uniforms.sync_lights(rig);
        uniforms
    }

    pub fn sync_lights(&mut self, rig: &LightRig) {
        for (i, light) in rig.points().into_iter().enumerate() {
            self.light_colors[i] = light.color;
            self.light_positions[i] = light.position;
        }
        self.ambient_color = rig.ambient.radiance();
    }
}

/// Custom lit material: three point lights, ambient, Blinn-Phong shininess.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderMaterial {
    pub uniforms: ShaderUniforms,
    pub texture: Option<Arc<TextureData>>,
    pub transparent: bool,
    pub depth_write: bool,
    pub side: Side,
}

impl ShaderMaterial {
    /// Opaque lit material, optionally textured.
    pub fn lit(rig: &LightRig, shininess: f32, texture: Option<Arc<TextureData>>) -> Self {
        Self {
            uniforms: ShaderUniforms::from_rig(rig, shininess),
            texture,
            transparent: false,
            depth_write: true,
            side: Side::Double,
        }
    }

    /// Half-transparent lit material with depth writes off. Never textured.
    pub fn lit_transparent(rig: &LightRig, shininess: f32) -> Self {
        let mut uniforms = ShaderUniforms::from_rig(rig, shininess);
        uniforms.opacity = 0.5;
        Self {
            uniforms,
            texture: None,
            transparent: true,
            depth_write: false,
            side: Side::Double,
        }
    }

    pub fn sync_lights(&mut self, rig: &LightRig) {
        self.uniforms.sync_lights(rig);
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.uniforms.time = seconds;
    }

    pub fn uses_texture(&self) -> bool {
        self.texture.is_some()
    }
}

/// Unlit-by-shader material for ordinary meshes, shaded by the backend's
/// standard pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardMaterial {
    pub color: Color,
    pub texture: Option<Arc<TextureData>>,
    pub side: Side,
}

impl StandardMaterial {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            texture: None,
            side: Side::Double,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Shader(ShaderMaterial),
    Standard(StandardMaterial),
}

impl Material {
    pub fn as_shader(&self) -> Option<&ShaderMaterial> {
        match self {
            Material::Shader(m) => Some(m),
            Material::Standard(_) => None,
        }
    }

    pub fn as_shader_mut(&mut self) -> Option<&mut ShaderMaterial> {
        match self {
            Material::Shader(m) => Some(m),
            Material::Standard(_) => None,
        }
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self, Material::Shader(m) if m.transparent)
    }

    pub fn texture(&self) -> Option<&Arc<TextureData>> {
        match self {
            Material::Shader(m) => m.texture.as_ref(),
            Material::Standard(m) => m.texture.as_ref(),
        }
    }

    pub fn set_texture(&mut self, texture: Arc<TextureData>) {
        match self {
            Material::Shader(m) => m.texture = Some(texture),
            Material::Standard(m) => m.texture = Some(texture),
        }
    }
}

impl From<ShaderMaterial> for Material {
    fn from(m: ShaderMaterial) -> Self {
        Material::Shader(m)
    }
}

impl From<StandardMaterial> for Material {
    fn from(m: StandardMaterial) -> Self {
        Material::Standard(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lit_copies_rig_into_uniforms() {
        let rig = LightRig::demo();
        let m = ShaderMaterial::lit(&rig, 1.0, None);
        assert_eq!(m.uniforms.light_colors[0], rig.primary.color);
        assert_eq!(m.uniforms.light_positions[1], rig.secondary.position);
        assert_eq!(m.uniforms.ambient_color, rig.ambient.radiance());
        assert_eq!(m.uniforms.shininess, 1.0);
        assert_eq!(m.uniforms.opacity, 1.0);
        assert!(m.depth_write && !m.transparent);
        assert_eq!(m.side, Side::Double);
        assert!(!m.uses_texture());
    }

    #[test]
    fn transparent_variant_fixes_opacity_and_depth_write() {
        let m = ShaderMaterial::lit_transparent(&LightRig::demo(), DEFAULT_SHININESS);
        assert_eq!(m.uniforms.opacity, 0.5);
        assert!(m.transparent);
        assert!(!m.depth_write);
        assert!(m.texture.is_none());
        assert!(Material::from(m).is_transparent());
    }

    #[test]
    fn sync_picks_up_mutated_rig() {
        let mut rig = LightRig::demo();
        let mut m = ShaderMaterial::lit(&rig, DEFAULT_SHININESS, None);
        rig.primary.color = Color::from_hex(0x00FF00);
        rig.tertiary.position = Vec3::new(1.0, 2.0, 3.0);
        rig.ambient.intensity = 2.0;
        assert_ne!(m.uniforms.light_colors[0], rig.primary.color);

        m.sync_lights(&rig);
        assert_eq!(m.uniforms.light_colors[0], rig.primary.color);
        assert_eq!(m.uniforms.light_positions[2], Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.uniforms.ambient_color, rig.ambient.color.scaled(2.0));
    }

    #[test]
    fn set_texture_on_either_kind() {
        let tex = Arc::new(TextureData::solid("t", [1, 2, 3, 255]));
        let mut standard = Material::from(StandardMaterial::new(Color::WHITE));
        standard.set_texture(Arc::clone(&tex));
        assert!(standard.texture().is_some());
        assert!(standard.as_shader().is_none());

        let mut shader = Material::from(ShaderMaterial::lit(&LightRig::demo(), 32.0, None));
        shader.set_texture(tex);
        assert!(shader.as_shader().unwrap().uses_texture());
    }
}
