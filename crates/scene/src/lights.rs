use flyscene_common::Color;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Omnidirectional light. `distance == 0` means no falloff cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    pub distance: f32,
    pub position: Vec3,
}

impl PointLight {
    pub fn new(color: Color, intensity: f32, position: Vec3) -> Self {
        Self {
            color,
            intensity,
            distance: 0.0,
            position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

impl AmbientLight {
    /// Color premultiplied by intensity, as fed to shaders.
    pub fn radiance(&self) -> Color {
        self.color.scaled(self.intensity)
    }
}

/// Borrowed view of one rig light, for code that walks all four.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light<'a> {
    Point(&'a PointLight),
    Ambient(&'a AmbientLight),
}

/// The scene's fixed light set: three point lights and an ambient term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightRig {
    pub primary: PointLight,
    pub secondary: PointLight,
    pub tertiary: PointLight,
    pub ambient: AmbientLight,
}

impl LightRig {
    /// Warm key light and cream fill high above the origin, a dim slate rim,
    /// and a dark blue ambient.
    pub fn demo() -> Self {
        Self {
            primary: PointLight::new(Color::from_hex(0xF95738), 1000.0, Vec3::new(0.0, 500.0, 0.0)),
            secondary: PointLight::new(
                Color::from_hex(0xF5F5DC),
                1000.0,
                Vec3::new(50.0, 500.0, 0.0),
            ),
            tertiary: PointLight::new(
                Color::from_hex(0x708090),
                10.0,
                Vec3::new(-50.0, 100.0, 0.0),
            ),
            ambient: AmbientLight {
                color: Color::from_hex(0x102030),
                intensity: 10.0,
            },
        }
    }

    pub fn points(&self) -> [&PointLight; 3] {
        [&self.primary, &self.secondary, &self.tertiary]
    }

    /// All four lights, point lights first.
    pub fn lights(&self) -> impl Iterator<Item = Light<'_>> {
        self.points()
            .into_iter()
            .map(Light::Point)
            .chain(std::iter::once(Light::Ambient(&self.ambient)))
    }
}

impl Default for LightRig {
    fn default() -> Self {
        Self::demo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_rig_values() {
        let rig = LightRig::demo();
        assert_eq!(rig.primary.color.to_hex(), 0xF95738);
        assert_eq!(rig.primary.position, Vec3::new(0.0, 500.0, 0.0));
        assert_eq!(rig.secondary.intensity, 1000.0);
        assert_eq!(rig.tertiary.position, Vec3::new(-50.0, 100.0, 0.0));
        assert_eq!(rig.ambient.color.to_hex(), 0x102030);
        assert_eq!(rig.ambient.intensity, 10.0);
    }

    #[test]
    fn lights_yields_four_in_order() {
        let rig = LightRig::demo();
        let lights: Vec<_> = rig.lights().collect();
        assert_eq!(lights.len(), 4);
        assert_eq!(lights[0], Light::Point(&rig.primary));
        assert_eq!(lights[2], Light::Point(&rig.tertiary));
        assert!(matches!(lights[3], Light::Ambient(_)));
    }

    #[test]
    fn ambient_radiance_is_premultiplied() {
        let ambient = AmbientLight {
            color: Color::new(0.1, 0.2, 0.3),
            intensity: 10.0,
        };
        let r = ambient.radiance();
        assert!((r.r - 1.0).abs() < 1e-6 && (r.b - 3.0).abs() < 1e-6);
    }
}
