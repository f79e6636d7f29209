use flyscene_common::{RotationOrder, Transform};
use glam::{EulerRot, Mat4, Quat, Vec3};

/// First-person perspective camera driven by yaw and pitch.
///
/// With zero yaw and pitch it looks down -Z. Rotation is composed in YXZ
/// order: yaw about world up first, then pitch about the camera's local X,
/// so the horizon never rolls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyCamera {
    pub position: Vec3,
    /// Radians about world up. Unbounded.
    pub yaw: f32,
    /// Radians about the camera's horizontal axis.
    pub pitch: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 10.0, 50.0), 75.0_f32.to_radians(), 16.0 / 9.0, 0.1, 2000.0)
    }
}

impl FlyCamera {
    pub fn new(position: Vec3, fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov,
            aspect,
            near,
            far,
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Unit look direction in world space.
    pub fn direction(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    /// Look direction flattened onto the ground plane.
    pub fn forward(&self) -> Vec3 {
        let d = self.direction();
        Vec3::new(d.x, 0.0, d.z)
            .try_normalize()
            .unwrap_or_else(|| Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos()))
    }

    /// Horizontal right vector: forward × world up.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    /// Object transform equivalent to the current pose.
    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position,
            rotation: Vec3::new(self.pitch, self.yaw, 0.0),
            order: RotationOrder::Yxz,
            scale: Vec3::ONE,
        }
    }

    /// Update the aspect ratio. Degenerate sizes are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.aspect = width as f32 / height as f32;
        true
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
