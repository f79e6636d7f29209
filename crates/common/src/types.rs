use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Order in which Euler angles are composed into a rotation.
///
/// `Xyz` is the default for scene objects. `Yxz` is used for cameras so that
/// yaw about world-up is applied before pitch about the local horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotationOrder {
    #[default]
    Xyz,
    Yxz,
}

/// Spatial transform: position, Euler rotation (radians), scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub order: RotationOrder,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            order: RotationOrder::Xyz,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Rotation as a quaternion, honouring the Euler order.
    pub fn quat(&self) -> Quat {
        let r = self.rotation;
        match self.order {
            RotationOrder::Xyz => Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z),
            RotationOrder::Yxz => Quat::from_euler(EulerRot::YXZ, r.y, r.x, r.z),
        }
    }

    /// Local-to-parent matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }
}
