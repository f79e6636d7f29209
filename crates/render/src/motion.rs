use flyscene_input::MovementIntent;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::FlyCamera;

/// Camera motion constants.
///
/// By default every quantity is per tick, so motion speeds up with the
/// display refresh rate. With `time_scaled` set, each step is multiplied by
/// `dt * reference_hz`, which reproduces the per-tick values at
/// `reference_hz` frames per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// World units per tick.
    pub speed: f32,
    /// Radians per tick.
    pub rotation_step: f32,
    pub max_pitch: f32,
    pub time_scaled: bool,
    pub reference_hz: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed: 0.5,
            rotation_step: 0.02,
            max_pitch: std::f32::consts::FRAC_PI_2 - 0.01,
            time_scaled: false,
            reference_hz: 60.0,
        }
    }
}

impl MotionConfig {
    /// Multiplier for per-tick quantities given this frame's duration.
    pub fn step_scale(&self, dt_secs: f32) -> f32 {
        if self.time_scaled {
            dt_secs * self.reference_hz
        } else {
            1.0
        }
    }
}

/// Move the camera along its horizontal basis and world up.
pub fn translate(camera: &mut FlyCamera, intent: &MovementIntent, speed: f32) {
    let forward = camera.forward();
    let right = camera.right();

    let mut delta = Vec3::ZERO;
    if intent.forward {
        delta += forward * speed;
    }
    if intent.backward {
        delta -= forward * speed;
    }
    if intent.right {
        delta += right * speed;
    }
    if intent.left {
        delta -= right * speed;
    }
    if intent.up {
        delta.y += speed;
    }
    if intent.down {
        delta.y -= speed;
    }
    camera.position += delta;
}

/// Turn the camera, clamping pitch to `±max_pitch`.
pub fn rotate(camera: &mut FlyCamera, intent: &MovementIntent, step: f32, max_pitch: f32) {
    if intent.look_left {
        camera.yaw += step;
    }
    if intent.look_right {
        camera.yaw -= step;
    }
    if intent.look_up {
        camera.pitch = max_pitch.min(camera.pitch + step);
    }
    if intent.look_down {
        camera.pitch = (-max_pitch).max(camera.pitch - step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flyscene_input::Movement;

    fn origin_camera() -> FlyCamera {
        FlyCamera {
            position: Vec3::ZERO,
            ..FlyCamera::default()
        }
    }

    fn intent(active: &[Movement]) -> MovementIntent {
        let mut i = MovementIntent::new();
        for m in active {
            i.set(*m, true);
        }
        i
    }

    #[test]
    fn forward_one_tick_from_origin() {
        let mut cam = origin_camera();
        translate(&mut cam, &intent(&[Movement::Forward]), 0.5);
        assert!(cam.position.abs_diff_eq(Vec3::new(0.0, 0.0, -0.5), 1e-6));
    }

    #[test]
    fn strafe_and_vertical() {
        let mut cam = origin_camera();
        translate(&mut cam, &intent(&[Movement::Right, Movement::Up]), 0.5);
        assert!(cam.position.abs_diff_eq(Vec3::new(0.5, 0.5, 0.0), 1e-6));
        translate(&mut cam, &intent(&[Movement::Left, Movement::Down]), 0.5);
        assert!(cam.position.abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn opposing_flags_cancel() {
        let mut cam = origin_camera();
        translate(
            &mut cam,
            &intent(&[Movement::Forward, Movement::Backward]),
            0.5,
        );
        assert!(cam.position.abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn pitch_does_not_change_ground_speed() {
        let mut cam = origin_camera();
        cam.pitch = 1.0;
        translate(&mut cam, &intent(&[Movement::Forward]), 0.5);
        assert!((cam.position.length() - 0.5).abs() < 1e-6);
        assert_eq!(cam.position.y, 0.0);
    }

    #[test]
    fn yaw_accumulates_exact_steps() {
        let cfg = MotionConfig::default();
        let mut cam = origin_camera();
        let left = intent(&[Movement::LookLeft]);
        for _ in 0..10 {
            rotate(&mut cam, &left, cfg.rotation_step, cfg.max_pitch);
        }
        assert!((cam.yaw - 0.2).abs() < 1e-5);

        let right = intent(&[Movement::LookRight]);
        for _ in 0..25 {
            rotate(&mut cam, &right, cfg.rotation_step, cfg.max_pitch);
        }
        assert!((cam.yaw + 0.3).abs() < 1e-5);
    }

    #[test]
    fn pitch_stays_clamped() {
        let cfg = MotionConfig::default();
        let mut cam = origin_camera();
        let up = intent(&[Movement::LookUp]);
        let down = intent(&[Movement::LookDown]);
        for i in 0..400 {
            let which = if (i / 97) % 2 == 0 { &up } else { &down };
            rotate(&mut cam, which, cfg.rotation_step, cfg.max_pitch);
            assert!(cam.pitch <= cfg.max_pitch && cam.pitch >= -cfg.max_pitch);
        }
        for _ in 0..200 {
            rotate(&mut cam, &up, cfg.rotation_step, cfg.max_pitch);
        }
        assert_eq!(cam.pitch, cfg.max_pitch);
    }

    #[test]
    fn step_scale_only_when_time_scaled() {
        let mut cfg = MotionConfig::default();
        assert_eq!(cfg.step_scale(0.5), 1.0);
        cfg.time_scaled = true;
        assert!((cfg.step_scale(1.0 / 120.0) - 0.5).abs() < 1e-6);
    }
}
