use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::{PI, TAU};

use donutfield_scene::CameraConfig;

/// Keeps the polar angle off the poles, where the up vector degenerates.
/// Anything much smaller rounds back onto the pole in f32.
const POLAR_EPS: f32 = 1e-3;
/// Dolly factor per wheel line.
const ZOOM_STEP: f32 = 0.95;

/// Perspective camera orbiting a target point.
///
/// Input accumulates into pending rotation, pan, and dolly; [`update`]
/// applies them once per frame. With damping on, only `damping_factor` of
/// the pending motion is applied each frame and the rest decays, so the
/// camera glides to a stop after input ends.
///
/// [`update`]: OrbitCamera::update
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Pending (azimuth, polar) rotation.
    spherical_delta: Vec2,
    pan_offset: Vec3,
    scale: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 16.0 / 9.0)
    }
}

impl OrbitCamera {
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            position: config.position,
            target: config.target,
            fov_y: config.fov_degrees.to_radians(),
            aspect,
            near: config.near,
            far: config.far,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            spherical_delta: Vec2::ZERO,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Orbit by a pointer drag of `delta` logical pixels. A drag across the
    /// full viewport height is one full turn.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.spherical_delta.x -= TAU * delta.x / h * self.rotate_speed;
        self.spherical_delta.y -= TAU * delta.y / h * self.rotate_speed;
    }

    /// Slide the camera and target in the view plane so the point under the
    /// pointer follows it.
    pub fn pan(&mut self, delta: Vec2, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        let offset = self.position - self.target;
        let target_distance = offset.length() * (self.fov_y / 2.0).tan();
        let forward = -offset.normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        let scale = 2.0 * target_distance / h * self.pan_speed;
        self.pan_offset += -right * delta.x * scale + up * delta.y * scale;
    }

    /// Dolly by wheel `lines`; positive moves towards the target.
    pub fn zoom(&mut self, lines: f32) {
        self.scale *= ZOOM_STEP.powf(lines * self.zoom_speed);
    }

    /// Apply pending input. Returns `true` if the camera moved.
    pub fn update(&mut self) -> bool {
        let offset = self.position - self.target;
        let mut radius = offset.length();
        let (mut theta, mut phi) = if radius > 0.0 {
            (offset.x.atan2(offset.z), (offset.y / radius).clamp(-1.0, 1.0).acos())
        } else {
            (0.0, PI / 2.0)
        };

        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        theta += self.spherical_delta.x * step;
        phi = (phi + self.spherical_delta.y * step).clamp(POLAR_EPS, PI - POLAR_EPS);
        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pan_offset * step;

        let offset = Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        let previous = self.position;
        self.position = self.target + offset;

        if self.enable_damping {
            self.spherical_delta *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta = Vec2::ZERO;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        previous.distance_squared(self.position) > 1e-10
    }

    /// Angle from the +Y axis to the camera, in radians.
    pub fn polar_angle(&self) -> f32 {
        let offset = self.position - self.target;
        (offset.y / offset.length().max(f32::MIN_POSITIVE))
            .clamp(-1.0, 1.0)
            .acos()
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(cam: &mut OrbitCamera) {
        for _ in 0..1000 {
            cam.update();
        }
    }

    #[test]
    fn default_looks_at_origin_from_front() {
        let cam = OrbitCamera::default();
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 3.0));
        let clip = cam.view_projection() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!((0.0..1.0).contains(&ndc.z));
    }

    #[test]
    fn update_without_input_keeps_camera() {
        let mut cam = OrbitCamera::default();
        assert!(!cam.update());
        assert!(cam.position.abs_diff_eq(Vec3::new(0.0, 0.0, 3.0), 1e-5));
    }

    #[test]
    fn undamped_rotation_applies_at_once() {
        let mut cam = OrbitCamera::default();
        cam.enable_damping = false;
        // A quarter-height drag is a quarter turn.
        cam.rotate(Vec2::new(-100.0, 0.0), 400.0);
        assert!(cam.update());
        assert!(cam.position.abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-4));
        assert!(!cam.update());
    }

    #[test]
    fn damped_rotation_converges_to_the_same_turn() {
        let mut cam = OrbitCamera::default();
        cam.rotate(Vec2::new(-100.0, 0.0), 400.0);
        cam.update();
        assert!(cam.position.x < 1.0, "damping applies only part of the turn");
        settle(&mut cam);
        assert!(cam.position.abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-3));
        assert!(!cam.update());
    }

    #[test]
    fn rotation_keeps_distance() {
        let mut cam = OrbitCamera::default();
        cam.rotate(Vec2::new(37.0, -12.0), 300.0);
        settle(&mut cam);
        assert!((cam.distance() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_stays_off_the_poles() {
        for dy in [-5000.0, 5000.0] {
            let mut cam = OrbitCamera::default();
            cam.rotate(Vec2::new(0.0, dy), 100.0);
            settle(&mut cam);
            let phi = cam.polar_angle();
            assert!(phi > 0.0 && phi < PI, "polar angle {phi}");
            assert!(!cam.view_matrix().is_nan());
        }
    }

    #[test]
    fn zoom_in_shortens_distance() {
        let mut cam = OrbitCamera::default();
        cam.zoom(1.0);
        cam.update();
        assert!((cam.distance() - 3.0 * ZOOM_STEP).abs() < 1e-5);
        cam.zoom(-2.0);
        cam.update();
        assert!(cam.distance() > 3.0);
    }

    #[test]
    fn zoom_respects_distance_limits() {
        let mut cam = OrbitCamera::default();
        cam.min_distance = 2.0;
        cam.zoom(100.0);
        cam.update();
        assert!((cam.distance() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn pan_moves_target_and_camera_together() {
        let mut cam = OrbitCamera::default();
        cam.enable_damping = false;
        cam.pan(Vec2::new(100.0, 0.0), 600.0);
        cam.update();
        assert!(cam.target.x < 0.0, "dragging right slides the scene right");
        assert!(cam.target.y.abs() < 1e-6);
        assert!((cam.distance() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn aspect_changes_projection() {
        let mut cam = OrbitCamera::default();
        let before = cam.projection_matrix();
        cam.set_aspect(1.0);
        assert_ne!(before, cam.projection_matrix());
        assert_eq!(cam.aspect, 1.0);
    }
}
