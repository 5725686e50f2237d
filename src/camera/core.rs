use glam::{Mat4, Vec3};

use crate::options::CameraOptions;

/// Pitch is kept inside this many degrees of straight up or down.
pub const PITCH_LIMIT: f32 = 89.0;
/// Narrowest field of view reachable by zooming, in degrees.
pub const MIN_FOV: f32 = 1.0;
/// Widest field of view reachable by zooming, in degrees.
pub const MAX_FOV: f32 = 45.0;

/// Directions the camera can travel in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// Along the view direction.
    Forward,
    /// Against the view direction.
    Backward,
    /// Along the negative right vector.
    Left,
    /// Along the right vector.
    Right,
}

/// Everything the renderer needs from the camera for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// World-to-view transform.
    pub view: Mat4,
    /// View-to-clip transform, depth range [0, 1].
    pub projection: Mat4,
    /// Eye position.
    pub position: Vec3,
    /// Unit view direction.
    pub front: Vec3,
}

/// Yaw/pitch camera that flies freely through the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyCamera {
    /// Eye position in world space.
    pub position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    /// Heading in degrees; -90 looks down negative Z.
    yaw: f32,
    /// Elevation in degrees.
    pitch: f32,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Degrees per unit of mouse motion.
    pub sensitivity: f32,
    /// Vertical field of view in degrees.
    fovy: f32,
    aspect: f32,
    znear: f32,
    zfar: f32,
}

impl FlyCamera {
    /// Camera at the persisted position and direction.
    pub fn from_options(options: &CameraOptions, aspect: f32) -> Self {
        let front = Vec3::from(options.front).normalize_or(Vec3::NEG_Z);
        let pitch = front
            .y
            .asin()
            .to_degrees()
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        let yaw = front.z.atan2(front.x).to_degrees();

        let mut camera = Self {
            position: Vec3::from(options.position),
            front,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: Vec3::Y,
            yaw,
            pitch,
            speed: options.speed,
            sensitivity: options.sensitivity,
            fovy: options.fovy.clamp(MIN_FOV, MAX_FOV),
            aspect,
            znear: options.znear,
            zfar: options.zfar,
        };
        camera.update_vectors();
        camera
    }

    /// Heading in degrees.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Elevation in degrees.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Unit view direction.
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Vertical field of view in degrees.
    pub fn fovy(&self) -> f32 {
        self.fovy
    }

    /// Travel along `direction` for `delta` seconds.
    pub fn travel(&mut self, direction: Movement, delta: f32) {
        let step = self.speed * delta;
        match direction {
            Movement::Forward => self.position += self.front * step,
            Movement::Backward => self.position -= self.front * step,
            Movement::Left => self.position -= self.right * step,
            Movement::Right => self.position += self.right * step,
        }
    }

    /// Turn by raw mouse motion. Positive `dy` (mouse moved down) looks
    /// down.
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Narrow (positive `delta`) or widen the field of view.
    pub fn zoom(&mut self, delta: f32) {
        self.fovy = (self.fovy - delta).clamp(MIN_FOV, MAX_FOV);
    }

    /// Scale movement speed, e.g. 1.1 to speed up.
    pub fn scale_speed(&mut self, factor: f32) {
        self.speed *= factor;
    }

    /// Track the viewport aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// World-to-view transform.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection with wgpu's [0, 1] depth range.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        )
    }

    /// Snapshot for the renderer.
    pub fn state(&self) -> CameraState {
        CameraState {
            view: self.view(),
            projection: self.projection(),
            position: self.position,
            front: self.front,
        }
    }

    /// Write position, direction, field of view and speed back for saving.
    pub fn store(&self, options: &mut CameraOptions) {
        options.position = self.position.to_array();
        options.front = self.front.to_array();
        options.fovy = self.fovy;
        options.speed = self.speed;
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn camera() -> FlyCamera {
        FlyCamera::from_options(&CameraOptions::default(), 1000.0 / 700.0)
    }

    #[test]
    fn default_looks_down_negative_z() {
        let camera = camera();
        assert_abs_diff_eq!(camera.yaw(), -90.0, epsilon = 1e-4);
        assert_abs_diff_eq!(camera.pitch(), 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(
            camera.front().distance(Vec3::NEG_Z),
            0.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = camera();
        camera.look(0.0, -10_000.0);
        assert_eq!(camera.pitch(), PITCH_LIMIT);
        camera.look(0.0, 10_000.0);
        assert_eq!(camera.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = camera();
        camera.zoom(100.0);
        assert_eq!(camera.fovy(), MIN_FOV);
        camera.zoom(-100.0);
        assert_eq!(camera.fovy(), MAX_FOV);
    }

    #[test]
    fn movement_scales_with_delta() {
        let mut camera = camera();
        camera.travel(Movement::Forward, 2.0);
        assert_abs_diff_eq!(camera.position.z, 3.0 - 5.0, epsilon = 1e-5);
        camera.travel(Movement::Right, 1.0);
        assert_abs_diff_eq!(camera.position.x, 2.5, epsilon = 1e-5);
    }

    #[test]
    fn stored_front_restores_orientation() {
        let mut camera = camera();
        camera.look(123.0, -45.0);
        let mut options = CameraOptions::default();
        camera.store(&mut options);

        let restored = FlyCamera::from_options(&options, 1.0);
        assert_abs_diff_eq!(
            restored.front().distance(camera.front()),
            0.0,
            epsilon = 1e-4
        );
    }

    #[test]
    fn snapshot_places_eye_at_origin_of_view_space() {
        let state = camera().state();
        let eye = state.view.transform_point3(state.position);
        assert_abs_diff_eq!(eye.length(), 0.0, epsilon = 1e-5);
    }
}
