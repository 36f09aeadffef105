//! # Camera
//!
//! Euler-angle camera with look-at and first-person modes. Angles are in
//! degrees; the view matrix is rebuilt whenever position or rotation change.

use crate::foundation::math::{deg_to_rad, perspective_rh_zo, rotation_axis, translation, Mat4, Vec2, Vec3, Vec4};
use crate::render::window::MovementKeys;

const PAD_DEAD_ZONE: f32 = 0.0015;

/// How position and rotation combine into the view matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraType {
    /// Orbit: translate after rotating
    #[default]
    LookAt,
    /// Free-fly: rotate after translating, keys move the camera
    FirstPerson,
}

/// Projection and view matrices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrices {
    /// Projection, Y flipped when [`Camera::flip_y`] is set
    pub perspective: Mat4,
    /// World to camera
    pub view: Mat4,
}

impl Default for CameraMatrices {
    fn default() -> Self {
        Self {
            perspective: Mat4::identity(),
            view: Mat4::identity(),
        }
    }
}

/// Euler-angle camera
#[derive(Debug)]
pub struct Camera {
    /// View composition mode
    pub camera_type: CameraType,
    /// Rotation around X, Y and Z in degrees
    pub rotation: Vec3,
    /// Camera translation
    pub position: Vec3,
    /// Eye position for shading, `(-x, y, -z, 0)`
    pub view_pos: Vec4,
    /// Degrees per unit of input
    pub rotation_speed: f32,
    /// Units per second
    pub movement_speed: f32,
    /// Set whenever the view matrix was rebuilt
    pub updated: bool,
    /// Negate Y in projection and translation
    pub flip_y: bool,
    /// Current matrices
    pub matrices: CameraMatrices,
    /// Movement keys held
    pub keys: MovementKeys,
    fov: f32,
    znear: f32,
    zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            camera_type: CameraType::LookAt,
            rotation: Vec3::zeros(),
            position: Vec3::zeros(),
            view_pos: Vec4::zeros(),
            rotation_speed: 1.0,
            movement_speed: 1.0,
            updated: false,
            flip_y: false,
            matrices: CameraMatrices::default(),
            keys: MovementKeys::empty(),
            fov: 0.0,
            znear: 0.0,
            zfar: 0.0,
        }
    }
}

impl Camera {
    /// Camera of `camera_type` at the origin
    pub fn new(camera_type: CameraType) -> Self {
        Self {
            camera_type,
            ..Self::default()
        }
    }

    /// Whether any movement key is held
    pub fn moving(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Near plane distance
    pub fn near_clip(&self) -> f32 {
        self.znear
    }

    /// Far plane distance
    pub fn far_clip(&self) -> f32 {
        self.zfar
    }

    /// Set the projection; `fov` is vertical and in degrees
    pub fn set_perspective(&mut self, fov: f32, aspect: f32, znear: f32, zfar: f32) {
        self.fov = fov;
        self.znear = znear;
        self.zfar = zfar;
        self.matrices.perspective = self.projection(aspect);
    }

    /// Rebuild the projection for a new aspect ratio
    pub fn update_aspect_ratio(&mut self, aspect: f32) {
        self.matrices.perspective = self.projection(aspect);
    }

    fn projection(&self, aspect: f32) -> Mat4 {
        let mut perspective = perspective_rh_zo(deg_to_rad(self.fov), aspect, self.znear, self.zfar);
        if self.flip_y {
            perspective[(1, 1)] *= -1.0;
        }
        perspective
    }

    /// Move to `position`
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_view_matrix();
    }

    /// Set absolute rotation in degrees
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
        self.update_view_matrix();
    }

    /// Add `delta` degrees to the rotation
    pub fn rotate(&mut self, delta: Vec3) {
        self.rotation += delta;
        self.update_view_matrix();
    }

    /// Same as [`Self::set_position`]
    pub fn set_translation(&mut self, translation: Vec3) {
        self.position = translation;
        self.update_view_matrix();
    }

    /// Offset the position by `delta`
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
        self.update_view_matrix();
    }

    /// Set the rotation speed
    pub fn set_rotation_speed(&mut self, rotation_speed: f32) {
        self.rotation_speed = rotation_speed;
    }

    /// Set the movement speed
    pub fn set_movement_speed(&mut self, movement_speed: f32) {
        self.movement_speed = movement_speed;
    }

    fn update_view_matrix(&mut self) {
        let pitch_sign = if self.flip_y { -1.0 } else { 1.0 };
        let rotation = rotation_axis(deg_to_rad(self.rotation.x * pitch_sign), &Vec3::x())
            * rotation_axis(deg_to_rad(self.rotation.y), &Vec3::y())
            * rotation_axis(deg_to_rad(self.rotation.z), &Vec3::z());

        let mut offset = self.position;
        if self.flip_y {
            offset.y = -offset.y;
        }
        let translation_matrix = translation(&offset);

        self.matrices.view = match self.camera_type {
            CameraType::FirstPerson => rotation * translation_matrix,
            CameraType::LookAt => translation_matrix * rotation,
        };
        self.view_pos = Vec4::new(-self.position.x, self.position.y, -self.position.z, 0.0);
        self.updated = true;
    }

    /// Unit vector the first-person camera looks along
    pub fn front(&self) -> Vec3 {
        let (pitch, yaw) = (deg_to_rad(self.rotation.x), deg_to_rad(self.rotation.y));
        Vec3::new(-pitch.cos() * yaw.sin(), pitch.sin(), pitch.cos() * yaw.cos()).normalize()
    }

    fn right(front: &Vec3) -> Vec3 {
        front.cross(&Vec3::y()).normalize()
    }

    /// Apply held movement keys over `delta_time` seconds
    pub fn update(&mut self, delta_time: f32) {
        self.updated = false;
        if self.camera_type == CameraType::FirstPerson && self.moving() {
            let front = self.front();
            let right = Self::right(&front);
            let step = delta_time * self.movement_speed;

            if self.keys.contains(MovementKeys::UP) {
                self.position += front * step;
            }
            if self.keys.contains(MovementKeys::DOWN) {
                self.position -= front * step;
            }
            if self.keys.contains(MovementKeys::LEFT) {
                self.position -= right * step;
            }
            if self.keys.contains(MovementKeys::RIGHT) {
                self.position += right * step;
            }
        }
        self.update_view_matrix();
    }

    /// Apply gamepad sticks; returns whether the camera changed
    ///
    /// The left stick moves (Y forward, X strafe), the right stick turns
    /// (X yaw, Y pitch). Deflections inside the dead zone are ignored.
    pub fn update_pad(&mut self, axis_left: Vec2, axis_right: Vec2, delta_time: f32) -> bool {
        if self.camera_type != CameraType::FirstPerson {
            return false;
        }

        let front = self.front();
        let move_speed = delta_time * self.movement_speed * 2.0;
        let turn_speed = delta_time * self.rotation_speed * 50.0;
        let mut changed = false;

        if let Some(amount) = stick_amount(axis_left.y) {
            self.position -= front * amount * move_speed;
            changed = true;
        }
        if let Some(amount) = stick_amount(axis_left.x) {
            self.position += Self::right(&front) * amount * move_speed;
            changed = true;
        }
        if let Some(amount) = stick_amount(axis_right.x) {
            self.rotation.y += amount * turn_speed;
            changed = true;
        }
        if let Some(amount) = stick_amount(axis_right.y) {
            self.rotation.x -= amount * turn_speed;
            changed = true;
        }

        if changed {
            self.update_view_matrix();
        }
        changed
    }
}

/// Signed deflection rescaled past the dead zone, `None` inside it
fn stick_amount(axis: f32) -> Option<f32> {
    let magnitude = axis.abs();
    (magnitude > PAD_DEAD_ZONE).then(|| (magnitude - PAD_DEAD_ZONE) / (1.0 - PAD_DEAD_ZONE) * axis.signum())
}
