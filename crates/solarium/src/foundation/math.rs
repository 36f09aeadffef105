//! Math utilities and types
//!
//! nalgebra aliases plus the handful of projection and view helpers the
//! renderer needs. Projections follow Vulkan's 0..1 depth range.

pub use nalgebra::{Matrix4, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TWO_PI: f32 = 2.0 * PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Convert degrees to radians
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * constants::DEG_TO_RAD
}

/// Right-handed perspective projection with a 0..1 depth range.
///
/// `fovy` is the vertical field of view in radians.
pub fn perspective_rh_zo(fovy: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let tan_half = (fovy / 2.0).tan();
    let mut m = Mat4::zeros();
    m[(0, 0)] = 1.0 / (aspect * tan_half);
    m[(1, 1)] = 1.0 / tan_half;
    m[(2, 2)] = far / (near - far);
    m[(3, 2)] = -1.0;
    m[(2, 3)] = -(far * near) / (far - near);
    m
}

/// Right-handed view matrix looking from `eye` towards `center`
pub fn look_at_rh(eye: &Vec3, center: &Vec3, up: &Vec3) -> Mat4 {
    Mat4::look_at_rh(&Point3::from(*eye), &Point3::from(*center), up)
}

/// Rotation of `angle` radians around `axis`
pub fn rotation_axis(angle: f32, axis: &Vec3) -> Mat4 {
    Mat4::from_axis_angle(&Unit::new_normalize(*axis), angle)
}

/// Translation matrix
pub fn translation(offset: &Vec3) -> Mat4 {
    Mat4::new_translation(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perspective_maps_near_and_far_to_vulkan_depth_range() {
        let proj = perspective_rh_zo(deg_to_rad(45.0), 1.5, 0.1, 10.0);

        let near = proj * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -10.0, 1.0);

        assert_relative_eq!(near.z / near.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn perspective_scales_x_by_aspect() {
        let proj = perspective_rh_zo(deg_to_rad(90.0), 2.0, 0.1, 10.0);
        assert_relative_eq!(proj[(1, 1)], 1.0, epsilon = 1e-6);
        assert_relative_eq!(proj[(0, 0)], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn look_at_places_center_on_negative_z() {
        let view = look_at_rh(&Vec3::new(2.0, 2.0, 2.0), &Vec3::zeros(), &Vec3::z());
        let center = view.transform_point(&Point3::origin());

        assert_relative_eq!(center.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(center.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(center.z, -(12.0_f32).sqrt(), epsilon = 1e-5);
    }

    #[test]
    fn quarter_turn_about_z_maps_x_to_y() {
        let rot = rotation_axis(deg_to_rad(90.0), &Vec3::z());
        let v = rot.transform_vector(&Vec3::x());
        assert_relative_eq!(v, Vec3::y(), epsilon = 1e-6);
    }
}
