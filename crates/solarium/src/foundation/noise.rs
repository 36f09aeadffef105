//! Cyclic noise
//!
//! CPU mirror of `resources/shaders/common.glsl`, used to preview and test the
//! procedural patterns the fragment shader applies.

use super::math::{Vec2, Vec3};

pub use super::math::constants::{PI, TWO_PI};

/// Cyclic noise over two dimensions, in `[0, 1]`
pub fn cyclic2(coord: Vec2) -> f32 {
    (coord.x.cos() + coord.y.cos()).abs() / 2.0
}

/// Cyclic noise over three dimensions, in `[0, 1]`
pub fn cyclic3(coord: Vec3) -> f32 {
    (coord.x.cos() + coord.y.cos() + coord.z.cos()).abs() / 3.0
}

/// Fractal Brownian motion built from [`cyclic2`]
pub fn fbm_cyclic2(coord: Vec2, octaves: u32) -> f32 {
    fbm(octaves, |scale| cyclic2(coord * scale))
}

/// Fractal Brownian motion built from [`cyclic3`]
pub fn fbm_cyclic3(coord: Vec3, octaves: u32) -> f32 {
    fbm(octaves, |scale| cyclic3(coord * scale))
}

fn fbm(octaves: u32, sample: impl Fn(f32) -> f32) -> f32 {
    let mut value = 0.0;
    let mut scale = 1.0;
    let mut atten = 0.5;
    for _ in 0..octaves {
        value += sample(scale) * atten;
        scale *= 2.0;
        atten *= 0.5;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cyclic_peaks_at_origin() {
        assert_relative_eq!(cyclic2(Vec2::zeros()), 1.0);
        assert_relative_eq!(cyclic3(Vec3::zeros()), 1.0);
    }

    #[test]
    fn cyclic_cancels_at_half_turn_offsets() {
        assert_relative_eq!(cyclic2(Vec2::new(0.0, PI)), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn cyclic_repeats_every_two_pi() {
        let p = Vec2::new(0.37, 1.9);
        let shifted = p + Vec2::new(TWO_PI, TWO_PI);
        assert_relative_eq!(cyclic2(p), cyclic2(shifted), epsilon = 1e-5);
    }

    #[test]
    fn fbm_with_no_octaves_is_zero() {
        assert_eq!(fbm_cyclic2(Vec2::new(1.0, 2.0), 0), 0.0);
        assert_eq!(fbm_cyclic3(Vec3::new(1.0, 2.0, 3.0), 0), 0.0);
    }

    #[test]
    fn fbm_at_origin_sums_attenuations() {
        // cyclic is 1 at the origin for every scale: 0.5 + 0.25 + 0.125
        assert_relative_eq!(fbm_cyclic2(Vec2::zeros(), 3), 0.875);
    }

    #[test]
    fn fbm_stays_below_one() {
        for i in 0..64 {
            let t = i as f32 * 0.173;
            let v = fbm_cyclic3(Vec3::new(t, t * 0.5, -t), 8);
            assert!((0.0..1.0).contains(&v), "fbm out of range: {v}");
        }
    }
}
