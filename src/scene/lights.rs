//! Light rig: one directional light, two point lights that ride the
//! helicopters, and a spot light attached to the camera.

use glam::Vec3;

/// Phong color terms shared by every light kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightColor {
    /// Ambient term.
    pub ambient: Vec3,
    /// Diffuse term.
    pub diffuse: Vec3,
    /// Specular term.
    pub specular: Vec3,
}

/// Constant/linear/quadratic distance falloff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    /// Constant term.
    pub constant: f32,
    /// Linear term.
    pub linear: f32,
    /// Quadratic term.
    pub quadratic: f32,
}

impl Attenuation {
    /// Falloff factor at `distance`.
    pub fn at(&self, distance: f32) -> f32 {
        let d = distance;
        1.0 / (self.constant + self.linear * d + self.quadratic * d * d)
    }
}

/// Falloff reaching roughly 50 units.
pub const STANDARD_ATTENUATION: Attenuation = Attenuation {
    constant: 1.0,
    linear: 0.09,
    quadratic: 0.032,
};

/// Fixed light parameters. Positions of the point lights and the spot
/// light come from the layout and the camera each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    /// Direction the sun shines toward.
    pub sun_direction: Vec3,
    /// Sun colors.
    pub sun: LightColor,
    /// Colors of both point lights.
    pub point: LightColor,
    /// Point light falloff.
    pub point_attenuation: Attenuation,
    /// Spot light colors.
    pub spot: LightColor,
    /// Spot light falloff.
    pub spot_attenuation: Attenuation,
    /// Inner cone half-angle in degrees.
    pub spot_inner_degrees: f32,
    /// Outer cone half-angle in degrees.
    pub spot_outer_degrees: f32,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            sun_direction: Vec3::new(-0.35, 0.0, -1.0),
            sun: LightColor {
                ambient: Vec3::new(0.005, 0.005, 0.02),
                diffuse: Vec3::new(0.4, 0.4, 0.6),
                specular: Vec3::new(0.2, 0.2, 0.1),
            },
            point: LightColor {
                ambient: Vec3::splat(0.05),
                diffuse: Vec3::splat(0.8),
                specular: Vec3::ONE,
            },
            point_attenuation: STANDARD_ATTENUATION,
            spot: LightColor {
                ambient: Vec3::ZERO,
                diffuse: Vec3::ONE,
                specular: Vec3::ONE,
            },
            spot_attenuation: STANDARD_ATTENUATION,
            spot_inner_degrees: 12.5,
            spot_outer_degrees: 15.0,
        }
    }
}

impl LightRig {
    /// Cosines of the inner and outer spot cone angles, as the shader
    /// compares them.
    pub fn spot_cutoffs(&self) -> (f32, f32) {
        (
            self.spot_inner_degrees.to_radians().cos(),
            self.spot_outer_degrees.to_radians().cos(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_cone_is_narrower() {
        let (inner, outer) = LightRig::default().spot_cutoffs();
        assert!(inner > outer);
        approx::assert_abs_diff_eq!(inner, 0.976_296, epsilon = 1e-5);
    }

    #[test]
    fn attenuation_falls_off_with_distance() {
        assert_eq!(STANDARD_ATTENUATION.at(0.0), 1.0);
        let near = STANDARD_ATTENUATION.at(2.0);
        assert!(STANDARD_ATTENUATION.at(10.0) < 0.5 * near);
    }
}
