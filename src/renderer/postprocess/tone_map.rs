//! CPU mirror of the shader math shared by the scene and composite passes.

use glam::Vec3;

/// Rec. 709 luminance weights used by the bright-pass split.
pub const LUMINANCE_WEIGHTS: Vec3 = Vec3::new(0.2126, 0.7152, 0.0722);

/// Default luminance above which a fragment contributes to bloom.
pub const DEFAULT_BLOOM_THRESHOLD: f32 = 1.0;

/// Per-frame inputs of the composite pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneMapParams {
    /// Exposure multiplier. Zero yields black.
    pub exposure: f32,
    /// Display gamma to encode for (1.0 leaves values linear).
    pub gamma: f32,
    /// Whether the blurred bright image is added before tone mapping.
    pub bloom: bool,
}

impl Default for ToneMapParams {
    fn default() -> Self {
        Self {
            exposure: 1.0,
            gamma: 2.2,
            bloom: true,
        }
    }
}

/// Relative luminance of a linear color.
pub fn luminance(color: Vec3) -> f32 {
    color.dot(LUMINANCE_WEIGHTS)
}

/// The color if its luminance exceeds `threshold`, black otherwise.
pub fn bright_pass(color: Vec3, threshold: f32) -> Vec3 {
    if luminance(color) > threshold {
        color
    } else {
        Vec3::ZERO
    }
}

/// Exposure tone map with optional bloom, then gamma encode.
pub fn tone_map(scene: Vec3, bloom: Vec3, params: &ToneMapParams) -> Vec3 {
    let hdr = if params.bloom { scene + bloom } else { scene };
    let mapped = Vec3::ONE - (-hdr * params.exposure).exp();
    mapped.max(Vec3::ZERO).powf(1.0 / params.gamma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn color() -> impl Strategy<Value = Vec3> {
        (0.0f32..50.0, 0.0f32..50.0, 0.0f32..50.0)
            .prop_map(|(r, g, b)| Vec3::new(r, g, b))
    }

    #[test]
    fn zero_exposure_is_black() {
        let params = ToneMapParams {
            exposure: 0.0,
            ..Default::default()
        };
        assert_eq!(
            tone_map(Vec3::splat(8.0), Vec3::splat(3.0), &params),
            Vec3::ZERO
        );
    }

    #[test]
    fn output_approaches_white_for_bright_input() {
        let params = ToneMapParams::default();
        let out = tone_map(Vec3::splat(1000.0), Vec3::ZERO, &params);
        approx::assert_abs_diff_eq!(out.x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn bright_pass_uses_strict_threshold() {
        // luminance of pure green at 1/0.7152 sits exactly on the threshold
        let on_threshold = Vec3::new(0.0, 1.0 / 0.7152, 0.0);
        assert_eq!(
            bright_pass(Vec3::splat(0.5), DEFAULT_BLOOM_THRESHOLD),
            Vec3::ZERO
        );
        assert_eq!(
            bright_pass(Vec3::splat(30.0), DEFAULT_BLOOM_THRESHOLD),
            Vec3::splat(30.0)
        );
        assert_eq!(bright_pass(on_threshold * 0.999, 1.0), Vec3::ZERO);
    }

    proptest! {
        #[test]
        fn bloom_off_ignores_blurred_input(
            scene in color(),
            a in color(),
            b in color(),
            exposure in 0.0f32..10.0,
        ) {
            let params = ToneMapParams { exposure, gamma: 2.2, bloom: false };
            prop_assert_eq!(
                tone_map(scene, a, &params),
                tone_map(scene, b, &params)
            );
        }

        #[test]
        fn monotonic_in_exposure(
            scene in color(),
            bloom in color(),
            e1 in 0.0f32..5.0,
            delta in 0.0f32..5.0,
        ) {
            let low = ToneMapParams { exposure: e1, ..Default::default() };
            let high = ToneMapParams {
                exposure: e1 + delta,
                ..Default::default()
            };
            let lo = tone_map(scene, bloom, &low);
            let hi = tone_map(scene, bloom, &high);
            prop_assert!(hi.cmpge(lo).all(), "{lo} -> {hi}");
        }

        #[test]
        fn bloom_never_darkens(
            scene in color(),
            bloom in color(),
            exposure in 0.0f32..5.0,
        ) {
            let on = ToneMapParams { exposure, gamma: 2.2, bloom: true };
            let off = ToneMapParams { bloom: false, ..on };
            let lit = tone_map(scene, bloom, &on);
            let unlit = tone_map(scene, bloom, &off);
            prop_assert!(lit.cmpge(unlit).all());
        }
    }
}
