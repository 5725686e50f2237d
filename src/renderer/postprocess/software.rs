//! Software reference of the post chain.
//!
//! Runs the bright split, the ping-pong blur and the tone-map composite on
//! the CPU with the same schedule, kernel and storage precision
//! (`Rgba16Float`) as the GPU stages. Used for headless verification of
//! frame output and for benchmarking the schedule.

use glam::Vec3;
use half::f16;

use super::blur::{
    BlurAxis, BlurInputs, BlurSchedule, BlurSource, BLUR_WEIGHTS,
};
use super::tone_map::{bright_pass, tone_map, ToneMapParams};

/// An RGBA image stored at half precision.
#[derive(Debug, Clone, PartialEq)]
pub struct HdrImage {
    width: u32,
    height: u32,
    pixels: Vec<[f16; 4]>,
}

impl HdrImage {
    /// Black image. Either dimension may be zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let black = [f16::ZERO, f16::ZERO, f16::ZERO, f16::ONE];
        Self {
            width,
            height,
            pixels: vec![black; (width * height) as usize],
        }
    }

    /// Image whose pixel at `(x, y)` is `f(x, y)`.
    pub fn from_fn(
        width: u32,
        height: u32,
        f: impl Fn(u32, u32) -> Vec3,
    ) -> Self {
        let mut image = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                image.set(x, y, f(x, y));
            }
        }
        image
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Color at `(x, y)`, clamped to the nearest edge pixel. Empty images
    /// read as black.
    pub fn get(&self, x: i64, y: i64) -> Vec3 {
        if self.pixels.is_empty() {
            return Vec3::ZERO;
        }
        let x = x.clamp(0, i64::from(self.width) - 1) as u32;
        let y = y.clamp(0, i64::from(self.height) - 1) as u32;
        let [r, g, b, _] = self.pixels[(y * self.width + x) as usize];
        Vec3::new(r.to_f32(), g.to_f32(), b.to_f32())
    }

    /// Store `color` at `(x, y)` with half-precision rounding.
    pub fn set(&mut self, x: u32, y: u32, color: Vec3) {
        let index = (y * self.width + x) as usize;
        self.pixels[index] = [
            f16::from_f32(color.x),
            f16::from_f32(color.y),
            f16::from_f32(color.z),
            f16::ONE,
        ];
    }

    /// Apply `f` to every pixel.
    #[must_use]
    pub fn map(&self, f: impl Fn(Vec3) -> Vec3) -> Self {
        Self::from_fn(self.width, self.height, |x, y| {
            f(self.get(i64::from(x), i64::from(y)))
        })
    }

    /// Sum of every channel of every pixel.
    pub fn total(&self) -> f32 {
        self.pixels
            .iter()
            .map(|[r, g, b, _]| r.to_f32() + g.to_f32() + b.to_f32())
            .sum()
    }
}

/// 8-bit RGBA output, as presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdrImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA bytes.
    pub pixels: Vec<[u8; 4]>,
}

impl LdrImage {
    /// Pixel at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels[(y * self.width + x) as usize]
    }
}

/// Every intermediate image of one post-processed frame.
#[derive(Debug, Clone)]
pub struct PostProcessFrame {
    /// Scene color as captured.
    pub scene: HdrImage,
    /// Over-threshold part of the scene.
    pub bright: HdrImage,
    /// Bright image after the blur schedule.
    pub blurred: HdrImage,
    /// Tone-mapped output.
    pub output: LdrImage,
}

/// Extract the over-threshold part of `scene`.
pub fn split_bright(scene: &HdrImage, threshold: f32) -> HdrImage {
    scene.map(|c| bright_pass(c, threshold))
}

/// One single-axis Gaussian pass with clamp-to-edge sampling.
pub fn blur_pass(source: &HdrImage, axis: BlurAxis) -> HdrImage {
    let (dx, dy) = match axis {
        BlurAxis::Horizontal => (1, 0),
        BlurAxis::Vertical => (0, 1),
    };
    HdrImage::from_fn(source.width, source.height, |x, y| {
        let (x, y) = (i64::from(x), i64::from(y));
        let mut sum = source.get(x, y) * BLUR_WEIGHTS[0];
        for (i, weight) in BLUR_WEIGHTS.iter().enumerate().skip(1) {
            let i = i as i64;
            sum += source.get(x + dx * i, y + dy * i) * *weight;
            sum += source.get(x - dx * i, y - dy * i) * *weight;
        }
        sum
    })
}

/// Run every step of `schedule` over `bright`, ping-ponging between two
/// images exactly as the GPU stage does.
pub fn run_blur(bright: &HdrImage, schedule: BlurSchedule) -> HdrImage {
    let mut images = BlurInputs::from_fn(|source| match source {
        BlurSource::BrightPass => bright.clone(),
        BlurSource::PingPong(_) => HdrImage::new(bright.width, bright.height),
    });
    for step in schedule.steps() {
        let written = blur_pass(images.get(step.source), step.axis);
        *images.get_mut(BlurSource::PingPong(step.target())) = written;
    }
    images.into_entry(schedule.output())
}

/// Tone map `scene` plus `blurred` into displayable bytes.
pub fn composite(
    scene: &HdrImage,
    blurred: &HdrImage,
    params: &ToneMapParams,
) -> LdrImage {
    let mut pixels = Vec::with_capacity((scene.width * scene.height) as usize);
    for y in 0..i64::from(scene.height) {
        for x in 0..i64::from(scene.width) {
            let c = tone_map(scene.get(x, y), blurred.get(x, y), params);
            let c = (c.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
            pixels.push([c.x as u8, c.y as u8, c.z as u8, 255]);
        }
    }
    LdrImage {
        width: scene.width,
        height: scene.height,
        pixels,
    }
}

/// Full post chain for one captured scene image.
pub fn process_frame(
    scene: &HdrImage,
    threshold: f32,
    schedule: BlurSchedule,
    params: &ToneMapParams,
) -> PostProcessFrame {
    let bright = split_bright(scene, threshold);
    let blurred = run_blur(&bright, schedule);
    let output = composite(scene, &blurred, params);
    PostProcessFrame {
        scene: scene.clone(),
        bright,
        blurred,
        output,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::postprocess::tone_map::DEFAULT_BLOOM_THRESHOLD;

    /// Dim gradient with two emissive squares, like light markers in front
    /// of unlit geometry.
    fn static_scene() -> HdrImage {
        HdrImage::from_fn(48, 32, |x, y| {
            let marker = ((10..13).contains(&x) && (8..11).contains(&y))
                || ((34..37).contains(&x) && (20..23).contains(&y));
            if marker {
                Vec3::splat(30.0)
            } else {
                Vec3::new(x as f32 / 96.0, y as f32 / 64.0, 0.1)
            }
        })
    }

    fn params(bloom: bool) -> ToneMapParams {
        ToneMapParams {
            exposure: 1.0,
            gamma: 2.2,
            bloom,
        }
    }

    fn frame(
        scene: &HdrImage,
        schedule: BlurSchedule,
        bloom: bool,
    ) -> PostProcessFrame {
        process_frame(scene, DEFAULT_BLOOM_THRESHOLD, schedule, &params(bloom))
    }

    #[test]
    fn static_frame_is_deterministic() {
        let scene = static_scene();
        let schedule = BlurSchedule::new(10);

        let first = frame(&scene, schedule, true);
        let second = frame(&scene, schedule, true);

        assert_eq!(first.output, second.output);
        assert_eq!(first.blurred, second.blurred);
    }

    #[test]
    fn bloom_toggle_only_changes_the_bloom_contribution() {
        let scene = static_scene();
        let schedule = BlurSchedule::default();

        let on = frame(&scene, schedule, true);
        let off = frame(&scene, schedule, false);

        assert_eq!(on.scene, off.scene);
        assert_eq!(on.blurred, off.blurred);

        let mut glowing = 0;
        for y in 0..scene.height() {
            for x in 0..scene.width() {
                let bloom = on.blurred.get(i64::from(x), i64::from(y));
                if bloom == Vec3::ZERO {
                    assert_eq!(on.output.get(x, y), off.output.get(x, y));
                } else if on.output.get(x, y) != off.output.get(x, y) {
                    glowing += 1;
                }
            }
        }
        assert!(glowing > 0);
    }

    #[test]
    fn bloom_off_output_matches_scene_tone_map() {
        let scene = static_scene();
        let processed = frame(&scene, BlurSchedule::default(), false);
        let unblurred =
            composite(&scene, &HdrImage::new(48, 32), &params(false));
        assert_eq!(processed.output, unblurred);
    }

    #[test]
    fn blur_spreads_glow_past_the_marker() {
        let scene = static_scene();
        let processed = frame(&scene, BlurSchedule::default(), true);

        // below the threshold, so not in the bright image
        assert_eq!(processed.bright.get(16, 9), Vec3::ZERO);
        assert!(processed.blurred.get(16, 9).x > 0.0);
        // out of reach of five 4-tap passes along either axis
        assert_eq!(processed.blurred.get(0, 31), Vec3::ZERO);
    }

    #[test]
    fn blur_roughly_preserves_energy_away_from_edges() {
        let bright = HdrImage::from_fn(64, 64, |x, y| {
            if (30..34).contains(&x) && (30..34).contains(&y) {
                Vec3::splat(10.0)
            } else {
                Vec3::ZERO
            }
        });
        let blurred = run_blur(&bright, BlurSchedule::new(4));
        let ratio = blurred.total() / bright.total();
        approx::assert_abs_diff_eq!(ratio, 1.0, epsilon = 0.01);
    }

    #[test]
    fn zero_iterations_composite_the_raw_bright_image() {
        let scene = static_scene();
        let bright = split_bright(&scene, DEFAULT_BLOOM_THRESHOLD);
        assert_eq!(run_blur(&bright, BlurSchedule::new(0)), bright);
    }

    #[test]
    fn odd_and_even_schedules_differ_by_one_pass() {
        let bright = split_bright(&static_scene(), DEFAULT_BLOOM_THRESHOLD);
        let three = run_blur(&bright, BlurSchedule::new(3));
        let four = run_blur(&bright, BlurSchedule::new(4));
        assert_eq!(blur_pass(&three, BlurAxis::Vertical), four);
    }

    #[test]
    fn empty_images_read_as_black() {
        for (width, height) in [(0, 4), (4, 0), (0, 0)] {
            let image = HdrImage::new(width, height);
            assert_eq!(image.get(0, 0), Vec3::ZERO);
            assert_eq!(image.get(-3, 7), Vec3::ZERO);
            let blurred = run_blur(&image, BlurSchedule::default());
            assert_eq!(blurred.total(), 0.0);
        }
    }

    #[test]
    fn hdr_values_survive_half_precision_storage() {
        let mut image = HdrImage::new(1, 1);
        image.set(0, 0, Vec3::new(30.0, 1.5, 0.25));
        assert_eq!(image.get(0, 0), Vec3::new(30.0, 1.5, 0.25));
    }
}
