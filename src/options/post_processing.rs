use serde::{Deserialize, Serialize};

use crate::renderer::postprocess::blur::DEFAULT_BLUR_ITERATIONS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Bloom and tone-mapping parameters.
pub struct PostProcessingOptions {
    /// Whether the blurred bright image is added before tone mapping.
    pub bloom: bool,
    /// Tone-mapping exposure. Never negative.
    pub exposure: f32,
    /// Exposure change per frame while an exposure key is held.
    pub exposure_step: f32,
    /// Number of single-axis blur passes.
    pub blur_iterations: u32,
}

impl Default for PostProcessingOptions {
    fn default() -> Self {
        Self {
            bloom: true,
            exposure: 0.5,
            exposure_step: 0.001,
            blur_iterations: DEFAULT_BLUR_ITERATIONS,
        }
    }
}
