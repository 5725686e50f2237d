use serde::{Deserialize, Serialize};

use crate::renderer::postprocess::tone_map::DEFAULT_BLOOM_THRESHOLD;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Lighting parameters.
pub struct LightingOptions {
    /// Whether the camera-attached spot light is on.
    pub spotlight: bool,
    /// Luminance above which fragments feed the bloom.
    pub bloom_threshold: f32,
    /// Blinn-Phong specular exponent.
    pub shininess: f32,
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            spotlight: false,
            bloom_threshold: DEFAULT_BLOOM_THRESHOLD,
            shininess: 32.0,
        }
    }
}
