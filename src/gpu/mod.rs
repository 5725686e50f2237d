//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, shader composition, shared
//! pipeline boilerplate, and texture/cubemap loading.

/// Shared wgpu boilerplate helpers for bind group layouts and pipelines.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Image-backed 2D textures and skybox cubemaps.
pub mod texture;
