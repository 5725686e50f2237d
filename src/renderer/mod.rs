//! Rendering: offscreen targets, the HDR scene pass, and the bloom post
//! chain (blur + composite).

pub(crate) mod pipeline_util;
pub mod postprocess;
pub mod scene_pass;
pub mod targets;
pub mod uniforms;
