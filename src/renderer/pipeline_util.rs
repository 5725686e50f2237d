//! Pipeline state shared by the scene pipelines.

use super::targets::{DEPTH_FORMAT, HDR_FORMAT};

/// The two HDR fragment targets every scene pipeline writes.
///
/// - Target 0: scene color, blended with `blend`
/// - Target 1: bright color, never blended
pub fn hdr_fragment_targets(
    blend: Option<wgpu::BlendState>,
) -> [Option<wgpu::ColorTargetState>; 2] {
    [
        Some(wgpu::ColorTargetState {
            format: HDR_FORMAT,
            blend,
            write_mask: wgpu::ColorWrites::ALL,
        }),
        Some(wgpu::ColorTargetState {
            format: HDR_FORMAT,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        }),
    ]
}

/// Depth state against the capture target's depth attachment.
pub fn depth_stencil_state(
    depth_compare: wgpu::CompareFunction,
    depth_write_enabled: bool,
) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled,
        depth_compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}
