//! Composite pass: adds the blurred bloom to the scene color, applies the
//! exposure tone map and gamma, and writes the visible surface.

use wgpu::util::DeviceExt;

use super::blur::{BlurInputs, BlurSource};
use super::tone_map::ToneMapParams;
use crate::error::IsleError;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, filtering_sampler, linear_sampler,
    texture_2d, uniform_buffer,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::renderer::targets::OffscreenTargets;

/// Uniform block of bloom_composite.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CompositeParams {
    /// Exposure multiplier for tone mapping.
    pub exposure: f32,
    /// Display gamma.
    pub gamma: f32,
    /// Nonzero when bloom is added.
    pub bloom_enabled: u32,
    /// Padding for GPU alignment.
    pub _pad: f32,
}

impl From<&ToneMapParams> for CompositeParams {
    fn from(params: &ToneMapParams) -> Self {
        Self {
            exposure: params.exposure,
            gamma: params.gamma,
            bloom_enabled: u32::from(params.bloom),
            _pad: 0.0,
        }
    }
}

/// Full-screen tone-map pass onto the surface.
pub struct CompositeStage {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    // one per image the blur can finish in, so changing the iteration
    // count never needs a rebind
    bind_groups: BlurInputs<wgpu::BindGroup>,
    sampler: wgpu::Sampler,
    params_buffer: wgpu::Buffer,
    params: CompositeParams,
}

impl CompositeStage {
    /// Compile the composite pipeline for `output_format` and bind it to
    /// `targets`.
    ///
    /// # Errors
    ///
    /// Returns [`IsleError::Shader`] if bloom_composite.wgsl fails to
    /// compose.
    pub fn new(
        context: &RenderContext,
        targets: &OffscreenTargets,
        output_format: wgpu::TextureFormat,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, IsleError> {
        let bind_group_layout = context.device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("Composite Layout"),
                entries: &[
                    texture_2d(0),
                    texture_2d(1),
                    filtering_sampler(2),
                    uniform_buffer(3, wgpu::ShaderStages::FRAGMENT),
                ],
            },
        );

        let shader = shader_composer.compose(
            &context.device,
            "Composite Shader",
            include_str!("../../../assets/shaders/screen/bloom_composite.wgsl"),
            "bloom_composite.wgsl",
        )?;
        let pipeline = create_screen_space_pipeline(
            &context.device,
            "Composite",
            &shader,
            output_format,
            None,
            &[&bind_group_layout],
        );

        let params = CompositeParams::from(&ToneMapParams {
            gamma: context.output_gamma(),
            ..Default::default()
        });
        let params_buffer = context.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Composite Params"),
                contents: bytemuck::bytes_of(&params),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            },
        );
        let sampler = linear_sampler(&context.device, "Composite Sampler");
        let bind_groups = Self::create_bind_groups(
            &context.device,
            &bind_group_layout,
            &sampler,
            &params_buffer,
            targets,
        );

        Ok(Self {
            pipeline,
            bind_group_layout,
            bind_groups,
            sampler,
            params_buffer,
            params,
        })
    }

    fn create_bind_groups(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        params_buffer: &wgpu::Buffer,
        targets: &OffscreenTargets,
    ) -> BlurInputs<wgpu::BindGroup> {
        let make = |bloom: &wgpu::TextureView| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Composite Bind Group"),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(
                            &targets.hdr.scene.view,
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(bloom),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: params_buffer.as_entire_binding(),
                    },
                ],
            })
        };
        BlurInputs::from_fn(|source| make(&targets.sampled(source).view))
    }

    /// Upload this frame's bloom flag and exposure. The display gamma is
    /// fixed by the output format.
    pub fn update_params(
        &mut self,
        queue: &wgpu::Queue,
        bloom: bool,
        exposure: f32,
    ) {
        let next = CompositeParams {
            exposure,
            bloom_enabled: u32::from(bloom),
            ..self.params
        };
        if next != self.params {
            self.params = next;
            queue.write_buffer(
                &self.params_buffer,
                0,
                bytemuck::bytes_of(&self.params),
            );
        }
    }

    /// Encode the composite onto `output`, reading the scene color and the
    /// blurred image `bloom`.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        output: &wgpu::TextureView,
        bloom: BlurSource,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Composite Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.bind_groups.get(bloom), &[]);
        pass.draw(0..3, 0..1);
    }

    /// Rebind to recreated targets.
    pub fn resize(
        &mut self,
        context: &RenderContext,
        targets: &OffscreenTargets,
    ) {
        self.bind_groups = Self::create_bind_groups(
            &context.device,
            &self.bind_group_layout,
            &self.sampler,
            &self.params_buffer,
            targets,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_layout_is_one_vec4() {
        assert_eq!(std::mem::size_of::<CompositeParams>(), 16);
    }

    #[test]
    fn params_mirror_tone_map_inputs() {
        let params = CompositeParams::from(&ToneMapParams {
            exposure: 0.5,
            gamma: 1.0,
            bloom: false,
        });
        assert_eq!(params.exposure, 0.5);
        assert_eq!(params.gamma, 1.0);
        assert_eq!(params.bloom_enabled, 0);
    }
}
