//! Separable Gaussian blur over the bright-pass image.
//!
//! The blur alternates single-axis passes between the two members of a
//! ping-pong pair, starting on the horizontal axis. Iteration 0 reads the
//! bright-pass image, every later iteration reads the member written by the
//! iteration before it. [`BlurSchedule`] yields that sequence as plain data
//! so the GPU stage and the software reference walk the same order.

use wgpu::util::DeviceExt;

use crate::error::IsleError;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, filtering_sampler, linear_sampler,
    texture_2d, uniform_buffer,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::renderer::targets::{OffscreenTargets, HDR_FORMAT};

/// One-sided Gaussian weights, center tap first.
pub const BLUR_WEIGHTS: [f32; 5] =
    [0.227_027, 0.194_594_6, 0.121_621_6, 0.054_054, 0.016_216];

/// Default number of single-axis passes.
pub const DEFAULT_BLUR_ITERATIONS: u32 = 10;

/// Axis a blur pass runs along. Also names the ping-pong member the pass
/// writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlurAxis {
    /// Blur along x.
    Horizontal,
    /// Blur along y.
    Vertical,
}

impl BlurAxis {
    /// The other axis.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// A pair of values addressed by [`BlurAxis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PingPong<T> {
    /// Member written by horizontal passes.
    pub horizontal: T,
    /// Member written by vertical passes.
    pub vertical: T,
}

impl<T> PingPong<T> {
    /// Build both members from a constructor keyed by axis.
    pub fn from_fn(mut f: impl FnMut(BlurAxis) -> T) -> Self {
        Self {
            horizontal: f(BlurAxis::Horizontal),
            vertical: f(BlurAxis::Vertical),
        }
    }

    /// Fallible variant of [`PingPong::from_fn`].
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_from_fn<E>(
        mut f: impl FnMut(BlurAxis) -> Result<T, E>,
    ) -> Result<Self, E> {
        Ok(Self {
            horizontal: f(BlurAxis::Horizontal)?,
            vertical: f(BlurAxis::Vertical)?,
        })
    }

    /// Member for `axis`.
    pub fn get(&self, axis: BlurAxis) -> &T {
        match axis {
            BlurAxis::Horizontal => &self.horizontal,
            BlurAxis::Vertical => &self.vertical,
        }
    }

    /// Mutable member for `axis`.
    pub fn get_mut(&mut self, axis: BlurAxis) -> &mut T {
        match axis {
            BlurAxis::Horizontal => &mut self.horizontal,
            BlurAxis::Vertical => &mut self.vertical,
        }
    }
}

/// Image a blur pass samples from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlurSource {
    /// The bright output of the scene pass.
    BrightPass,
    /// A ping-pong member.
    PingPong(BlurAxis),
}

/// Every image a blur pass or the composite can sample, addressed by
/// [`BlurSource`].
///
/// The GPU bind groups and the software reference both resolve sources
/// through this one mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlurInputs<T> {
    /// The scene pass's bright output.
    pub bright: T,
    /// The two blur members.
    pub ping_pong: PingPong<T>,
}

impl<T> BlurInputs<T> {
    /// Build every entry from a constructor keyed by source.
    pub fn from_fn(mut f: impl FnMut(BlurSource) -> T) -> Self {
        let bright = f(BlurSource::BrightPass);
        let ping_pong =
            PingPong::from_fn(|axis| f(BlurSource::PingPong(axis)));
        Self { bright, ping_pong }
    }

    /// Entry for `source`.
    pub fn get(&self, source: BlurSource) -> &T {
        match source {
            BlurSource::BrightPass => &self.bright,
            BlurSource::PingPong(axis) => self.ping_pong.get(axis),
        }
    }

    /// Mutable entry for `source`.
    pub fn get_mut(&mut self, source: BlurSource) -> &mut T {
        match source {
            BlurSource::BrightPass => &mut self.bright,
            BlurSource::PingPong(axis) => self.ping_pong.get_mut(axis),
        }
    }

    /// Consume, keeping only the entry for `source`.
    pub fn into_entry(self, source: BlurSource) -> T {
        match source {
            BlurSource::BrightPass => self.bright,
            BlurSource::PingPong(BlurAxis::Horizontal) => {
                self.ping_pong.horizontal
            }
            BlurSource::PingPong(BlurAxis::Vertical) => {
                self.ping_pong.vertical
            }
        }
    }
}

/// One single-axis pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurStep {
    /// Zero-based iteration number.
    pub iteration: u32,
    /// Axis blurred along, which is also the member written.
    pub axis: BlurAxis,
    /// Image sampled.
    pub source: BlurSource,
}

impl BlurStep {
    /// Ping-pong member this step writes.
    pub fn target(&self) -> BlurAxis {
        self.axis
    }
}

/// The ordered list of passes for a given iteration count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurSchedule {
    iterations: u32,
}

impl BlurSchedule {
    /// Schedule with `iterations` passes.
    #[must_use]
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    /// Number of passes.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Iterate the passes in execution order.
    pub fn steps(&self) -> BlurSteps {
        BlurSteps {
            remaining: self.iterations,
            iteration: 0,
            axis: BlurAxis::Horizontal,
            first: true,
        }
    }

    /// Image holding the blurred result once every step has run. With zero
    /// iterations that is the unblurred bright image.
    pub fn output(&self) -> BlurSource {
        match self.iterations {
            0 => BlurSource::BrightPass,
            n if n % 2 == 0 => BlurSource::PingPong(BlurAxis::Vertical),
            _ => BlurSource::PingPong(BlurAxis::Horizontal),
        }
    }
}

impl Default for BlurSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_BLUR_ITERATIONS)
    }
}

/// Iterator over a [`BlurSchedule`].
#[derive(Debug, Clone)]
pub struct BlurSteps {
    remaining: u32,
    iteration: u32,
    axis: BlurAxis,
    first: bool,
}

impl Iterator for BlurSteps {
    type Item = BlurStep;

    fn next(&mut self) -> Option<BlurStep> {
        if self.remaining == 0 {
            return None;
        }
        let source = if self.first {
            BlurSource::BrightPass
        } else {
            BlurSource::PingPong(self.axis.flipped())
        };
        let step = BlurStep {
            iteration: self.iteration,
            axis: self.axis,
            source,
        };
        self.first = false;
        self.axis = self.axis.flipped();
        self.iteration += 1;
        self.remaining -= 1;
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

impl ExactSizeIterator for BlurSteps {}

/// Blur direction params. Must match `BlurParams` in blur.wgsl.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct BlurParams {
    texel_size: [f32; 2],
    horizontal: u32,
    _pad: u32,
}

impl BlurParams {
    fn new(axis: BlurAxis, width: u32, height: u32) -> Self {
        Self {
            texel_size: [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
            horizontal: u32::from(axis == BlurAxis::Horizontal),
            _pad: 0,
        }
    }
}

/// GPU side of the blur: one pipeline, two param buffers, and the bind
/// groups for each readable image.
pub struct BlurStage {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    params_buffers: PingPong<wgpu::Buffer>,
    // [axis the pass runs] -> [source] bind groups
    bind_groups: PingPong<BlurInputs<wgpu::BindGroup>>,
    schedule: BlurSchedule,
}

impl BlurStage {
    /// Compile the blur pipeline and bind it to `targets`.
    ///
    /// # Errors
    ///
    /// Returns [`IsleError::Shader`] if blur.wgsl fails to compose.
    pub fn new(
        context: &RenderContext,
        targets: &OffscreenTargets,
        schedule: BlurSchedule,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, IsleError> {
        let bind_group_layout = context.device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("Blur Layout"),
                entries: &[
                    texture_2d(0),
                    filtering_sampler(1),
                    uniform_buffer(2, wgpu::ShaderStages::FRAGMENT),
                ],
            },
        );

        let shader = shader_composer.compose(
            &context.device,
            "Blur Shader",
            include_str!("../../../assets/shaders/screen/blur.wgsl"),
            "blur.wgsl",
        )?;
        let pipeline = create_screen_space_pipeline(
            &context.device,
            "Blur",
            &shader,
            HDR_FORMAT,
            None,
            &[&bind_group_layout],
        );

        let sampler = linear_sampler(&context.device, "Blur Sampler");
        let (width, height) = targets.size();
        let params_buffers = PingPong::from_fn(|axis| {
            context.device.create_buffer_init(
                &wgpu::util::BufferInitDescriptor {
                    label: Some("Blur Params"),
                    contents: bytemuck::bytes_of(&BlurParams::new(
                        axis, width, height,
                    )),
                    usage: wgpu::BufferUsages::UNIFORM
                        | wgpu::BufferUsages::COPY_DST,
                },
            )
        });
        let bind_groups = Self::create_bind_groups(
            &context.device,
            &bind_group_layout,
            &sampler,
            &params_buffers,
            targets,
        );

        Ok(Self {
            pipeline,
            bind_group_layout,
            sampler,
            params_buffers,
            bind_groups,
            schedule,
        })
    }

    fn create_bind_groups(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        params: &PingPong<wgpu::Buffer>,
        targets: &OffscreenTargets,
    ) -> PingPong<BlurInputs<wgpu::BindGroup>> {
        let make = |view: &wgpu::TextureView, buffer: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Blur Bind Group"),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: buffer.as_entire_binding(),
                    },
                ],
            })
        };
        PingPong::from_fn(|pass_axis| {
            let buffer = params.get(pass_axis);
            BlurInputs::from_fn(|source| {
                make(&targets.sampled(source).view, buffer)
            })
        })
    }

    /// Current pass schedule.
    pub fn schedule(&self) -> BlurSchedule {
        self.schedule
    }

    /// Change the iteration count.
    pub fn set_iterations(&mut self, iterations: u32) {
        self.schedule = BlurSchedule::new(iterations);
    }

    /// Encode every pass of the schedule. Returns the image holding the
    /// blurred result.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        targets: &OffscreenTargets,
    ) -> BlurSource {
        for step in self.schedule.steps() {
            let target = targets.ping_pong.member(step.target());
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Blur Pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: &target.view,
                            depth_slice: None,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                                store: wgpu::StoreOp::Store,
                            },
                        },
                    )],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(
                0,
                self.bind_groups.get(step.axis).get(step.source),
                &[],
            );
            pass.draw(0..3, 0..1);
        }
        self.schedule.output()
    }

    /// Rebind to recreated targets and refresh texel sizes.
    pub fn resize(
        &mut self,
        context: &RenderContext,
        targets: &OffscreenTargets,
    ) {
        let (width, height) = targets.size();
        for axis in [BlurAxis::Horizontal, BlurAxis::Vertical] {
            context.queue.write_buffer(
                self.params_buffers.get(axis),
                0,
                bytemuck::bytes_of(&BlurParams::new(axis, width, height)),
            );
        }
        self.bind_groups = Self::create_bind_groups(
            &context.device,
            &self.bind_group_layout,
            &self.sampler,
            &self.params_buffers,
            targets,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SOURCES: [BlurSource; 3] = [
        BlurSource::BrightPass,
        BlurSource::PingPong(BlurAxis::Horizontal),
        BlurSource::PingPong(BlurAxis::Vertical),
    ];

    /// Image contents reduced to where they came from: the source slot
    /// they live in and the iteration that last wrote them.
    type Tag = (BlurSource, Option<u32>);

    #[test]
    fn weights_are_normalized() {
        let total =
            BLUR_WEIGHTS[0] + 2.0 * BLUR_WEIGHTS[1..].iter().sum::<f32>();
        approx::assert_abs_diff_eq!(total, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn default_schedule_alternates_from_horizontal() {
        let steps: Vec<BlurStep> = BlurSchedule::default().steps().collect();

        assert_eq!(steps.len(), 10);
        assert_eq!(steps[0].source, BlurSource::BrightPass);
        assert_eq!(steps[0].axis, BlurAxis::Horizontal);
        assert_eq!(
            steps[1].source,
            BlurSource::PingPong(BlurAxis::Horizontal)
        );
        assert_eq!(steps[1].axis, BlurAxis::Vertical);
        assert_eq!(steps[9].axis, BlurAxis::Vertical);
        assert_eq!(
            BlurSchedule::default().output(),
            BlurSource::PingPong(BlurAxis::Vertical)
        );
    }

    #[test]
    fn zero_iterations_pass_bright_image_through() {
        let schedule = BlurSchedule::new(0);
        assert_eq!(schedule.steps().count(), 0);
        assert_eq!(schedule.output(), BlurSource::BrightPass);
    }

    #[test]
    fn single_iteration_ends_on_horizontal_member() {
        let schedule = BlurSchedule::new(1);
        assert_eq!(
            schedule.output(),
            BlurSource::PingPong(BlurAxis::Horizontal)
        );
    }

    #[test]
    fn inputs_resolve_each_source_to_its_own_entry() {
        let mut inputs = BlurInputs::from_fn(|source| source);
        for source in SOURCES {
            assert_eq!(*inputs.get(source), source);
            assert_eq!(*inputs.get_mut(source), source);
            assert_eq!(inputs.into_entry(source), source);
        }
        assert_eq!(
            inputs.ping_pong.horizontal,
            BlurSource::PingPong(BlurAxis::Horizontal)
        );
    }

    proptest! {
        #[test]
        fn bright_image_is_read_exactly_once(n in 1u32..64) {
            let bright_reads = BlurSchedule::new(n)
                .steps()
                .filter(|s| s.source == BlurSource::BrightPass)
                .count();
            prop_assert_eq!(bright_reads, 1);
        }

        #[test]
        fn each_pass_reads_what_the_previous_pass_wrote(n in 2u32..64) {
            let steps: Vec<BlurStep> =
                BlurSchedule::new(n).steps().collect();
            for pair in steps.windows(2) {
                prop_assert_eq!(
                    pair[1].source,
                    BlurSource::PingPong(pair[0].target())
                );
            }
        }

        #[test]
        fn no_pass_reads_its_own_target(n in 1u32..64) {
            for step in BlurSchedule::new(n).steps() {
                prop_assert_ne!(
                    step.source,
                    BlurSource::PingPong(step.target())
                );
            }
        }

        #[test]
        fn output_is_last_written_member(n in 1u32..64) {
            let schedule = BlurSchedule::new(n);
            let last = schedule.steps().last().map(|s| s.target());
            prop_assert_eq!(
                Some(schedule.output()),
                last.map(BlurSource::PingPong)
            );
            let expected = if n % 2 == 0 {
                BlurAxis::Vertical
            } else {
                BlurAxis::Horizontal
            };
            prop_assert_eq!(
                schedule.output(),
                BlurSource::PingPong(expected)
            );
        }

        #[test]
        fn resolved_inputs_follow_the_writes(n in 0u32..64) {
            let schedule = BlurSchedule::new(n);
            let mut images: BlurInputs<Tag> =
                BlurInputs::from_fn(|source| (source, None));

            for step in schedule.steps() {
                let written = BlurSource::PingPong(step.target());
                let (slot, writer) = *images.get(step.source);
                prop_assert_eq!(slot, step.source);
                prop_assert_ne!(slot, written);
                prop_assert_eq!(writer, step.iteration.checked_sub(1));
                *images.get_mut(written) = (written, Some(step.iteration));
            }

            let (slot, writer) = images.into_entry(schedule.output());
            prop_assert_eq!(slot, schedule.output());
            prop_assert_eq!(writer, n.checked_sub(1));
        }
    }
}
