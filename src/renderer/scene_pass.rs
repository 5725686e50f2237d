//! HDR scene capture: every visible object drawn into the scene and bright
//! attachments of the capture target, one pipeline per phase.

use glam::{Mat4, Vec4};
use wgpu::util::DeviceExt;

use super::pipeline_util::{depth_stencil_state, hdr_fragment_targets};
use super::targets::OffscreenTargets;
use super::uniforms::{FrameUniform, InstanceUniform};
use crate::error::IsleError;
use crate::gpu::pipeline_helpers::{
    filtering_sampler, texture_2d, texture_cube, uniform_buffer,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::scene::layout::{SceneLayout, LIGHT_MARKER_COLOR};
use crate::scene::mesh::MeshVertex;
use crate::scene::SceneAssets;

/// Draw phases in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenePhase {
    /// Lit, textured meshes.
    Opaque,
    /// Alpha-tested, alpha-blended foliage.
    Transparent,
    /// Cubemap at the far plane.
    Skybox,
    /// Emissive cubes at the point lights.
    LightMarkers,
}

/// Every phase, in the order the pass draws them.
pub const SCENE_PHASES: [ScenePhase; 4] = [
    ScenePhase::Opaque,
    ScenePhase::Transparent,
    ScenePhase::Skybox,
    ScenePhase::LightMarkers,
];

impl ScenePhase {
    /// Debug label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Opaque => "Opaque",
            Self::Transparent => "Transparent",
            Self::Skybox => "Skybox",
            Self::LightMarkers => "Light Markers",
        }
    }

    /// Face culling. Foliage quads are seen from both sides.
    pub fn cull_mode(self) -> Option<wgpu::Face> {
        match self {
            Self::Transparent => None,
            _ => Some(wgpu::Face::Back),
        }
    }

    /// Depth comparison. The sky sits exactly on the cleared depth.
    pub fn depth_compare(self) -> wgpu::CompareFunction {
        match self {
            Self::Skybox => wgpu::CompareFunction::LessEqual,
            _ => wgpu::CompareFunction::Less,
        }
    }

    /// Whether the phase writes depth.
    pub fn depth_write(self) -> bool {
        self != Self::Skybox
    }

    /// Blending on the scene color output.
    pub fn blend(self) -> Option<wgpu::BlendState> {
        match self {
            Self::Transparent => Some(wgpu::BlendState::ALPHA_BLENDING),
            _ => None,
        }
    }

    fn shader_source(self) -> (&'static str, &'static str) {
        match self {
            Self::Opaque => (
                include_str!("../../assets/shaders/scene/lit.wgsl"),
                "lit.wgsl",
            ),
            Self::Transparent => (
                include_str!("../../assets/shaders/scene/foliage.wgsl"),
                "foliage.wgsl",
            ),
            Self::Skybox => (
                include_str!("../../assets/shaders/scene/skybox.wgsl"),
                "skybox.wgsl",
            ),
            Self::LightMarkers => (
                include_str!("../../assets/shaders/scene/emissive.wgsl"),
                "emissive.wgsl",
            ),
        }
    }
}

/// Bind group layouts of the scene shaders.
pub struct SceneLayouts {
    /// Group 0: [`FrameUniform`].
    pub frame: wgpu::BindGroupLayout,
    /// Group 1 of the mesh phases: [`InstanceUniform`].
    pub instance: wgpu::BindGroupLayout,
    /// Group 2: diffuse map, specular map, sampler.
    pub material: wgpu::BindGroupLayout,
    /// Group 1 of the skybox phase: cubemap and sampler.
    pub skybox: wgpu::BindGroupLayout,
}

impl SceneLayouts {
    /// Create all four layouts.
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = |label, entries: &[wgpu::BindGroupLayoutEntry]| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries,
            })
        };
        let both = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
        let frame = layout("Frame Layout", &[uniform_buffer(0, both)]);
        let instance = layout("Instance Layout", &[uniform_buffer(0, both)]);
        let material = layout(
            "Material Layout",
            &[texture_2d(0), texture_2d(1), filtering_sampler(2)],
        );
        let skybox = layout(
            "Skybox Layout",
            &[texture_cube(0), filtering_sampler(1)],
        );
        Self {
            frame,
            instance,
            material,
            skybox,
        }
    }

    fn for_phase(&self, phase: ScenePhase) -> Vec<&wgpu::BindGroupLayout> {
        match phase {
            ScenePhase::Opaque | ScenePhase::Transparent => {
                vec![&self.frame, &self.instance, &self.material]
            }
            ScenePhase::Skybox => vec![&self.frame, &self.skybox],
            ScenePhase::LightMarkers => vec![&self.frame, &self.instance],
        }
    }
}

/// One object's instance uniform.
struct InstanceSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl InstanceSlot {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
    ) -> Self {
        let initial = InstanceUniform::new(Mat4::IDENTITY, Vec4::ONE);
        let buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(&initial),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    fn write(&self, queue: &wgpu::Queue, model: Mat4, color: Vec4) {
        queue.write_buffer(
            &self.buffer,
            0,
            bytemuck::bytes_of(&InstanceUniform::new(model, color)),
        );
    }
}

struct InstanceSlots {
    island: InstanceSlot,
    helicopters: [InstanceSlot; 2],
    foliage: [InstanceSlot; 4],
    light_markers: [InstanceSlot; 2],
}

/// Renders the scene phases into the HDR capture target.
pub struct ScenePass {
    layouts: SceneLayouts,
    pipelines: [wgpu::RenderPipeline; 4],
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    instances: InstanceSlots,
}

impl ScenePass {
    /// Compose the four scene shaders and build their pipelines.
    ///
    /// # Errors
    ///
    /// Returns [`IsleError::Shader`] if a scene shader fails to compose.
    pub fn new(
        context: &RenderContext,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, IsleError> {
        let device = &context.device;
        let layouts = SceneLayouts::new(device);

        let mut pipelines = Vec::with_capacity(SCENE_PHASES.len());
        for phase in SCENE_PHASES {
            pipelines.push(Self::create_pipeline(
                device,
                shader_composer,
                &layouts,
                phase,
            )?);
        }
        let pipelines: [wgpu::RenderPipeline; 4] = pipelines
            .try_into()
            .map_err(|_| IsleError::Shader("scene pipeline count".to_owned()))?;

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform"),
            size: std::mem::size_of::<FrameUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Frame Bind Group"),
                layout: &layouts.frame,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                }],
            });

        let slot =
            |label: &str| InstanceSlot::new(device, &layouts.instance, label);
        let instances = InstanceSlots {
            island: slot("Island Instance"),
            helicopters: [
                slot("Helicopter 0 Instance"),
                slot("Helicopter 1 Instance"),
            ],
            foliage: [
                slot("Foliage 0 Instance"),
                slot("Foliage 1 Instance"),
                slot("Foliage 2 Instance"),
                slot("Foliage 3 Instance"),
            ],
            light_markers: [
                slot("Marker 0 Instance"),
                slot("Marker 1 Instance"),
            ],
        };

        Ok(Self {
            layouts,
            pipelines,
            frame_buffer,
            frame_bind_group,
            instances,
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        shader_composer: &mut ShaderComposer,
        layouts: &SceneLayouts,
        phase: ScenePhase,
    ) -> Result<wgpu::RenderPipeline, IsleError> {
        let (source, file_path) = phase.shader_source();
        let shader = shader_composer.compose(
            device,
            &format!("{} Shader", phase.label()),
            source,
            file_path,
        )?;
        let bind_group_layouts = layouts.for_phase(phase);
        let layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{} Pipeline Layout", phase.label())),
                bind_group_layouts: &bind_group_layouts,
                push_constant_ranges: &[],
            });
        let targets = hdr_fragment_targets(phase.blend());

        Ok(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{} Pipeline", phase.label())),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[MeshVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &targets,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: phase.cull_mode(),
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil_state(
                phase.depth_compare(),
                phase.depth_write(),
            )),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        }))
    }

    /// Bind group layouts, for building materials and the skybox binding.
    pub fn layouts(&self) -> &SceneLayouts {
        &self.layouts
    }

    /// Upload this frame's camera/lighting block and object transforms.
    pub fn prepare(
        &self,
        queue: &wgpu::Queue,
        frame: &FrameUniform,
        layout: &SceneLayout,
    ) {
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(frame));

        let slots = &self.instances;
        slots.island.write(queue, layout.island, Vec4::ONE);
        for (slot, model) in slots.helicopters.iter().zip(layout.helicopters) {
            slot.write(queue, model, Vec4::ONE);
        }
        for (slot, model) in slots.foliage.iter().zip(layout.foliage) {
            slot.write(queue, model, Vec4::ONE);
        }
        let markers = slots.light_markers.iter().zip(layout.light_markers);
        for (slot, model) in markers {
            slot.write(queue, model, LIGHT_MARKER_COLOR.extend(1.0));
        }
    }

    /// Encode the capture pass: clear, then draw every phase in order.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        targets: &OffscreenTargets,
        assets: &SceneAssets,
        clear_color: wgpu::Color,
    ) {
        let hdr = &targets.hdr;
        let color_attachment = |view, clear| {
            Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
            })
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[
                color_attachment(&hdr.scene.view, clear_color),
                color_attachment(&hdr.bright.view, wgpu::Color::BLACK),
            ],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &hdr.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                },
            ),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_bind_group(0, &self.frame_bind_group, &[]);

        let slots = &self.instances;
        for (phase, pipeline) in SCENE_PHASES.iter().zip(&self.pipelines) {
            pass.set_pipeline(pipeline);
            match phase {
                ScenePhase::Opaque => {
                    pass.set_bind_group(1, &slots.island.bind_group, &[]);
                    assets.island.draw(&mut pass);
                    for slot in &slots.helicopters {
                        pass.set_bind_group(1, &slot.bind_group, &[]);
                        assets.helicopter.draw(&mut pass);
                    }
                }
                ScenePhase::Transparent => {
                    let material = assets.foliage_material.bind_group();
                    pass.set_bind_group(2, material, &[]);
                    for slot in &slots.foliage {
                        pass.set_bind_group(1, &slot.bind_group, &[]);
                        assets.foliage.draw(&mut pass);
                    }
                }
                ScenePhase::Skybox => {
                    pass.set_bind_group(1, &assets.skybox_bind_group, &[]);
                    assets.sky_cube.draw(&mut pass);
                }
                ScenePhase::LightMarkers => {
                    for slot in &slots.light_markers {
                        pass.set_bind_group(1, &slot.bind_group, &[]);
                        assets.light_cube.draw(&mut pass);
                    }
                }
            }
        }
    }
}
