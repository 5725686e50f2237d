//! Scene content: meshes, materials, models, the animated layout, and the
//! light rig.

/// Where everything sits each frame.
pub mod layout;
/// Fixed light parameters.
pub mod lights;
/// Diffuse + specular texture pairs.
pub mod material;
/// Vertex format, procedural meshes, GPU mesh buffers.
pub mod mesh;
/// OBJ models.
pub mod model;

use crate::gpu::pipeline_helpers::linear_sampler;
use crate::gpu::render_context::RenderContext;
use crate::gpu::texture::{Cubemap, Texture};
use crate::options::AssetOptions;
use crate::renderer::scene_pass::SceneLayouts;
use material::{Material, MaterialSlot};
use mesh::{GpuMesh, MeshData};
use model::Model;

/// Shown in place of a foliage texture that fails to load.
const FOLIAGE_PLACEHOLDER: [u8; 4] = [64, 140, 64, 255];

/// Every GPU asset the scene pass draws.
pub struct SceneAssets {
    /// Island model.
    pub island: Model,
    /// Helicopter model, drawn once per flight path.
    pub helicopter: Model,
    /// Unit quad for the foliage billboards.
    pub foliage: GpuMesh,
    /// Foliage texture binding.
    pub foliage_material: Material,
    /// Light-marker cube.
    pub light_cube: GpuMesh,
    /// Inward-facing skybox cube.
    pub sky_cube: GpuMesh,
    /// Skybox faces.
    pub skybox: Cubemap,
    /// Cubemap and sampler at group 1 of the skybox phase.
    pub skybox_bind_group: wgpu::BindGroup,
}

impl SceneAssets {
    /// Load and upload everything named by `assets`. Failures degrade to
    /// empty models and placeholder textures.
    pub fn load(
        context: &RenderContext,
        assets: &AssetOptions,
        layouts: &SceneLayouts,
    ) -> Self {
        let island = Model::load_or_empty(
            context,
            &layouts.material,
            &assets.resolve(&assets.island),
        );
        let helicopter = Model::load_or_empty(
            context,
            &layouts.material,
            &assets.resolve(&assets.helicopter),
        );

        let foliage_material = Material::new(
            context,
            &layouts.material,
            "Foliage Material",
            Texture::load_or_placeholder(
                context,
                &assets.resolve(&assets.foliage_texture),
                MaterialSlot::Diffuse.kind(),
                FOLIAGE_PLACEHOLDER,
            ),
            MaterialSlot::Specular.solid(context, "Foliage Specular"),
        );

        let skybox = Cubemap::load(
            context,
            &assets.resolve(&assets.skybox_dir),
            &assets.skybox_extension,
            assets.skybox_flip,
        );
        let sampler = linear_sampler(&context.device, "Skybox Sampler");
        let skybox_bind_group =
            context.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Skybox Bind Group"),
                layout: &layouts.skybox,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(
                            &skybox.view,
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
            });

        let device = &context.device;
        Self {
            island,
            helicopter,
            foliage: GpuMesh::new(device, "Foliage", &MeshData::foliage_quad()),
            foliage_material,
            light_cube: GpuMesh::new(device, "Light Cube", &MeshData::cube()),
            sky_cube: GpuMesh::new(
                device,
                "Sky Cube",
                &MeshData::skybox_cube(),
            ),
            skybox,
            skybox_bind_group,
        }
    }

    /// Destroy every texture.
    pub fn release(&self) {
        self.island.release();
        self.helicopter.release();
        self.foliage_material.release();
        self.skybox.texture.destroy();
    }
}
