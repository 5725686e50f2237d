//! Diffuse + specular texture pairs bound for the lit and foliage shaders.

use crate::gpu::pipeline_helpers::material_sampler;
use crate::gpu::render_context::RenderContext;
use crate::gpu::texture::{Texture, TextureKind};

/// Fallback diffuse color: white, so instance tint shows through.
pub const DEFAULT_DIFFUSE: [u8; 4] = [255, 255, 255, 255];
/// Fallback specular color: none.
pub const DEFAULT_SPECULAR: [u8; 4] = [0, 0, 0, 255];

/// Texture slots of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialSlot {
    /// Base color, binding 0.
    Diffuse,
    /// Specular intensity, binding 1.
    Specular,
}

impl MaterialSlot {
    /// How the slot's texels are interpreted.
    pub fn kind(self) -> TextureKind {
        match self {
            Self::Diffuse => TextureKind::Color,
            Self::Specular => TextureKind::Data,
        }
    }

    /// Value used when the slot has no texture.
    pub fn fallback(self) -> [u8; 4] {
        match self {
            Self::Diffuse => DEFAULT_DIFFUSE,
            Self::Specular => DEFAULT_SPECULAR,
        }
    }

    /// 1x1 texture holding [`MaterialSlot::fallback`].
    pub fn solid(self, context: &RenderContext, label: &str) -> Texture {
        Texture::solid(context, label, self.kind(), self.fallback())
    }
}

/// Owned textures plus the bind group that exposes them at group 2.
pub struct Material {
    diffuse: Texture,
    specular: Texture,
    bind_group: wgpu::BindGroup,
}

impl Material {
    /// Bind `diffuse` and `specular` with a sampler matching the diffuse
    /// texture's address mode.
    pub fn new(
        context: &RenderContext,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        diffuse: Texture,
        specular: Texture,
    ) -> Self {
        let sampler =
            material_sampler(&context.device, label, diffuse.address_mode);
        let bind_group =
            context.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(
                            &diffuse.view,
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(
                            &specular.view,
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
            });
        Self {
            diffuse,
            specular,
            bind_group,
        }
    }

    /// Untextured white material.
    pub fn untextured(
        context: &RenderContext,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self::new(
            context,
            layout,
            "Default Material",
            MaterialSlot::Diffuse.solid(context, "Default Diffuse"),
            MaterialSlot::Specular.solid(context, "Default Specular"),
        )
    }

    /// Bind group for slot 2.
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Destroy both textures.
    pub fn release(&self) {
        self.diffuse.texture.destroy();
        self.specular.texture.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specular_is_sampled_linear() {
        assert_eq!(MaterialSlot::Diffuse.kind(), TextureKind::Color);
        assert_eq!(MaterialSlot::Specular.kind(), TextureKind::Data);
        assert_eq!(MaterialSlot::Specular.fallback(), DEFAULT_SPECULAR);
    }
}
