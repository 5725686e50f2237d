use std::borrow::Cow;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage,
    ShaderType,
};

use crate::error::IsleError;

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Pre-loads the shared WGSL modules at construction time. Consuming shaders
/// use `#import isle::module_name::{item}` to pull in shared code. The
/// composer produces `naga::Module` IR directly, skipping WGSL re-parse at
/// runtime.
pub struct ShaderComposer {
    composer: Composer,
}

struct ModuleDef {
    source: &'static str,
    file_path: &'static str,
}

/// Shared modules in dependency order.
const MODULES: &[ModuleDef] = &[
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/fullscreen.wgsl"),
        file_path: "modules/fullscreen.wgsl",
    },
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/scene.wgsl"),
        file_path: "modules/scene.wgsl",
    },
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/lighting.wgsl"),
        file_path: "modules/lighting.wgsl",
    },
];

impl ShaderComposer {
    /// Register every shared module.
    ///
    /// # Errors
    ///
    /// Returns [`IsleError::Shader`] if a shared module fails to parse.
    pub fn new() -> Result<Self, IsleError> {
        let mut composer = Composer::default();

        for m in MODULES {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: m.source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| {
                    IsleError::Shader(format!(
                        "failed to register module '{}': {e}",
                        m.file_path
                    ))
                })?;
        }

        Ok(Self { composer })
    }

    /// Compose a shader source string (which may contain `#import` directives)
    /// into a `wgpu::ShaderModule` ready for pipeline creation.
    ///
    /// # Errors
    ///
    /// Returns [`IsleError::Shader`] if composition fails.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        source: &str,
        file_path: &str,
    ) -> Result<wgpu::ShaderModule, IsleError> {
        let naga_module = self.compose_naga(source, file_path).map_err(|e| {
            IsleError::Shader(format!("failed to compose '{file_path}': {e}"))
        })?;

        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Naga(Cow::Owned(naga_module)),
        }))
    }

    /// Compose a shader source into a `naga::Module` without creating a wgpu
    /// shader module. Useful for testing composition without a GPU device.
    ///
    /// # Errors
    ///
    /// Returns the composer error if imports or WGSL fail to resolve.
    pub fn compose_naga(
        &mut self,
        source: &str,
        file_path: &str,
    ) -> Result<naga::Module, Box<naga_oil::compose::ComposerError>> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source,
                file_path,
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_shader_sources() -> Vec<(&'static str, &'static str)> {
        vec![
            (
                include_str!("../../assets/shaders/scene/lit.wgsl"),
                "lit.wgsl",
            ),
            (
                include_str!("../../assets/shaders/scene/foliage.wgsl"),
                "foliage.wgsl",
            ),
            (
                include_str!("../../assets/shaders/scene/skybox.wgsl"),
                "skybox.wgsl",
            ),
            (
                include_str!("../../assets/shaders/scene/emissive.wgsl"),
                "emissive.wgsl",
            ),
            (
                include_str!("../../assets/shaders/screen/blur.wgsl"),
                "blur.wgsl",
            ),
            (
                include_str!("../../assets/shaders/screen/bloom_composite.wgsl"),
                "bloom_composite.wgsl",
            ),
        ]
    }

    #[test]
    fn test_all_shaders_compose() {
        let mut composer = ShaderComposer::new().unwrap();
        for (source, file_path) in all_shader_sources() {
            let module = composer
                .compose_naga(source, file_path)
                .unwrap_or_else(|e| {
                    panic!("Shader '{file_path}' failed to compose: {e}")
                });
            let mut validator = naga::valid::Validator::new(
                naga::valid::ValidationFlags::all(),
                naga::valid::Capabilities::default(),
            );
            let _ = validator.validate(&module).unwrap_or_else(|e| {
                panic!("Shader '{file_path}' failed validation: {e:?}")
            });
        }
    }

    #[test]
    fn scene_shaders_write_both_color_outputs() {
        let mut composer = ShaderComposer::new().unwrap();
        let sources = all_shader_sources();
        for (source, file_path) in sources.iter().take(4) {
            let module = composer.compose_naga(source, file_path).unwrap();
            let fragment = module
                .entry_points
                .iter()
                .find(|ep| ep.stage == naga::ShaderStage::Fragment)
                .unwrap();
            let result = fragment.function.result.as_ref().unwrap();
            let naga::TypeInner::Struct { members, .. } =
                &module.types[result.ty].inner
            else {
                panic!("{file_path}: fragment output is not a struct");
            };
            let locations: Vec<u32> = members
                .iter()
                .filter_map(|m| match m.binding {
                    Some(naga::Binding::Location { location, .. }) => {
                        Some(location)
                    }
                    _ => None,
                })
                .collect();
            assert_eq!(locations, vec![0, 1], "{file_path}");
        }
    }
}
