mod frame;

use glam::Vec3;

pub use self::frame::PresentedFrame;
use crate::error::IsleError;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::options::Options;
use crate::renderer::postprocess::blur::{BlurSchedule, BlurStage};
use crate::renderer::postprocess::composite::CompositeStage;
use crate::renderer::scene_pass::ScenePass;
use crate::renderer::targets::OffscreenTargets;
use crate::scene::lights::LightRig;
use crate::scene::SceneAssets;

/// Values read from [`Options`] that stay fixed between option changes.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SceneSettings {
    clear_color: wgpu::Color,
    bloom_threshold: f32,
    shininess: f32,
    island_position: Vec3,
}

impl SceneSettings {
    fn from_options(options: &Options) -> Self {
        Self {
            clear_color: options.display.wgpu_clear_color(),
            bloom_threshold: options.lighting.bloom_threshold,
            shininess: options.lighting.shininess,
            island_position: Vec3::ZERO,
        }
    }
}

/// The island bloom renderer.
///
/// Owns every GPU resource of the fixed pipeline: the offscreen targets,
/// the scene pass and its assets, the blur stage and the composite stage.
///
/// # Frame loop
///
/// Each frame, call [`render_frame`](Self::render_frame) with the frame
/// time, a camera snapshot and the toggle snapshot. Call
/// [`resize`](Self::resize) when the window size changes and
/// [`shutdown`](Self::shutdown) before dropping the window.
pub struct Engine {
    /// Core wgpu device, queue, and surface.
    pub context: RenderContext,
    _shader_composer: ShaderComposer,
    targets: OffscreenTargets,
    scene_pass: ScenePass,
    assets: SceneAssets,
    blur: BlurStage,
    composite: CompositeStage,
    rig: LightRig,
    settings: SceneSettings,
}

impl Engine {
    /// Engine drawing to a window surface.
    ///
    /// # Errors
    ///
    /// Returns [`IsleError`] if GPU initialization, target validation or
    /// shader composition fails.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
        options: &Options,
    ) -> Result<Self, IsleError> {
        let context = RenderContext::new(window, size).await?;
        Self::from_context(context, options)
    }

    /// Engine from a pre-built [`RenderContext`] (for headless rendering
    /// into caller-owned textures).
    ///
    /// # Errors
    ///
    /// Returns [`IsleError`] if target validation or shader composition
    /// fails.
    pub fn from_context(
        context: RenderContext,
        options: &Options,
    ) -> Result<Self, IsleError> {
        let mut shader_composer = ShaderComposer::new()?;
        let targets = OffscreenTargets::new(
            &context.device,
            context.width(),
            context.height(),
        )?;
        let scene_pass = ScenePass::new(&context, &mut shader_composer)?;
        let assets =
            SceneAssets::load(&context, &options.assets, scene_pass.layouts());
        let blur = BlurStage::new(
            &context,
            &targets,
            BlurSchedule::new(options.post_processing.blur_iterations),
            &mut shader_composer,
        )?;
        let composite = CompositeStage::new(
            &context,
            &targets,
            context.format(),
            &mut shader_composer,
        )?;
        log::info!(
            "engine ready at {}x{} ({:?}, {} blur passes)",
            context.width(),
            context.height(),
            context.format(),
            blur.schedule().iterations()
        );

        Ok(Self {
            context,
            _shader_composer: shader_composer,
            targets,
            scene_pass,
            assets,
            blur,
            composite,
            rig: LightRig::default(),
            settings: SceneSettings::from_options(options),
        })
    }

    /// Pick up clear color, threshold, shininess and blur iteration
    /// changes, e.g. after the settings file is reloaded. Toggles are
    /// passed per frame and need no call here.
    pub fn apply_options(&mut self, options: &Options) {
        self.settings = SceneSettings::from_options(options);
        let iterations = options.post_processing.blur_iterations;
        if iterations != self.blur.schedule().iterations() {
            self.blur.set_iterations(iterations);
        }
    }

    /// Reconfigure the surface and recreate every size-dependent resource.
    /// Zero-sized requests (minimized windows) are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`IsleError::Target`] if the new targets fail validation;
    /// the old targets stay in use.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), IsleError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.context.resize(width, height);
        self.targets.resize(&self.context.device, width, height)?;
        self.blur.resize(&self.context, &self.targets);
        self.composite.resize(&self.context, &self.targets);
        log::debug!("resized to {width}x{height}");
        Ok(())
    }

    /// Release every GPU texture. The context is dropped with `self`.
    pub fn shutdown(self) {
        self.targets.release();
        self.assets.release();
        log::info!("engine shut down");
    }
}
