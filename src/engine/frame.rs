//! Per-frame orchestration: animate, upload, capture, blur, composite.

use super::Engine;
use crate::camera::core::CameraState;
use crate::options::ToggleState;
use crate::renderer::postprocess::blur::BlurSource;
use crate::renderer::uniforms::{FrameUniform, ShadingInputs};
use crate::scene::layout::SceneLayout;
use crate::util::frame_timing::FrameTime;

/// What a rendered frame used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresentedFrame {
    /// Image the composite read as bloom.
    pub bloom_source: BlurSource,
    /// Toggles the frame was rendered with.
    pub toggles: ToggleState,
}

impl Engine {
    /// Render one frame to the surface and present it.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] if the next surface texture cannot be
    /// acquired. `Lost` and `Outdated` call for a [`resize`](Self::resize).
    pub fn render_frame(
        &mut self,
        time: FrameTime,
        camera: &CameraState,
        toggles: &ToggleState,
    ) -> Result<PresentedFrame, wgpu::SurfaceError> {
        let output = self.context.get_next_frame()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let frame = self.render_to_view(&view, time, camera, toggles);
        output.present();
        Ok(frame)
    }

    /// Render one frame into a caller-owned view of the context's format.
    pub fn render_to_view(
        &mut self,
        view: &wgpu::TextureView,
        time: FrameTime,
        camera: &CameraState,
        toggles: &ToggleState,
    ) -> PresentedFrame {
        log::trace!(
            "t={:.3} dt={:.4} bloom={} exposure={:.3} spotlight={}",
            time.elapsed,
            time.delta,
            toggles.bloom,
            toggles.exposure,
            toggles.spotlight
        );

        let layout =
            SceneLayout::at(time.elapsed, self.settings.island_position);
        let uniform = FrameUniform::new(
            camera,
            &layout,
            &ShadingInputs {
                rig: &self.rig,
                spotlight: toggles.spotlight,
                bloom_threshold: self.settings.bloom_threshold,
                shininess: self.settings.shininess,
            },
        );
        self.scene_pass.prepare(&self.context.queue, &uniform, &layout);
        self.composite.update_params(
            &self.context.queue,
            toggles.bloom,
            toggles.exposure,
        );

        let mut encoder = self.context.create_encoder();
        self.scene_pass.render(
            &mut encoder,
            &self.targets,
            &self.assets,
            self.settings.clear_color,
        );
        let bloom_source = self.blur.render(&mut encoder, &self.targets);
        self.composite.render(&mut encoder, view, bloom_source);
        self.context.submit(encoder);

        PresentedFrame {
            bloom_source,
            toggles: *toggles,
        }
    }
}
