//! Standalone window backed by winit.
//!
//! ```no_run
//! # use isle_bloom::viewer::Viewer;
//! Viewer::builder()
//!     .with_options_path("resources/isle_bloom.toml")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window, WindowId},
};

use crate::camera::core::FlyCamera;
use crate::engine::Engine;
use crate::error::IsleError;
use crate::input::{InputEvent, InputOutcome, InputProcessor};
use crate::options::{Options, DEFAULT_OPTIONS_PATH};
use crate::util::frame_timing::{FpsMeter, FrameClock};

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options_path: PathBuf,
    options: Option<Options>,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            options_path: PathBuf::from(DEFAULT_OPTIONS_PATH),
            options: None,
        }
    }

    /// Where settings are loaded from and saved to on exit.
    #[must_use]
    pub fn with_options_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options_path = path.into();
        self
    }

    /// Start from these options instead of reading the settings file.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            options_path: self.options_path,
            options: self.options,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A window showing the island scene.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options_path: PathBuf,
    options: Option<Options>,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the user quits.
    ///
    /// # Errors
    ///
    /// Returns [`IsleError::Viewer`] if the event loop fails, or the
    /// engine's error if GPU setup fails.
    pub fn run(self) -> Result<(), IsleError> {
        let options = self
            .options
            .unwrap_or_else(|| Options::load_or_default(&self.options_path));

        let event_loop =
            EventLoop::new().map_err(|e| IsleError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            engine: None,
            camera: None,
            input: InputProcessor::new(),
            clock: FrameClock::new(),
            fps: FpsMeter::default(),
            options,
            options_path: self.options_path,
            fatal: None,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| IsleError::Viewer(e.to_string()))?;
        app.fatal.map_or(Ok(()), Err)
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

struct ViewerApp {
    window: Option<Arc<Window>>,
    engine: Option<Engine>,
    camera: Option<FlyCamera>,
    input: InputProcessor,
    clock: FrameClock,
    fps: FpsMeter,
    options: Options,
    options_path: PathBuf,
    fatal: Option<IsleError>,
}

fn viewport_size(inner: winit::dpi::PhysicalSize<u32>) -> (u32, u32) {
    (inner.width.max(1), inner.height.max(1))
}

/// Hide and confine the cursor for mouse look, or give it back.
fn capture_cursor(window: &Window, captured: bool) {
    let grab = if captured {
        window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
    } else {
        window.set_cursor_grab(CursorGrabMode::None)
    };
    if let Err(e) = grab {
        log::warn!("cursor grab not available: {e}");
    }
    window.set_cursor_visible(!captured);
}

impl ViewerApp {
    /// Persist settings, release GPU resources, and stop the loop.
    fn quit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(camera) = &self.camera {
            camera.store(&mut self.options.camera);
        }
        match self.options.save(&self.options_path) {
            Ok(()) => {
                log::info!("saved settings to {}", self.options_path.display());
            }
            Err(e) => log::error!("failed to save settings: {e}"),
        }
        if let Some(engine) = self.engine.take() {
            engine.shutdown();
        }
        event_loop.exit();
    }

    /// Re-read the settings file and push it to the engine. A file that
    /// fails to load leaves the current settings in place.
    fn reload_options(&mut self) {
        let options = match Options::load(&self.options_path) {
            Ok(options) => options,
            Err(e) => {
                log::warn!("settings not reloaded: {e}");
                return;
            }
        };
        self.options = options;
        if let Some(engine) = &mut self.engine {
            engine.apply_options(&self.options);
        }
        if let Some(window) = &self.window {
            capture_cursor(window, !self.options.display.inspector);
        }
        log::info!("reloaded settings from {}", self.options_path.display());
    }

    fn handle_input(
        &mut self,
        event_loop: &ActiveEventLoop,
        event: InputEvent,
    ) {
        let Some(camera) = &mut self.camera else {
            return;
        };
        match self.input.handle_event(event, camera, &mut self.options) {
            Some(InputOutcome::Quit) => self.quit(event_loop),
            Some(InputOutcome::ReloadOptions) => self.reload_options(),
            Some(InputOutcome::InspectorChanged(open)) => {
                if open {
                    log::info!("{:.0} fps", self.fps.fps());
                }
                if let Some(window) = &self.window {
                    capture_cursor(window, !open);
                }
            }
            None => {}
        }
    }

    fn redraw(&mut self) {
        let (Some(engine), Some(camera)) =
            (&mut self.engine, &mut self.camera)
        else {
            return;
        };
        let time = self.clock.tick();
        self.fps.record(time);
        self.input.update(time.delta, camera, &mut self.options);

        let toggles = self.options.toggles();
        match engine.render_frame(time, &camera.state(), &toggles) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                if let Some(window) = &self.window {
                    let (w, h) = viewport_size(window.inner_size());
                    if let Err(e) = engine.resize(w, h) {
                        log::error!("{e}");
                    }
                }
            }
            Err(e) => log::error!("render error: {e:?}"),
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let display = &self.options.display;
        let attrs = Window::default_attributes()
            .with_title(&display.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                display.window_width,
                display.window_height,
            ));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                self.fatal = Some(IsleError::Viewer(e.to_string()));
                event_loop.exit();
                return;
            }
        };

        let (vp_w, vp_h) = viewport_size(window.inner_size());
        let engine = match pollster::block_on(Engine::new(
            window.clone(),
            (vp_w, vp_h),
            &self.options,
        )) {
            Ok(e) => e,
            Err(e) => {
                log::error!("Failed to initialize engine: {e}");
                self.fatal = Some(e);
                event_loop.exit();
                return;
            }
        };

        self.camera = Some(FlyCamera::from_options(
            &self.options.camera,
            vp_w as f32 / vp_h as f32,
        ));
        capture_cursor(&window, !self.options.display.inspector);
        self.clock = FrameClock::new();

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn device_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.handle_input(
                event_loop,
                InputEvent::MouseMotion {
                    dx: dx as f32,
                    dy: dy as f32,
                },
            );
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            self.quit(event_loop);
            return;
        }

        // Guard: both window and engine must be initialised.
        if self.window.is_none() || self.engine.is_none() {
            return;
        }

        match event {
            WindowEvent::Resized(event_size) => {
                let (vp_w, vp_h) = viewport_size(event_size);
                if let Some(engine) = &mut self.engine {
                    if let Err(e) = engine.resize(vp_w, vp_h) {
                        log::error!("{e}");
                    }
                }
                if let Some(camera) = &mut self.camera {
                    camera.resize(vp_w, vp_h);
                }
            }

            WindowEvent::Focused(false) => self.input.release_all(),

            WindowEvent::RedrawRequested => {
                self.redraw();
                if let Some(w) = &self.window {
                    w.request_redraw();
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.handle_input(event_loop, InputEvent::scroll(delta));
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let key_str = format!("{code:?}");
                let bound = self.options.keybindings.lookup(&key_str);
                if let Some(action) = bound {
                    self.handle_input(
                        event_loop,
                        InputEvent::Key {
                            action,
                            pressed: event.state == ElementState::Pressed,
                        },
                    );
                }
            }

            _ => (),
        }
    }
}
