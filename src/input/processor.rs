//! Applies input to the fly camera and the persisted settings.
//!
//! The `InputProcessor` owns the set of held actions. Discrete actions
//! (toggles, quit) fire once on the press edge; continuous ones (movement,
//! speed, exposure) are applied every frame by [`InputProcessor::update`]
//! for as long as their key stays down.

use std::collections::HashSet;

use super::event::InputEvent;
use super::keyboard::KeyAction;
use crate::camera::core::{FlyCamera, Movement};
use crate::options::Options;

/// Per-frame speed multiplier while speed-up is held.
pub const SPEED_FACTOR: f32 = 1.1;

/// Something the host window has to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// The inspector opened (`true`) or closed. The cursor should be
    /// released while it is open.
    InspectorChanged(bool),
    /// The settings file should be read again and applied.
    ReloadOptions,
    /// The user asked to exit.
    Quit,
}

/// Order continuous actions apply in within a frame. Speed changes come
/// first so a move in the same frame already uses the new speed.
const CONTINUOUS_ORDER: [KeyAction; 8] = [
    KeyAction::SpeedUp,
    KeyAction::SlowDown,
    KeyAction::MoveForward,
    KeyAction::MoveBackward,
    KeyAction::MoveLeft,
    KeyAction::MoveRight,
    KeyAction::ExposureDown,
    KeyAction::ExposureUp,
];

/// Tracks held keys and routes events to the camera and settings.
#[derive(Debug, Default)]
pub struct InputProcessor {
    held: HashSet<KeyAction>,
}

impl InputProcessor {
    /// Processor with nothing held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Process one event. Returns an outcome when the host has work to
    /// do.
    pub fn handle_event(
        &mut self,
        event: InputEvent,
        camera: &mut FlyCamera,
        options: &mut Options,
    ) -> Option<InputOutcome> {
        match event {
            InputEvent::Key {
                action,
                pressed: true,
            } => {
                // OS key repeat arrives as further presses
                let edge = self.held.insert(action);
                if edge && !action.is_continuous() {
                    Self::press(action, camera, options)
                } else {
                    None
                }
            }
            InputEvent::Key {
                action,
                pressed: false,
            } => {
                let _ = self.held.remove(&action);
                None
            }
            InputEvent::MouseMotion { dx, dy } => {
                if !options.display.inspector {
                    camera.look(dx, dy);
                }
                None
            }
            InputEvent::Scroll { delta } => {
                camera.zoom(delta);
                None
            }
        }
    }

    fn press(
        action: KeyAction,
        camera: &FlyCamera,
        options: &mut Options,
    ) -> Option<InputOutcome> {
        match action {
            KeyAction::ToggleBloom => {
                let pp = &mut options.post_processing;
                pp.bloom = !pp.bloom;
                log::info!("bloom {}", if pp.bloom { "on" } else { "off" });
                None
            }
            KeyAction::ToggleSpotlight => {
                let lighting = &mut options.lighting;
                lighting.spotlight = !lighting.spotlight;
                log::info!(
                    "spotlight {}",
                    if lighting.spotlight { "on" } else { "off" }
                );
                None
            }
            KeyAction::ToggleInspector => {
                let display = &mut options.display;
                display.inspector = !display.inspector;
                if display.inspector {
                    log::info!(
                        "inspector: camera at {:.3}, yaw {:.1}, pitch {:.1}, \
                         fov {:.1}, speed {:.2}, exposure {:.3}",
                        camera.position,
                        camera.yaw(),
                        camera.pitch(),
                        camera.fovy(),
                        camera.speed,
                        options.post_processing.exposure,
                    );
                }
                Some(InputOutcome::InspectorChanged(display.inspector))
            }
            KeyAction::ReloadOptions => Some(InputOutcome::ReloadOptions),
            KeyAction::Quit => Some(InputOutcome::Quit),
            _ => None,
        }
    }

    /// Apply every held continuous action for a frame of `delta` seconds.
    pub fn update(
        &self,
        delta: f32,
        camera: &mut FlyCamera,
        options: &mut Options,
    ) {
        let pp = &mut options.post_processing;
        let held = CONTINUOUS_ORDER
            .iter()
            .filter(|action| self.held.contains(action));
        for action in held {
            match action {
                KeyAction::SpeedUp => camera.scale_speed(SPEED_FACTOR),
                KeyAction::SlowDown => {
                    camera.scale_speed(SPEED_FACTOR.recip());
                }
                KeyAction::MoveForward => {
                    camera.travel(Movement::Forward, delta);
                }
                KeyAction::MoveBackward => {
                    camera.travel(Movement::Backward, delta);
                }
                KeyAction::MoveLeft => camera.travel(Movement::Left, delta),
                KeyAction::MoveRight => camera.travel(Movement::Right, delta),
                KeyAction::ExposureDown => {
                    pp.exposure = (pp.exposure - pp.exposure_step).max(0.0);
                }
                KeyAction::ExposureUp => pp.exposure += pp.exposure_step,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    struct Harness {
        input: InputProcessor,
        camera: FlyCamera,
        options: Options,
    }

    impl Harness {
        fn new() -> Self {
            let options = Options::default();
            let camera = FlyCamera::from_options(&options.camera, 1.0);
            Self {
                input: InputProcessor::new(),
                camera,
                options,
            }
        }

        fn key(
            &mut self,
            action: KeyAction,
            pressed: bool,
        ) -> Option<InputOutcome> {
            self.input.handle_event(
                InputEvent::Key { action, pressed },
                &mut self.camera,
                &mut self.options,
            )
        }

        fn frame(&mut self, delta: f32) {
            self.input
                .update(delta, &mut self.camera, &mut self.options);
        }
    }

    #[test]
    fn bloom_toggles_once_per_press() {
        let mut h = Harness::new();
        let _ = h.key(KeyAction::ToggleBloom, true);
        // key repeat
        let _ = h.key(KeyAction::ToggleBloom, true);
        assert!(!h.options.post_processing.bloom);

        let _ = h.key(KeyAction::ToggleBloom, false);
        let _ = h.key(KeyAction::ToggleBloom, true);
        assert!(h.options.post_processing.bloom);
    }

    #[test]
    fn exposure_steps_while_held_and_stops_at_zero() {
        let mut h = Harness::new();
        h.options.post_processing.exposure = 0.0025;
        let _ = h.key(KeyAction::ExposureDown, true);
        for _ in 0..5 {
            h.frame(0.016);
        }
        assert_eq!(h.options.post_processing.exposure, 0.0);

        let _ = h.key(KeyAction::ExposureDown, false);
        let _ = h.key(KeyAction::ExposureUp, true);
        h.frame(0.016);
        assert_abs_diff_eq!(
            h.options.post_processing.exposure,
            0.001,
            epsilon = 1e-7
        );
    }

    #[test]
    fn speed_up_compounds_per_frame() {
        let mut h = Harness::new();
        let _ = h.key(KeyAction::SpeedUp, true);
        h.frame(0.016);
        h.frame(0.016);
        assert_abs_diff_eq!(h.camera.speed, 2.5 * 1.21, epsilon = 1e-5);
    }

    #[test]
    fn speed_change_applies_before_movement() {
        // Repeat so a hash-order dependency would show up.
        for _ in 0..32 {
            let mut h = Harness::new();
            let start = h.camera.position;
            let _ = h.key(KeyAction::MoveForward, true);
            let _ = h.key(KeyAction::SpeedUp, true);
            h.frame(1.0);
            assert_abs_diff_eq!(
                h.camera.position.distance(start),
                2.5 * SPEED_FACTOR,
                epsilon = 1e-5
            );
        }
    }

    #[test]
    fn inspector_freezes_mouse_look() {
        let mut h = Harness::new();
        let outcome = h.key(KeyAction::ToggleInspector, true);
        assert_eq!(outcome, Some(InputOutcome::InspectorChanged(true)));

        let yaw = h.camera.yaw();
        let _ = h.input.handle_event(
            InputEvent::MouseMotion { dx: 50.0, dy: 0.0 },
            &mut h.camera,
            &mut h.options,
        );
        assert_eq!(h.camera.yaw(), yaw);
    }

    #[test]
    fn movement_needs_update_and_stops_on_release() {
        let mut h = Harness::new();
        let start = h.camera.position;
        let _ = h.key(KeyAction::MoveForward, true);
        assert_eq!(h.camera.position, start);

        h.frame(1.0);
        assert_abs_diff_eq!(
            h.camera.position.distance(start),
            2.5,
            epsilon = 1e-5
        );

        let _ = h.key(KeyAction::MoveForward, false);
        let moved = h.camera.position;
        h.frame(1.0);
        assert_eq!(h.camera.position, moved);
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let mut h = Harness::new();
        let start = h.camera.position;
        let _ = h.key(KeyAction::MoveForward, true);
        h.input.release_all();
        h.frame(1.0);
        assert_eq!(h.camera.position, start);
    }

    #[test]
    fn quit_and_reload_are_reported() {
        let mut h = Harness::new();
        assert_eq!(
            h.key(KeyAction::ReloadOptions, true),
            Some(InputOutcome::ReloadOptions)
        );
        assert_eq!(h.key(KeyAction::Quit, true), Some(InputOutcome::Quit));
    }
}
