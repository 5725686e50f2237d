use super::keyboard::KeyAction;

/// Platform-agnostic input events.
///
/// These are fed into an [`InputProcessor`](super::InputProcessor), which
/// applies them to the camera and the settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A bound key changed state.
    Key {
        /// Action the key is bound to.
        action: KeyAction,
        /// `true` for press (including OS key repeat), `false` for release.
        pressed: bool,
    },
    /// Raw relative mouse motion.
    MouseMotion {
        /// Horizontal motion, positive right.
        dx: f32,
        /// Vertical motion, positive down.
        dy: f32,
    },
    /// Scroll wheel (positive = zoom in).
    Scroll {
        /// Scroll amount in lines.
        delta: f32,
    },
}

#[cfg(feature = "viewer")]
impl InputEvent {
    /// Scroll event from a winit wheel delta.
    pub fn scroll(delta: winit::event::MouseScrollDelta) -> Self {
        let delta = match delta {
            winit::event::MouseScrollDelta::LineDelta(_, y) => y,
            winit::event::MouseScrollDelta::PixelDelta(pos) => {
                pos.y as f32 * 0.01
            }
        };
        Self::Scroll { delta }
    }
}
