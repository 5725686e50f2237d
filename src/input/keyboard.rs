use serde::{Deserialize, Serialize};

/// Actions that can be bound to keys.
///
/// Serde serializes as `snake_case` strings so the settings file stays
/// readable:
/// ```toml
/// [keybindings.bindings]
/// Space = "toggle_bloom"
/// KeyG = "toggle_spotlight"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Fly forward while held.
    MoveForward,
    /// Fly backward while held.
    MoveBackward,
    /// Strafe left while held.
    MoveLeft,
    /// Strafe right while held.
    MoveRight,
    /// Multiply speed by 1.1 every frame while held.
    SpeedUp,
    /// Divide speed by 1.1 every frame while held.
    SlowDown,
    /// Flip bloom on press.
    ToggleBloom,
    /// Lower exposure every frame while held.
    ExposureDown,
    /// Raise exposure every frame while held.
    ExposureUp,
    /// Flip the camera spot light on press.
    ToggleSpotlight,
    /// Open or close the inspector on press.
    ToggleInspector,
    /// Read the settings file again and apply it.
    ReloadOptions,
    /// Save and exit.
    Quit,
}

impl KeyAction {
    /// Whether the action repeats every frame while its key is held, as
    /// opposed to firing once per press.
    pub fn is_continuous(self) -> bool {
        matches!(
            self,
            Self::MoveForward
                | Self::MoveBackward
                | Self::MoveLeft
                | Self::MoveRight
                | Self::SpeedUp
                | Self::SlowDown
                | Self::ExposureDown
                | Self::ExposureUp
        )
    }
}
