use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::input::KeyAction;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Configurable keyboard bindings mapping key codes to actions.
///
/// Key strings use the `winit::keyboard::KeyCode` debug format
/// (`"KeyW"`, `"Space"`, `"F1"`). Several keys may share an action.
pub struct KeybindingOptions {
    /// Maps key string → action.
    pub bindings: HashMap<String, KeyAction>,
}

impl Default for KeybindingOptions {
    fn default() -> Self {
        let bindings = HashMap::from([
            ("KeyW".into(), KeyAction::MoveForward),
            ("KeyS".into(), KeyAction::MoveBackward),
            ("KeyA".into(), KeyAction::MoveLeft),
            ("KeyD".into(), KeyAction::MoveRight),
            ("ShiftLeft".into(), KeyAction::SpeedUp),
            ("ShiftRight".into(), KeyAction::SpeedUp),
            ("ControlLeft".into(), KeyAction::SlowDown),
            ("ControlRight".into(), KeyAction::SlowDown),
            ("Space".into(), KeyAction::ToggleBloom),
            ("KeyQ".into(), KeyAction::ExposureDown),
            ("KeyE".into(), KeyAction::ExposureUp),
            ("KeyG".into(), KeyAction::ToggleSpotlight),
            ("KeyP".into(), KeyAction::ToggleSpotlight),
            ("F1".into(), KeyAction::ToggleInspector),
            ("F5".into(), KeyAction::ReloadOptions),
            ("Escape".into(), KeyAction::Quit),
        ]);
        Self { bindings }
    }
}

impl KeybindingOptions {
    /// Look up the action for a key string.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<KeyAction> {
        self.bindings.get(key).copied()
    }

    /// Every key bound to `action`, sorted.
    #[must_use]
    pub fn keys_for(&self, action: KeyAction) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .bindings
            .iter()
            .filter(|(_, bound)| **bound == action)
            .map(|(key, _)| key.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }
}
