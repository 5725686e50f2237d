//! Persisted settings with TOML support.
//!
//! Everything the viewer remembers between runs (clear color, inspector
//! flag, lighting and bloom toggles, exposure, camera placement, asset
//! paths, keybindings) lives here. The viewer loads the file on startup
//! and writes it back on exit.

mod assets;
mod camera;
mod display;
mod keybindings;
mod lighting;
mod post_processing;

use std::path::Path;

pub use assets::AssetOptions;
pub use camera::CameraOptions;
pub use display::DisplayOptions;
pub use keybindings::KeybindingOptions;
pub use lighting::LightingOptions;
pub use post_processing::PostProcessingOptions;
use serde::{Deserialize, Serialize};

use crate::error::IsleError;

/// Default settings file, relative to the working directory.
pub const DEFAULT_OPTIONS_PATH: &str = "resources/isle_bloom.toml";

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[lighting]`) work correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Options {
    /// Window and background settings.
    pub display: DisplayOptions,
    /// Lighting parameters.
    pub lighting: LightingOptions,
    /// Bloom and tone-mapping parameters.
    pub post_processing: PostProcessingOptions,
    /// Camera placement and control parameters.
    pub camera: CameraOptions,
    /// Asset locations.
    pub assets: AssetOptions,
    /// Keyboard binding options.
    pub keybindings: KeybindingOptions,
}

/// Runtime toggles read by the renderer every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToggleState {
    /// Add the blurred bright image before tone mapping.
    pub bloom: bool,
    /// Tone-mapping exposure.
    pub exposure: f32,
    /// Camera spot light on.
    pub spotlight: bool,
}

impl Options {
    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, IsleError> {
        let content = std::fs::read_to_string(path).map_err(IsleError::Io)?;
        toml::from_str(&content)
            .map_err(|e| IsleError::OptionsParse(e.to_string()))
    }

    /// Load `path`, falling back to defaults when the file is missing or
    /// malformed.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(options) => {
                log::info!("loaded settings from {}", path.display());
                options
            }
            Err(IsleError::Io(e))
                if e.kind() == std::io::ErrorKind::NotFound =>
            {
                log::info!("no settings at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("{}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), IsleError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| IsleError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(IsleError::Io)?;
        }
        std::fs::write(path, content).map_err(IsleError::Io)
    }

    /// Snapshot of the per-frame toggles.
    #[must_use]
    pub fn toggles(&self) -> ToggleState {
        ToggleState {
            bloom: self.post_processing.bloom,
            exposure: self.post_processing.exposure,
            spotlight: self.lighting.spotlight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyAction;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[post_processing]
exposure = 1.25
";
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.post_processing.exposure, 1.25);
        // Everything else should be default
        assert!(opts.post_processing.bloom);
        assert_eq!(opts.post_processing.blur_iterations, 10);
        assert_eq!(opts.camera.position, [0.0, 0.0, 3.0]);
    }

    #[test]
    fn keybinding_lookup() {
        let opts = Options::default();
        let keys = &opts.keybindings;
        assert_eq!(keys.lookup("Space"), Some(KeyAction::ToggleBloom));
        assert_eq!(keys.lookup("KeyP"), Some(KeyAction::ToggleSpotlight));
        assert_eq!(opts.keybindings.lookup("KeyZ"), None);
        assert_eq!(
            opts.keybindings.keys_for(KeyAction::ToggleSpotlight),
            vec!["KeyG", "KeyP"]
        );
    }

    #[test]
    fn toggles_mirror_persisted_values() {
        let mut opts = Options::default();
        opts.post_processing.bloom = false;
        opts.lighting.spotlight = true;
        assert_eq!(
            opts.toggles(),
            ToggleState {
                bloom: false,
                exposure: 0.5,
                spotlight: true
            }
        );
    }

    #[test]
    fn save_then_load_restores_state() {
        let path = std::env::temp_dir()
            .join(format!("isle-bloom-options-{}", std::process::id()))
            .join("settings.toml");
        let mut opts = Options::default();
        opts.display.clear_color = [0.1, 0.2, 0.3];
        opts.camera.front = [1.0, 0.0, 0.0];
        opts.save(&path).unwrap();

        assert_eq!(Options::load(&path).unwrap(), opts);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = std::env::temp_dir()
            .join(format!("isle-bloom-bad-options-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(&path, "[display\nclear_color = ").unwrap();

        assert!(matches!(
            Options::load(&path),
            Err(IsleError::OptionsParse(_))
        ));
        assert_eq!(Options::load_or_default(&path), Options::default());
        assert_eq!(
            Options::load_or_default(&dir.join("missing.toml")),
            Options::default()
        );
    }
}
