use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Where scene assets are read from. Relative paths resolve against
/// `root`.
pub struct AssetOptions {
    /// Base directory for every other path.
    pub root: PathBuf,
    /// Island OBJ model.
    pub island: PathBuf,
    /// Helicopter OBJ model.
    pub helicopter: PathBuf,
    /// RGBA texture of the foliage quads.
    pub foliage_texture: PathBuf,
    /// Directory holding the six skybox faces.
    pub skybox_dir: PathBuf,
    /// File extension of the skybox faces.
    pub skybox_extension: String,
    /// Flip skybox faces vertically on load.
    pub skybox_flip: bool,
}

impl Default for AssetOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("resources"),
            island: PathBuf::from("objects/islan/Small_Tropical_Island.obj"),
            helicopter: PathBuf::from("objects/heli/ah64d.obj"),
            foliage_texture: PathBuf::from("textures/grass.png"),
            skybox_dir: PathBuf::from("textures/skybox/skyboxbak"),
            skybox_extension: "png".to_owned(),
            skybox_flip: true,
        }
    }
}

impl AssetOptions {
    /// `path` joined onto the asset root.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}
