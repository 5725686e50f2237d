use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Window and background settings.
pub struct DisplayOptions {
    /// Linear RGB the scene target is cleared to.
    pub clear_color: [f32; 3],
    /// Whether the inspector (free cursor, no mouse look) is open.
    pub inspector: bool,
    /// Initial window width in logical pixels.
    pub window_width: u32,
    /// Initial window height in logical pixels.
    pub window_height: u32,
    /// Window title.
    pub title: String,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0],
            inspector: false,
            window_width: 1000,
            window_height: 700,
            title: "isle-bloom".to_owned(),
        }
    }
}

impl DisplayOptions {
    /// Clear color as a wgpu color with opaque alpha.
    pub fn wgpu_clear_color(&self) -> wgpu::Color {
        let [r, g, b] = self.clear_color.map(f64::from);
        wgpu::Color { r, g, b, a: 1.0 }
    }
}
