use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Fly camera state and control parameters.
pub struct CameraOptions {
    /// Eye position in world space.
    pub position: [f32; 3],
    /// View direction.
    pub front: [f32; 3],
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Degrees of rotation per unit of mouse motion.
    pub sensitivity: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 3.0],
            front: [0.0, 0.0, -1.0],
            fovy: 45.0,
            znear: 0.1,
            zfar: 100.0,
            speed: 2.5,
            sensitivity: 0.1,
        }
    }
}
