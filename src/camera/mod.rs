//! First-person fly camera.
//!
//! Provides WASD movement, mouse look with a pitch clamp, scroll zoom, and
//! the per-frame [`CameraState`](core::CameraState) snapshot the renderer
//! consumes.

/// Fly camera and its per-frame snapshot.
pub mod core;
