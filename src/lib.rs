// -- Lint policy ---------------------------------------------------------
// Crate-wide lint levels live here and in Cargo.toml's [lints] table.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![warn(missing_docs)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::str_to_string)]
// Unused / redundant code
#![warn(unused_results)]
#![warn(unused_qualifications)]

//! HDR bloom demo renderer built on wgpu.
//!
//! A textured tropical island, two helicopters, foliage quads and a skybox
//! are drawn into a floating-point offscreen target that captures both the
//! lit scene and its over-bright regions. The bright image is blurred with a
//! separable Gaussian that ping-pongs between two targets, then composited
//! back over the scene with exposure tone mapping.
//!
//! # Key entry points
//!
//! - [`engine::Engine`] - owns the GPU resources and runs one frame
//! - [`renderer::postprocess::blur::BlurSchedule`] - the ping-pong blur order
//! - [`renderer::postprocess::software`] - CPU reference of the post chain
//! - [`options::Options`] - persisted settings and runtime toggles
//! - [`camera::core::FlyCamera`] - the WASD/mouse fly camera

/// Fly camera and the per-frame camera snapshot.
pub mod camera;
/// Frame orchestration: per-frame animation, pass sequencing, present.
pub mod engine;
/// Crate-level error types.
pub mod error;
/// GPU context, shader composition, pipeline helpers and textures.
pub mod gpu;
/// Keyboard/mouse handling mapped to actions and toggle updates.
pub mod input;
/// Persisted settings (TOML) and the runtime toggle snapshot.
pub mod options;
/// Offscreen targets, the scene pass and the bloom post chain.
pub mod renderer;
/// Scene geometry, OBJ models and the animated layout.
pub mod scene;
/// Frame clock and FPS smoothing.
pub mod util;
/// Standalone winit viewer.
#[cfg(feature = "viewer")]
pub mod viewer;

pub use error::IsleError;
