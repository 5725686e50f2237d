//! Input handling: key actions, platform-agnostic events, and the
//! processor that turns them into camera motion and setting changes.

/// Platform-agnostic input events.
pub mod event;
/// Bindable key actions.
pub mod keyboard;
/// Applies input to the camera and settings.
pub mod processor;

pub use event::InputEvent;
pub use keyboard::KeyAction;
pub use processor::{InputOutcome, InputProcessor};
