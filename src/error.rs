//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;
use crate::renderer::targets::TargetError;

/// Errors produced by the isle-bloom crate.
#[derive(Debug)]
pub enum IsleError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// An offscreen render target failed completeness validation.
    Target(TargetError),
    /// A WGSL shader failed to compose or register.
    Shader(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for IsleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Target(e) => write!(f, "render target error: {e}"),
            Self::Shader(msg) => write!(f, "shader error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for IsleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Target(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for IsleError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<TargetError> for IsleError {
    fn from(e: TargetError) -> Self {
        Self::Target(e)
    }
}

impl From<std::io::Error> for IsleError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
