//! Offscreen render targets: the HDR capture target and the ping-pong pair.
//!
//! Every target is described by a [`TargetSpec`] and validated before any
//! GPU texture is allocated. An incomplete spec is a fatal configuration
//! error; the host logs it and shuts down.

use std::fmt;

use crate::renderer::postprocess::blur::{BlurAxis, BlurSource, PingPong};

/// Format of every HDR color image.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Format of the scene depth image.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Which attachment of a target a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentSlot {
    /// Color attachment at the given index.
    Color(usize),
    /// The depth attachment.
    Depth,
}

impl fmt::Display for AttachmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color(i) => write!(f, "color attachment {i}"),
            Self::Depth => write!(f, "depth attachment"),
        }
    }
}

/// Why a target spec is incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncompleteReason {
    /// Fewer color attachments than required.
    MissingColor {
        /// Required count.
        expected: usize,
        /// Present count.
        found: usize,
    },
    /// The target requires depth but has none.
    MissingDepth,
    /// An attachment has a zero dimension.
    ZeroSized(AttachmentSlot),
    /// An attachment's size differs from the first color attachment.
    DimensionMismatch {
        /// Offending attachment.
        slot: AttachmentSlot,
        /// Size of the first color attachment.
        expected: (u32, u32),
        /// Size of the offending attachment.
        found: (u32, u32),
    },
    /// A color attachment does not use a float HDR format.
    NonFloatColor {
        /// Offending attachment.
        slot: AttachmentSlot,
        /// Its format.
        format: wgpu::TextureFormat,
    },
    /// The depth attachment format has no depth aspect.
    NonDepthFormat(wgpu::TextureFormat),
}

impl fmt::Display for IncompleteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColor { expected, found } => write!(
                f,
                "expected {expected} color attachments, found {found}"
            ),
            Self::MissingDepth => write!(f, "missing depth attachment"),
            Self::ZeroSized(slot) => write!(f, "{slot} has zero size"),
            Self::DimensionMismatch {
                slot,
                expected,
                found,
            } => write!(
                f,
                "{slot} is {}x{}, expected {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
            Self::NonFloatColor { slot, format } => {
                write!(f, "{slot} uses non-float format {format:?}")
            }
            Self::NonDepthFormat(format) => {
                write!(f, "depth attachment uses {format:?}")
            }
        }
    }
}

/// Render target validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    /// The target is missing an attachment or its attachments disagree.
    Incomplete {
        /// Target label.
        label: &'static str,
        /// What is wrong.
        reason: IncompleteReason,
    },
}

impl fmt::Display for TargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incomplete { label, reason } => {
                write!(f, "{label} is incomplete: {reason}")
            }
        }
    }
}

impl std::error::Error for TargetError {}

/// Format and size of one attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentSpec {
    /// Texture format.
    pub format: wgpu::TextureFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl AttachmentSpec {
    /// HDR color attachment.
    #[must_use]
    pub fn hdr(width: u32, height: u32) -> Self {
        Self {
            format: HDR_FORMAT,
            width,
            height,
        }
    }

    /// Depth attachment.
    #[must_use]
    pub fn depth(width: u32, height: u32) -> Self {
        Self {
            format: DEPTH_FORMAT,
            width,
            height,
        }
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Description of a target, checked by [`TargetSpec::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    /// Debug label, also used in diagnostics.
    pub label: &'static str,
    /// Color attachments in shader output order.
    pub colors: Vec<AttachmentSpec>,
    /// Depth attachment.
    pub depth: Option<AttachmentSpec>,
    /// Number of color attachments the consumer writes.
    pub required_colors: usize,
    /// Whether the consumer depth-tests.
    pub requires_depth: bool,
}

impl TargetSpec {
    /// Scene color + bright color + depth.
    #[must_use]
    pub fn hdr_capture(width: u32, height: u32) -> Self {
        Self {
            label: "HDR Capture Target",
            colors: vec![
                AttachmentSpec::hdr(width, height),
                AttachmentSpec::hdr(width, height),
            ],
            depth: Some(AttachmentSpec::depth(width, height)),
            required_colors: 2,
            requires_depth: true,
        }
    }

    /// One member of the blur ping-pong pair: a single color, no depth.
    #[must_use]
    pub fn blur_member(axis: BlurAxis, width: u32, height: u32) -> Self {
        Self {
            label: match axis {
                BlurAxis::Horizontal => "Horizontal Blur Target",
                BlurAxis::Vertical => "Vertical Blur Target",
            },
            colors: vec![AttachmentSpec::hdr(width, height)],
            depth: None,
            required_colors: 1,
            requires_depth: false,
        }
    }

    /// Check that every required attachment exists and that all attachments
    /// share one size.
    ///
    /// # Errors
    ///
    /// [`TargetError::Incomplete`] naming the first problem found.
    pub fn validate(&self) -> Result<(), TargetError> {
        let fail = |reason| TargetError::Incomplete {
            label: self.label,
            reason,
        };

        if self.colors.len() < self.required_colors
            || self.colors.is_empty()
        {
            return Err(fail(IncompleteReason::MissingColor {
                expected: self.required_colors.max(1),
                found: self.colors.len(),
            }));
        }
        if self.requires_depth && self.depth.is_none() {
            return Err(fail(IncompleteReason::MissingDepth));
        }

        let attachments = self
            .colors
            .iter()
            .enumerate()
            .map(|(i, a)| (AttachmentSlot::Color(i), a))
            .chain(self.depth.iter().map(|a| (AttachmentSlot::Depth, a)));

        let expected = self.colors[0].size();
        for (slot, attachment) in attachments {
            if attachment.width == 0 || attachment.height == 0 {
                return Err(fail(IncompleteReason::ZeroSized(slot)));
            }
            if attachment.size() != expected {
                return Err(fail(IncompleteReason::DimensionMismatch {
                    slot,
                    expected,
                    found: attachment.size(),
                }));
            }
            match slot {
                AttachmentSlot::Color(_)
                    if !is_hdr_float(attachment.format) =>
                {
                    return Err(fail(IncompleteReason::NonFloatColor {
                        slot,
                        format: attachment.format,
                    }));
                }
                AttachmentSlot::Depth
                    if !attachment.format.has_depth_aspect() =>
                {
                    return Err(fail(IncompleteReason::NonDepthFormat(
                        attachment.format,
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn is_hdr_float(format: wgpu::TextureFormat) -> bool {
    matches!(
        format,
        wgpu::TextureFormat::Rgba16Float | wgpu::TextureFormat::Rgba32Float
    )
}

/// A render-target texture and its default view.
pub struct RenderTarget {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
}

impl RenderTarget {
    fn new(
        device: &wgpu::Device,
        label: &str,
        spec: &AttachmentSpec,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: spec.width,
                height: spec.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: spec.format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    fn color(
        device: &wgpu::Device,
        label: &str,
        spec: &AttachmentSpec,
    ) -> Self {
        Self::new(
            device,
            label,
            spec,
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
        )
    }
}

/// Scene color, bright color and depth at viewport size.
pub struct HdrCaptureTarget {
    /// Lit scene color (shader output 0).
    pub scene: RenderTarget,
    /// Over-threshold color (shader output 1).
    pub bright: RenderTarget,
    /// Depth buffer.
    pub depth: RenderTarget,
    width: u32,
    height: u32,
}

impl HdrCaptureTarget {
    /// Validate and allocate.
    ///
    /// # Errors
    ///
    /// [`TargetError::Incomplete`] if the spec for this size is invalid.
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> Result<Self, TargetError> {
        Self::from_spec(device, &TargetSpec::hdr_capture(width, height))
    }

    fn from_spec(
        device: &wgpu::Device,
        spec: &TargetSpec,
    ) -> Result<Self, TargetError> {
        spec.validate()?;
        let (Some(depth), [scene, bright, ..]) =
            (spec.depth.as_ref(), spec.colors.as_slice())
        else {
            return Err(TargetError::Incomplete {
                label: spec.label,
                reason: IncompleteReason::MissingColor {
                    expected: 2,
                    found: spec.colors.len(),
                },
            });
        };
        Ok(Self {
            scene: RenderTarget::color(device, "HDR Scene Color", scene),
            bright: RenderTarget::color(device, "HDR Bright Color", bright),
            depth: RenderTarget::new(
                device,
                "HDR Depth",
                depth,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            ),
            width: scene.width,
            height: scene.height,
        })
    }

    /// Size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn release(&self) {
        self.scene.texture.destroy();
        self.bright.texture.destroy();
        self.depth.texture.destroy();
    }
}

/// The two single-color blur targets.
pub struct PingPongPair {
    members: PingPong<RenderTarget>,
}

impl PingPongPair {
    /// Validate and allocate both members.
    ///
    /// # Errors
    ///
    /// [`TargetError::Incomplete`] if either member's spec is invalid.
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> Result<Self, TargetError> {
        let members = PingPong::try_from_fn(|axis| {
            let spec = TargetSpec::blur_member(axis, width, height);
            spec.validate()?;
            Ok(RenderTarget::color(device, spec.label, &spec.colors[0]))
        })?;
        Ok(Self { members })
    }

    /// Member written by passes along `axis`.
    pub fn member(&self, axis: BlurAxis) -> &RenderTarget {
        self.members.get(axis)
    }

    fn release(&self) {
        self.members.horizontal.texture.destroy();
        self.members.vertical.texture.destroy();
    }
}

/// Every offscreen image the frame uses, sized to the viewport.
pub struct OffscreenTargets {
    /// Scene capture target.
    pub hdr: HdrCaptureTarget,
    /// Blur ping-pong pair.
    pub ping_pong: PingPongPair,
}

impl OffscreenTargets {
    /// Create both targets at `width` x `height`.
    ///
    /// # Errors
    ///
    /// [`TargetError::Incomplete`] if any target fails validation.
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> Result<Self, TargetError> {
        let targets = Self {
            hdr: HdrCaptureTarget::new(device, width, height)?,
            ping_pong: PingPongPair::new(device, width, height)?,
        };
        log::debug!("offscreen targets created at {width}x{height}");
        Ok(targets)
    }

    /// Size shared by every target.
    pub fn size(&self) -> (u32, u32) {
        self.hdr.size()
    }

    /// Image a blur pass or the composite samples for `source`.
    pub fn sampled(&self, source: BlurSource) -> &RenderTarget {
        match source {
            BlurSource::BrightPass => &self.hdr.bright,
            BlurSource::PingPong(axis) => self.ping_pong.member(axis),
        }
    }

    /// Replace every target with one of the new size. The old textures are
    /// destroyed only after the new ones validate.
    ///
    /// # Errors
    ///
    /// [`TargetError::Incomplete`] if the new size is invalid; the existing
    /// targets are kept in that case.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> Result<(), TargetError> {
        let next = Self::new(device, width, height)?;
        self.release();
        *self = next;
        Ok(())
    }

    /// Destroy every GPU texture.
    pub fn release(&self) {
        self.hdr.release();
        self.ping_pong.release();
    }
}
