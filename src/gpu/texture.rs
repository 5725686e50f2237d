//! Image-backed 2D textures and skybox cubemaps.
//!
//! Decoding is separated from upload so channel-layout checks and mip
//! generation run without a device. Decode failures are recoverable: the
//! `*_or_placeholder` constructors log a warning and substitute a solid
//! color so rendering can continue.

use std::fmt;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::RgbaImage;

use crate::gpu::render_context::RenderContext;

/// Cubemap face file stems in layer order (+X, -X, +Y, -Y, +Z, -Z).
pub const SKYBOX_FACES: [&str; 6] =
    ["right", "left", "top", "bottom", "front", "back"];

/// Errors raised while decoding an image file.
#[derive(Debug)]
pub enum TextureError {
    /// The file could not be opened or decoded.
    Decode {
        /// Offending file.
        path: PathBuf,
        /// Decoder error.
        source: image::ImageError,
    },
    /// The image decoded, but its channel count is not 1, 3 or 4.
    UnsupportedChannelCount {
        /// Offending file.
        path: PathBuf,
        /// Channel count reported by the decoder.
        channels: u8,
    },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode { path, source } => {
                write!(f, "failed to decode {}: {source}", path.display())
            }
            Self::UnsupportedChannelCount { path, channels } => write!(
                f,
                "{} has {channels} channels (expected 1, 3 or 4)",
                path.display()
            ),
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode { source, .. } => Some(source),
            Self::UnsupportedChannelCount { .. } => None,
        }
    }
}

/// A decoded image expanded to RGBA8, plus the layout it was stored in.
pub struct DecodedImage {
    /// Pixels expanded to RGBA8.
    pub pixels: RgbaImage,
    /// Channel count of the source file (1, 3 or 4).
    pub channels: u8,
}

impl DecodedImage {
    /// Address mode matching the source layout: images with alpha clamp so
    /// transparent borders do not bleed, everything else repeats.
    pub fn address_mode(&self) -> wgpu::AddressMode {
        if self.channels == 4 {
            wgpu::AddressMode::ClampToEdge
        } else {
            wgpu::AddressMode::Repeat
        }
    }
}

/// Decode an image file and check its channel layout.
///
/// # Errors
///
/// [`TextureError::Decode`] if the file cannot be read or decoded, and
/// [`TextureError::UnsupportedChannelCount`] for layouts other than 1, 3
/// or 4 channels.
pub fn decode_image(
    path: &Path,
    flip_vertical: bool,
) -> Result<DecodedImage, TextureError> {
    let image = image::open(path).map_err(|source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let channels = image.color().channel_count();
    if !matches!(channels, 1 | 3 | 4) {
        return Err(TextureError::UnsupportedChannelCount {
            path: path.to_path_buf(),
            channels,
        });
    }

    let image = if flip_vertical { image.flipv() } else { image };
    Ok(DecodedImage {
        pixels: image.to_rgba8(),
        channels,
    })
}

/// Number of mip levels for a full chain down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Box-filtered mip chain, level 0 first.
pub fn mip_chain(base: &RgbaImage) -> Vec<RgbaImage> {
    let levels = mip_level_count(base.width(), base.height());
    let mut chain = Vec::with_capacity(levels as usize);
    chain.push(base.clone());
    for _ in 1..levels {
        let Some(prev) = chain.last() else { break };
        let w = (prev.width() / 2).max(1);
        let h = (prev.height() / 2).max(1);
        let next = image::imageops::resize(prev, w, h, FilterType::Triangle);
        chain.push(next);
    }
    chain
}

/// How a texture's texels are read back in the shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    /// Authored color, stored sRGB and decoded to linear on sample.
    Color,
    /// Linear values such as specular intensity, sampled as stored.
    Data,
}

impl TextureKind {
    /// Upload format for RGBA8 texels of this kind.
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            Self::Color => wgpu::TextureFormat::Rgba8UnormSrgb,
            Self::Data => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// A sampled 2D texture with a full mip chain.
pub struct Texture {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
    /// Address mode the texture should be sampled with.
    pub address_mode: wgpu::AddressMode,
}

impl Texture {
    /// Upload an RGBA8 image and its generated mips.
    pub fn from_image(
        context: &RenderContext,
        label: &str,
        image: &DecodedImage,
        kind: TextureKind,
    ) -> Self {
        let chain = mip_chain(&image.pixels);
        let texture = context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.pixels.width(),
                height: image.pixels.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: chain.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: kind.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for (level, mip) in chain.iter().enumerate() {
            write_rgba(context, &texture, mip, level as u32, 0);
        }
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            address_mode: image.address_mode(),
        }
    }

    /// 1x1 texture of a single value.
    pub fn solid(
        context: &RenderContext,
        label: &str,
        kind: TextureKind,
        rgba: [u8; 4],
    ) -> Self {
        let image = DecodedImage {
            pixels: RgbaImage::from_pixel(1, 1, image::Rgba(rgba)),
            channels: 4,
        };
        let mut texture = Self::from_image(context, label, &image, kind);
        texture.address_mode = wgpu::AddressMode::Repeat;
        texture
    }

    /// Decode and upload an image file.
    ///
    /// # Errors
    ///
    /// Propagates [`decode_image`] failures.
    pub fn load(
        context: &RenderContext,
        path: &Path,
        kind: TextureKind,
    ) -> Result<Self, TextureError> {
        let image = decode_image(path, false)?;
        log::debug!(
            "loaded texture {} ({}x{}, {} channels)",
            path.display(),
            image.pixels.width(),
            image.pixels.height(),
            image.channels
        );
        Ok(Self::from_image(
            context,
            &path.display().to_string(),
            &image,
            kind,
        ))
    }

    /// Like [`Texture::load`], but falls back to a solid `fallback` texture
    /// and logs a warning on failure.
    pub fn load_or_placeholder(
        context: &RenderContext,
        path: &Path,
        kind: TextureKind,
        fallback: [u8; 4],
    ) -> Self {
        Self::load(context, path, kind).unwrap_or_else(|e| {
            log::warn!("{e}; using placeholder texture");
            Self::solid(context, "Placeholder Texture", kind, fallback)
        })
    }
}

/// Six-face cube texture for the skybox.
pub struct Cubemap {
    /// The underlying 6-layer GPU texture.
    pub texture: wgpu::Texture,
    /// Cube-dimension view over all six layers.
    pub view: wgpu::TextureView,
}

/// Placeholder color for faces that fail to load.
const MISSING_FACE: [u8; 4] = [40, 48, 72, 255];

impl Cubemap {
    /// Load `<dir>/<face>.<extension>` for each of [`SKYBOX_FACES`].
    ///
    /// Faces that fail to decode, or whose size differs from the first
    /// decoded face, are logged and replaced with a solid color.
    pub fn load(
        context: &RenderContext,
        dir: &Path,
        extension: &str,
        flip_vertical: bool,
    ) -> Self {
        let faces: Vec<Option<RgbaImage>> = SKYBOX_FACES
            .iter()
            .map(|face| {
                let path = dir.join(format!("{face}.{extension}"));
                match decode_image(&path, flip_vertical) {
                    Ok(image) => Some(image.pixels),
                    Err(e) => {
                        log::warn!("{e}; skybox face '{face}' left blank");
                        None
                    }
                }
            })
            .collect();

        let (width, height) = faces
            .iter()
            .flatten()
            .next()
            .map_or((1, 1), |img| (img.width(), img.height()));
        let size = width.max(height);

        let texture = context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Skybox Cubemap"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let faces = faces.iter().zip(SKYBOX_FACES);
        for (layer, (face, name)) in faces.enumerate() {
            let placeholder;
            let pixels = match face {
                Some(img) if img.width() == size && img.height() == size => {
                    img
                }
                other => {
                    if other.is_some() {
                        log::warn!(
                            "skybox face '{name}' is not {size}x{size}; \
                             left blank"
                        );
                    }
                    placeholder = RgbaImage::from_pixel(
                        size,
                        size,
                        image::Rgba(MISSING_FACE),
                    );
                    &placeholder
                }
            };
            write_rgba(context, &texture, pixels, 0, layer as u32);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Skybox Cubemap View"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        Self { texture, view }
    }
}

fn write_rgba(
    context: &RenderContext,
    texture: &wgpu::Texture,
    image: &RgbaImage,
    mip_level: u32,
    layer: u32,
) {
    context.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level,
            origin: wgpu::Origin3d { x: 0, y: 0, z: layer },
            aspect: wgpu::TextureAspect::All,
        },
        image.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width()),
            rows_per_image: Some(image.height()),
        },
        wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, GrayImage, LumaA};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("isle-bloom-{}-{name}", std::process::id()))
    }

    #[test]
    fn two_channel_images_are_rejected() {
        let path = temp_path("gray-alpha.png");
        GrayAlphaImage::from_pixel(4, 4, LumaA([200, 255]))
            .save(&path)
            .unwrap();

        let result = decode_image(&path, false);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(
            result,
            Err(TextureError::UnsupportedChannelCount { channels: 2, .. })
        ));
    }

    #[test]
    fn single_channel_images_expand_to_gray_rgba() {
        let path = temp_path("gray.png");
        GrayImage::from_pixel(2, 2, image::Luma([90])).save(&path).unwrap();

        let decoded = decode_image(&path, false).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.pixels.get_pixel(1, 1).0, [90, 90, 90, 255]);
        assert_eq!(decoded.address_mode(), wgpu::AddressMode::Repeat);
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let result = decode_image(&temp_path("does-not-exist.png"), false);
        assert!(matches!(result, Err(TextureError::Decode { .. })));
    }

    #[test]
    fn flip_swaps_rows() {
        let path = temp_path("flip.png");
        let mut img = RgbaImage::new(1, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        img.save(&path).unwrap();

        let flipped = decode_image(&path, true).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(flipped.pixels.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(flipped.address_mode(), wgpu::AddressMode::ClampToEdge);
    }

    #[test]
    fn only_color_textures_decode_srgb() {
        assert!(TextureKind::Color.format().is_srgb());
        assert!(!TextureKind::Data.format().is_srgb());
        assert_eq!(
            TextureKind::Data.format(),
            wgpu::TextureFormat::Rgba8Unorm
        );
    }

    #[test]
    fn mip_chain_ends_at_one_pixel() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(256, 64), 9);

        let chain = mip_chain(&RgbaImage::new(8, 2));
        let sizes: Vec<(u32, u32)> =
            chain.iter().map(|m| (m.width(), m.height())).collect();
        assert_eq!(sizes, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
    }
}
