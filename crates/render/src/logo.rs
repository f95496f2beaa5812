use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::document::RenderWarning;

/// Longest edge kept for the embedded logo; larger images are downscaled.
const MAX_EDGE: u32 = 600;

/// Decoded logo, split into 8-bit RGB samples and an optional alpha mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logo {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
    pub alpha: Option<Vec<u8>>,
}

impl Logo {
    /// Load a PNG logo. A missing, unreadable or non-PNG file is reported as the
    /// warning the renderer attaches to the document.
    pub fn load(path: &Path) -> Result<Self, RenderWarning> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => RenderWarning::LogoMissing {
                path: path.to_path_buf(),
            },
            _ => RenderWarning::LogoUnreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;

        if !matches!(image::guess_format(&bytes), Ok(ImageFormat::Png)) {
            return Err(RenderWarning::LogoNotPng {
                path: path.to_path_buf(),
            });
        }

        let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png).map_err(|e| {
            RenderWarning::LogoUnreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self::from_image(image))
    }

    pub fn from_image(image: DynamicImage) -> Self {
        let (w, h) = image.dimensions();
        let image = if w > MAX_EDGE || h > MAX_EDGE {
            image.thumbnail(MAX_EDGE, MAX_EDGE)
        } else {
            image
        };

        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = (width * height) as usize;
        let mut rgb = Vec::with_capacity(pixels * 3);
        let mut alpha = Vec::with_capacity(pixels);
        for px in rgba.pixels() {
            let [r, g, b, a] = px.0;
            rgb.extend_from_slice(&[r, g, b]);
            alpha.push(a);
        }
        let opaque = alpha.iter().all(|&a| a == u8::MAX);

        Self {
            width,
            height,
            rgb,
            alpha: (!opaque).then_some(alpha),
        }
    }

    /// Size `(w, h)` in points of the logo fitted into an `extent` square.
    pub fn fit(&self, extent: f32) -> (f32, f32) {
        let aspect = self.width as f32 / self.height.max(1) as f32;
        if aspect >= 1.0 {
            (extent, extent / aspect)
        } else {
            (extent * aspect, extent)
        }
    }
}
