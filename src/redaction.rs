//! # Redaction Module
//!
//! Blurs a fixed set of rectangles on an uploaded photo before it is
//! previewed and posted.
//!
//! Each rectangle is handled independently: the region is cropped, blurred
//! and pasted back at the same position. Rectangles are clipped to the
//! image bounds, so a mask designed for large screenshots can be applied
//! to a smaller image without failing. A rectangle lying completely
//! outside the image is skipped.

use image::codecs::jpeg::JpegEncoder;
use image::{imageops, ColorType, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::RedactionError;

pub const DEFAULT_BLUR_SIGMA: f32 = 6.0;
pub const JPEG_QUALITY: u8 = 90;

/// Axis-aligned rectangle in source-image pixel coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Part of the rectangle inside a `width` x `height` image, if any
    pub fn clip(&self, width: u32, height: u32) -> Option<Rect> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let clipped = Rect {
            x: self.x,
            y: self.y,
            width: self.width.min(width - self.x),
            height: self.height.min(height - self.y),
        };
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
    }
}

/// Fixed list of regions blurred on every processed image
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RedactionMask {
    pub rects: Vec<Rect>,
    #[serde(default = "default_blur_sigma")]
    pub blur_sigma: f32,
}

fn default_blur_sigma() -> f32 {
    DEFAULT_BLUR_SIGMA
}

impl Default for RedactionMask {
    fn default() -> Self {
        Self {
            rects: vec![
                Rect::new(19, 326, 155, 24),
                Rect::new(248, 326, 89, 24),
                Rect::new(148, 36, 103, 24),
            ],
            blur_sigma: DEFAULT_BLUR_SIGMA,
        }
    }
}

/// Blur every mask rectangle of `image` in place
pub fn redact_image(image: &mut RgbImage, mask: &RedactionMask) {
    let (width, height) = image.dimensions();

    for rect in &mask.rects {
        let Some(area) = rect.clip(width, height) else {
            debug!(?rect, width, height, "Mask rectangle outside image, skipping");
            continue;
        };

        let region = imageops::crop_imm(&*image, area.x, area.y, area.width, area.height).to_image();
        let blurred = imageops::blur(&region, mask.blur_sigma);
        imageops::replace(image, &blurred, i64::from(area.x), i64::from(area.y));
    }
}

/// Decode `bytes`, apply the mask and re-encode the result as JPEG
pub fn redact(bytes: &[u8], mask: &RedactionMask) -> Result<Vec<u8>, RedactionError> {
    let mut image = image::load_from_memory(bytes)
        .map_err(|e| RedactionError::Decode(e.to_string()))?
        .to_rgb8();

    redact_image(&mut image, mask);

    let mut output = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY);
    encoder
        .encode(image.as_raw(), image.width(), image.height(), ColorType::Rgb8)
        .map_err(|e| RedactionError::Encode(e.to_string()))?;

    debug!(
        input_bytes = bytes.len(),
        output_bytes = output.len(),
        "Image redacted"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_inside() {
        let rect = Rect::new(10, 10, 20, 20);
        assert_eq!(rect.clip(100, 100), Some(rect));
    }

    #[test]
    fn test_clip_partially_outside() {
        let rect = Rect::new(90, 95, 20, 20);
        assert_eq!(rect.clip(100, 100), Some(Rect::new(90, 95, 10, 5)));
    }

    #[test]
    fn test_clip_fully_outside() {
        assert_eq!(Rect::new(100, 0, 5, 5).clip(100, 100), None);
        assert_eq!(Rect::new(0, 120, 5, 5).clip(100, 100), None);
        assert_eq!(Rect::new(0, 0, 0, 5).clip(100, 100), None);
    }

    #[test]
    fn test_default_mask() {
        let mask = RedactionMask::default();
        assert_eq!(mask.rects.len(), 3);
        assert_eq!(mask.rects[0], Rect::new(19, 326, 155, 24));
        assert_eq!(mask.blur_sigma, 6.0);
    }
}
