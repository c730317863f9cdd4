//! Image decoding and luminance extraction.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP), optionally resizes to
//! a fixed working resolution, and produces the brightness grid the edge
//! detector consumes.
//!
//! This is the first step in the pipeline: raw bytes in, `GrayImage` out.

use image::DynamicImage;
use image::imageops::FilterType;

use crate::types::{Dimensions, GrayImage, PipelineError};

/// Weighted luminance of an RGB sample: `0.299*R + 0.587*G + 0.114*B`,
/// truncated toward zero.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops
)]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    // Plain multiply-add, not fused: truncation must see the same
    // rounding as the usual left-to-right evaluation.
    let y = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    y as u8
}

/// Decode raw image bytes.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    Ok(image::load_from_memory(bytes)?)
}

/// Resize to exactly `size`, ignoring aspect ratio.
///
/// Returns the input unchanged when it already has that size.
#[must_use = "returns the resized image"]
pub fn resize(image: DynamicImage, size: Dimensions) -> DynamicImage {
    if image.width() == size.width && image.height() == size.height {
        return image;
    }
    image.resize_exact(size.width, size.height, FilterType::Triangle)
}

/// Apply [`luminance`] to every pixel, producing the brightness grid.
///
/// Alpha is ignored.
#[must_use = "returns the brightness grid"]
pub fn to_brightness_grid(image: &DynamicImage) -> GrayImage {
    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        image::Luma([luminance(r, g, b)])
    })
}

/// Decode, optionally resize, and extract luminance in one call.
///
/// # Errors
///
/// Propagates [`decode`] errors. Returns [`PipelineError::InputShape`]
/// if the decoded image has a zero-sized axis.
pub fn decode_to_grid(
    bytes: &[u8],
    working_size: Option<Dimensions>,
) -> Result<GrayImage, PipelineError> {
    let mut image = decode(bytes)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(PipelineError::InputShape(format!(
            "decoded image is {}x{}",
            image.width(),
            image.height(),
        )));
    }
    if let Some(size) = working_size {
        image = resize(image, size);
    }
    let grid = to_brightness_grid(&image);
    log::debug!("brightness grid {}x{}", grid.width(), grid.height());
    Ok(grid)
}
