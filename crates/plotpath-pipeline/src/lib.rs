//! plotpath-pipeline: Pure image-to-stroke pipeline (sans-IO).
//!
//! Converts raster images into pen strokes through:
//! decode -> resize -> luminance -> Sobel edge mask -> greedy stroke tracing.
//!
//! This crate has **no filesystem access** -- it operates on in-memory
//! byte slices and grids and returns structured data. Writing G-code and
//! previews lives in `plotpath-export`; reading files lives in the
//! `plotpath` binary.

pub mod edge;
pub mod grayscale;
pub mod trace;
pub mod types;

pub use types::{
    Dimensions, EdgeMask, GrayImage, GridPoint, PipelineConfig, PipelineError, ProcessResult,
    RunSummary, StagedResult, Stroke,
};

/// Run the full pipeline on encoded image bytes.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP) and a configuration,
/// then produces the traced strokes together with the grid dimensions
/// the toolpath emitter needs for scaling.
///
/// An image without edges is not an error: the result simply has no
/// strokes.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails validation.
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
/// Returns [`PipelineError::InputShape`] if the decoded image is empty.
pub fn process(image_bytes: &[u8], config: &PipelineConfig) -> Result<ProcessResult, PipelineError> {
    process_staged(image_bytes, config).map(StagedResult::into_result)
}

/// Like [`process`], but keeps the brightness grid and edge mask.
///
/// # Errors
///
/// Same as [`process`].
pub fn process_staged(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<StagedResult, PipelineError> {
    config.validate()?;
    let grid = grayscale::decode_to_grid(image_bytes, config.working_size)?;
    process_grid_staged(grid, config)
}

/// Run edge detection and tracing on an existing brightness grid.
///
/// `config.working_size` is ignored; the grid is used as-is.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails validation.
/// Returns [`PipelineError::InputShape`] if `grid` has a zero-sized axis.
pub fn process_grid(grid: GrayImage, config: &PipelineConfig) -> Result<ProcessResult, PipelineError> {
    config.validate()?;
    process_grid_staged(grid, config).map(StagedResult::into_result)
}

fn process_grid_staged(
    grid: GrayImage,
    config: &PipelineConfig,
) -> Result<StagedResult, PipelineError> {
    let mask = edge::detect_edges(&grid, config.threshold)?;
    let strokes = trace::trace_strokes(&mask, config.neighbor_search_radius);
    let summary = RunSummary::new(&mask, &strokes);
    log::info!(
        "{}x{} grid: {} edge cells, {} strokes (longest {}, {} single-point)",
        grid.width(),
        grid.height(),
        summary.edge_pixel_count,
        summary.stroke_count,
        summary.longest_stroke,
        summary.single_point_strokes,
    );
    Ok(StagedResult {
        grid,
        mask,
        strokes,
        summary,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Create a minimal PNG with a sharp black/white boundary for testing.
    fn sharp_edge_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_fn(width, height, |x, _y| {
            if x < width / 2 {
                image::Rgba([0, 0, 0, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        });
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    fn diagonal_grid() -> GrayImage {
        GrayImage::from_fn(5, 5, |x, y| image::Luma([if x == y { 255 } else { 0 }]))
    }

    #[test]
    fn process_empty_input() {
        let result = process(&[], &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn process_corrupt_input() {
        let result = process(&[0xFF, 0x00], &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn process_rejects_invalid_config_before_decoding() {
        let config = PipelineConfig {
            neighbor_search_radius: 0,
            ..PipelineConfig::default()
        };
        let result = process(&[], &config);
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn process_black_image_has_no_strokes() {
        let img = image::RgbaImage::from_pixel(20, 20, image::Rgba([0, 0, 0, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();

        let result = process(&buf, &PipelineConfig::default()).unwrap();
        assert!(result.strokes.is_empty());
        assert_eq!(result.summary, RunSummary::default());
    }

    #[test]
    fn process_sharp_edge_produces_strokes() {
        let png = sharp_edge_png(40, 40);
        let config = PipelineConfig {
            working_size: None,
            ..PipelineConfig::default()
        };
        let result = process(&png, &config).unwrap();
        assert!(!result.strokes.is_empty());
        assert_eq!(result.dimensions, Dimensions::new(40, 40));
        let total: usize = result.strokes.iter().map(Stroke::len).sum();
        assert_eq!(total, result.summary.edge_pixel_count);
    }

    #[test]
    fn process_resizes_to_working_size() {
        let png = sharp_edge_png(40, 20);
        let config = PipelineConfig {
            working_size: Some(Dimensions::new(30, 30)),
            ..PipelineConfig::default()
        };
        let staged = process_staged(&png, &config).unwrap();
        assert_eq!(staged.dimensions(), Dimensions::new(30, 30));
        assert_eq!(staged.grid.dimensions(), (30, 30));
    }

    #[test]
    fn diagonal_grid_links_into_one_stroke() {
        let config = PipelineConfig {
            threshold: 500,
            ..PipelineConfig::default()
        };
        let result = process_grid(diagonal_grid(), &config).unwrap();
        assert_eq!(result.strokes.len(), 1);
        assert_eq!(result.strokes[0].len(), 8);
        assert_eq!(result.strokes[0].first(), Some(&GridPoint::new(1, 0)));
    }

    #[test]
    fn process_grid_rejects_empty_grid() {
        let result = process_grid(GrayImage::new(0, 0), &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::InputShape(_))));
    }

    #[test]
    fn process_is_deterministic() {
        let png = sharp_edge_png(32, 24);
        let config = PipelineConfig::coarse();
        let a = process(&png, &config).unwrap();
        let b = process(&png, &config).unwrap();
        assert_eq!(a, b);
    }
}
