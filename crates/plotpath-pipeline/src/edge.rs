//! Sobel edge detection.
//!
//! Convolves the brightness grid with the classic 3×3 Sobel kernel pair
//! and thresholds the gradient magnitude into an [`EdgeMask`].
//!
//! Neighbors outside the grid are skipped rather than clamped or
//! reflected, so the border behaves as if padded with zeros. A bright
//! region touching the border therefore produces edges along it.

use crate::types::{Dimensions, EdgeMask, GrayImage, PipelineError};

type Kernel3 = [[i32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Gradient magnitude at `(x, y)`: `round(sqrt(gx² + gy²))`.
///
/// `(x, y)` must lie inside `grid`; neighbors outside contribute zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sobel_magnitude(grid: &GrayImage, x: u32, y: u32) -> u32 {
    let (width, height) = grid.dimensions();
    let mut gx: i32 = 0;
    let mut gy: i32 = 0;

    for (ky, (row_x, row_y)) in SOBEL_KERNEL_X.iter().zip(&SOBEL_KERNEL_Y).enumerate() {
        let Some(yy) = (y + ky as u32).checked_sub(1) else {
            continue;
        };
        if yy >= height {
            continue;
        }
        for (kx, (wx, wy)) in row_x.iter().zip(row_y).enumerate() {
            let Some(xx) = (x + kx as u32).checked_sub(1) else {
                continue;
            };
            if xx >= width {
                continue;
            }
            let value = i32::from(grid.get_pixel(xx, yy).0[0]);
            gx += wx * value;
            gy += wy * value;
        }
    }

    // |gx|, |gy| <= 4 * 255, so the sum of squares is exact in f64 and
    // the rounded root fits comfortably in u32.
    f64::from(gx * gx + gy * gy).sqrt().round() as u32
}

/// Gradient magnitude of every cell, row-major.
#[must_use = "returns the magnitude buffer"]
pub fn gradient_magnitudes(grid: &GrayImage) -> Vec<u32> {
    let (width, height) = grid.dimensions();
    let mut out = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            out.push(sobel_magnitude(grid, x, y));
        }
    }
    out
}

/// Classify every cell as edge (`magnitude > threshold`) or background.
///
/// # Errors
///
/// Returns [`PipelineError::InputShape`] if the grid has a zero-sized axis.
pub fn detect_edges(grid: &GrayImage, threshold: u32) -> Result<EdgeMask, PipelineError> {
    let dimensions = Dimensions::new(grid.width(), grid.height());
    if dimensions.is_degenerate() {
        return Err(PipelineError::InputShape(format!(
            "brightness grid must be non-empty, got {}x{}",
            dimensions.width, dimensions.height,
        )));
    }

    let cells = gradient_magnitudes(grid)
        .into_iter()
        .map(|m| m > threshold)
        .collect();
    let mask = EdgeMask::from_cells(dimensions, cells)?;
    log::debug!(
        "edge detection: threshold={threshold} edges={}/{}",
        mask.edge_count(),
        dimensions.cell_count(),
    );
    Ok(mask)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// 5×5 grid, 255 on the main diagonal, 0 elsewhere.
    fn diagonal_grid() -> GrayImage {
        GrayImage::from_fn(5, 5, |x, y| image::Luma([if x == y { 255 } else { 0 }]))
    }

    /// 20×20 grid with a sharp vertical boundary at x = 10.
    fn sharp_edge_grid() -> GrayImage {
        GrayImage::from_fn(20, 20, |x, _| image::Luma([if x < 10 { 0 } else { 255 }]))
    }

    #[test]
    fn black_grid_has_no_edges() {
        let grid = GrayImage::new(8, 6);
        let mask = detect_edges(&grid, 0).unwrap();
        assert!(mask.is_blank());
        assert_eq!(mask.dimensions(), Dimensions::new(8, 6));
    }

    #[test]
    fn zero_sized_grid_is_rejected() {
        let grid = GrayImage::new(0, 3);
        assert!(matches!(
            detect_edges(&grid, 10),
            Err(PipelineError::InputShape(_))
        ));
    }

    #[test]
    fn interior_of_uniform_grid_is_flat() {
        let grid = GrayImage::from_pixel(4, 4, image::Luma([128]));
        assert_eq!(sobel_magnitude(&grid, 1, 1), 0);
        assert_eq!(sobel_magnitude(&grid, 2, 2), 0);
    }

    #[test]
    fn border_is_zero_padded() {
        // A uniform grid still has gradient along its border because the
        // missing neighbors count as zero.
        let grid = GrayImage::from_pixel(4, 4, image::Luma([128]));
        // Edge midpoint: gx = 0, gy = 128 + 2*128 + 128 = 512.
        assert_eq!(sobel_magnitude(&grid, 1, 0), 512);
        // Corner: gx = gy = 2*128 + 128 = 384, |g| = 543.05...
        assert_eq!(sobel_magnitude(&grid, 0, 0), 543);
    }

    #[test]
    fn diagonal_magnitudes_are_rounded() {
        let grid = diagonal_grid();
        let expected: [[u32; 5]; 5] = [
            [361, 721, 361, 0, 0],
            [721, 0, 721, 361, 0],
            [361, 721, 0, 721, 361],
            [0, 361, 721, 0, 721],
            [0, 0, 361, 721, 361],
        ];
        let mags = gradient_magnitudes(&grid);
        for (y, row) in expected.iter().enumerate() {
            for (x, &m) in row.iter().enumerate() {
                assert_eq!(mags[y * 5 + x], m, "magnitude at ({x}, {y})");
            }
        }
    }

    #[test]
    fn threshold_is_strict() {
        let grid = diagonal_grid();
        // 721 is the largest magnitude; equality is not an edge.
        assert!(detect_edges(&grid, 721).unwrap().is_blank());
        assert_eq!(detect_edges(&grid, 720).unwrap().edge_count(), 8);
    }

    #[test]
    fn diagonal_edges_flank_the_line() {
        let mask = detect_edges(&diagonal_grid(), 500).unwrap();
        assert_eq!(
            mask.to_text_rows(),
            vec!["01000", "10100", "01010", "00101", "00010"],
        );
    }

    #[test]
    fn sharp_boundary_detected_next_to_step() {
        let mask = detect_edges(&sharp_edge_grid(), 100).unwrap();
        for y in 1..19 {
            assert!(mask.get(9, y), "expected edge at (9, {y})");
            assert!(mask.get(10, y), "expected edge at (10, {y})");
            assert!(!mask.get(5, y), "unexpected edge at (5, {y})");
        }
    }

    #[test]
    fn raising_threshold_never_adds_edges() {
        let grid = GrayImage::from_fn(12, 9, |x, y| image::Luma([((x * 37 + y * 91) % 256) as u8]));
        let mags = gradient_magnitudes(&grid);
        let max = mags.iter().copied().max().unwrap();
        let mut previous = usize::MAX;
        for threshold in (0..=max + 1).step_by(7) {
            let count = detect_edges(&grid, threshold).unwrap().edge_count();
            assert!(
                count <= previous,
                "threshold {threshold} produced {count} edges, more than {previous}",
            );
            previous = count;
        }
    }
}
