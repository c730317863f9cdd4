//! Shared types for the plotpath pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference the
/// brightness grid without depending on `image` directly.
pub use image::GrayImage;

/// A cell coordinate in the brightness grid.
///
/// Origin is the top-left cell; `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    /// Column (cells from the left edge).
    pub x: u32,
    /// Row (cells from the top edge).
    pub y: u32,
}

impl GridPoint {
    /// Create a new grid point.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (chessboard) distance to another point.
    ///
    /// This is the metric of the tracer's square search window: a
    /// neighbor found with radius `r` is at most `r` away.
    #[must_use]
    pub const fn chebyshev_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }
}

/// One continuous pen-down path: an ordered, non-empty sequence of cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stroke(Vec<GridPoint>);

impl Stroke {
    /// Create a stroke from its points in drawing order.
    #[must_use]
    pub const fn new(points: Vec<GridPoint>) -> Self {
        Self(points)
    }

    /// Returns `true` if the stroke has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of points in the stroke.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// The point where the pen goes down.
    #[must_use]
    pub fn first(&self) -> Option<&GridPoint> {
        self.0.first()
    }

    /// The point where the pen lifts.
    #[must_use]
    pub fn last(&self) -> Option<&GridPoint> {
        self.0.last()
    }

    /// All points in drawing order.
    #[must_use]
    pub fn points(&self) -> &[GridPoint] {
        &self.0
    }

    /// Consumes the stroke and returns its points.
    #[must_use]
    pub fn into_points(self) -> Vec<GridPoint> {
        self.0
    }
}

/// Grid dimensions in cells (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either axis is zero.
    #[must_use]
    pub const fn is_degenerate(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if `point` lies inside the grid.
    #[must_use]
    pub const fn contains(self, point: GridPoint) -> bool {
        point.x < self.width && point.y < self.height
    }

    /// Total number of cells.
    #[must_use]
    pub const fn cell_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Binary edge classification of a brightness grid.
///
/// Same dimensions as the grid it was derived from; immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMask {
    dimensions: Dimensions,
    cells: Vec<bool>,
}

impl EdgeMask {
    /// Build a mask from row-major cells.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InputShape`] if either dimension is zero
    /// or `cells.len()` does not equal `width * height`.
    pub fn from_cells(dimensions: Dimensions, cells: Vec<bool>) -> Result<Self, PipelineError> {
        if dimensions.is_degenerate() {
            return Err(PipelineError::InputShape(format!(
                "edge mask must be non-empty, got {}x{}",
                dimensions.width, dimensions.height,
            )));
        }
        if cells.len() != dimensions.cell_count() {
            return Err(PipelineError::InputShape(format!(
                "edge mask {}x{} needs {} cells, got {}",
                dimensions.width,
                dimensions.height,
                dimensions.cell_count(),
                cells.len(),
            )));
        }
        Ok(Self { dimensions, cells })
    }

    /// Build a mask by evaluating `f` at every cell.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InputShape`] if either dimension is zero.
    pub fn from_fn(
        dimensions: Dimensions,
        mut f: impl FnMut(u32, u32) -> bool,
    ) -> Result<Self, PipelineError> {
        let mut cells = Vec::with_capacity(dimensions.cell_count());
        for y in 0..dimensions.height {
            for x in 0..dimensions.width {
                cells.push(f(x, y));
            }
        }
        Self::from_cells(dimensions, cells)
    }

    /// Mask dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Mask width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.dimensions.width
    }

    /// Mask height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.dimensions.height
    }

    /// Whether the cell at `(x, y)` is an edge. Out-of-range is `false`.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.index(x, y).is_some_and(|i| self.cells[i])
    }

    /// Row-major index of `(x, y)`, or `None` outside the mask.
    #[must_use]
    pub fn index(&self, x: u32, y: u32) -> Option<usize> {
        self.dimensions
            .contains(GridPoint::new(x, y))
            .then(|| y as usize * self.dimensions.width as usize + x as usize)
    }

    /// Number of edge cells.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Returns `true` if no cell is an edge.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }

    /// Edge cells in raster order.
    pub fn edge_points(&self) -> impl Iterator<Item = GridPoint> + '_ {
        let width = self.dimensions.width as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c)
            .filter_map(move |(i, _)| {
                let x = u32::try_from(i % width).ok()?;
                let y = u32::try_from(i / width).ok()?;
                Some(GridPoint::new(x, y))
            })
    }

    /// Render as a binary image: 255 for edges, 0 for background.
    #[must_use]
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width(), self.height(), |x, y| {
            image::Luma([if self.get(x, y) { 255 } else { 0 }])
        })
    }

    /// One string of `1`/`0` characters per row.
    #[must_use]
    pub fn to_text_rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.dimensions.width as usize)
            .map(|row| row.iter().map(|&c| if c { '1' } else { '0' }).collect())
            .collect()
    }
}

/// Configuration for the image-to-stroke pipeline.
///
/// The two presets, [`fine`](Self::fine) and [`coarse`](Self::coarse),
/// trade resolution for gap tolerance. [`Default`] is the fine preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Gradient magnitude cutoff. A cell is an edge iff its Sobel
    /// magnitude is strictly greater than this. Higher values yield
    /// fewer edges.
    pub threshold: u32,

    /// Half-width of the square window the tracer searches for the next
    /// stroke point. Larger values bridge wider gaps between edge cells
    /// at the cost of possibly merging unrelated edges. Must be at least 1.
    pub neighbor_search_radius: u32,

    /// Resize the decoded image to this size before luminance extraction.
    /// Aspect ratio is not preserved. `None` keeps the native size.
    pub working_size: Option<Dimensions>,
}

impl PipelineConfig {
    /// Default gradient threshold.
    pub const DEFAULT_THRESHOLD: u32 = 100;
    /// Default neighbor search radius.
    pub const DEFAULT_NEIGHBOR_SEARCH_RADIUS: u32 = 1;
    /// Default working resolution (both axes).
    pub const DEFAULT_WORKING_RESOLUTION: u32 = 300;

    /// High-resolution preset: 300×300, radius 1, threshold 100.
    #[must_use]
    pub const fn fine() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            neighbor_search_radius: Self::DEFAULT_NEIGHBOR_SEARCH_RADIUS,
            working_size: Some(Dimensions::new(
                Self::DEFAULT_WORKING_RESOLUTION,
                Self::DEFAULT_WORKING_RESOLUTION,
            )),
        }
    }

    /// Low-resolution preset: 180×180, radius 2, threshold 128.
    #[must_use]
    pub const fn coarse() -> Self {
        Self {
            threshold: 128,
            neighbor_search_radius: 2,
            working_size: Some(Dimensions::new(180, 180)),
        }
    }

    /// Check invariants that the pipeline relies on.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the search radius is
    /// zero or the working size has a zero axis.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.neighbor_search_radius == 0 {
            return Err(PipelineError::InvalidConfig(
                "neighbor_search_radius must be at least 1".to_string(),
            ));
        }
        if let Some(size) = self.working_size
            && size.is_degenerate()
        {
            return Err(PipelineError::InvalidConfig(format!(
                "working_size must be non-empty, got {}x{}",
                size.width, size.height,
            )));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::fine()
    }
}

/// Counts describing one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of `true` cells in the edge mask.
    pub edge_pixel_count: usize,
    /// Number of strokes produced by the tracer.
    pub stroke_count: usize,
    /// Point count of the longest stroke (0 when there are none).
    pub longest_stroke: usize,
    /// Strokes consisting of a single isolated point.
    pub single_point_strokes: usize,
}

impl RunSummary {
    /// Summarize a mask and the strokes traced from it.
    #[must_use]
    pub fn new(mask: &EdgeMask, strokes: &[Stroke]) -> Self {
        Self {
            edge_pixel_count: mask.edge_count(),
            stroke_count: strokes.len(),
            longest_stroke: strokes.iter().map(Stroke::len).max().unwrap_or(0),
            single_point_strokes: strokes.iter().filter(|s| s.len() == 1).count(),
        }
    }
}

/// Result of running the full pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Strokes in discovery order.
    pub strokes: Vec<Stroke>,

    /// Dimensions of the brightness grid the strokes live in.
    ///
    /// The toolpath emitter needs these to scale and flip coordinates.
    pub dimensions: Dimensions,

    /// Counts for reporting.
    pub summary: RunSummary,
}

/// Result of running the pipeline with every intermediate kept.
///
/// Used by callers that want to preview the brightness grid or edge mask
/// alongside the strokes.
#[derive(Debug, Clone)]
pub struct StagedResult {
    /// Luminance of each cell after any resize.
    pub grid: GrayImage,
    /// Thresholded Sobel magnitude.
    pub mask: EdgeMask,
    /// Strokes in discovery order.
    pub strokes: Vec<Stroke>,
    /// Counts for reporting.
    pub summary: RunSummary,
}

impl StagedResult {
    /// Dimensions shared by the grid, the mask, and the stroke space.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.mask.dimensions()
    }

    /// Drop the raster intermediates.
    #[must_use]
    pub fn into_result(self) -> ProcessResult {
        ProcessResult {
            dimensions: self.mask.dimensions(),
            strokes: self.strokes,
            summary: self.summary,
        }
    }
}

/// Errors that can occur during pipeline processing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// A grid or mask has zero size or mismatched dimensions.
    #[error("invalid input shape: {0}")]
    InputShape(String),

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}
