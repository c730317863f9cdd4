//! Stroke tracing: link edge cells into continuous pen strokes.
//!
//! A greedy walk, not a connected-components pass. Start cells are found
//! by raster scan (top-to-bottom, left-to-right). From each start the
//! walker repeatedly steps to the *first* unvisited edge cell in a square
//! window of half-width `radius`, scanned row by row. When the window is
//! empty the stroke ends and the raster scan resumes.
//!
//! There is no backtracking and no distance weighting. At a branch point
//! the first branch in scan order is followed and the other one is
//! picked up later as a new stroke, so one visual contour may come out
//! as several strokes. Output is fully determined by the mask and the
//! radius.
//!
//! Cost is linear in the number of edge cells times the window area.

use crate::types::{EdgeMask, GridPoint, Stroke};

/// Cells already consumed by some stroke.
///
/// Scratch state owned by a single [`trace_strokes`] call.
struct Visited {
    width: usize,
    cells: Vec<bool>,
}

impl Visited {
    fn new(mask: &EdgeMask) -> Self {
        Self {
            width: mask.width() as usize,
            cells: vec![false; mask.dimensions().cell_count()],
        }
    }

    const fn index(&self, p: GridPoint) -> usize {
        p.y as usize * self.width + p.x as usize
    }

    fn contains(&self, p: GridPoint) -> bool {
        self.cells[self.index(p)]
    }

    fn insert(&mut self, p: GridPoint) {
        let i = self.index(p);
        debug_assert!(!self.cells[i], "cell ({}, {}) visited twice", p.x, p.y);
        self.cells[i] = true;
    }
}

/// Trace every edge cell of `mask` into strokes.
///
/// Each `true` cell appears in exactly one stroke and consecutive points
/// of a stroke are at most `radius` apart (Chebyshev distance). Strokes
/// are returned in discovery order. A blank mask yields no strokes; an
/// isolated cell yields a one-point stroke.
///
/// A `radius` of zero never finds a neighbor, so every edge cell becomes
/// its own stroke.
#[must_use = "returns the traced strokes"]
pub fn trace_strokes(mask: &EdgeMask, radius: u32) -> Vec<Stroke> {
    let mut visited = Visited::new(mask);
    let mut strokes = Vec::new();

    for start in mask.edge_points() {
        if visited.contains(start) {
            continue;
        }

        let mut points = vec![start];
        visited.insert(start);
        let mut current = start;
        while let Some(next) = next_neighbor(mask, &visited, current, radius) {
            visited.insert(next);
            points.push(next);
            current = next;
        }
        strokes.push(Stroke::new(points));
    }

    log::debug!(
        "traced {} strokes from {} edge cells (radius {radius})",
        strokes.len(),
        visited.cells.iter().filter(|&&v| v).count(),
    );
    strokes
}

/// First unvisited edge cell in the window around `from`.
///
/// Offsets are scanned row-major: `dy` from `-radius` to `radius`, and
/// within each row `dx` from `-radius` to `radius`, skipping `(0, 0)`.
/// Cells outside the mask are ignored.
fn next_neighbor(
    mask: &EdgeMask,
    visited: &Visited,
    from: GridPoint,
    radius: u32,
) -> Option<GridPoint> {
    let r = i64::from(radius);
    let (fx, fy) = (i64::from(from.x), i64::from(from.y));

    for dy in -r..=r {
        let Ok(ny) = u32::try_from(fy + dy) else {
            continue;
        };
        if ny >= mask.height() {
            continue;
        }
        for dx in -r..=r {
            if dx == 0 && dy == 0 {
                continue;
            }
            let Ok(nx) = u32::try_from(fx + dx) else {
                continue;
            };
            let candidate = GridPoint::new(nx, ny);
            if mask.get(nx, ny) && !visited.contains(candidate) {
                return Some(candidate);
            }
        }
    }
    None
}
