//! G-code export serializer.
//!
//! Converts traced strokes into a minimal pen plotter program. The
//! program is produced lazily by [`program`] as a sequence of
//! [`GcodeCommand`]s, one per output line, so it can be streamed to any
//! [`std::io::Write`] without buffering.
//!
//! ## Program layout
//!
//! ```text
//! G21 ; Set units to mm
//! G90 ; Absolute positioning
//! G28 ; Home all axes          (only when `home` is set)
//! G0 Z5 ; Pen up
//! G0 X<x> Y<y> Z5              (per stroke: travel to first point)
//! G1 Z0 ; Pen down
//! G1 X<x> Y<y>                 (one per remaining point)
//! G1 Z5 ; Pen up
//! G0 X0 Y0 ; Return to origin
//! M30 ; End of program
//! ```
//!
//! ## Coordinate Convention
//!
//! Grid coordinates have their origin at the top-left with Y growing
//! downward. Plotters put the origin at the bottom-left, so Y is flipped:
//! `out_y = target_height - scaled_y`. Both axes are scaled to the target
//! coordinate space with round-half-up integer arithmetic.

use std::fmt;
use std::io::Write;
use std::iter;

use plotpath_pipeline::{Dimensions, GridPoint, Stroke};

use crate::ExportError;

/// Settings for the emitted program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcodeConfig {
    /// Output coordinate space. `None` uses the grid dimensions, i.e.
    /// one unit per grid cell.
    pub target_scale: Option<Dimensions>,
    /// Z height with the pen lifted.
    pub pen_up_z: i32,
    /// Z height with the pen on the paper.
    pub pen_down_z: i32,
    /// Emit `G28` in the preamble.
    pub home: bool,
}

impl GcodeConfig {
    /// Default lifted pen height.
    pub const DEFAULT_PEN_UP_Z: i32 = 5;
    /// Default lowered pen height.
    pub const DEFAULT_PEN_DOWN_Z: i32 = 0;
}

impl Default for GcodeConfig {
    fn default() -> Self {
        Self {
            target_scale: None,
            pen_up_z: Self::DEFAULT_PEN_UP_Z,
            pen_down_z: Self::DEFAULT_PEN_DOWN_Z,
            home: true,
        }
    }
}

/// One line of the emitted program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcodeCommand {
    /// `G21`: millimeter units.
    Units,
    /// `G90`: absolute positioning.
    AbsolutePositioning,
    /// `G28`: home all axes.
    Home,
    /// `G0 Z<z>`: lift the pen in place (preamble).
    LiftPen {
        /// Pen-up height.
        z: i32,
    },
    /// `G0 X<x> Y<y> Z<z>`: rapid travel to a stroke start, pen up.
    TravelTo {
        /// Target X.
        x: u32,
        /// Target Y.
        y: u32,
        /// Pen-up height.
        z: i32,
    },
    /// `G1 Z<z>`: lower the pen.
    PenDown {
        /// Pen-down height.
        z: i32,
    },
    /// `G1 X<x> Y<y>`: draw to a point.
    LineTo {
        /// Target X.
        x: u32,
        /// Target Y.
        y: u32,
    },
    /// `G1 Z<z>`: raise the pen at the end of a stroke.
    PenUp {
        /// Pen-up height.
        z: i32,
    },
    /// `G0 X0 Y0`: park at the origin.
    ReturnToOrigin,
    /// `M30`: end of program.
    ProgramEnd,
}

impl fmt::Display for GcodeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Units => f.write_str("G21 ; Set units to mm"),
            Self::AbsolutePositioning => f.write_str("G90 ; Absolute positioning"),
            Self::Home => f.write_str("G28 ; Home all axes"),
            Self::LiftPen { z } => write!(f, "G0 Z{z} ; Pen up"),
            Self::TravelTo { x, y, z } => write!(f, "G0 X{x} Y{y} Z{z}"),
            Self::PenDown { z } => write!(f, "G1 Z{z} ; Pen down"),
            Self::LineTo { x, y } => write!(f, "G1 X{x} Y{y}"),
            Self::PenUp { z } => write!(f, "G1 Z{z} ; Pen up"),
            Self::ReturnToOrigin => f.write_str("G0 X0 Y0 ; Return to origin"),
            Self::ProgramEnd => f.write_str("M30 ; End of program"),
        }
    }
}

/// Maps grid cells to output coordinates: scale, then flip Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateTransform {
    grid: Dimensions,
    target: Dimensions,
}

impl CoordinateTransform {
    /// Build a transform from `grid` cells to a `target` coordinate space.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InputShape`] if `grid` has a zero axis and
    /// [`ExportError::InvalidConfig`] if `target` does.
    pub fn new(grid: Dimensions, target: Dimensions) -> Result<Self, ExportError> {
        if grid.is_degenerate() {
            return Err(ExportError::InputShape(format!(
                "grid must be non-empty, got {}x{}",
                grid.width, grid.height,
            )));
        }
        if target.is_degenerate() {
            return Err(ExportError::InvalidConfig(format!(
                "target scale must be non-empty, got {}x{}",
                target.width, target.height,
            )));
        }
        Ok(Self { grid, target })
    }

    /// Output `(x, y)` for a grid cell.
    #[must_use]
    pub fn apply(self, p: GridPoint) -> (u32, u32) {
        let x = scale_axis(p.x, self.grid.width, self.target.width);
        let y = scale_axis(p.y, self.grid.height, self.target.height);
        (x, self.target.height.saturating_sub(y))
    }
}

/// `round(value * target / source)` with halves rounded up.
fn scale_axis(value: u32, source: u32, target: u32) -> u32 {
    let num = u64::from(value) * u64::from(target) * 2 + u64::from(source);
    let scaled = num / (u64::from(source) * 2);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Lazily produce the full program for `strokes`.
///
/// Empty strokes are skipped. Points are not bounds-checked here; use
/// [`write_gcode`] or [`to_gcode`] for validated output.
pub fn program<'a>(
    strokes: &'a [Stroke],
    transform: CoordinateTransform,
    config: &GcodeConfig,
) -> impl Iterator<Item = GcodeCommand> + use<'a> {
    let up = config.pen_up_z;
    let down = config.pen_down_z;

    let preamble = [GcodeCommand::Units, GcodeCommand::AbsolutePositioning]
        .into_iter()
        .chain(config.home.then_some(GcodeCommand::Home))
        .chain(iter::once(GcodeCommand::LiftPen { z: up }));

    let body = strokes.iter().flat_map(move |stroke| {
        stroke
            .points()
            .split_first()
            .into_iter()
            .flat_map(move |(first, rest)| {
                let (x, y) = transform.apply(*first);
                iter::once(GcodeCommand::TravelTo { x, y, z: up })
                    .chain(iter::once(GcodeCommand::PenDown { z: down }))
                    .chain(rest.iter().map(move |p| {
                        let (x, y) = transform.apply(*p);
                        GcodeCommand::LineTo { x, y }
                    }))
                    .chain(iter::once(GcodeCommand::PenUp { z: up }))
            })
    });

    let postamble = [GcodeCommand::ReturnToOrigin, GcodeCommand::ProgramEnd];

    preamble.chain(body).chain(postamble)
}

/// Check that every stroke point lies inside `dimensions`.
fn validate_strokes(strokes: &[Stroke], dimensions: Dimensions) -> Result<(), ExportError> {
    let outside = strokes
        .iter()
        .flat_map(Stroke::points)
        .find(|p| !dimensions.contains(**p));
    match outside {
        Some(p) => Err(ExportError::InputShape(format!(
            "stroke point ({}, {}) is outside the {}x{} grid",
            p.x, p.y, dimensions.width, dimensions.height,
        ))),
        None => Ok(()),
    }
}

/// Build the transform for `dimensions` and validate `strokes` against it.
fn prepare(
    strokes: &[Stroke],
    dimensions: Dimensions,
    config: &GcodeConfig,
) -> Result<CoordinateTransform, ExportError> {
    let transform =
        CoordinateTransform::new(dimensions, config.target_scale.unwrap_or(dimensions))?;
    validate_strokes(strokes, dimensions)?;
    Ok(transform)
}

/// Stream the program for `strokes` into `writer`, one command per line.
///
/// Shape problems are reported before anything is written. An I/O
/// failure aborts emission and may leave partial output behind.
///
/// Returns the number of lines written.
///
/// # Errors
///
/// Returns [`ExportError::InputShape`] if `dimensions` is empty or a
/// stroke point lies outside it, [`ExportError::InvalidConfig`] for an
/// empty target scale, and [`ExportError::Io`] if writing fails.
pub fn write_gcode<W: Write>(
    mut writer: W,
    strokes: &[Stroke],
    dimensions: Dimensions,
    config: &GcodeConfig,
) -> Result<usize, ExportError> {
    let transform = prepare(strokes, dimensions, config)?;
    let mut lines = 0;
    for command in program(strokes, transform, config) {
        writeln!(writer, "{command}")?;
        lines += 1;
    }
    writer.flush()?;
    log::debug!("wrote {lines} G-code lines for {} strokes", strokes.len());
    Ok(lines)
}

/// Serialize the program for `strokes` into a `String`.
///
/// # Errors
///
/// Same shape and configuration errors as [`write_gcode`].
///
/// # Examples
///
/// ```
/// use plotpath_pipeline::{Dimensions, GridPoint, Stroke};
/// use plotpath_export::gcode::{GcodeConfig, to_gcode};
///
/// let strokes = vec![Stroke::new(vec![GridPoint::new(1, 1), GridPoint::new(2, 2)])];
/// let gcode = to_gcode(&strokes, Dimensions::new(4, 4), &GcodeConfig::default()).unwrap();
/// assert!(gcode.contains("G0 X1 Y3 Z5\nG1 Z0 ; Pen down\nG1 X2 Y2\nG1 Z5 ; Pen up\n"));
/// ```
pub fn to_gcode(
    strokes: &[Stroke],
    dimensions: Dimensions,
    config: &GcodeConfig,
) -> Result<String, ExportError> {
    use std::fmt::Write as _;

    let transform = prepare(strokes, dimensions, config)?;
    let mut out = String::new();
    for command in program(strokes, transform, config) {
        let _ = writeln!(out, "{command}");
    }
    Ok(out)
}
