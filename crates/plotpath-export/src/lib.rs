//! plotpath-export: Serializers for traced strokes.
//!
//! Converts strokes into output formats:
//! - [`gcode`]: pen plotter program, streamed to any [`std::io::Write`]
//! - [`svg`]: preview document for eyeballing the trace

pub mod gcode;
pub mod svg;

pub use gcode::{GcodeCommand, GcodeConfig, to_gcode, write_gcode};
pub use svg::{SvgMetadata, to_svg};

/// Errors that can occur while exporting strokes.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The output destination could not be written.
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// Grid dimensions are empty or a stroke lies outside them.
    #[error("invalid input shape: {0}")]
    InputShape(String),

    /// Export configuration is invalid.
    #[error("invalid export configuration: {0}")]
    InvalidConfig(String),
}
