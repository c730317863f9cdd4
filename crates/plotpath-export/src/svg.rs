//! SVG preview serializer.
//!
//! Renders strokes in grid coordinates (origin top-left, no Y flip) so
//! the preview lines up with the source image. Each stroke with two or
//! more points becomes a `<path>` of `M`/`L` commands; a one-point
//! stroke becomes a small dot so isolated edge cells stay visible.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Description, Path, Title};
use svg::node::{Text, Value};

use plotpath_pipeline::{Dimensions, Stroke};

/// Radius of the dot drawn for a one-point stroke, in grid cells.
const DOT_RADIUS: f64 = 0.5;

/// Metadata to embed in the SVG document.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the source image filename (without extension).
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,
}

/// Build an SVG path `d` attribute string from a stroke.
///
/// Returns an empty string for strokes with fewer than 2 points.
///
/// # Examples
///
/// ```
/// use plotpath_pipeline::{GridPoint, Stroke};
/// use plotpath_export::svg::build_path_data;
///
/// let stroke = Stroke::new(vec![GridPoint::new(10, 20), GridPoint::new(30, 40)]);
/// assert_eq!(build_path_data(&stroke), "M10,20 L30,40");
/// ```
#[must_use]
pub fn build_path_data(stroke: &Stroke) -> String {
    let points = stroke.points();
    if points.len() < 2 {
        return String::new();
    }

    let first = &points[0];
    let mut data = Data::new().move_to((f64::from(first.x), f64::from(first.y)));
    for p in &points[1..] {
        data = data.line_to((f64::from(p.x), f64::from(p.y)));
    }
    String::from(Value::from(data))
}

/// Serialize strokes into an SVG document string.
///
/// The `viewBox` matches the grid [`Dimensions`].
#[must_use]
pub fn to_svg(strokes: &[Stroke], dimensions: Dimensions, metadata: &SvgMetadata<'_>) -> String {
    let w = dimensions.width;
    let h = dimensions.height;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    for stroke in strokes {
        match stroke.points() {
            [] => {}
            [only] => {
                let dot = Circle::new()
                    .set("cx", f64::from(only.x))
                    .set("cy", f64::from(only.y))
                    .set("r", DOT_RADIUS)
                    .set("fill", "black");
                doc = doc.add(dot);
            }
            _ => {
                let path = Path::new()
                    .set("d", build_path_data(stroke))
                    .set("fill", "none")
                    .set("stroke", "black")
                    .set("stroke-width", 1);
                doc = doc.add(path);
            }
        }
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
