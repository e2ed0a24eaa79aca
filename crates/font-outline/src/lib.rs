//! # Font Outline
//!
//! Import vector outlines for icon glyphs and normalize them.
//!
//! SVG documents are flattened into a single [`kurbo::BezPath`] in font
//! units: fills contribute their area, strokes are expanded into outlines,
//! and transforms are applied. [`remove_overlap`] then resolves the result
//! into non-overlapping contours with the filled region on the right of
//! every contour.
//!
//! ## Example
//!
//! ```no_run
//! use receptar_font_outline::{EmBox, FillRule, import_svg, remove_overlap};
//!
//! let svg = std::fs::read_to_string("search.svg").unwrap();
//! let outline = import_svg(&svg, EmBox::DEFAULT).unwrap();
//! let outline = remove_overlap(&outline, FillRule::NonZero).unwrap();
//! ```

mod contour;
mod error;
mod overlap;
mod svg;
mod transform;

pub use contour::{contours, reverse_contours, to_path, to_quadratic};
pub use error::{Error, Result};
pub use overlap::{FillRule, remove_overlap};
pub use svg::{EmBox, import_svg};
