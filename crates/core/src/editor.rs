//! The font-editing capability the build pipeline drives.

use std::path::Path;

use kurbo::Rect;

use crate::{error::Result, format::FontFormat};

/// A font under construction, addressed by code point.
///
/// Every method except [`FontEditor::create_glyph`] fails with
/// [`Error::UnknownGlyph`](crate::Error::UnknownGlyph) for a code point that
/// has no glyph yet.
pub trait FontEditor {
    fn create_glyph(&mut self, code_point: u32) -> Result<()>;

    /// Add the outlines of the SVG file at `path` to the glyph.
    ///
    /// `name` is the glyph's table name, reported when the file is missing.
    fn import_outline(&mut self, code_point: u32, name: &str, path: &Path) -> Result<()>;

    fn remove_glyph_overlap(&mut self, code_point: u32) -> Result<()>;

    /// `None` for a glyph without contours.
    fn bounding_box(&self, code_point: u32) -> Result<Option<Rect>>;

    fn set_advance_width(&mut self, code_point: u32, width: u16) -> Result<()>;

    /// Remove overlaps in every glyph.
    fn remove_overlap(&mut self) -> Result<()>;

    /// Serialize the whole font.
    fn encode(&self, format: FontFormat) -> Result<Vec<u8>>;
}
