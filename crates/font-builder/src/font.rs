//! The in-memory icon font.

use std::collections::{BTreeMap, btree_map::Entry};

use kurbo::{BezPath, Rect, Shape};
use log::debug;
use receptar_font_outline::{EmBox, FillRule, remove_overlap};

use crate::error::{Error, Result};

/// Font-wide naming and vertical metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct FontInfo {
    pub family: String,
    pub style: String,
    /// Font revision, written as `Version 1.000`.
    pub version: f64,
    pub vendor: [u8; 4],
    pub em: EmBox,
    /// Creation and modification time, seconds since the Unix epoch.
    pub timestamp: i64,
    /// Advance of `.notdef`.
    pub notdef_advance: u16,
}

impl FontInfo {
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            style: "Regular".to_string(),
            version: 1.0,
            vendor: *b"NONE",
            em: EmBox::DEFAULT,
            timestamp: 0,
            notdef_advance: 500,
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// PostScript name: the family with spaces removed, then the style.
    pub fn postscript_name(&self) -> String {
        let family: String = self.family.chars().filter(|c| !c.is_whitespace()).collect();
        format!("{family}-{}", self.style)
    }

    pub fn full_name(&self) -> String {
        if self.style == "Regular" {
            self.family.clone()
        } else {
            format!("{} {}", self.family, self.style)
        }
    }

    pub fn version_string(&self) -> String {
        format!("Version {:.3}", self.version)
    }
}

/// One encoded glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub code_point: char,
    /// Outline in font units, y up, filled region on the right.
    pub outline: BezPath,
    pub advance: u16,
}

impl Glyph {
    pub fn new(code_point: char) -> Self {
        Self { code_point, outline: BezPath::new(), advance: 0 }
    }

    /// PostScript glyph name, `uniXXXX` in the BMP and `uXXXXX` above it.
    pub fn name(&self) -> String {
        glyph_name(self.code_point)
    }

    /// Append an outline to the glyph's existing contours.
    pub fn append(&mut self, outline: &BezPath) {
        for el in outline.elements() {
            self.outline.push(*el);
        }
    }

    /// Resolve overlapping contours under the nonzero rule.
    pub fn remove_overlap(&mut self) -> Result<()> {
        self.outline = remove_overlap(&self.outline, FillRule::NonZero)
            .map_err(|source| Error::Overlap { glyph: self.name(), source })?;
        Ok(())
    }

    /// Bounding box of the outline, or `None` for an empty glyph.
    pub fn bounding_box(&self) -> Option<Rect> {
        if self.outline.elements().is_empty() {
            None
        } else {
            Some(self.outline.bounding_box())
        }
    }
}

pub(crate) fn glyph_name(code_point: char) -> String {
    let cp = u32::from(code_point);
    if cp <= 0xFFFF { format!("uni{cp:04X}") } else { format!("u{cp:05X}") }
}

/// A font made of outline glyphs keyed by code point.
///
/// Glyph order when compiled is `.notdef` first, then ascending code point.
#[derive(Debug, Clone)]
pub struct IconFont {
    pub info: FontInfo,
    glyphs: BTreeMap<char, Glyph>,
}

impl IconFont {
    pub fn new(info: FontInfo) -> Self {
        Self { info, glyphs: BTreeMap::new() }
    }

    /// Create an empty glyph for `code_point`.
    pub fn create_glyph(&mut self, code_point: u32) -> Result<&mut Glyph> {
        let ch = char::from_u32(code_point).ok_or(Error::InvalidCodePoint(code_point))?;
        match self.glyphs.entry(ch) {
            Entry::Occupied(_) => Err(Error::DuplicateCodePoint(code_point)),
            Entry::Vacant(entry) => {
                debug!("created glyph {}", glyph_name(ch));
                Ok(entry.insert(Glyph::new(ch)))
            }
        }
    }

    pub fn glyph(&self, code_point: u32) -> Option<&Glyph> {
        char::from_u32(code_point).and_then(|ch| self.glyphs.get(&ch))
    }

    pub fn glyph_mut(&mut self, code_point: u32) -> Option<&mut Glyph> {
        char::from_u32(code_point).and_then(|ch| self.glyphs.get_mut(&ch))
    }

    /// Glyphs in ascending code point order.
    pub fn glyphs(&self) -> impl Iterator<Item = &Glyph> {
        self.glyphs.values()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Remove overlaps in every glyph.
    pub fn remove_overlap(&mut self) -> Result<()> {
        for glyph in self.glyphs.values_mut() {
            glyph.remove_overlap()?;
        }
        Ok(())
    }
}
