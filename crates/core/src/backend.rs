//! [`FontEditor`] backed by [`IconFont`].

use std::{fs, path::Path};

use kurbo::Rect;
use log::{debug, info};
use receptar_font_builder::{self as builder, FontInfo, Glyph, IconFont};
use receptar_font_outline::import_svg;
use receptar_font_woff::{encode_woff, encode_woff2};

use crate::{
    config::is_file,
    editor::FontEditor,
    error::{Error, Result},
    format::FontFormat,
};

#[derive(Debug, Clone)]
pub struct IconFontEditor {
    font: IconFont,
}

impl IconFontEditor {
    pub fn new(info: FontInfo) -> Self {
        Self { font: IconFont::new(info) }
    }

    fn glyph(&self, code_point: u32) -> Result<&Glyph> {
        self.font.glyph(code_point).ok_or(Error::UnknownGlyph(code_point))
    }

    fn glyph_mut(&mut self, code_point: u32) -> Result<&mut Glyph> {
        self.font.glyph_mut(code_point).ok_or(Error::UnknownGlyph(code_point))
    }

    fn compile(&self, format: FontFormat) -> std::result::Result<Vec<u8>, String> {
        let ttf = || self.font.compile_ttf().map_err(|e| e.to_string());
        match format {
            FontFormat::Ttf => ttf(),
            FontFormat::Otf => self.font.compile_otf().map_err(|e| e.to_string()),
            FontFormat::Woff => encode_woff(&ttf()?).map_err(|e| format!("{e:#}")),
            FontFormat::Woff2 => encode_woff2(&ttf()?).map_err(|e| format!("{e:#}")),
        }
    }
}

impl FontEditor for IconFontEditor {
    fn create_glyph(&mut self, code_point: u32) -> Result<()> {
        match self.font.create_glyph(code_point) {
            Ok(_) => Ok(()),
            Err(builder::Error::DuplicateCodePoint(cp)) => Err(Error::DuplicateCodePoint(cp)),
            Err(_) => Err(Error::InvalidCodePoint(code_point)),
        }
    }

    fn import_outline(&mut self, code_point: u32, name: &str, path: &Path) -> Result<()> {
        let em = self.font.info.em;
        let glyph = self.glyph_mut(code_point)?;
        if !is_file(path) {
            return Err(Error::MissingAsset { name: name.to_string(), path: path.to_path_buf() });
        }
        let source = fs::read_to_string(path)
            .map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
        let outline = import_svg(&source, em)
            .map_err(|source| Error::OutlineImport { path: path.to_path_buf(), source })?;
        debug!(
            "{name} ({}): imported {} path elements from {}",
            glyph.name(),
            outline.elements().len(),
            path.display()
        );
        glyph.append(&outline);
        Ok(())
    }

    fn remove_glyph_overlap(&mut self, code_point: u32) -> Result<()> {
        self.glyph_mut(code_point)?
            .remove_overlap()
            .map_err(|source| Error::OverlapRemoval { code_point, source })
    }

    fn bounding_box(&self, code_point: u32) -> Result<Option<Rect>> {
        Ok(self.glyph(code_point)?.bounding_box())
    }

    fn set_advance_width(&mut self, code_point: u32, width: u16) -> Result<()> {
        self.glyph_mut(code_point)?.advance = width;
        Ok(())
    }

    fn remove_overlap(&mut self) -> Result<()> {
        let code_points: Vec<u32> = self.font.glyphs().map(|g| u32::from(g.code_point)).collect();
        for code_point in code_points {
            self.remove_glyph_overlap(code_point)?;
        }
        Ok(())
    }

    fn encode(&self, format: FontFormat) -> Result<Vec<u8>> {
        let data =
            self.compile(format).map_err(|message| Error::Serialization { format, message })?;
        info!("encoded {format}: {} bytes", data.len());
        Ok(data)
    }
}
