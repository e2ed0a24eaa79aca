//! OpenType/CFF compilation.

use std::collections::HashMap;

use kurbo::BezPath;
use log::info;
use write_fonts::{FontBuilder, tables::maxp::Maxp, types::Tag};

use crate::{
    cff::{CffGlyph, CffNames, build_cff},
    error::Result,
    font::IconFont,
    sfnt::{OTTO, set_sfnt_version},
    tables::{GlyphMetrics, add_shared_tables, font_bbox},
};

impl IconFont {
    /// Compile to a CFF-flavored sfnt (`OTTO`).
    pub fn compile_otf(&self) -> Result<Vec<u8>> {
        let nominal_width = self.most_common_advance();

        let mut glyphs = Vec::with_capacity(self.len() + 1);
        glyphs.push(CffGlyph::new(
            ".notdef".to_string(),
            self.info.notdef_advance,
            &BezPath::new(),
            nominal_width,
        ));
        for glyph in self.glyphs() {
            glyphs.push(CffGlyph::new(glyph.name(), glyph.advance, &glyph.outline, nominal_width));
        }

        let metrics: Vec<GlyphMetrics> =
            glyphs.iter().map(|g| GlyphMetrics { advance: g.advance, bbox: g.bbox }).collect();
        let names = CffNames {
            postscript_name: self.info.postscript_name(),
            full_name: self.info.full_name(),
            family_name: self.info.family.clone(),
            weight: self.info.style.clone(),
            version: format!("{:.3}", self.info.version),
        };
        let cff = build_cff(
            &names,
            &glyphs,
            font_bbox(&metrics),
            self.info.em.units_per_em,
            nominal_width,
        );

        let mut builder = FontBuilder::new();
        add_shared_tables(&mut builder, self, &metrics, 0)?;
        builder.add_table(&Maxp::new(metrics.len() as u16))?;
        builder.add_raw(Tag::new(b"CFF "), cff);
        let mut data = builder.build();
        set_sfnt_version(&mut data, OTTO);

        info!("compiled OpenType/CFF font: {} glyphs, {} bytes", metrics.len(), data.len());
        Ok(data)
    }

    /// The advance shared by most glyphs, used as the CFF nominal width.
    fn most_common_advance(&self) -> u16 {
        let mut counts: HashMap<u16, usize> = HashMap::new();
        for glyph in self.glyphs() {
            *counts.entry(glyph.advance).or_default() += 1;
        }
        counts
            .into_iter()
            .max_by_key(|&(advance, count)| (count, advance))
            .map_or(self.info.notdef_advance, |(advance, _)| advance)
    }
}
