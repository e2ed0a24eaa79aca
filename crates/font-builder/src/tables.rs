//! Tables shared by the TrueType and CFF flavors.

use write_fonts::{
    FontBuilder,
    tables::{
        cmap::Cmap,
        glyf::Bbox,
        head::{Flags, Head, MacStyle},
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        name::{Name, NameRecord},
        os2::{Os2, SelectionFlags},
        post::Post,
    },
    types::{FWord, Fixed, GlyphId, LongDateTime, NameId, Tag, UfWord, Version16Dot16},
};

use crate::{
    error::Result,
    font::{FontInfo, IconFont},
};

/// Seconds between 1904-01-01 and 1970-01-01.
const MAC_EPOCH_OFFSET: i64 = 2_082_844_800;

const PLATFORM_WINDOWS: u16 = 3;
const ENCODING_UNICODE_BMP: u16 = 1;
const LANGUAGE_EN_US: u16 = 0x409;

/// OS/2 Unicode range bits for the blocks icon fonts use.
const UNICODE_RANGES: &[(u32, u32, u32)] = &[
    (0x0000, 0x007F, 0),
    (0x0080, 0x00FF, 1),
    (0x0400, 0x052F, 9),
    (0x2000, 0x206F, 31),
    (0xE000, 0xF8FF, 60),
];

/// Horizontal metrics and bounds of one compiled glyph.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GlyphMetrics {
    pub advance: u16,
    /// `None` for a glyph without contours.
    pub bbox: Option<Bbox>,
}

impl GlyphMetrics {
    fn left_side_bearing(&self) -> i16 {
        self.bbox.map_or(0, |b| b.x_min)
    }

    fn right_side_bearing(&self) -> Option<i16> {
        self.bbox.map(|b| clamp_i16(i32::from(self.advance) - i32::from(b.x_max)))
    }
}

pub(crate) fn clamp_i16(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Union of all glyph bounds, zero when every glyph is empty.
pub(crate) fn font_bbox(metrics: &[GlyphMetrics]) -> Bbox {
    metrics
        .iter()
        .filter_map(|m| m.bbox)
        .reduce(|a, b| Bbox {
            x_min: a.x_min.min(b.x_min),
            y_min: a.y_min.min(b.y_min),
            x_max: a.x_max.max(b.x_max),
            y_max: a.y_max.max(b.y_max),
        })
        .unwrap_or(Bbox { x_min: 0, y_min: 0, x_max: 0, y_max: 0 })
}

/// Add `head`, `hhea`, `hmtx`, `cmap`, `OS/2`, `name` and `post`.
///
/// `metrics` is in glyph order, `.notdef` first.
pub(crate) fn add_shared_tables(
    builder: &mut FontBuilder,
    font: &IconFont,
    metrics: &[GlyphMetrics],
    index_to_loc_format: i16,
) -> Result<()> {
    let bbox = font_bbox(metrics);
    builder.add_table(&head(&font.info, bbox, index_to_loc_format))?;
    builder.add_table(&hhea(&font.info, metrics))?;
    builder.add_table(&hmtx(metrics))?;
    builder.add_table(&cmap(font)?)?;
    builder.add_table(&os2(font, metrics, bbox))?;
    builder.add_table(&name(&font.info))?;
    builder.add_table(&post(metrics.len()))?;
    Ok(())
}

fn head(info: &FontInfo, bbox: Bbox, index_to_loc_format: i16) -> Head {
    let timestamp = LongDateTime::new(info.timestamp + MAC_EPOCH_OFFSET);
    Head {
        font_revision: Fixed::from_f64(info.version),
        checksum_adjustment: 0,
        magic_number: 0x5F0F3CF5,
        flags: Flags::BASELINE_AT_Y_0,
        units_per_em: info.em.units_per_em,
        created: timestamp,
        modified: timestamp,
        x_min: bbox.x_min,
        y_min: bbox.y_min,
        x_max: bbox.x_max,
        y_max: bbox.y_max,
        mac_style: MacStyle::empty(),
        lowest_rec_ppem: 8,
        font_direction_hint: 2,
        index_to_loc_format,
    }
}

fn hhea(info: &FontInfo, metrics: &[GlyphMetrics]) -> Hhea {
    let advance_width_max = metrics.iter().map(|m| m.advance).max().unwrap_or(0);
    let inked = || metrics.iter().filter(|m| m.bbox.is_some());
    let min_lsb = inked().map(GlyphMetrics::left_side_bearing).min().unwrap_or(0);
    let min_rsb = inked().filter_map(|m| m.right_side_bearing()).min().unwrap_or(0);
    let x_max_extent = inked().filter_map(|m| m.bbox.map(|b| b.x_max)).max().unwrap_or(0);

    Hhea {
        ascender: FWord::new(info.em.ascent),
        descender: FWord::new(info.em.descent),
        line_gap: FWord::new(0),
        advance_width_max: UfWord::new(advance_width_max),
        min_left_side_bearing: FWord::new(min_lsb),
        min_right_side_bearing: FWord::new(min_rsb),
        x_max_extent: FWord::new(x_max_extent),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: metrics.len() as u16,
    }
}

fn hmtx(metrics: &[GlyphMetrics]) -> Hmtx {
    Hmtx {
        h_metrics: metrics
            .iter()
            .map(|m| LongMetric { advance: m.advance, side_bearing: m.left_side_bearing() })
            .collect(),
        left_side_bearings: vec![],
    }
}

fn cmap(font: &IconFont) -> Result<Cmap> {
    let mappings = font
        .glyphs()
        .enumerate()
        .map(|(idx, glyph)| (glyph.code_point, GlyphId::new(idx as u32 + 1)));
    Ok(Cmap::from_mappings(mappings)?)
}

fn unicode_ranges(font: &IconFont) -> [u32; 4] {
    let mut ranges = [0u32; 4];
    for glyph in font.glyphs() {
        let cp = u32::from(glyph.code_point);
        for &(start, end, bit) in UNICODE_RANGES {
            if (start..=end).contains(&cp) {
                ranges[(bit / 32) as usize] |= 1 << (bit % 32);
            }
        }
        if cp > 0xFFFF {
            // Non-Plane 0
            ranges[1] |= 1 << (57 - 32);
        }
    }
    ranges
}

fn os2(font: &IconFont, metrics: &[GlyphMetrics], bbox: Bbox) -> Os2 {
    let info = &font.info;
    let advances: Vec<u32> =
        metrics.iter().map(|m| u32::from(m.advance)).filter(|&a| a > 0).collect();
    let x_avg_char_width = if advances.is_empty() {
        0
    } else {
        clamp_i16((advances.iter().sum::<u32>() as f64 / advances.len() as f64).round() as i32)
    };

    let code_points: Vec<u32> = font.glyphs().map(|g| u32::from(g.code_point)).collect();
    let first = code_points.first().map_or(0, |&cp| cp.min(0xFFFF) as u16);
    let last = code_points.last().map_or(0, |&cp| cp.min(0xFFFF) as u16);
    let [range_1, range_2, range_3, range_4] = unicode_ranges(font);

    let upem = i32::from(info.em.units_per_em);
    let scaled = |ratio: f64| clamp_i16((f64::from(upem) * ratio).round() as i32);

    Os2 {
        x_avg_char_width,
        us_weight_class: 400,
        us_width_class: 5,
        fs_type: 0,
        y_subscript_x_size: scaled(0.65),
        y_subscript_y_size: scaled(0.6),
        y_subscript_x_offset: 0,
        y_subscript_y_offset: scaled(0.075),
        y_superscript_x_size: scaled(0.65),
        y_superscript_y_size: scaled(0.6),
        y_superscript_x_offset: 0,
        y_superscript_y_offset: scaled(0.35),
        y_strikeout_size: scaled(0.05),
        y_strikeout_position: scaled(0.3),
        s_family_class: 0,
        panose_10: [0; 10],
        ul_unicode_range_1: range_1,
        ul_unicode_range_2: range_2,
        ul_unicode_range_3: range_3,
        ul_unicode_range_4: range_4,
        ach_vend_id: Tag::new(&info.vendor),
        fs_selection: SelectionFlags::REGULAR,
        us_first_char_index: first,
        us_last_char_index: last,
        s_typo_ascender: info.em.ascent,
        s_typo_descender: info.em.descent,
        s_typo_line_gap: 0,
        us_win_ascent: bbox.y_max.max(info.em.ascent).max(0) as u16,
        us_win_descent: (-bbox.y_min.min(info.em.descent)).max(0) as u16,
        ul_code_page_range_1: Some(1),
        ul_code_page_range_2: Some(0),
        sx_height: Some(0),
        s_cap_height: Some(0),
        us_default_char: Some(0),
        us_break_char: Some(0x20),
        us_max_context: Some(0),
        us_lower_optical_point_size: None,
        us_upper_optical_point_size: None,
    }
}

fn name(info: &FontInfo) -> Name {
    let entries = [
        (1, info.family.clone()),
        (2, info.style.clone()),
        (3, format!("{:.3};{}", info.version, info.postscript_name())),
        (4, info.full_name()),
        (5, info.version_string()),
        (6, info.postscript_name()),
    ];
    let mut records: Vec<NameRecord> = entries
        .into_iter()
        .map(|(id, value)| {
            NameRecord::new(
                PLATFORM_WINDOWS,
                ENCODING_UNICODE_BMP,
                LANGUAGE_EN_US,
                NameId::new(id),
                value.into(),
            )
        })
        .collect();
    records.sort();
    Name::new(records)
}

fn post(num_glyphs: usize) -> Post {
    Post {
        version: Version16Dot16::VERSION_3_0,
        italic_angle: Fixed::from_f64(0.0),
        underline_position: FWord::new(-100),
        underline_thickness: FWord::new(50),
        is_fixed_pitch: 0,
        min_mem_type42: 0,
        max_mem_type42: 0,
        min_mem_type1: 0,
        max_mem_type1: 0,
        num_glyphs: Some(num_glyphs as u16),
        glyph_name_index: None,
        string_data: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(advance: u16, bbox: Option<(i16, i16, i16, i16)>) -> GlyphMetrics {
        GlyphMetrics {
            advance,
            bbox: bbox.map(|(x_min, y_min, x_max, y_max)| Bbox { x_min, y_min, x_max, y_max }),
        }
    }

    #[test]
    fn test_font_bbox_skips_empty_glyphs() {
        let all = [
            metrics(500, None),
            metrics(900, Some((50, -100, 850, 700))),
            metrics(900, Some((10, 0, 400, 800))),
        ];
        let bbox = font_bbox(&all);
        assert_eq!((bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max), (10, -100, 850, 800));
        assert_eq!(font_bbox(&all[..1]).x_max, 0);
    }

    #[test]
    fn test_side_bearings() {
        let m = metrics(900, Some((50, 0, 800, 700)));
        assert_eq!(m.left_side_bearing(), 50);
        assert_eq!(m.right_side_bearing(), Some(100));
        assert_eq!(metrics(500, None).right_side_bearing(), None);
    }

    #[test]
    fn test_unicode_ranges() {
        let mut font = IconFont::new(FontInfo::new("Test"));
        font.create_glyph(0xE108).unwrap();
        font.create_glyph(0x433).unwrap();
        let ranges = unicode_ranges(&font);
        assert_eq!(ranges[0], 1 << 9);
        assert_eq!(ranges[1], 1 << 28);
    }
}
