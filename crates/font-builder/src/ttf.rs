//! TrueType (`glyf`) compilation.

use kurbo::{PathSeg, Point};
use log::{debug, info};
use read_fonts::tables::glyf::CurvePoint;
use receptar_font_outline::{contours, to_quadratic};
use write_fonts::{
    FontBuilder,
    tables::{
        glyf::{Bbox, Contour, GlyfLocaBuilder, Glyph as GlyfGlyph, SimpleGlyph},
        loca::LocaFormat,
        maxp::Maxp,
    },
};

use crate::{
    error::{Error, Result},
    font::{Glyph, IconFont},
    tables::{GlyphMetrics, add_shared_tables, clamp_i16},
};

/// Maximum distance between a cubic and its quadratic approximation, in
/// font units.
const QUADRATIC_ACCURACY: f64 = 1.0;

impl IconFont {
    /// Compile to a TrueType-flavored sfnt.
    pub fn compile_ttf(&self) -> Result<Vec<u8>> {
        let mut glyf_builder = GlyfLocaBuilder::new();
        let mut metrics = Vec::with_capacity(self.len() + 1);
        let (mut max_points, mut max_contours) = (0u16, 0u16);

        glyf_builder.add_glyph(&GlyfGlyph::Empty)?;
        metrics.push(GlyphMetrics { advance: self.info.notdef_advance, bbox: None });

        for glyph in self.glyphs() {
            match simple_glyph(glyph)? {
                Some(simple) => {
                    let points: usize = simple.contours.iter().map(Contour::len).sum();
                    max_points = max_points.max(points as u16);
                    max_contours = max_contours.max(simple.contours.len() as u16);
                    metrics.push(GlyphMetrics { advance: glyph.advance, bbox: Some(simple.bbox) });
                    glyf_builder.add_glyph(&GlyfGlyph::Simple(simple))?;
                }
                None => {
                    metrics.push(GlyphMetrics { advance: glyph.advance, bbox: None });
                    glyf_builder.add_glyph(&GlyfGlyph::Empty)?;
                }
            }
        }
        let (glyf, loca, loca_format) = glyf_builder.build();

        let maxp = Maxp {
            num_glyphs: metrics.len() as u16,
            max_points: Some(max_points),
            max_contours: Some(max_contours),
            max_composite_points: Some(0),
            max_composite_contours: Some(0),
            max_zones: Some(1),
            max_twilight_points: Some(0),
            max_storage: Some(0),
            max_function_defs: Some(0),
            max_instruction_defs: Some(0),
            max_stack_elements: Some(0),
            max_size_of_instructions: Some(0),
            max_component_elements: Some(0),
            max_component_depth: Some(0),
        };

        let index_to_loc_format = match loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        };

        let mut builder = FontBuilder::new();
        add_shared_tables(&mut builder, self, &metrics, index_to_loc_format)?;
        builder.add_table(&maxp)?;
        builder.add_table(&glyf)?;
        builder.add_table(&loca)?;
        let data = builder.build();

        info!("compiled TrueType font: {} glyphs, {} bytes", metrics.len(), data.len());
        Ok(data)
    }
}

fn to_point(p: Point) -> (i16, i16) {
    (clamp_i16(p.x.round() as i32), clamp_i16(p.y.round() as i32))
}

/// Convert a glyph outline to quadratic TrueType contours.
///
/// Returns `None` when nothing of the outline survives rounding.
fn simple_glyph(glyph: &Glyph) -> Result<Option<SimpleGlyph>> {
    let quadratic = to_quadratic(&glyph.outline, QUADRATIC_ACCURACY);
    let mut result = Vec::new();

    for contour in contours(&quadratic) {
        let mut points: Vec<CurvePoint> = Vec::with_capacity(contour.len() * 2);
        for seg in &contour {
            match *seg {
                PathSeg::Line(line) => {
                    let (x, y) = to_point(line.p0);
                    points.push(CurvePoint::on_curve(x, y));
                }
                PathSeg::Quad(quad) => {
                    let (x, y) = to_point(quad.p0);
                    points.push(CurvePoint::on_curve(x, y));
                    let (x, y) = to_point(quad.p1);
                    points.push(CurvePoint::off_curve(x, y));
                }
                PathSeg::Cubic(_) => {
                    return Err(Error::MalformedOutline {
                        glyph: glyph.name(),
                        reason: "cubic segment left after quadratic conversion".to_string(),
                    });
                }
            }
        }

        // rounding can collapse neighbouring on-curve points
        points.dedup_by(|b, a| a.on_curve && b.on_curve && a.x == b.x && a.y == b.y);
        while points.len() > 1
            && points.first().zip(points.last()).is_some_and(|(a, b)| {
                a.on_curve && b.on_curve && a.x == b.x && a.y == b.y
            })
        {
            points.pop();
        }

        if points.len() < 3 {
            debug!("{}: dropping degenerate contour", glyph.name());
            continue;
        }
        result.push(Contour::from(points));
    }

    if result.is_empty() {
        return Ok(None);
    }
    let mut simple = SimpleGlyph {
        bbox: Bbox { x_min: 0, y_min: 0, x_max: 0, y_max: 0 },
        contours: result,
        instructions: vec![],
    };
    simple.recompute_bounding_box();
    debug!("{}: {} contours", glyph.name(), simple.contours.len());
    Ok(Some(simple))
}
