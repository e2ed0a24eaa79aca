//! A minimal CFF (version 1) writer for non-CID outline fonts.
//!
//! The table holds a single font with no subroutines, a custom format-0
//! charset, Type 2 charstrings and a Private DICT carrying only the width
//! defaults.

use kurbo::{BezPath, ParamCurve, PathSeg, Point, Rect, Shape};
use receptar_font_outline::{contours, reverse_contours};
use write_fonts::tables::glyf::Bbox;

use crate::tables::clamp_i16;

/// Number of predefined strings; custom strings start at this SID.
const STANDARD_STRING_COUNT: u16 = 391;

/// Offset size used for absolute offsets in the header.
const HEADER_OFF_SIZE: u8 = 4;

mod op {
    pub const VERSION: u8 = 0;
    pub const FULL_NAME: u8 = 2;
    pub const FAMILY_NAME: u8 = 3;
    pub const WEIGHT: u8 = 4;
    pub const FONT_BBOX: u8 = 5;
    pub const CHARSET: u8 = 15;
    pub const CHAR_STRINGS: u8 = 17;
    pub const PRIVATE: u8 = 18;
    pub const DEFAULT_WIDTH_X: u8 = 20;
    pub const NOMINAL_WIDTH_X: u8 = 21;
    pub const ESCAPE: u8 = 12;
    pub const FONT_MATRIX: u8 = 7;

    pub const RLINETO: u8 = 5;
    pub const RRCURVETO: u8 = 8;
    pub const ENDCHAR: u8 = 14;
    pub const RMOVETO: u8 = 21;
}

/// Names written into the Top DICT.
#[derive(Debug, Clone)]
pub(crate) struct CffNames {
    pub postscript_name: String,
    pub full_name: String,
    pub family_name: String,
    pub weight: String,
    pub version: String,
}

/// One glyph ready for encoding: PostScript name, advance and an outline
/// already in PostScript direction.
#[derive(Debug, Clone)]
pub(crate) struct CffGlyph {
    pub name: String,
    pub advance: u16,
    pub charstring: Vec<u8>,
    pub bbox: Option<Bbox>,
}

impl CffGlyph {
    /// Encode `outline` (TrueType direction) as a Type 2 charstring.
    ///
    /// Coordinates are rounded to integers; the returned bbox is the tight
    /// bounds of the rounded outline.
    pub fn new(name: String, advance: u16, outline: &BezPath, nominal_width: u16) -> Self {
        let mut cs = Charstring::default();
        let width_delta = i32::from(advance) - i32::from(nominal_width);
        let mut width = Some(width_delta).filter(|&w| w != 0);
        let mut rounded = BezPath::new();

        for contour in contours(&reverse_contours(outline)) {
            let Some(first) = contour.first() else {
                continue;
            };
            let start = round(first.start());
            rounded.move_to(start);
            let mut args: Vec<i32> = width.take().into_iter().collect();
            args.extend(cs.delta(start));
            cs.op(&args, op::RMOVETO);

            let count = contour.len();
            for (idx, seg) in contour.iter().enumerate() {
                match *seg {
                    PathSeg::Line(line) => {
                        let p = round(line.p1);
                        // the closing line is implied
                        if idx + 1 == count && p == start {
                            break;
                        }
                        rounded.line_to(p);
                        let args = cs.delta(p);
                        cs.op(&args, op::RLINETO);
                    }
                    PathSeg::Quad(quad) => {
                        let cubic = quad.raise();
                        let (p1, p2, p3) = (round(cubic.p1), round(cubic.p2), round(cubic.p3));
                        rounded.curve_to(p1, p2, p3);
                        cs.curve(p1, p2, p3);
                    }
                    PathSeg::Cubic(cubic) => {
                        let (p1, p2, p3) = (round(cubic.p1), round(cubic.p2), round(cubic.p3));
                        rounded.curve_to(p1, p2, p3);
                        cs.curve(p1, p2, p3);
                    }
                }
            }
            rounded.close_path();
        }

        let args: Vec<i32> = width.take().into_iter().collect();
        cs.op(&args, op::ENDCHAR);

        let bbox = (!rounded.elements().is_empty()).then(|| bbox_of(rounded.bounding_box()));
        Self { name, advance, charstring: cs.data, bbox }
    }
}

fn round(p: Point) -> Point {
    Point::new(p.x.round(), p.y.round())
}

fn bbox_of(rect: Rect) -> Bbox {
    Bbox {
        x_min: clamp_i16(rect.x0.floor() as i32),
        y_min: clamp_i16(rect.y0.floor() as i32),
        x_max: clamp_i16(rect.x1.ceil() as i32),
        y_max: clamp_i16(rect.y1.ceil() as i32),
    }
}

/// Type 2 charstring under construction, tracking the current point.
#[derive(Default)]
struct Charstring {
    data: Vec<u8>,
    current: Point,
}

impl Charstring {
    fn delta(&mut self, p: Point) -> [i32; 2] {
        let d = [(p.x - self.current.x) as i32, (p.y - self.current.y) as i32];
        self.current = p;
        d
    }

    fn curve(&mut self, p1: Point, p2: Point, p3: Point) {
        let mut args = Vec::with_capacity(6);
        args.extend(self.delta(p1));
        args.extend(self.delta(p2));
        args.extend(self.delta(p3));
        self.op(&args, op::RRCURVETO);
    }

    fn op(&mut self, args: &[i32], operator: u8) {
        for &value in args {
            encode_charstring_int(value, &mut self.data);
        }
        self.data.push(operator);
    }
}

fn encode_charstring_int(value: i32, out: &mut Vec<u8>) {
    match value {
        -107..=107 => out.push((value + 139) as u8),
        108..=1131 => {
            let v = value - 108;
            out.extend([((v >> 8) + 247) as u8, (v & 0xFF) as u8]);
        }
        -1131..=-108 => {
            let v = -value - 108;
            out.extend([((v >> 8) + 251) as u8, (v & 0xFF) as u8]);
        }
        _ => {
            out.push(28);
            out.extend_from_slice(&clamp_i16(value).to_be_bytes());
        }
    }
}

fn encode_dict_int(value: i32, out: &mut Vec<u8>) {
    match value {
        -32768..=32767 => encode_charstring_int(value, out),
        _ => {
            out.push(29);
            out.extend_from_slice(&value.to_be_bytes());
        }
    }
}

/// Always five bytes, so offsets can be patched without changing sizes.
fn encode_dict_offset(value: usize, out: &mut Vec<u8>) {
    out.push(29);
    out.extend_from_slice(&(value as i32).to_be_bytes());
}

/// Encode a real number operand as packed BCD nibbles.
fn encode_dict_real(value: f64, out: &mut Vec<u8>) {
    let text = format!("{value}");
    let mut nibbles = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '0'..='9' => nibbles.push(c as u8 - b'0'),
            '.' => nibbles.push(0xA),
            '-' => nibbles.push(0xE),
            'e' | 'E' => {
                if chars.peek() == Some(&'-') {
                    chars.next();
                    nibbles.push(0xC);
                } else {
                    nibbles.push(0xB);
                }
            }
            _ => {}
        }
    }
    nibbles.push(0xF);
    if nibbles.len() % 2 == 1 {
        nibbles.push(0xF);
    }
    out.push(30);
    out.extend(nibbles.chunks(2).map(|pair| (pair[0] << 4) | pair[1]));
}

/// Serialize an INDEX structure.
fn index<T: AsRef<[u8]>>(items: &[T]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(items.len() as u16).to_be_bytes());
    if items.is_empty() {
        return out;
    }

    let data_len: usize = items.iter().map(|item| item.as_ref().len()).sum();
    let off_size = offset_size(data_len + 1);
    out.push(off_size);

    let mut offset = 1usize;
    write_offset(offset, off_size, &mut out);
    for item in items {
        offset += item.as_ref().len();
        write_offset(offset, off_size, &mut out);
    }
    for item in items {
        out.extend_from_slice(item.as_ref());
    }
    out
}

fn offset_size(max: usize) -> u8 {
    match max {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 3,
        _ => 4,
    }
}

fn write_offset(offset: usize, size: u8, out: &mut Vec<u8>) {
    let bytes = (offset as u32).to_be_bytes();
    out.extend_from_slice(&bytes[4 - size as usize..]);
}

/// Custom strings, assigned SIDs in insertion order.
#[derive(Default)]
struct Strings(Vec<String>);

impl Strings {
    fn sid(&mut self, value: &str) -> i32 {
        let idx = match self.0.iter().position(|s| s == value) {
            Some(idx) => idx,
            None => {
                self.0.push(value.to_string());
                self.0.len() - 1
            }
        };
        i32::from(STANDARD_STRING_COUNT) + idx as i32
    }
}

/// Assemble the `CFF ` table.
///
/// `glyphs` is in glyph order and must start with `.notdef`.
pub(crate) fn build_cff(
    names: &CffNames,
    glyphs: &[CffGlyph],
    font_bbox: Bbox,
    units_per_em: u16,
    nominal_width: u16,
) -> Vec<u8> {
    let mut strings = Strings::default();

    let mut charset = vec![0u8];
    for glyph in glyphs.iter().skip(1) {
        let sid = strings.sid(&glyph.name) as u16;
        charset.extend_from_slice(&sid.to_be_bytes());
    }

    let mut private = Vec::new();
    encode_dict_int(i32::from(nominal_width), &mut private);
    private.push(op::DEFAULT_WIDTH_X);
    encode_dict_int(i32::from(nominal_width), &mut private);
    private.push(op::NOMINAL_WIDTH_X);

    let charstrings: Vec<&[u8]> = glyphs.iter().map(|g| g.charstring.as_slice()).collect();
    let charstrings = index(&charstrings);

    // Top DICT with placeholder offsets; its size does not depend on them.
    let top_dict = |strings: &mut Strings, charset_at: usize, charstrings_at: usize, private_at: usize| {
        let mut dict = Vec::new();
        for (value, operator) in [
            (&names.version, op::VERSION),
            (&names.full_name, op::FULL_NAME),
            (&names.family_name, op::FAMILY_NAME),
            (&names.weight, op::WEIGHT),
        ] {
            encode_dict_int(strings.sid(value), &mut dict);
            dict.push(operator);
        }
        if units_per_em != 1000 {
            let scale = 1.0 / f64::from(units_per_em);
            for value in [scale, 0.0, 0.0, scale, 0.0, 0.0] {
                encode_dict_real(value, &mut dict);
            }
            dict.extend([op::ESCAPE, op::FONT_MATRIX]);
        }
        for value in [font_bbox.x_min, font_bbox.y_min, font_bbox.x_max, font_bbox.y_max] {
            encode_dict_int(i32::from(value), &mut dict);
        }
        dict.push(op::FONT_BBOX);
        encode_dict_offset(charset_at, &mut dict);
        dict.push(op::CHARSET);
        encode_dict_offset(charstrings_at, &mut dict);
        dict.push(op::CHAR_STRINGS);
        encode_dict_int(private.len() as i32, &mut dict);
        encode_dict_offset(private_at, &mut dict);
        dict.push(op::PRIVATE);
        dict
    };

    let header = [1u8, 0, 4, HEADER_OFF_SIZE];
    let name_index = index(&[names.postscript_name.as_bytes()]);
    let global_subrs = index::<&[u8]>(&[]);

    let draft = top_dict(&mut strings, 0, 0, 0);
    let top_index_len = index(&[&draft]).len();
    let string_index_len = index(&strings.0).len();

    let charset_at =
        header.len() + name_index.len() + top_index_len + string_index_len + global_subrs.len();
    let charstrings_at = charset_at + charset.len();
    let private_at = charstrings_at + charstrings.len();

    let top = top_dict(&mut strings, charset_at, charstrings_at, private_at);
    let top_index = index(&[&top]);
    let string_index = index(&strings.0);

    let mut out = Vec::with_capacity(private_at + private.len());
    out.extend_from_slice(&header);
    out.extend(name_index);
    out.extend(top_index);
    out.extend(string_index);
    out.extend(global_subrs);
    out.extend(charset);
    out.extend(charstrings);
    out.extend(private);
    out
}
