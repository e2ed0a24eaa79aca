//! SVG document import.

use kurbo::{
    Affine, BezPath, Cap, Circle, Ellipse, Join, Rect, RoundedRect, Shape, Stroke, StrokeOpts,
};
use log::debug;
use roxmltree::{Document, Node};

use crate::{
    contour::{contours, to_path},
    error::{Error, Result},
    overlap::{FillRule, remove_overlap},
    transform::{parse_length, parse_numbers, parse_transform},
};

/// Tolerance used when turning primitive shapes into paths.
const SHAPE_TOLERANCE: f64 = 0.1;

/// Tolerance used for stroke expansion, in SVG user units.
const STROKE_TOLERANCE: f64 = 0.1;

/// Elements whose content is never rendered directly.
const SKIPPED_ELEMENTS: &[&str] = &[
    "defs",
    "clipPath",
    "mask",
    "symbol",
    "title",
    "desc",
    "metadata",
    "style",
    "linearGradient",
    "radialGradient",
    "pattern",
    "marker",
    "filter",
];

/// Vertical metrics of the em square outlines are imported into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmBox {
    pub units_per_em: u16,
    /// Top of the em square, in font units above the baseline.
    pub ascent: i16,
    /// Bottom of the em square, negative below the baseline.
    pub descent: i16,
}

impl EmBox {
    /// 1000 units per em, 800 above and 200 below the baseline.
    pub const DEFAULT: Self = Self { units_per_em: 1000, ascent: 800, descent: -200 };

    pub fn height(&self) -> f64 {
        f64::from(self.ascent) - f64::from(self.descent)
    }

    /// Map a viewBox onto the em square: the viewBox height spans the em
    /// height, y grows upwards and the viewBox top sits on the ascent line.
    fn placement(&self, view_box: Rect) -> Affine {
        let scale = self.height() / view_box.height();
        Affine::new([
            scale,
            0.0,
            0.0,
            -scale,
            -view_box.x0 * scale,
            f64::from(self.ascent) + view_box.y0 * scale,
        ])
    }
}

impl Default for EmBox {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Import an SVG document as one outline in font units.
///
/// Filled shapes contribute their area and stroked shapes contribute their
/// expanded stroke, both after applying every `transform` on the way down
/// the tree. The returned path may still overlap itself.
pub fn import_svg(source: &str, em: EmBox) -> Result<BezPath> {
    let doc = Document::parse(source)?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(Error::NotSvg(root.tag_name().name().to_string()));
    }

    let view_box = view_box(&root, em)?;
    let paint = Paint::default().inherit(&root)?;
    let mut outline = BezPath::new();
    collect(&root, Affine::IDENTITY, &paint, &mut outline)?;

    if outline.elements().is_empty() {
        return Err(Error::Empty);
    }
    Ok(em.placement(view_box) * outline)
}

fn view_box(root: &Node, em: EmBox) -> Result<Rect> {
    if let Some(value) = root.attribute("viewBox") {
        return match parse_numbers(value)?.as_slice() {
            &[x, y, width, height] if width > 0.0 && height > 0.0 => {
                Ok(Rect::new(x, y, x + width, y + height))
            }
            _ => Err(Error::ViewBox(value.to_string())),
        };
    }

    let width = root.attribute("width").and_then(|v| parse_length(v).ok());
    let height = root.attribute("height").and_then(|v| parse_length(v).ok());
    match (width, height) {
        (Some(width), Some(height)) if width > 0.0 && height > 0.0 => {
            Ok(Rect::new(0.0, 0.0, width, height))
        }
        _ => {
            debug!("no usable viewBox or size, assuming the em square");
            Ok(Rect::new(0.0, 0.0, em.height(), em.height()))
        }
    }
}

fn collect(node: &Node, ctm: Affine, parent: &Paint, out: &mut BezPath) -> Result<()> {
    for child in node.children().filter(Node::is_element) {
        let tag = child.tag_name().name();
        if SKIPPED_ELEMENTS.contains(&tag) || property(&child, "display") == Some("none") {
            continue;
        }

        let ctm = match child.attribute("transform") {
            Some(value) => ctm * parse_transform(value)?,
            None => ctm,
        };
        let paint = parent.inherit(&child)?;

        match tag {
            "g" | "svg" | "a" | "switch" => collect(&child, ctm, &paint, out)?,
            _ => {
                if let Some(shape) = shape_path(&child)? {
                    paint.render(&shape, ctm, out)?;
                }
            }
        }
    }
    Ok(())
}

/// Look up a presentation property, preferring an inline `style` declaration.
fn property<'a>(node: &Node<'a, '_>, name: &str) -> Option<&'a str> {
    if let Some(style) = node.attribute("style") {
        for declaration in style.split(';') {
            if let Some((key, value)) = declaration.split_once(':')
                && key.trim() == name
            {
                return Some(value.trim());
            }
        }
    }
    node.attribute(name).map(str::trim)
}

fn number(node: &Node, name: &str) -> Result<f64> {
    node.attribute(name).map(parse_length).transpose().map(|v| v.unwrap_or(0.0))
}

fn shape_path(node: &Node) -> Result<Option<BezPath>> {
    let path = match node.tag_name().name() {
        "path" => {
            let Some(data) = node.attribute("d") else {
                return Ok(None);
            };
            BezPath::from_svg(data).map_err(|e| Error::PathData(e.to_string()))?
        }
        "rect" => {
            let (x, y) = (number(node, "x")?, number(node, "y")?);
            let (width, height) = (number(node, "width")?, number(node, "height")?);
            if width <= 0.0 || height <= 0.0 {
                return Ok(None);
            }
            let rect = Rect::new(x, y, x + width, y + height);
            let rx = node.attribute("rx").map(parse_length).transpose()?;
            let ry = node.attribute("ry").map(parse_length).transpose()?;
            let radius = match (rx, ry) {
                (Some(rx), Some(ry)) => rx.min(ry),
                (Some(r), None) | (None, Some(r)) => r,
                (None, None) => 0.0,
            }
            .min(width / 2.0)
            .min(height / 2.0);
            if radius > 0.0 {
                RoundedRect::from_rect(rect, radius).to_path(SHAPE_TOLERANCE)
            } else {
                rect.to_path(SHAPE_TOLERANCE)
            }
        }
        "circle" => {
            let r = number(node, "r")?;
            if r <= 0.0 {
                return Ok(None);
            }
            Circle::new((number(node, "cx")?, number(node, "cy")?), r).to_path(SHAPE_TOLERANCE)
        }
        "ellipse" => {
            let (rx, ry) = (number(node, "rx")?, number(node, "ry")?);
            if rx <= 0.0 || ry <= 0.0 {
                return Ok(None);
            }
            Ellipse::new((number(node, "cx")?, number(node, "cy")?), (rx, ry), 0.0)
                .to_path(SHAPE_TOLERANCE)
        }
        "line" => {
            let mut path = BezPath::new();
            path.move_to((number(node, "x1")?, number(node, "y1")?));
            path.line_to((number(node, "x2")?, number(node, "y2")?));
            path
        }
        tag @ ("polyline" | "polygon") => {
            let points = parse_numbers(node.attribute("points").unwrap_or_default())?;
            if points.len() < 4 {
                return Ok(None);
            }
            let mut path = BezPath::new();
            for (idx, pair) in points.chunks_exact(2).enumerate() {
                if idx == 0 {
                    path.move_to((pair[0], pair[1]));
                } else {
                    path.line_to((pair[0], pair[1]));
                }
            }
            if tag == "polygon" {
                path.close_path();
            }
            path
        }
        other => {
            debug!("skipping unsupported element <{other}>");
            return Ok(None);
        }
    };
    Ok(Some(path))
}

/// Inherited painting state.
#[derive(Debug, Clone)]
struct Paint {
    fill: bool,
    fill_rule: FillRule,
    stroke: bool,
    stroke_width: f64,
    cap: Cap,
    join: Join,
    miter_limit: f64,
    visible: bool,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            fill: true,
            fill_rule: FillRule::NonZero,
            stroke: false,
            stroke_width: 1.0,
            cap: Cap::Butt,
            join: Join::Miter,
            miter_limit: 4.0,
            visible: true,
        }
    }
}

impl Paint {
    fn inherit(&self, node: &Node) -> Result<Self> {
        let mut paint = self.clone();
        if let Some(fill) = property(node, "fill") {
            paint.fill = is_painted(fill);
        }
        if let Some(rule) = property(node, "fill-rule") {
            paint.fill_rule = match rule {
                "evenodd" => FillRule::EvenOdd,
                _ => FillRule::NonZero,
            };
        }
        if let Some(stroke) = property(node, "stroke") {
            paint.stroke = is_painted(stroke);
        }
        if let Some(width) = property(node, "stroke-width") {
            paint.stroke_width = parse_length(width)?;
        }
        if let Some(cap) = property(node, "stroke-linecap") {
            paint.cap = match cap {
                "round" => Cap::Round,
                "square" => Cap::Square,
                _ => Cap::Butt,
            };
        }
        if let Some(join) = property(node, "stroke-linejoin") {
            paint.join = match join {
                "round" => Join::Round,
                "bevel" => Join::Bevel,
                _ => Join::Miter,
            };
        }
        if let Some(limit) = property(node, "stroke-miterlimit") {
            paint.miter_limit = parse_length(limit)?;
        }
        if let Some(visibility) = property(node, "visibility") {
            paint.visible = visibility == "visible";
        }
        Ok(paint)
    }

    fn render(&self, shape: &BezPath, ctm: Affine, out: &mut BezPath) -> Result<()> {
        if !self.visible {
            return Ok(());
        }

        if self.fill {
            let area = to_path(&contours(shape));
            let area = match self.fill_rule {
                FillRule::EvenOdd => remove_overlap(&area, FillRule::EvenOdd)?,
                FillRule::NonZero => area,
            };
            append(out, &(ctm * area));
        }

        if self.stroke && self.stroke_width > 0.0 {
            let style = Stroke::new(self.stroke_width)
                .with_caps(self.cap)
                .with_join(self.join)
                .with_miter_limit(self.miter_limit);
            let outline = kurbo::stroke(
                shape.elements().iter().copied(),
                &style,
                &StrokeOpts::default(),
                STROKE_TOLERANCE,
            );
            append(out, &(ctm * outline));
        }
        Ok(())
    }
}

fn is_painted(value: &str) -> bool {
    !matches!(value, "none" | "transparent")
}

fn append(out: &mut BezPath, path: &BezPath) {
    for el in path.elements() {
        out.push(*el);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(body: &str) -> Result<BezPath> {
        let source =
            format!(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 512 512">{body}</svg>"#);
        import_svg(&source, EmBox::DEFAULT)
    }

    #[test]
    fn test_rect_maps_into_em() {
        let outline = import(r#"<rect x="0" y="0" width="512" height="512"/>"#).unwrap();
        let bbox = outline.bounding_box();
        assert!((bbox.x0 - 0.0).abs() < 1e-9);
        assert!((bbox.x1 - 1000.0).abs() < 1e-9);
        assert!((bbox.y0 + 200.0).abs() < 1e-9);
        assert!((bbox.y1 - 800.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_of_view_box_is_ascent() {
        let outline = import(r#"<path d="M0 0H256V256H0Z"/>"#).unwrap();
        let bbox = outline.bounding_box();
        assert!((bbox.y1 - 800.0).abs() < 1e-9);
        assert!((bbox.y0 - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_stroke_only_path_is_expanded() {
        let outline = import(
            r#"<path fill="none" stroke="currentColor" stroke-linecap="round"
                stroke-linejoin="round" stroke-width="32" d="M256 112v288M400 256H112"/>"#,
        )
        .unwrap();
        let bbox = outline.bounding_box();
        let unit = 1000.0 / 512.0;
        // round caps extend half the stroke width past each end
        assert!((bbox.x0 - 96.0 * unit).abs() < 0.5, "{bbox:?}");
        assert!((bbox.x1 - 416.0 * unit).abs() < 0.5, "{bbox:?}");
    }

    #[test]
    fn test_unfilled_unstroked_is_empty() {
        assert!(matches!(import(r#"<circle cx="10" cy="10" r="5" fill="none"/>"#), Err(Error::Empty)));
    }

    #[test]
    fn test_style_attribute_overrides() {
        let outline =
            import(r#"<circle cx="256" cy="256" r="100" fill="black" style="fill: none"/>"#);
        assert!(matches!(outline, Err(Error::Empty)));
    }

    #[test]
    fn test_group_transform_applies() {
        let outline =
            import(r#"<g transform="translate(256 0)"><rect width="256" height="512"/></g>"#)
                .unwrap();
        let bbox = outline.bounding_box();
        assert!((bbox.x0 - 500.0).abs() < 1e-9);
        assert!((bbox.x1 - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_defs_are_skipped() {
        let outline = import(
            r#"<defs><rect width="512" height="512"/></defs><rect width="256" height="256"/>"#,
        )
        .unwrap();
        assert!((outline.bounding_box().x1 - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_size_without_view_box() {
        let source = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24">
            <polygon points="0,0 24,0 24,24"/></svg>"#;
        let bbox = import_svg(source, EmBox::DEFAULT).unwrap().bounding_box();
        assert!((bbox.x1 - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(import_svg("<svg", EmBox::DEFAULT), Err(Error::Xml(_))));
        assert!(matches!(import_svg("<html/>", EmBox::DEFAULT), Err(Error::NotSvg(_))));
        assert!(matches!(import(r#"<path d="M0 0 Q"/>"#), Err(Error::PathData(_))));
        assert!(matches!(
            import_svg(r#"<svg viewBox="0 0 0 10"><rect width="1" height="1"/></svg>"#, EmBox::DEFAULT),
            Err(Error::ViewBox(_))
        ));
    }
}
