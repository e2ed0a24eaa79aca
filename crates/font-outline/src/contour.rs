//! Contour-level helpers over [`BezPath`].

use std::mem::take;

use kurbo::{BezPath, CubicBez, Line, ParamCurve, PathEl, PathSeg, Point, QuadBez};

/// Lines shorter than this carry no geometry.
const DEGENERATE_LENGTH: f64 = 1e-9;

/// Split a path into closed contours of segments.
///
/// Open subpaths are closed with an implicit line back to their start, the
/// way a filled outline is rendered. Zero-length lines are dropped.
pub fn contours(path: &BezPath) -> Vec<Vec<PathSeg>> {
    let mut result = Vec::new();
    let mut current = Vec::new();
    let mut start = Point::ZERO;
    let mut last = Point::ZERO;

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                finish_contour(&mut current, last, start, &mut result);
                start = p;
                last = p;
            }
            PathEl::LineTo(p) => {
                current.push(PathSeg::Line(Line::new(last, p)));
                last = p;
            }
            PathEl::QuadTo(p1, p2) => {
                current.push(PathSeg::Quad(QuadBez::new(last, p1, p2)));
                last = p2;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                current.push(PathSeg::Cubic(CubicBez::new(last, p1, p2, p3)));
                last = p3;
            }
            PathEl::ClosePath => {
                finish_contour(&mut current, last, start, &mut result);
                last = start;
            }
        }
    }
    finish_contour(&mut current, last, start, &mut result);

    result
}

fn finish_contour(
    current: &mut Vec<PathSeg>,
    last: Point,
    start: Point,
    out: &mut Vec<Vec<PathSeg>>,
) {
    if current.is_empty() {
        return;
    }
    if last.distance(start) > DEGENERATE_LENGTH {
        current.push(PathSeg::Line(Line::new(last, start)));
    }
    current.retain(
        |seg| !matches!(seg, PathSeg::Line(line) if line.p0.distance(line.p1) <= DEGENERATE_LENGTH),
    );
    if !current.is_empty() {
        out.push(take(current));
    }
}

/// Assemble closed contours back into a path.
///
/// A trailing line that returns to the contour start is folded into the
/// `ClosePath`.
pub fn to_path(contours: &[Vec<PathSeg>]) -> BezPath {
    let mut path = BezPath::new();
    for contour in contours {
        let Some(first) = contour.first() else {
            continue;
        };
        let start = first.start();
        path.move_to(start);

        let count = contour.len();
        for (idx, seg) in contour.iter().enumerate() {
            match *seg {
                PathSeg::Line(line) => {
                    if idx + 1 == count && line.p1 == start {
                        break;
                    }
                    path.line_to(line.p1);
                }
                PathSeg::Quad(quad) => path.quad_to(quad.p1, quad.p2),
                PathSeg::Cubic(cubic) => path.curve_to(cubic.p1, cubic.p2, cubic.p3),
            }
        }
        path.close_path();
    }
    path
}

/// Reverse the direction of every contour in the path.
///
/// Glyph outlines are kept in TrueType direction; PostScript outlines run
/// the other way.
pub fn reverse_contours(path: &BezPath) -> BezPath {
    let reversed: Vec<Vec<PathSeg>> = contours(path)
        .into_iter()
        .map(|contour| contour.iter().rev().map(PathSeg::reverse).collect())
        .collect();
    to_path(&reversed)
}

/// Replace every cubic segment by quadratic approximations.
///
/// `accuracy` is the maximum distance, in path units, between a cubic and
/// its approximation.
pub fn to_quadratic(path: &BezPath, accuracy: f64) -> BezPath {
    let converted: Vec<Vec<PathSeg>> = contours(path)
        .into_iter()
        .map(|contour| {
            contour
                .into_iter()
                .flat_map(|seg| match seg {
                    PathSeg::Cubic(cubic) => cubic
                        .to_quads(accuracy)
                        .map(|(_, _, quad)| PathSeg::Quad(quad))
                        .collect::<Vec<_>>(),
                    other => vec![other],
                })
                .collect()
        })
        .collect();
    to_path(&converted)
}
