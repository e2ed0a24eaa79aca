//! Overlap removal.
//!
//! The outline is flattened and snap rounded onto an integer grid: every
//! segment end and every crossing becomes a hot pixel, and each segment is
//! rerouted through the centers of the hot pixels it passes through. The
//! resulting edges meet only at grid vertices, so the winding number on
//! either side of an edge can be computed exactly. An edge is kept when
//! exactly one of its sides is filled, turned so the filled side is on its
//! right, and linked into contours. Runs of kept edges cut from the same
//! source curve are replaced by that piece of the curve.

use std::collections::{HashMap, HashSet};

use kurbo::{BezPath, CubicBez, Line, ParamCurve, PathSeg, Point, QuadBez};
use log::debug;

use crate::{
    contour::{contours, to_path},
    error::{Error, Result},
};

/// Grid cells per font unit.
const GRID: f64 = 64.0;

/// Maximum distance between a curve and its flattened polyline.
const FLATTEN_TOLERANCE: f64 = 0.05;

/// Upper bound on the polyline pieces of one curve.
const MAX_PIECES: usize = 512;

/// Horizontal bands used to bucket edges for winding queries.
const BANDS: i128 = 64;

/// A grid vertex.
type Vertex = (i64, i64);

/// Rule deciding whether a winding number is inside the outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl FillRule {
    fn is_filled(self, winding: i32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding % 2 != 0,
        }
    }
}

/// Resolve self-overlapping and overlapping contours into a clean outline.
///
/// The result covers the area the input fills under `fill_rule`, up to the
/// flattening tolerance, has no intersecting contours, and runs clockwise
/// around filled regions (y-up). Applying it to its own output only moves
/// points by less than a grid cell.
///
/// Fails with [`Error::OpenContour`] rather than return a boundary that does
/// not close.
pub fn remove_overlap(path: &BezPath, fill_rule: FillRule) -> Result<BezPath> {
    let source: Vec<PathSeg> = contours(path).into_iter().flatten().collect();
    if source.is_empty() {
        return Ok(BezPath::new());
    }

    let fragments = fragments(&source);
    let pixels = hot_pixels(&fragments);
    let mut arrangement = Arrangement::default();
    for fragment in &fragments {
        arrangement.add_fragment(fragment, &pixels);
    }

    let kept = arrangement.boundary(fill_rule);
    let linked = link(&kept, arrangement.vertices.len())?;
    let contours: Vec<Vec<PathSeg>> = linked
        .iter()
        .map(|chain| merge_collinear(rebuild(chain, &kept, &arrangement.vertices, &source)))
        .collect();
    debug!(
        "overlap removal: {} segments, {} fragments, {} hot pixels, {} edges, {} kept, {} contours",
        source.len(),
        fragments.len(),
        pixels.len(),
        arrangement.edges.len(),
        kept.len(),
        contours.len()
    );
    Ok(to_path(&contours))
}

/// A straight piece of a flattened source segment.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    a: Vertex,
    b: Vertex,
    seg: usize,
    t0: f64,
    t1: f64,
}

impl Fragment {
    fn x_range(&self) -> (i64, i64) {
        (self.a.0.min(self.b.0), self.a.0.max(self.b.0))
    }

    fn y_range(&self) -> (i64, i64) {
        (self.a.1.min(self.b.1), self.a.1.max(self.b.1))
    }
}

fn snap(p: Point) -> Vertex {
    ((p.x * GRID).round() as i64, (p.y * GRID).round() as i64)
}

fn unsnap(v: Vertex) -> Point {
    Point::new(v.0 as f64 / GRID, v.1 as f64 / GRID)
}

fn pieces(second_derivative: f64) -> usize {
    let n = (second_derivative / (8.0 * FLATTEN_TOLERANCE)).sqrt().ceil();
    if n.is_finite() { (n as usize).clamp(1, MAX_PIECES) } else { 1 }
}

/// Sample points with their curve parameters, ends included.
fn flatten(seg: &PathSeg) -> Vec<(f64, Point)> {
    let n = match seg {
        PathSeg::Line(_) => 1,
        PathSeg::Quad(q) => {
            pieces(2.0 * (q.p0.to_vec2() - q.p1.to_vec2() * 2.0 + q.p2.to_vec2()).hypot())
        }
        PathSeg::Cubic(c) => {
            let d1 = (c.p0.to_vec2() - c.p1.to_vec2() * 2.0 + c.p2.to_vec2()).hypot();
            let d2 = (c.p1.to_vec2() - c.p2.to_vec2() * 2.0 + c.p3.to_vec2()).hypot();
            pieces(6.0 * d1.max(d2))
        }
    };
    let mut points = Vec::with_capacity(n + 1);
    points.push((0.0, seg.start()));
    for i in 1..n {
        let t = i as f64 / n as f64;
        points.push((t, seg.eval(t)));
    }
    points.push((1.0, seg.end()));
    points
}

fn fragments(source: &[PathSeg]) -> Vec<Fragment> {
    let mut out = Vec::new();
    for (idx, seg) in source.iter().enumerate() {
        let points = flatten(seg);
        for pair in points.windows(2) {
            let (a, b) = (snap(pair[0].1), snap(pair[1].1));
            if a != b {
                out.push(Fragment { a, b, seg: idx, t0: pair[0].0, t1: pair[1].0 });
            }
        }
    }
    out
}

fn cross(a: (i128, i128), b: (i128, i128)) -> i128 {
    a.0 * b.1 - a.1 * b.0
}

fn wide(v: Vertex) -> (i128, i128) {
    (i128::from(v.0), i128::from(v.1))
}

fn sub(a: (i128, i128), b: (i128, i128)) -> (i128, i128) {
    (a.0 - b.0, a.1 - b.1)
}

/// Nearest integer to `num / den` for positive `den`.
fn round_div(num: i128, den: i128) -> i64 {
    (2 * num + den).div_euclid(2 * den) as i64
}

/// Rounded crossing point of two fragments. Parallel fragments share only
/// end points, which are hot pixels already.
fn crossing(f: &Fragment, g: &Fragment) -> Option<Vertex> {
    let (a, r) = (wide(f.a), sub(wide(f.b), wide(f.a)));
    let (c, s) = (wide(g.a), sub(wide(g.b), wide(g.a)));
    let denom = cross(r, s);
    if denom == 0 {
        return None;
    }
    let ac = sub(c, a);
    let (mut t, mut u, mut den) = (cross(ac, s), cross(ac, r), denom);
    if den < 0 {
        (t, u, den) = (-t, -u, -den);
    }
    if t < 0 || t > den || u < 0 || u > den {
        return None;
    }
    Some((round_div(a.0 * den + r.0 * t, den), round_div(a.1 * den + r.1 * t, den)))
}

/// Fragment ends and crossings, sorted by x then y.
fn hot_pixels(fragments: &[Fragment]) -> Vec<Vertex> {
    let mut pixels: HashSet<Vertex> = fragments.iter().flat_map(|f| [f.a, f.b]).collect();

    let mut order: Vec<usize> = (0..fragments.len()).collect();
    order.sort_by_key(|&i| fragments[i].x_range().0);
    for (pos, &i) in order.iter().enumerate() {
        let f = &fragments[i];
        let (_, f_x1) = f.x_range();
        let (f_y0, f_y1) = f.y_range();
        for &j in &order[pos + 1..] {
            let g = &fragments[j];
            if g.x_range().0 > f_x1 {
                break;
            }
            let (g_y0, g_y1) = g.y_range();
            if g_y0 > f_y1 || f_y0 > g_y1 {
                continue;
            }
            if let Some(p) = crossing(f, g) {
                pixels.insert(p);
            }
        }
    }

    let mut pixels: Vec<Vertex> = pixels.into_iter().collect();
    pixels.sort_unstable();
    pixels
}

/// `true` if the segment `a`-`b` touches the closed unit square centered on `p`.
fn passes_through(a: Vertex, b: Vertex, p: Vertex) -> bool {
    let doubled = |v: Vertex| (2 * i128::from(v.0), 2 * i128::from(v.1));
    let (a2, (px, py)) = (doubled(a), doubled(p));
    let dir = sub(doubled(b), a2);
    let sides = [(px - 1, py - 1), (px + 1, py - 1), (px + 1, py + 1), (px - 1, py + 1)]
        .map(|corner| cross(dir, sub(corner, a2)).signum());
    !(sides.iter().all(|&s| s > 0) || sides.iter().all(|&s| s < 0))
}

/// An edge between two vertices, counted once per source fragment laid
/// along it in its direction and minus once per fragment against it.
#[derive(Debug, Clone, Copy)]
struct Edge {
    from: usize,
    to: usize,
    multiplicity: i32,
    seg: usize,
    t0: f64,
    t1: f64,
}

#[derive(Debug, Default)]
struct Arrangement {
    vertices: Vec<Vertex>,
    ids: HashMap<Vertex, usize>,
    edges: Vec<Edge>,
    lookup: HashMap<(usize, usize), usize>,
}

impl Arrangement {
    fn vertex(&mut self, v: Vertex) -> usize {
        *self.ids.entry(v).or_insert_with(|| {
            self.vertices.push(v);
            self.vertices.len() - 1
        })
    }

    /// Route a fragment through every hot pixel it touches.
    fn add_fragment(&mut self, f: &Fragment, pixels: &[Vertex]) {
        let (x0, x1) = f.x_range();
        let (y0, y1) = f.y_range();
        let (a, b) = (wide(f.a), wide(f.b));
        let dir = sub(b, a);
        let length2 = dir.0 * dir.0 + dir.1 * dir.1;

        let start = pixels.partition_point(|p| p.0 < x0);
        let mut stops: Vec<(i128, Vertex)> = pixels[start..]
            .iter()
            .take_while(|p| p.0 <= x1)
            .filter(|p| p.1 >= y0 && p.1 <= y1 && **p != f.a && **p != f.b)
            .filter(|p| passes_through(f.a, f.b, **p))
            .map(|&p| {
                let offset = sub(wide(p), a);
                ((offset.0 * dir.0 + offset.1 * dir.1).clamp(0, length2), p)
            })
            .collect();
        stops.sort_unstable();

        let param = |key: i128| f.t0 + (key as f64 / length2 as f64) * (f.t1 - f.t0);
        let stops = stops.into_iter().map(|(key, p)| (p, param(key))).chain([(f.b, f.t1)]);
        let mut prev = (f.a, f.t0);
        for (p, t) in stops {
            if p != prev.0 {
                self.add_edge(prev.0, p, f.seg, prev.1, t);
            }
            prev = (p, t);
        }
    }

    fn add_edge(&mut self, u: Vertex, v: Vertex, seg: usize, tu: f64, tv: f64) {
        let (from, to) = (self.vertex(u), self.vertex(v));
        let key = (from.min(to), from.max(to));
        match self.lookup.get(&key) {
            Some(&idx) => {
                let edge = &mut self.edges[idx];
                edge.multiplicity += if edge.from == from { 1 } else { -1 };
            }
            None => {
                self.lookup.insert(key, self.edges.len());
                self.edges.push(Edge { from, to, multiplicity: 1, seg, t0: tu, t1: tv });
            }
        }
    }

    /// Edges with exactly one filled side, filled side on the right.
    fn boundary(&self, fill_rule: FillRule) -> Vec<Edge> {
        let doubled = |id: usize| {
            let (x, y) = wide(self.vertices[id]);
            (2 * x, 2 * y)
        };
        let (y_min, y_max) = self
            .vertices
            .iter()
            .map(|v| 2 * i128::from(v.1))
            .fold((i128::MAX, i128::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
        let span = (y_max - y_min).max(0) + 1;
        let band = |y: i128| ((y - y_min).clamp(0, span - 1) * BANDS / span) as usize;

        let mut bands: Vec<Vec<usize>> = vec![Vec::new(); BANDS as usize];
        for (idx, edge) in self.edges.iter().enumerate() {
            if edge.multiplicity == 0 {
                continue;
            }
            let (ya, yb) = (doubled(edge.from).1, doubled(edge.to).1);
            for b in band(ya.min(yb))..=band(ya.max(yb)) {
                bands[b].push(idx);
            }
        }

        let winding = |q: (i128, i128)| -> i32 {
            bands[band(q.1)]
                .iter()
                .map(|&idx| {
                    let edge = &self.edges[idx];
                    let (a, b) = (doubled(edge.from), doubled(edge.to));
                    let side = cross(sub(b, a), sub(q, a));
                    if a.1 <= q.1 && b.1 > q.1 && side > 0 {
                        edge.multiplicity
                    } else if b.1 <= q.1 && a.1 > q.1 && side < 0 {
                        -edge.multiplicity
                    } else {
                        0
                    }
                })
                .sum()
        };

        let mut kept = Vec::new();
        for edge in &self.edges {
            let (a, b) = (wide(self.vertices[edge.from]), wide(self.vertices[edge.to]));
            // the ray test skips the edge itself and reads the side it
            // faces: +x for sloped edges, +y for horizontal ones
            let beside = winding((a.0 + b.0, a.1 + b.1));
            let m = edge.multiplicity;
            let (left, right) = if a.1 != b.1 {
                if b.1 > a.1 { (beside + m, beside) } else { (beside, beside - m) }
            } else if b.0 > a.0 {
                (beside, beside - m)
            } else {
                (beside + m, beside)
            };

            let (left, right) = (fill_rule.is_filled(left), fill_rule.is_filled(right));
            if left == right {
                continue;
            }
            kept.push(if left {
                Edge { from: edge.to, to: edge.from, t0: edge.t1, t1: edge.t0, ..*edge }
            } else {
                *edge
            });
        }
        kept
    }
}

/// Chain edges into closed contours through shared vertices.
///
/// Every vertex of a boundary has as many edges in as out, so a chain can
/// only stop where it started.
fn link(edges: &[Edge], vertex_count: usize) -> Result<Vec<Vec<usize>>> {
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
    for (idx, edge) in edges.iter().enumerate() {
        outgoing[edge.from].push(idx);
    }
    let mut cursor = vec![0usize; vertex_count];

    let mut used = vec![false; edges.len()];
    let mut result = Vec::new();
    for first in 0..edges.len() {
        if used[first] {
            continue;
        }
        used[first] = true;

        let origin = edges[first].from;
        let mut chain = vec![first];
        let mut at = edges[first].to;
        while at != origin {
            let next = loop {
                match outgoing[at].get(cursor[at]) {
                    Some(&e) if used[e] => cursor[at] += 1,
                    Some(&e) => break Some(e),
                    None => break None,
                }
            };
            let Some(next) = next else {
                return Err(Error::OpenContour(chain.len()));
            };
            used[next] = true;
            chain.push(next);
            at = edges[next].to;
        }
        result.push(chain);
    }
    Ok(result)
}

/// Edge `b` picks up the source segment where `a` left it.
fn continues(a: &Edge, b: &Edge) -> bool {
    a.seg == b.seg && a.t1 == b.t0
}

/// Turn a linked chain of edges back into segments.
///
/// Edges cut from one source line become a single line; runs cut from one
/// source curve become that piece of the curve.
fn rebuild(
    chain: &[usize],
    edges: &[Edge],
    vertices: &[Vertex],
    source: &[PathSeg],
) -> Vec<PathSeg> {
    let n = chain.len();
    let start = (0..n)
        .find(|&i| !continues(&edges[chain[(i + n - 1) % n]], &edges[chain[i]]))
        .unwrap_or(0);
    let ordered: Vec<&Edge> = (0..n).map(|i| &edges[chain[(start + i) % n]]).collect();

    let mut out = Vec::with_capacity(n);
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && continues(ordered[j - 1], ordered[j]) {
            j += 1;
        }
        let (first, last) = (ordered[i], ordered[j - 1]);
        let (p0, p1) = (unsnap(vertices[first.from]), unsnap(vertices[last.to]));
        match source[first.seg] {
            PathSeg::Line(_) if p0 != p1 => out.push(PathSeg::Line(Line::new(p0, p1))),
            curve if j - i > 1 && p0 != p1 && !matches!(curve, PathSeg::Line(_)) => {
                out.push(curve_piece(curve, first.t0, last.t1, p0, p1));
            }
            _ => out.extend(ordered[i..j].iter().map(|e| {
                PathSeg::Line(Line::new(unsnap(vertices[e.from]), unsnap(vertices[e.to])))
            })),
        }
        i = j;
    }
    out
}

fn curve_piece(curve: PathSeg, t0: f64, t1: f64, start: Point, end: Point) -> PathSeg {
    let (lo, hi) = (t0.min(t1), t0.max(t1));
    let piece = if lo == 0.0 && hi == 1.0 { curve } else { curve.subsegment(lo..hi) };
    let piece = if t0 > t1 { piece.reverse() } else { piece };
    with_endpoints(piece, start, end)
}

fn with_endpoints(seg: PathSeg, start: Point, end: Point) -> PathSeg {
    match seg {
        PathSeg::Line(_) => PathSeg::Line(Line::new(start, end)),
        PathSeg::Quad(q) => PathSeg::Quad(QuadBez::new(start, q.p1, end)),
        PathSeg::Cubic(c) => PathSeg::Cubic(CubicBez::new(start, c.p1, c.p2, end)),
    }
}

fn merge_collinear(contour: Vec<PathSeg>) -> Vec<PathSeg> {
    let mut out: Vec<PathSeg> = Vec::with_capacity(contour.len());
    for seg in contour {
        if let PathSeg::Line(next) = seg
            && let Some(PathSeg::Line(prev)) = out.last_mut()
            && collinear(*prev, next)
        {
            prev.p1 = next.p1;
            continue;
        }
        out.push(seg);
    }

    if out.len() > 2
        && let (PathSeg::Line(last), PathSeg::Line(first)) = (out[out.len() - 1], out[0])
        && collinear(last, first)
    {
        out[0] = PathSeg::Line(Line::new(last.p0, first.p1));
        out.pop();
    }
    out
}

fn collinear(a: Line, b: Line) -> bool {
    let da = a.p1 - a.p0;
    let db = b.p1 - b.p0;
    let scale = da.hypot() * db.hypot();
    scale > 0.0 && da.cross(db).abs() < 1e-9 * scale && da.dot(db) > 0.0
}

#[cfg(test)]
mod tests {
    use kurbo::{Circle, Rect, Shape};

    use super::*;
    use crate::reverse_contours;

    fn square(x: f64, y: f64, size: f64) -> BezPath {
        Rect::new(x, y, x + size, y + size).to_path(0.1)
    }

    fn contour_count(path: &BezPath) -> usize {
        path.elements().iter().filter(|el| matches!(el, kurbo::PathEl::MoveTo(_))).count()
    }

    fn union(parts: &[BezPath]) -> BezPath {
        let mut path = BezPath::new();
        for part in parts {
            path.extend(part.elements().iter().copied());
        }
        path
    }

    #[test]
    fn test_overlapping_squares_merge() {
        let path = union(&[square(0.0, 0.0, 100.0), square(50.0, 50.0, 100.0)]);
        let merged = remove_overlap(&path, FillRule::NonZero).unwrap();
        assert_eq!(contour_count(&merged), 1);
        assert!((merged.area().abs() - 17500.0).abs() < 1e-6);
    }

    #[test]
    fn test_disjoint_squares_are_kept() {
        let path = union(&[square(0.0, 0.0, 100.0), square(200.0, 0.0, 100.0)]);
        let merged = remove_overlap(&path, FillRule::NonZero).unwrap();
        assert_eq!(contour_count(&merged), 2);
        assert!((merged.area().abs() - 20000.0).abs() < 1e-6);
    }

    #[test]
    fn test_output_runs_clockwise() {
        let path = union(&[square(0.0, 0.0, 100.0), square(50.0, 50.0, 100.0)]);
        assert!(remove_overlap(&path, FillRule::NonZero).unwrap().area() < 0.0);
        let reversed = reverse_contours(&path);
        assert!(remove_overlap(&reversed, FillRule::NonZero).unwrap().area() < 0.0);
    }

    #[test]
    fn test_figure_eight_lobes_both_run_clockwise() {
        let path = BezPath::from_svg("M0,0 L100,100 L100,0 L0,100 Z").unwrap();
        let merged = remove_overlap(&path, FillRule::NonZero).unwrap();
        assert_eq!(contour_count(&merged), 2);
        assert!((merged.area() + 5000.0).abs() < 1e-6);
    }

    #[test]
    fn test_duplicate_contour_collapses() {
        let path = union(&[square(0.0, 0.0, 100.0), square(0.0, 0.0, 100.0)]);
        let merged = remove_overlap(&path, FillRule::NonZero).unwrap();
        assert_eq!(contour_count(&merged), 1);
        assert!((merged.area().abs() - 10000.0).abs() < 1e-6);
    }

    #[test]
    fn test_even_odd_keeps_hole() {
        let path = union(&[square(0.0, 0.0, 300.0), square(100.0, 100.0, 100.0)]);
        let merged = remove_overlap(&path, FillRule::EvenOdd).unwrap();
        assert_eq!(contour_count(&merged), 2);
        assert!((merged.area().abs() - 80000.0).abs() < 1e-6);
    }

    #[test]
    fn test_nonzero_fills_nested_square() {
        let path = union(&[square(0.0, 0.0, 300.0), square(100.0, 100.0, 100.0)]);
        let merged = remove_overlap(&path, FillRule::NonZero).unwrap();
        assert_eq!(contour_count(&merged), 1);
        assert!((merged.area().abs() - 90000.0).abs() < 1e-6);
    }

    #[test]
    fn test_overlapping_circles_keep_curves() {
        let circle = Circle::new((0.0, 0.0), 100.0).to_path(0.1);
        let single = circle.area().abs();
        let path = union(&[circle, Circle::new((100.0, 0.0), 100.0).to_path(0.1)]);
        let merged = remove_overlap(&path, FillRule::NonZero).unwrap();
        assert_eq!(contour_count(&merged), 1);
        let area = merged.area().abs();
        assert!(area > single && area < 2.0 * single);
        assert!(merged.elements().iter().any(|el| matches!(el, kurbo::PathEl::CurveTo(..))));
    }

    #[test]
    fn test_second_pass_is_stable() {
        let path = union(&[square(0.0, 0.0, 100.0), square(50.0, 50.0, 100.0)]);
        let once = remove_overlap(&path, FillRule::NonZero).unwrap();
        let twice = remove_overlap(&once, FillRule::NonZero).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_path() {
        let merged = remove_overlap(&BezPath::new(), FillRule::NonZero).unwrap();
        assert!(merged.elements().is_empty());
    }

    #[test]
    fn test_crossing_rounds_to_grid() {
        let f = Fragment { a: (0, 0), b: (10, 10), seg: 0, t0: 0.0, t1: 1.0 };
        let g = Fragment { a: (0, 10), b: (10, 0), seg: 1, t0: 0.0, t1: 1.0 };
        assert_eq!(crossing(&f, &g), Some((5, 5)));

        let g = Fragment { a: (0, 1), b: (3, 0), seg: 1, t0: 0.0, t1: 1.0 };
        let f = Fragment { a: (0, 0), b: (3, 1), seg: 0, t0: 0.0, t1: 1.0 };
        assert_eq!(crossing(&f, &g), Some((2, 1)));

        let g = Fragment { a: (0, 5), b: (10, 5), seg: 1, t0: 0.0, t1: 1.0 };
        let f = Fragment { a: (0, 0), b: (10, 0), seg: 0, t0: 0.0, t1: 1.0 };
        assert_eq!(crossing(&f, &g), None);
    }

    #[test]
    fn test_passes_through_touches_closed_cell() {
        assert!(passes_through((0, 0), (10, 0), (5, 0)));
        assert!(!passes_through((0, 0), (10, 0), (5, 1)));
        // grazing the corner of the cell counts
        assert!(passes_through((0, 0), (10, 10), (6, 5)));
        assert!(!passes_through((0, 0), (10, 10), (7, 5)));
    }

    #[test]
    fn test_unbalanced_edges_fail_to_link() {
        let edge = |from, to| Edge { from, to, multiplicity: 1, seg: 0, t0: 0.0, t1: 1.0 };
        let result = link(&[edge(0, 1), edge(1, 2)], 3);
        assert!(matches!(result, Err(Error::OpenContour(2))));

        let closed = link(&[edge(0, 1), edge(1, 2), edge(2, 0)], 3).unwrap();
        assert_eq!(closed, vec![vec![0, 1, 2]]);
    }
}
