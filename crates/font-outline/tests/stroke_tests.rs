use kurbo::{BezPath, PathEl, Point, Shape};
use receptar_font_outline::{EmBox, FillRule, import_svg, remove_overlap};

/// Outline icons drawn with round-capped strokes and curved joins.
const STROKED: &[(&str, &str)] = &[
    (
        "home",
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 512 512">
            <path d="M80 212v236a16 16 0 0016 16h96V328a24 24 0 0124-24h80a24 24 0 0124 24v136h96a16 16 0 0016-16V212"
                  fill="none" stroke="currentColor" stroke-linecap="round" stroke-linejoin="round" stroke-width="32"/>
            <path d="M480 256L266.89 52c-5-5.28-16.69-5.34-21.78 0L32 256M400 179V64h-48v69"
                  fill="none" stroke="currentColor" stroke-linecap="round" stroke-linejoin="round" stroke-width="32"/>
        </svg>"#,
    ),
    (
        "heart",
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 512 512">
            <path d="M352.92 80C288 80 256 144 256 144s-32-64-96.92-64c-52.76 0-94.54 44.14-95.08 96.81-1.1 109.33 86.73 187.08 183 252.42a16 16 0 0018 0c96.26-65.34 184.09-143.09 183-252.42-.54-52.67-42.32-96.81-95.08-96.81z"
                  fill="none" stroke="currentColor" stroke-linecap="round" stroke-linejoin="round" stroke-width="32"/>
        </svg>"#,
    ),
    (
        "person",
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 512 512">
            <path d="M344 144c-3.92 52.87-44 96-88 96s-84.15-43.12-88-96c-4-55 35-96 88-96s92 42 88 96z"
                  fill="none" stroke="currentColor" stroke-linecap="round" stroke-linejoin="round" stroke-width="32"/>
            <path d="M256 304c-87 0-175.3 48-191.64 138.6C62.39 453.52 68.57 464 80 464h352c11.44 0 17.62-10.48 15.65-21.4C431.3 352 343 304 256 304z"
                  fill="none" stroke="currentColor" stroke-miterlimit="10" stroke-width="32"/>
        </svg>"#,
    ),
];

/// Sample points across the em box: 100 by 100 cell centers.
const SAMPLES: usize = 100;

/// Sample points allowed to disagree, for points within the flattening
/// tolerance of a boundary.
const MAX_MISMATCHES: usize = 20;

fn windings(path: &BezPath) -> Vec<i32> {
    let mut out = Vec::with_capacity(SAMPLES * SAMPLES);
    for i in 0..SAMPLES {
        for j in 0..SAMPLES {
            let p = Point::new(5.0 + 10.0 * i as f64, -195.0 + 10.0 * j as f64);
            out.push(path.winding(p));
        }
    }
    out
}

fn mismatches(a: &[i32], b: &[i32]) -> usize {
    a.iter().zip(b).filter(|(a, b)| (**a != 0) != (**b != 0)).count()
}

fn contour_count(path: &BezPath) -> usize {
    path.elements().iter().filter(|el| matches!(el, PathEl::MoveTo(_))).count()
}

#[test]
fn test_stroked_icons_keep_covered_area() {
    for (name, svg) in STROKED {
        let outline = import_svg(svg, EmBox::DEFAULT).unwrap();
        let merged = remove_overlap(&outline, FillRule::NonZero).unwrap();

        let before = windings(&outline);
        let after = windings(&merged);
        let covered = before.iter().filter(|w| **w != 0).count();
        assert!(covered > 500, "{name} covers only {covered} samples");
        let wrong = mismatches(&before, &after);
        assert!(wrong <= MAX_MISMATCHES, "{name}: {wrong} of {covered} samples changed");
    }
}

#[test]
fn test_stroked_icons_wind_once_clockwise() {
    for (name, svg) in STROKED {
        let outline = import_svg(svg, EmBox::DEFAULT).unwrap();
        let merged = remove_overlap(&outline, FillRule::NonZero).unwrap();
        assert!(merged.area() < 0.0, "{name} is not clockwise");

        let filled: Vec<i32> = windings(&merged).into_iter().filter(|w| *w != 0).collect();
        assert!(!filled.is_empty(), "{name} lost its outline");
        assert_eq!(filled[0].abs(), 1, "{name} still overlaps itself");
        assert!(filled.iter().all(|w| *w == filled[0]), "{name} mixes directions");
    }
}

#[test]
fn test_stroked_icons_survive_a_second_pass() {
    for (name, svg) in STROKED {
        let outline = import_svg(svg, EmBox::DEFAULT).unwrap();
        let once = remove_overlap(&outline, FillRule::NonZero).unwrap();
        let twice = remove_overlap(&once, FillRule::NonZero).unwrap();

        assert_eq!(contour_count(&once), contour_count(&twice), "{name}");
        assert!(twice.area() < 0.0, "{name} flipped direction");
        let drift = (once.area() - twice.area()).abs() / once.area().abs();
        assert!(drift < 1e-3, "{name} area drifted by {drift}");
        let wrong = mismatches(&windings(&once), &windings(&twice));
        assert!(wrong <= MAX_MISMATCHES, "{name}: {wrong} samples changed");
    }
}
