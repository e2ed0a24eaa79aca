use std::fs;

use read_fonts::{
    FontRef, TableProvider,
    tables::glyf::{Glyph, SimpleGlyph},
    types::GlyphId,
};
use receptar_icons_core::{BuildConfig, Error, FontFormat, GLYPHS, build, check};
use tempfile::TempDir;

/// Outlined, stroked and even-odd icons, cycled over the glyph table.
const ICONS: &[&str] = &[
    r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 512 512">
        <path d="M256 112v288M400 256H112" fill="none" stroke="currentColor"
              stroke-linecap="round" stroke-width="32"/>
    </svg>"#,
    r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 512 512">
        <circle cx="221" cy="221" r="157"/>
        <rect x="300" y="300" width="150" height="60" transform="rotate(45 375 330)"/>
    </svg>"#,
    r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 512 512">
        <path fill-rule="evenodd" d="M64 64h384v384H64z M128 128h256v256H128z"/>
    </svg>"#,
    r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 512 512">
        <g transform="translate(32 32)">
            <polygon points="224,16 288,176 448,176 320,272 368,432 224,336 80,432 128,272 0,176 160,176"/>
        </g>
    </svg>"#,
];

/// An outline icon: a closed curved path drawn with a round-joined stroke.
const STROKED_HEART: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 512 512">
    <path d="M352.92 80C288 80 256 144 256 144s-32-64-96.92-64c-52.76 0-94.54 44.14-95.08 96.81-1.1 109.33 86.73 187.08 183 252.42a16 16 0 0018 0c96.26-65.34 184.09-143.09 183-252.42-.54-52.67-42.32-96.81-95.08-96.81z"
          fill="none" stroke="currentColor" stroke-linecap="round" stroke-linejoin="round" stroke-width="32"/>
</svg>"#;

fn project() -> (TempDir, BuildConfig) {
    let dir = TempDir::new().unwrap();
    let config = BuildConfig::new(dir.path()).with_timestamp(1_700_000_000);
    fs::create_dir_all(config.icons_path()).unwrap();
    for (idx, glyph) in GLYPHS.iter().enumerate() {
        fs::write(config.source_path(glyph), ICONS[idx % ICONS.len()]).unwrap();
    }
    (dir, config)
}

#[test]
fn test_build_writes_every_format() {
    let (_dir, config) = project();
    let summary = build(&config).unwrap();
    assert_eq!(summary.glyph_count, 18);
    assert_eq!(summary.outputs.len(), 4);

    for format in FontFormat::ALL {
        let path = config.output_path(format);
        let data = fs::read(&path).unwrap();
        assert!(!data.is_empty(), "{} is empty", path.display());
        let signature: &[u8] = match format {
            FontFormat::Woff2 => b"wOF2",
            FontFormat::Woff => b"wOFF",
            FontFormat::Ttf => &[0, 1, 0, 0],
            FontFormat::Otf => b"OTTO",
        };
        assert_eq!(&data[..4], signature);
    }
    let woff2 = config.output_path(FontFormat::Woff2);
    assert!(woff2.ends_with("priv/static/fonts/receptar-icons.woff2"));
}

#[test]
fn test_every_icon_has_fixed_advance() {
    let (_dir, config) = project();
    build(&config).unwrap();

    for format in [FontFormat::Ttf, FontFormat::Otf] {
        let data = fs::read(config.output_path(format)).unwrap();
        let font = FontRef::new(&data).unwrap();
        assert_eq!(font.maxp().unwrap().num_glyphs(), 19);

        let cmap = font.cmap().unwrap();
        let hmtx = font.hmtx().unwrap();
        for glyph in GLYPHS {
            let gid = cmap.map_codepoint(glyph.code_point).unwrap();
            assert_ne!(gid, GlyphId::NOTDEF);
            assert_eq!(hmtx.advance(gid), Some(900), "{} in {format}", glyph.name);
        }
    }
}

#[test]
fn test_search_glyph() {
    let (_dir, config) = project();
    build(&config).unwrap();

    let data = fs::read(config.output_path(FontFormat::Ttf)).unwrap();
    let font = FontRef::new(&data).unwrap();
    let gid = font.cmap().unwrap().map_codepoint(0xE410u32).unwrap();
    assert_eq!(font.hmtx().unwrap().advance(gid), Some(900));
    let glyph = outline(&font, gid);
    assert!(glyph.number_of_contours() > 0, "search glyph has no outline");
    assert_within_em(&glyph);
}

#[test]
fn test_stroked_heart_is_one_ring() {
    let (_dir, config) = project();
    fs::write(config.icons_path().join("heart.svg"), STROKED_HEART).unwrap();
    build(&config).unwrap();

    let data = fs::read(config.output_path(FontFormat::Ttf)).unwrap();
    let font = FontRef::new(&data).unwrap();
    let gid = font.cmap().unwrap().map_codepoint(0x433u32).unwrap();
    let glyph = outline(&font, gid);
    assert_within_em(&glyph);
    let Glyph::Simple(simple) = glyph else {
        panic!("heart is a composite glyph");
    };

    // outer edge clockwise, the hole counter-clockwise
    let mut areas = contour_areas(&simple);
    areas.sort_by(f64::total_cmp);
    assert_eq!(areas.len(), 2, "stroke outline left {} contours", areas.len());
    assert!(areas[0] < 0.0 && areas[1] > 0.0);
    assert!(areas[0].abs() > areas[1]);
}

#[test]
fn test_missing_heart_fails_before_output() {
    let (_dir, config) = project();
    fs::remove_file(config.icons_path().join("heart.svg")).unwrap();

    let err = build(&config).unwrap_err();
    match err {
        Error::MissingAsset { name, path } => {
            assert_eq!(name, "heart");
            assert!(path.ends_with("heart.svg"));
        }
        other => panic!("unexpected error: {other}"),
    }
    for format in FontFormat::ALL {
        assert!(!config.output_path(format).exists());
    }
}

#[test]
fn test_build_is_reproducible() {
    let (_dir, config) = project();
    build(&config).unwrap();
    let first: Vec<Vec<u8>> =
        FontFormat::ALL.iter().map(|&f| fs::read(config.output_path(f)).unwrap()).collect();

    build(&config).unwrap();
    for (format, before) in FontFormat::ALL.iter().zip(first) {
        assert_eq!(fs::read(config.output_path(*format)).unwrap(), before, "{format} differs");
    }
}

#[test]
fn test_check_reports_missing_assets() {
    let (_dir, config) = project();
    assert!(check(&config).is_ok());

    fs::remove_file(config.icons_path().join("heart.svg")).unwrap();
    fs::remove_file(config.icons_path().join("add.svg")).unwrap();
    let report = check(&config);
    assert_eq!(report.problems.len(), 2);
}

#[test]
fn test_format_subset() {
    let (_dir, config) = project();
    let config = config.with_formats(vec![FontFormat::Woff]);
    let summary = build(&config).unwrap();
    assert_eq!(summary.outputs, vec![config.output_path(FontFormat::Woff)]);
    assert!(!config.output_path(FontFormat::Ttf).exists());
}

fn outline<'a>(font: &FontRef<'a>, gid: GlyphId) -> Glyph<'a> {
    let glyf = font.glyf().unwrap();
    let loca = font.loca(None).unwrap();
    loca.get_glyf(gid, &glyf).unwrap().expect("glyph has no outline")
}

fn assert_within_em(glyph: &Glyph) {
    assert!(glyph.x_min() >= 0 && glyph.x_max() <= 1000);
    assert!(glyph.y_min() >= -200 && glyph.y_max() <= 800);
    assert!(glyph.x_min() < glyph.x_max() && glyph.y_min() < glyph.y_max());
}

/// Signed area of each contour's control polygon.
fn contour_areas(glyph: &SimpleGlyph) -> Vec<f64> {
    let points: Vec<_> = glyph.points().collect();
    let mut areas = Vec::new();
    let mut start = 0;
    for end in glyph.end_pts_of_contours() {
        let end = usize::from(end.get());
        let ring = &points[start..=end];
        let twice: f64 = ring
            .iter()
            .zip(ring.iter().cycle().skip(1))
            .map(|(a, b)| f64::from(a.x) * f64::from(b.y) - f64::from(b.x) * f64::from(a.y))
            .sum();
        areas.push(twice / 2.0);
        start = end + 1;
    }
    areas
}
