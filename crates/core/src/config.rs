//! Configuration for Receptar icon font builds.

use std::{
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

use crate::format::FontFormat;

/// Directory holding the SVG sources, relative to the project root.
pub const ICONS_DIR: &str = "priv/static/icons";

/// Directory the font files are written to, relative to the project root.
pub const FONTS_DIR: &str = "priv/static/fonts";

/// Base name of every output file.
pub const FONT_NAME: &str = "receptar-icons";

/// Advance width given to every icon, in font units.
pub const ADVANCE_WIDTH: u16 = 900;

/// The BMP Private Use Area.
pub const PRIVATE_USE_AREA: RangeInclusive<u32> = 0xE000..=0xF8FF;

/// One icon: a name for progress output, its code point and its SVG source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphDef {
    pub name: &'static str,
    pub code_point: u32,
    pub source: &'static str,
}

impl GlyphDef {
    pub const fn new(name: &'static str, code_point: u32, source: &'static str) -> Self {
        Self { name, code_point, source }
    }
}

/// The icon set, in build order.
pub const GLYPHS: &[GlyphDef] = &[
    GlyphDef::new("add", 0xE108, "add.svg"),
    GlyphDef::new("edit", 0xE041, "create.svg"),
    GlyphDef::new("delete", 0xE12C, "trash.svg"),
    GlyphDef::new("cancel", 0xE10F, "close.svg"),
    GlyphDef::new("submit", 0xE029, "checkmark-done.svg"),
    GlyphDef::new("reset", 0xE10E, "arrow-undo.svg"),
    GlyphDef::new("up", 0xE039, "arrow-up.svg"),
    GlyphDef::new("down", 0xE03A, "arrow-down.svg"),
    GlyphDef::new("settings", 0xE401, "settings.svg"),
    GlyphDef::new("user", 0xE402, "person.svg"),
    GlyphDef::new("user-add", 0xE403, "person-add.svg"),
    GlyphDef::new("login", 0xE404, "login.svg"),
    GlyphDef::new("logout", 0xE405, "logout.svg"),
    GlyphDef::new("search", 0xE410, "search.svg"),
    GlyphDef::new("language", 0xE420, "language.svg"),
    GlyphDef::new("home", 0xE421, "home.svg"),
    GlyphDef::new("star", 0xE422, "star.svg"),
    // outside the Private Use Area; kept as published
    GlyphDef::new("heart", 0x433, "heart.svg"),
];

/// Everything a build needs to know.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub root: PathBuf,
    /// Relative to `root` unless absolute.
    pub icons_dir: PathBuf,
    /// Relative to `root` unless absolute.
    pub fonts_dir: PathBuf,
    pub name: String,
    pub advance_width: u16,
    pub glyphs: Vec<GlyphDef>,
    pub formats: Vec<FontFormat>,
    /// Seconds since the Unix epoch written into the font. The current time
    /// when unset.
    pub timestamp: Option<i64>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

impl BuildConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            icons_dir: PathBuf::from(ICONS_DIR),
            fonts_dir: PathBuf::from(FONTS_DIR),
            name: FONT_NAME.to_string(),
            advance_width: ADVANCE_WIDTH,
            glyphs: GLYPHS.to_vec(),
            formats: FontFormat::ALL.to_vec(),
            timestamp: None,
        }
    }

    pub fn with_icons_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.icons_dir = dir.into();
        self
    }

    pub fn with_fonts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fonts_dir = dir.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_glyphs(mut self, glyphs: impl Into<Vec<GlyphDef>>) -> Self {
        self.glyphs = glyphs.into();
        self
    }

    pub fn with_formats(mut self, formats: impl Into<Vec<FontFormat>>) -> Self {
        self.formats = formats.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn icons_path(&self) -> PathBuf {
        self.root.join(&self.icons_dir)
    }

    pub fn fonts_path(&self) -> PathBuf {
        self.root.join(&self.fonts_dir)
    }

    pub fn source_path(&self, glyph: &GlyphDef) -> PathBuf {
        self.icons_path().join(glyph.source)
    }

    pub fn output_path(&self, format: FontFormat) -> PathBuf {
        self.fonts_path().join(format!("{}.{}", self.name, format.extension()))
    }

    /// Human-readable family name: `receptar-icons` becomes `Receptar Icons`.
    pub fn family_name(&self) -> String {
        family_name(&self.name)
    }
}

fn family_name(file_name: &str) -> String {
    file_name
        .split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `true` if `path` exists and is a regular file.
pub(crate) fn is_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}
