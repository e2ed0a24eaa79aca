//! Pre-flight checks over the glyph table and its source files.

use std::{collections::HashMap, fmt, path::PathBuf};

use log::warn;

use crate::{
    config::{BuildConfig, GlyphDef, PRIVATE_USE_AREA, is_file},
    error::{Error, Result},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    DuplicateCodePoint { name: String, code_point: u32, first: String },
    InvalidCodePoint { name: String, code_point: u32 },
    MissingAsset { name: String, path: PathBuf },
}

impl Problem {
    fn into_error(self) -> Error {
        match self {
            Problem::DuplicateCodePoint { code_point, .. } => Error::DuplicateCodePoint(code_point),
            Problem::InvalidCodePoint { code_point, .. } => Error::InvalidCodePoint(code_point),
            Problem::MissingAsset { name, path } => Error::MissingAsset { name, path },
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::DuplicateCodePoint { name, code_point, first } => {
                write!(f, "{name}: U+{code_point:04X} is already used by '{first}'")
            }
            Problem::InvalidCodePoint { name, code_point } => {
                write!(f, "{name}: U+{code_point:04X} is not a Unicode scalar value")
            }
            Problem::MissingAsset { name, path } => {
                write!(f, "{name}: missing {}", path.display())
            }
        }
    }
}

/// Outcome of [`check`]. Warnings never fail a build.
#[derive(Debug, Default)]
pub struct Report {
    pub problems: Vec<Problem>,
    pub warnings: Vec<String>,
}

impl Report {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Problems in the table itself, in table order.
pub fn table_problems(glyphs: &[GlyphDef]) -> Vec<Problem> {
    let mut seen: HashMap<u32, &str> = HashMap::new();
    let mut problems = Vec::new();
    for glyph in glyphs {
        if char::from_u32(glyph.code_point).is_none() {
            problems.push(Problem::InvalidCodePoint {
                name: glyph.name.to_string(),
                code_point: glyph.code_point,
            });
        }
        if let Some(first) = seen.insert(glyph.code_point, glyph.name) {
            problems.push(Problem::DuplicateCodePoint {
                name: glyph.name.to_string(),
                code_point: glyph.code_point,
                first: first.to_string(),
            });
            // keep reporting against the first owner
            seen.insert(glyph.code_point, first);
        }
    }
    problems
}

/// Source files that do not exist, in table order.
pub fn missing_assets(config: &BuildConfig) -> Vec<Problem> {
    config
        .glyphs
        .iter()
        .map(|glyph| (glyph, config.source_path(glyph)))
        .filter(|(_, path)| !is_file(path))
        .map(|(glyph, path)| Problem::MissingAsset { name: glyph.name.to_string(), path })
        .collect()
}

/// Code points outside the Private Use Area.
pub fn non_pua_warnings(glyphs: &[GlyphDef]) -> Vec<String> {
    glyphs
        .iter()
        .filter(|g| !PRIVATE_USE_AREA.contains(&g.code_point))
        .map(|g| format!("{}: U+{:04X} is outside the Private Use Area", g.name, g.code_point))
        .collect()
}

/// Run every check without touching the fonts directory.
pub fn check(config: &BuildConfig) -> Report {
    let mut problems = table_problems(&config.glyphs);
    problems.extend(missing_assets(config));
    Report { problems, warnings: non_pua_warnings(&config.glyphs) }
}

/// Fail with the first table problem, logging non-PUA code points.
pub fn validate_table(glyphs: &[GlyphDef]) -> Result<()> {
    if let Some(problem) = table_problems(glyphs).into_iter().next() {
        return Err(problem.into_error());
    }
    for warning in non_pua_warnings(glyphs) {
        warn!("{warning}");
    }
    Ok(())
}
