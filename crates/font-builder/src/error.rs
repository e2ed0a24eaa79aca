use std::result;

use thiserror::Error;
use write_fonts::{BuilderError, error, tables::cmap::CmapConflict};

#[derive(Error, Debug)]
pub enum Error {
    #[error("code point U+{0:04X} already has a glyph")]
    DuplicateCodePoint(u32),

    #[error("U+{0:04X} is not a Unicode scalar value")]
    InvalidCodePoint(u32),

    #[error("failed to write table: {0}")]
    WriteError(#[from] error::Error),

    #[error("failed to build font: {0}")]
    BuilderError(#[from] BuilderError),

    #[error("failed to build cmap: {0}")]
    CmapError(#[from] CmapConflict),

    #[error("glyph '{glyph}' has a malformed outline: {reason}")]
    MalformedOutline { glyph: String, reason: String },

    #[error("failed to remove overlaps in glyph '{glyph}'")]
    Overlap {
        glyph: String,
        #[source]
        source: receptar_font_outline::Error,
    },
}

pub type Result<T> = result::Result<T, Error>;
