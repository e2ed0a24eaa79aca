use std::{io, path::PathBuf, result};

use thiserror::Error;

use crate::format::FontFormat;

#[derive(Error, Debug)]
pub enum Error {
    #[error("missing asset for '{name}': {}", path.display())]
    MissingAsset { name: String, path: PathBuf },

    #[error("failed to import outline from {}", path.display())]
    OutlineImport {
        path: PathBuf,
        #[source]
        source: receptar_font_outline::Error,
    },

    #[error("failed to remove overlaps at U+{code_point:04X}")]
    OverlapRemoval {
        code_point: u32,
        #[source]
        source: receptar_font_builder::Error,
    },

    #[error("code point U+{0:04X} is used more than once")]
    DuplicateCodePoint(u32),

    #[error("U+{0:04X} is not a Unicode scalar value")]
    InvalidCodePoint(u32),

    #[error("no glyph at U+{0:04X}")]
    UnknownGlyph(u32),

    #[error("failed to generate {format}: {message}")]
    Serialization { format: FontFormat, message: String },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = result::Result<T, Error>;
