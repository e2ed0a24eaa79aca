//! # Font Builder
//!
//! An in-memory icon font and its compilation to binary sfnt fonts.
//!
//! [`IconFont`] holds one outline glyph per code point. It compiles either
//! to TrueType outlines ([`IconFont::compile_ttf`]) or to CFF outlines
//! ([`IconFont::compile_otf`]). Both flavors share `head`, `hhea`, `hmtx`,
//! `cmap`, `OS/2`, `name` and `post`, and both are deterministic for a
//! given [`FontInfo::timestamp`].
//!
//! ## Example
//!
//! ```no_run
//! use kurbo::{Rect, Shape};
//! use receptar_font_builder::{FontInfo, IconFont};
//!
//! let mut font = IconFont::new(FontInfo::new("Receptar Icons"));
//! let glyph = font.create_glyph(0xE108).unwrap();
//! glyph.append(&Rect::new(100.0, 0.0, 800.0, 700.0).to_path(0.1));
//! glyph.advance = 900;
//! font.remove_overlap().unwrap();
//!
//! let ttf = font.compile_ttf().unwrap();
//! let otf = font.compile_otf().unwrap();
//! ```

mod cff;
mod error;
mod font;
mod otf;
mod sfnt;
mod tables;
mod ttf;

pub use error::{Error, Result};
pub use font::{FontInfo, Glyph, IconFont};
