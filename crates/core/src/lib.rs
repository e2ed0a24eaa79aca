//! Receptar Icons Core - build pipeline for the Receptar icon font.

pub mod backend;
pub mod config;
pub mod editor;
pub mod error;
pub mod format;
pub mod io;
pub mod pipeline;
pub mod validate;

pub use backend::IconFontEditor;
pub use config::{BuildConfig, GLYPHS, GlyphDef};
pub use editor::FontEditor;
pub use error::{Error, Result};
pub use format::FontFormat;
pub use pipeline::{BuildSummary, build, build_with};
pub use validate::{Problem, Report, check};
