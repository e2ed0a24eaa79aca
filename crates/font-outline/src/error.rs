//! Error types for outline import and overlap removal.

use std::result;

/// Errors that can occur while importing or normalizing an outline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse SVG document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("root element is <{0}>, expected <svg>")]
    NotSvg(String),

    #[error("invalid viewBox '{0}'")]
    ViewBox(String),

    #[error("invalid path data: {0}")]
    PathData(String),

    #[error("invalid number '{0}'")]
    Number(String),

    #[error("invalid transform '{0}'")]
    Transform(String),

    #[error("document contains no drawable geometry")]
    Empty,

    #[error("overlap removal left a chain of {0} boundary edges open")]
    OpenContour(usize),
}

pub type Result<T> = result::Result<T, Error>;
