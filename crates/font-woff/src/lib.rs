//! # Font WOFF
//!
//! Web font containers for a compiled sfnt.
//!
//! [`encode_woff`] writes WOFF 1.0 with zlib-compressed tables;
//! [`encode_woff2`] writes WOFF2 through `ttf2woff2`.
//!
//! ## Example
//!
//! ```no_run
//! use receptar_font_woff::{encode_woff, encode_woff2};
//!
//! let ttf = std::fs::read("receptar-icons.ttf").unwrap();
//! let woff = encode_woff(&ttf).unwrap();
//! let woff2 = encode_woff2(&ttf).unwrap();
//! ```

mod woff;
mod woff2;

pub use woff::{WOFF_SIGNATURE, encode_woff};
pub use woff2::{WOFF2_SIGNATURE, encode_woff2};
