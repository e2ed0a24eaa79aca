//! Receptar icons CLI library.

pub mod cli;
pub mod timestamp;
