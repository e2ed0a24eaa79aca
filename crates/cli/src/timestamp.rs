//! Build timestamp resolution.

use anyhow::{Context, Result};
use chrono::Utc;
use log::debug;

/// Reproducible-builds override for the embedded timestamp.
pub const SOURCE_DATE_EPOCH: &str = "SOURCE_DATE_EPOCH";

/// Parse a `SOURCE_DATE_EPOCH` value, falling back to the current time when
/// it is unset or empty.
pub fn resolve(value: Option<&str>) -> Result<i64> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => {
            let timestamp = value
                .parse::<i64>()
                .with_context(|| format!("Invalid {SOURCE_DATE_EPOCH}: {value}"))?;
            debug!("using {SOURCE_DATE_EPOCH}={timestamp}");
            Ok(timestamp)
        }
        None => Ok(Utc::now().timestamp()),
    }
}

/// Timestamp for this build from the environment.
pub fn from_env() -> Result<i64> {
    resolve(std::env::var(SOURCE_DATE_EPOCH).ok().as_deref())
}
