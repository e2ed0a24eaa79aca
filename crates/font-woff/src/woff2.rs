use anyhow::{Result, anyhow, ensure};
use log::info;
use ttf2woff2::{BrotliQuality, encode};

/// `wOF2`
pub const WOFF2_SIGNATURE: [u8; 4] = *b"wOF2";

/// Encode a TrueType-flavored sfnt as WOFF2 at the default Brotli quality.
pub fn encode_woff2(sfnt: &[u8]) -> Result<Vec<u8>> {
    ensure!(sfnt.len() >= 12, "input is too short to be an sfnt ({} bytes)", sfnt.len());

    let woff2 =
        encode(sfnt, BrotliQuality::default()).map_err(|e| anyhow!("WOFF2 encoding failed: {e:?}"))?;

    info!("encoded WOFF2: {} -> {} bytes", sfnt.len(), woff2.len());
    Ok(woff2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_truncated_input() {
        assert!(encode_woff2(&[0, 1, 0]).is_err());
    }
}
