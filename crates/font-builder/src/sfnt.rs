//! Post-processing of assembled sfnt files.

use log::debug;
use read_fonts::tables::compute_checksum;

/// sfnt version of fonts with CFF outlines.
pub(crate) const OTTO: [u8; 4] = *b"OTTO";

const TABLE_RECORDS_START: usize = 12;
const TABLE_RECORD_LEN: usize = 16;
const CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;

/// Replace the sfnt version and recompute `head.checkSumAdjustment`.
pub(crate) fn set_sfnt_version(data: &mut [u8], version: [u8; 4]) {
    data[..4].copy_from_slice(&version);
    update_checksum_adjustment(data);
}

/// Recompute `head.checkSumAdjustment` over the whole file.
pub(crate) fn update_checksum_adjustment(data: &mut [u8]) {
    let Some(head) = head_offset(data) else {
        debug!("no head table, checksum adjustment left as is");
        return;
    };
    let field = head + CHECKSUM_ADJUSTMENT_OFFSET;
    data[field..field + 4].copy_from_slice(&[0; 4]);
    let adjustment = 0xB1B0_AFBAu32.wrapping_sub(compute_checksum(data));
    data[field..field + 4].copy_from_slice(&adjustment.to_be_bytes());
}

fn head_offset(data: &[u8]) -> Option<usize> {
    let num_tables = u16::from_be_bytes(data.get(4..6)?.try_into().ok()?) as usize;
    (0..num_tables).find_map(|idx| {
        let record = data.get(TABLE_RECORDS_START + idx * TABLE_RECORD_LEN..)?;
        if record.get(..4)? != b"head" {
            return None;
        }
        let offset = u32::from_be_bytes(record.get(8..12)?.try_into().ok()?) as usize;
        (offset + CHECKSUM_ADJUSTMENT_OFFSET + 4 <= data.len()).then_some(offset)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One-table font whose `head` is 12 zero bytes.
    fn tiny_font() -> Vec<u8> {
        let mut data = vec![0, 1, 0, 0, 0, 1, 0, 16, 0, 0, 0, 0];
        data.extend_from_slice(b"head");
        data.extend_from_slice(&[0; 4]);
        data.extend_from_slice(&28u32.to_be_bytes());
        data.extend_from_slice(&12u32.to_be_bytes());
        data.extend_from_slice(&[0; 12]);
        data
    }

    #[test]
    fn test_whole_file_sums_to_magic() {
        let mut data = tiny_font();
        set_sfnt_version(&mut data, OTTO);
        assert_eq!(&data[..4], b"OTTO");
        assert_eq!(compute_checksum(&data), 0xB1B0_AFBA);
    }

    #[test]
    fn test_missing_head_is_ignored() {
        let mut data = vec![0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        update_checksum_adjustment(&mut data);
        assert_eq!(data, vec![0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }
}
