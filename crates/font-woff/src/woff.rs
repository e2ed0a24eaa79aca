use std::io::Write;

use anyhow::{Context, Result};
use flate2::{Compression, write::ZlibEncoder};
use log::{debug, info};
use read_fonts::{FontRef, TableProvider};

/// `wOFF`
pub const WOFF_SIGNATURE: [u8; 4] = *b"wOFF";

const HEADER_LEN: usize = 44;
const DIRECTORY_ENTRY_LEN: usize = 20;
const SFNT_HEADER_LEN: usize = 12;
const SFNT_RECORD_LEN: usize = 16;

struct Entry {
    tag: [u8; 4],
    checksum: u32,
    orig_length: u32,
    data: Vec<u8>,
}

fn round4(len: usize) -> usize {
    (len + 3) & !3
}

/// zlib-compress a table, keeping it uncompressed when that is not smaller.
fn compress(table: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(table)?;
    let compressed = encoder.finish()?;
    Ok(if compressed.len() < table.len() { compressed } else { table.to_vec() })
}

/// Encode an sfnt (TrueType or CFF flavored) as WOFF 1.0.
///
/// The flavor is copied from the input. Tables are written in tag order,
/// each zlib-compressed when that makes it smaller.
pub fn encode_woff(sfnt: &[u8]) -> Result<Vec<u8>> {
    let font = FontRef::new(sfnt).context("Failed to parse font")?;
    let flavor = font.table_directory.sfnt_version();
    let (major, minor) = match font.head() {
        Ok(head) => {
            let revision = head.font_revision().to_f64();
            (revision.trunc() as u16, ((revision.fract() * 1000.0).round()) as u16)
        }
        Err(_) => (0, 0),
    };

    let mut records: Vec<_> = font.table_directory.table_records().iter().collect();
    records.sort_by_key(|record| record.tag());

    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        let tag = record.tag();
        let table = font
            .table_data(tag)
            .with_context(|| format!("Table '{tag}' is out of bounds"))?;
        let table = table.as_bytes();
        let data = compress(table).with_context(|| format!("Failed to compress '{tag}'"))?;
        debug!("{tag}: {} -> {} bytes", table.len(), data.len());
        entries.push(Entry {
            tag: tag.into_bytes(),
            checksum: record.checksum(),
            orig_length: table.len() as u32,
            data,
        });
    }

    let total_sfnt_size = SFNT_HEADER_LEN
        + SFNT_RECORD_LEN * entries.len()
        + entries.iter().map(|e| round4(e.orig_length as usize)).sum::<usize>();

    let directory_len = DIRECTORY_ENTRY_LEN * entries.len();
    let mut offset = HEADER_LEN + directory_len;
    let mut directory = Vec::with_capacity(directory_len);
    let mut body = Vec::new();
    for entry in &entries {
        directory.extend_from_slice(&entry.tag);
        directory.extend_from_slice(&(offset as u32).to_be_bytes());
        directory.extend_from_slice(&(entry.data.len() as u32).to_be_bytes());
        directory.extend_from_slice(&entry.orig_length.to_be_bytes());
        directory.extend_from_slice(&entry.checksum.to_be_bytes());

        body.extend_from_slice(&entry.data);
        body.resize(round4(body.len()), 0);
        offset = HEADER_LEN + directory_len + body.len();
    }

    let length = HEADER_LEN + directory.len() + body.len();
    let mut out = Vec::with_capacity(length);
    out.extend_from_slice(&WOFF_SIGNATURE);
    out.extend_from_slice(&flavor.to_be_bytes());
    out.extend_from_slice(&(length as u32).to_be_bytes());
    out.extend_from_slice(&(entries.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&(total_sfnt_size as u32).to_be_bytes());
    out.extend_from_slice(&major.to_be_bytes());
    out.extend_from_slice(&minor.to_be_bytes());
    // no metadata or private block
    out.extend_from_slice(&[0; 20]);
    out.extend(directory);
    out.extend(body);

    info!("encoded WOFF: {} -> {} bytes", sfnt.len(), out.len());
    Ok(out)
}
