//! TrueType collection (TTC) splitting and packing.

use anyhow::{Context, Result, bail, ensure};
use log::debug;
use read_fonts::{FileRef, FontRef};
use write_fonts::FontBuilder;

const TTC_TAG: &[u8; 4] = b"ttcf";
const TTC_VERSION_1: u32 = 0x0001_0000;
const TTC_HEADER_LEN: usize = 12;
const SFNT_HEADER_LEN: usize = 12;
const TABLE_RECORD_LEN: usize = 16;
/// Position of the offset field inside a table record.
const TABLE_OFFSET_FIELD: usize = 8;

/// Whether the data starts like a font collection.
pub fn is_collection(data: &[u8]) -> bool {
    data.starts_with(TTC_TAG)
}

/// Every face of a font file as a standalone font. A plain font is returned as is.
pub fn collection_faces(data: &[u8]) -> Result<Vec<Vec<u8>>> {
    match FileRef::new(data).context("Failed to parse font file")? {
        FileRef::Font(_) => Ok(vec![data.to_vec()]),
        FileRef::Collection(collection) => {
            debug!("Collection with {} faces", collection.len());
            collection.iter().map(|font| Ok(standalone(&font?))).collect()
        }
    }
}

fn standalone(font: &FontRef) -> Vec<u8> {
    let mut builder = FontBuilder::new();
    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if let Some(data) = font.table_data(tag) {
            builder.add_raw(tag, data);
        }
    }
    builder.build()
}

/// Pack standalone fonts into a version 1.0 collection.
///
/// Faces do not share tables; each face's tables follow its own table directory.
pub fn build_collection(faces: &[Vec<u8>]) -> Result<Vec<u8>> {
    ensure!(!faces.is_empty(), "A collection needs at least one face");

    let mut out = Vec::new();
    out.extend_from_slice(TTC_TAG);
    out.extend_from_slice(&TTC_VERSION_1.to_be_bytes());
    out.extend_from_slice(&(faces.len() as u32).to_be_bytes());
    let offsets_at = out.len();
    out.resize(TTC_HEADER_LEN + 4 * faces.len(), 0);

    for (i, face) in faces.iter().enumerate() {
        pad4(&mut out);
        let base = out.len();
        let field = offsets_at + 4 * i;
        out[field..field + 4].copy_from_slice(&offset32(base)?.to_be_bytes());

        let num_tables = table_count(face).with_context(|| format!("Face {i} is not a font"))?;
        out.extend_from_slice(face);
        for table in 0..num_tables {
            let at = base + SFNT_HEADER_LEN + TABLE_RECORD_LEN * table + TABLE_OFFSET_FIELD;
            let relative = read_u32(&out, at)?;
            let absolute = offset32(base + relative as usize)?;
            out[at..at + 4].copy_from_slice(&absolute.to_be_bytes());
        }
    }
    Ok(out)
}

fn table_count(face: &[u8]) -> Result<usize> {
    if is_collection(face) {
        bail!("Nested collections are not allowed");
    }
    let font = FontRef::new(face)?;
    Ok(font.table_directory.table_records().len())
}

fn pad4(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

fn offset32(offset: usize) -> Result<u32> {
    u32::try_from(offset).context("Collection larger than 4 GiB")
}

fn read_u32(data: &[u8], at: usize) -> Result<u32> {
    let bytes = data.get(at..at + 4).context("Truncated table directory")?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
