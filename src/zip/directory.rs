//! Central directory record parsing.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use super::layout::{CDFH_SIZE, CDFH_SIGNATURE};
use super::structures::{CompressionMethod, MemberEntry};

/// Decode the raw central directory bytes into member entries.
///
/// Records are walked in storage order, each advancing by the fixed
/// 46-byte header plus its name, extra field and comment. The walk stops
/// silently once no full header fits before the end of the buffer;
/// trailing bytes are not an error.
///
/// The CRC-32 field is kept as the raw little-endian value from the
/// directory.
pub fn parse_directory(data: &[u8]) -> Vec<MemberEntry> {
    let mut entries = Vec::new();
    let mut offset = 0usize;

    while offset + CDFH_SIZE <= data.len() {
        let Some((entry, advance)) = parse_record(&data[offset..]) else {
            break;
        };
        entries.push(entry);
        offset += advance;
    }

    entries
}

/// Parse one record at the start of `data`. Returns the entry and the
/// total record length, or `None` when the record is truncated or does
/// not carry the header signature.
fn parse_record(data: &[u8]) -> Option<(MemberEntry, usize)> {
    if &data[..4] != CDFH_SIGNATURE {
        return None;
    }

    let mut cursor = Cursor::new(data);
    cursor.set_position(4);
    let _version_made_by = cursor.read_u16::<LittleEndian>().ok()?;
    let _version_needed = cursor.read_u16::<LittleEndian>().ok()?;
    let _flags = cursor.read_u16::<LittleEndian>().ok()?;
    let method = cursor.read_u16::<LittleEndian>().ok()?;
    let _mod_time = cursor.read_u16::<LittleEndian>().ok()?;
    let _mod_date = cursor.read_u16::<LittleEndian>().ok()?;
    let crc32 = cursor.read_u32::<LittleEndian>().ok()?;
    let compressed_size = cursor.read_u32::<LittleEndian>().ok()? as u64;
    let uncompressed_size = cursor.read_u32::<LittleEndian>().ok()? as u64;
    let name_len = cursor.read_u16::<LittleEndian>().ok()? as usize;
    let extra_len = cursor.read_u16::<LittleEndian>().ok()? as usize;
    let comment_len = cursor.read_u16::<LittleEndian>().ok()? as usize;
    let _disk_start = cursor.read_u16::<LittleEndian>().ok()?;
    let internal_attributes = cursor.read_u16::<LittleEndian>().ok()?;
    let external_attributes = cursor.read_u16::<LittleEndian>().ok()?;
    let _external_attributes_high = cursor.read_u16::<LittleEndian>().ok()?;
    let local_header_offset = cursor.read_u32::<LittleEndian>().ok()? as u64;

    let mut name_bytes = vec![0u8; name_len];
    cursor.read_exact(&mut name_bytes).ok()?;
    // Lossy conversion keeps non-UTF8 names usable
    let name = String::from_utf8_lossy(&name_bytes).to_string();
    let is_directory = name.ends_with('/');

    let entry = MemberEntry {
        name,
        method: CompressionMethod::from_u16(method),
        crc32,
        compressed_size,
        uncompressed_size,
        internal_attributes,
        external_attributes,
        local_header_offset,
        extra_field_length: extra_len as u16,
        is_directory,
    };

    Some((entry, CDFH_SIZE + name_len + extra_len + comment_len))
}
