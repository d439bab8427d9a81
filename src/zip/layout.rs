//! Fixed offsets, widths and signatures of the ZIP records this engine
//! consumes. All multi-byte fields are unsigned little-endian.
//!
//! See <http://en.wikipedia.org/wiki/ZIP_(file_format)#File_headers>.

/// End of central directory signature (`0x06054b50`).
pub const EOCD_SIGNATURE: &[u8] = b"PK\x05\x06";
/// Fixed size of the end of central directory record.
pub const EOCD_SIZE: usize = 22;
/// Central directory size field, relative to the EOCD start.
pub const EOCD_DIR_SIZE: usize = 12;
/// Central directory offset field, relative to the EOCD start.
pub const EOCD_DIR_OFFSET: usize = 16;

/// Central directory file header signature (`0x02014b50`).
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
/// Fixed size of a central directory file header.
pub const CDFH_SIZE: usize = 46;
/// Compression method field.
pub const CDFH_METHOD: usize = 10;
/// CRC-32 field.
pub const CDFH_CRC32: usize = 16;
/// Compressed size field.
pub const CDFH_COMPRESSED_SIZE: usize = 20;
/// Uncompressed size field.
pub const CDFH_UNCOMPRESSED_SIZE: usize = 24;
/// File name length field.
pub const CDFH_NAME_LEN: usize = 28;
/// Extra field length field.
pub const CDFH_EXTRA_LEN: usize = 30;
/// File comment length field.
pub const CDFH_COMMENT_LEN: usize = 32;
/// Internal file attributes field.
pub const CDFH_INTERNAL_ATTR: usize = 36;
/// External file attributes field.
pub const CDFH_EXTERNAL_ATTR: usize = 38;
/// Local header offset field.
pub const CDFH_LOCAL_OFFSET: usize = 42;

/// Local file header signature (`0x04034b50`).
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
/// Fixed size of a local file header.
pub const LFH_SIZE: usize = 30;
/// Compressed size field in the local header.
pub const LFH_COMPRESSED_SIZE: usize = 18;
/// File name length field in the local header.
pub const LFH_NAME_LEN: usize = 26;
/// Extra field length field in the local header.
pub const LFH_EXTRA_LEN: usize = 28;
