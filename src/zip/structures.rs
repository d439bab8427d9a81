/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// Where the central directory lives inside the archive, as recorded by
/// the end-of-central-directory record.
///
/// Derived once per session; an absent or unparseable end record is
/// terminal for directory discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CentralDirectoryPointer {
    /// Size of the central directory in bytes.
    pub size: u32,
    /// Offset of the central directory from the start of the archive.
    pub offset: u32,
}

/// One member of the archive, as recorded in the central directory.
///
/// Entries are immutable once parsed. The sizes read here are
/// authoritative defaults; local header resolution may substitute the
/// compressed size when the local header stores zero (see
/// [`LocalHeaderResolver`](super::LocalHeaderResolver)).
#[derive(Debug, Clone)]
pub struct MemberEntry {
    pub name: String,
    pub method: CompressionMethod,
    /// Raw CRC-32 field from the central directory. Not verified by this
    /// engine.
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub internal_attributes: u16,
    pub external_attributes: u16,
    /// Offset of the member's local file header. Must lie inside the
    /// archive; an out-of-range value surfaces when the local header
    /// fetch comes back non-partial or short.
    pub local_header_offset: u64,
    pub extra_field_length: u16,
    /// Directory entries carry a name ending in `/` and no payload.
    pub is_directory: bool,
}

/// Inclusive byte range of one member's compressed payload inside the
/// remote archive. Computed per extraction request and consumed once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadRange {
    pub start: u64,
    pub end: u64,
}
