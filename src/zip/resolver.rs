//! Local header resolution.
//!
//! The central directory records where each member's local file header
//! starts, but the local header's own variable-length fields (and, with
//! some writers, its size fields) decide where the compressed payload
//! actually begins. Resolving reads the fixed 30-byte local header and
//! computes the exact payload byte range from it.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;

use super::layout::{LFH_COMPRESSED_SIZE, LFH_SIGNATURE, LFH_SIZE};
use super::structures::{MemberEntry, PayloadRange};
use crate::error::{Error, Result};
use crate::io::{ArchiveLocation, Transport};

/// Computes the compressed payload range of one member.
pub struct LocalHeaderResolver<'a, T: Transport> {
    transport: &'a T,
    location: &'a ArchiveLocation,
}

impl<'a, T: Transport> LocalHeaderResolver<'a, T> {
    pub fn new(transport: &'a T, location: &'a ArchiveLocation) -> Self {
        Self {
            transport,
            location,
        }
    }

    /// Fetch and validate the member's local header, then compute the
    /// inclusive byte range of its compressed payload.
    ///
    /// The local header's compressed size wins over the central
    /// directory's, except when it is zero: some writers (macOS Finder
    /// among them) store zero there even for non-empty members, and the
    /// central directory value is substituted.
    pub async fn resolve(&self, entry: &MemberEntry) -> Result<PayloadRange> {
        let start = entry.local_header_offset;
        let end = start + LFH_SIZE as u64 - 1;

        let resp = self.transport.ranged_get(self.location, start, end).await?;
        if !resp.is_partial() {
            return Err(Error::UnexpectedStatus {
                status: resp.status,
            });
        }
        if resp.body.len() < LFH_SIZE {
            return Err(Error::ShortRead {
                expected: LFH_SIZE,
                got: resp.body.len(),
            });
        }

        let header = &resp.body[..LFH_SIZE];
        if &header[..4] != LFH_SIGNATURE {
            return Err(Error::SignatureMismatch {
                offset: entry.local_header_offset,
            });
        }

        let mut cursor = Cursor::new(header);
        cursor.set_position(LFH_COMPRESSED_SIZE as u64);
        let local_compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
        let _uncompressed_size = cursor.read_u32::<LittleEndian>()?;
        let name_len = cursor.read_u16::<LittleEndian>()? as u64;
        let extra_len = cursor.read_u16::<LittleEndian>()? as u64;

        let effective_size = if local_compressed_size == 0 {
            entry.compressed_size
        } else {
            local_compressed_size
        };

        let payload_start = entry.local_header_offset + LFH_SIZE as u64 + name_len + extra_len;
        let range = PayloadRange {
            start: payload_start,
            end: payload_start + effective_size,
        };
        debug!(
            "payload of {} spans bytes {}-{}",
            entry.name, range.start, range.end
        );

        Ok(range)
    }
}
