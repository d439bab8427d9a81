//! Central directory discovery.
//!
//! ZIP stores its table of contents at the end of the file, so the
//! directory can be located with a small tail fetch: probe the archive
//! length, pull the last few KiB, scan for the end-of-central-directory
//! signature and read the directory's size and offset out of the fixed
//! 22-byte end record.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use bytes::Bytes;
use log::debug;

use super::layout::{EOCD_SIGNATURE, EOCD_SIZE};
use super::matcher;
use super::structures::CentralDirectoryPointer;
use crate::error::{Error, Result};
use crate::io::{ArchiveLocation, SizeProbe, Transport};

/// Redirect hops followed during the size probe before giving up.
pub const MAX_REDIRECT_HOPS: u32 = 5;

/// Tail window fetched when searching for the end record.
///
/// Archives whose directory comment pushes the end record out of this
/// window are rejected; the window is never grown.
const TAIL_WINDOW: u64 = 4096;

/// Probe the archive's total length, following redirects by re-targeting
/// the location and probing again, one hop at a time.
///
/// Returns the length together with the final (possibly re-targeted)
/// location. Redirect resolution belongs here, at session setup, so the
/// location stays immutable once extractions may run concurrently.
pub async fn probe_archive_length<T: Transport>(
    transport: &T,
    mut location: ArchiveLocation,
) -> Result<(u64, ArchiveLocation)> {
    for _ in 0..=MAX_REDIRECT_HOPS {
        match transport.probe_size(&location).await? {
            SizeProbe::Length(0) => {
                return Err(Error::SizeUnavailable {
                    url: location.to_string(),
                });
            }
            SizeProbe::Length(length) => {
                debug!("content length of {location} is {length} bytes");
                return Ok((length, location));
            }
            SizeProbe::Redirect(target) => {
                debug!("size probe redirected to {target}");
                location = target;
            }
        }
    }

    Err(Error::TooManyRedirects {
        url: location.to_string(),
    })
}

/// Locates and fetches the central directory of one remote archive.
pub struct DirectoryLocator<'a, T: Transport> {
    transport: &'a T,
    location: &'a ArchiveLocation,
    archive_length: u64,
}

impl<'a, T: Transport> DirectoryLocator<'a, T> {
    pub fn new(transport: &'a T, location: &'a ArchiveLocation, archive_length: u64) -> Self {
        Self {
            transport,
            location,
            archive_length,
        }
    }

    /// Find the end-of-central-directory record in the tail window and
    /// read the directory's size and offset from it.
    pub async fn locate(&self) -> Result<CentralDirectoryPointer> {
        let window = TAIL_WINDOW.min(self.archive_length);
        let start = self.archive_length - window;
        let end = self.archive_length - 1;

        let resp = self.transport.ranged_get(self.location, start, end).await?;
        if !resp.is_partial() {
            return Err(Error::UnexpectedStatus {
                status: resp.status,
            });
        }
        debug!("read {} bytes of tail window", resp.body.len());

        let index = matcher::find(&resp.body, EOCD_SIGNATURE).ok_or(Error::SignatureNotFound)?;
        if index + EOCD_SIZE > resp.body.len() {
            return Err(Error::ShortRead {
                expected: EOCD_SIZE,
                got: resp.body.len() - index,
            });
        }

        let mut cursor = Cursor::new(&resp.body[index..index + EOCD_SIZE]);
        cursor.set_position(4); // past the signature
        let _disk_number = cursor.read_u16::<LittleEndian>()?;
        let _directory_start_disk = cursor.read_u16::<LittleEndian>()?;
        let _disk_entry_count = cursor.read_u16::<LittleEndian>()?;
        let _total_entry_count = cursor.read_u16::<LittleEndian>()?;
        let size = cursor.read_u32::<LittleEndian>()?;
        let offset = cursor.read_u32::<LittleEndian>()?;

        Ok(CentralDirectoryPointer { size, offset })
    }

    /// Fetch the raw central directory bytes described by `pointer`.
    pub async fn fetch_directory(&self, pointer: &CentralDirectoryPointer) -> Result<Bytes> {
        if pointer.size == 0 {
            return Ok(Bytes::new());
        }

        let start = pointer.offset as u64;
        let end = start + pointer.size as u64 - 1;

        let resp = self.transport.ranged_get(self.location, start, end).await?;
        if !resp.is_partial() {
            return Err(Error::UnexpectedStatus {
                status: resp.status,
            });
        }
        if resp.body.len() < pointer.size as usize {
            return Err(Error::ShortRead {
                expected: pointer.size as usize,
                got: resp.body.len(),
            });
        }
        debug!("central directory is {} bytes", resp.body.len());

        Ok(resp.body)
    }
}
