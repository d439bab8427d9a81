//! Streaming member extraction.

use std::io::{Cursor, Read};

use flate2::read::DeflateDecoder;
use log::debug;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use super::structures::{CompressionMethod, MemberEntry, PayloadRange};
use crate::error::{Error, Result};
use crate::io::{ArchiveLocation, Transport};

/// Decoded bytes are moved into the sink in chunks of this size.
const CHUNK_SIZE: usize = 2048;

/// Listener for extraction progress, invoked synchronously from the
/// streaming loop after each chunk.
pub trait ProgressListener: Send + Sync {
    /// `total_written` bytes written so far, of which `chunk_len` arrived
    /// with this chunk; `total_size` is the member's uncompressed size.
    fn on_progress(&self, total_written: u64, chunk_len: usize, total_size: u64);
}

/// Per-call extraction options.
///
/// The default has no progress listener and a token that never cancels.
#[derive(Default)]
pub struct ExtractOptions<'a> {
    pub progress: Option<&'a dyn ProgressListener>,
    /// Checked cooperatively between chunks. When tripped, the call
    /// flushes the sink and returns [`Error::Cancelled`]; bytes already
    /// written are kept.
    pub cancel: CancellationToken,
}

/// Streams one member's payload range into a sink, decoding it on the way.
pub struct StreamExtractor<'a, T: Transport> {
    transport: &'a T,
    location: &'a ArchiveLocation,
}

impl<'a, T: Transport> StreamExtractor<'a, T> {
    pub fn new(transport: &'a T, location: &'a ArchiveLocation) -> Self {
        Self {
            transport,
            location,
        }
    }

    /// Fetch `range` and decode it into `sink`, returning the number of
    /// bytes written.
    ///
    /// STORED payloads are copied verbatim; DEFLATE payloads are decoded
    /// as a raw deflate stream, ZIP's in-archive format. Writes are capped
    /// at `entry.uncompressed_size`: a chunk that would overflow the cap
    /// is truncated and reading stops, which discards trailing garbage
    /// when central and local size bookkeeping disagreed.
    ///
    /// Directory entries succeed immediately with zero bytes written and
    /// no network request.
    pub async fn extract<W>(
        &self,
        entry: &MemberEntry,
        range: PayloadRange,
        sink: &mut W,
        options: &ExtractOptions<'_>,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        if entry.is_directory {
            return Ok(0);
        }

        let resp = self
            .transport
            .ranged_get(self.location, range.start, range.end)
            .await?;
        if !resp.is_partial() {
            return Err(Error::UnexpectedStatus {
                status: resp.status,
            });
        }

        let mut decoder: Box<dyn Read + Send> = match entry.method {
            CompressionMethod::Stored => Box::new(Cursor::new(resp.body)),
            CompressionMethod::Deflate => {
                Box::new(DeflateDecoder::new(Cursor::new(resp.body)))
            }
            CompressionMethod::Unknown(method) => {
                return Err(Error::UnsupportedMethod(method));
            }
        };

        let ceiling = entry.uncompressed_size;
        let mut written = 0u64;
        let mut buf = [0u8; CHUNK_SIZE];

        loop {
            if options.cancel.is_cancelled() {
                sink.flush().await?;
                return Err(Error::Cancelled);
            }

            let read = decoder.read(&mut buf)?;
            if read == 0 {
                break;
            }

            // Never write past the declared uncompressed size.
            let take = read.min((ceiling - written) as usize);
            sink.write_all(&buf[..take]).await?;
            written += take as u64;

            if let Some(progress) = options.progress {
                progress.on_progress(written, take, ceiling);
            }

            if written == ceiling {
                break;
            }
        }

        sink.flush().await?;
        debug!("wrote {} bytes for {}", written, entry.name);

        Ok(written)
    }
}
