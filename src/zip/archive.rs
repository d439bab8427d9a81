use std::sync::Arc;

use tokio::io::AsyncWrite;

use super::directory::parse_directory;
use super::extractor::{ExtractOptions, StreamExtractor};
use super::locator::{DirectoryLocator, probe_archive_length};
use super::resolver::LocalHeaderResolver;
use super::structures::{CentralDirectoryPointer, MemberEntry, PayloadRange};
use crate::error::Result;
use crate::io::{ArchiveLocation, Transport};

/// A session against one remote ZIP archive.
///
/// [`connect`](Self::connect) probes the archive length once, following
/// redirects; afterwards the session is immutable, so entries may be
/// resolved and extracted concurrently from independent tasks sharing it
/// behind an [`Arc`].
///
/// The parsed directory reflects the archive as published at parse time;
/// a later mutation on the server is not observed.
#[derive(Debug)]
pub struct RemoteZip<T: Transport> {
    transport: Arc<T>,
    location: ArchiveLocation,
    archive_length: u64,
}

impl<T: Transport> RemoteZip<T> {
    /// Open a session: probe the archive's size, re-targeting the
    /// location on redirects, and remember both for the session's life.
    pub async fn connect(transport: Arc<T>, location: ArchiveLocation) -> Result<Self> {
        let (archive_length, location) = probe_archive_length(transport.as_ref(), location).await?;
        Ok(Self {
            transport,
            location,
            archive_length,
        })
    }

    /// The session's location, as resolved after any redirects.
    pub fn location(&self) -> &ArchiveLocation {
        &self.location
    }

    /// The archive's total length in bytes, as probed at connect time.
    pub fn archive_length(&self) -> u64 {
        self.archive_length
    }

    fn locator(&self) -> DirectoryLocator<'_, T> {
        DirectoryLocator::new(self.transport.as_ref(), &self.location, self.archive_length)
    }

    /// Locate the central directory via the end-of-central-directory
    /// record in the archive's tail.
    pub async fn locate_directory(&self) -> Result<CentralDirectoryPointer> {
        self.locator().locate().await
    }

    /// List the archive's members in storage order.
    pub async fn entries(&self) -> Result<Vec<MemberEntry>> {
        let locator = self.locator();
        let pointer = locator.locate().await?;
        let directory = locator.fetch_directory(&pointer).await?;
        Ok(parse_directory(&directory))
    }

    /// Compute the byte range of one member's compressed payload from its
    /// local file header.
    pub async fn resolve(&self, entry: &MemberEntry) -> Result<PayloadRange> {
        LocalHeaderResolver::new(self.transport.as_ref(), &self.location)
            .resolve(entry)
            .await
    }

    /// Resolve and extract one member into `sink`. Returns the number of
    /// bytes written.
    pub async fn extract<W>(
        &self,
        entry: &MemberEntry,
        sink: &mut W,
        options: &ExtractOptions<'_>,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        if entry.is_directory {
            return Ok(0);
        }
        let range = self.resolve(entry).await?;
        StreamExtractor::new(self.transport.as_ref(), &self.location)
            .extract(entry, range, sink, options)
            .await
    }
}
