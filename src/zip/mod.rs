//! ZIP-over-HTTP-range extraction engine.
//!
//! ZIP archives keep their table of contents, the central directory, near
//! the end of the file. That makes single-member extraction from a remote
//! archive cheap with ranged requests:
//!
//! 1. [`locator`] probes the archive length and fetches a small tail
//!    window to find the end-of-central-directory record.
//! 2. [`directory`] decodes the fetched central directory into
//!    [`MemberEntry`] metadata, in storage order.
//! 3. [`resolver`] reads one member's local file header and computes the
//!    exact byte range of its compressed payload.
//! 4. [`extractor`] fetches that range and streams it, decoded, into a
//!    sink.
//!
//! Steps 1–2 run once per archive; steps 3–4 run per requested member and
//! may run concurrently against the same parsed directory. [`RemoteZip`]
//! ties the steps together behind one session type.
//!
//! ## Limitations
//!
//! - No ZIP64 extensions
//! - No encryption, no multi-disk archives
//! - STORED and DEFLATE members only
//! - Extracted content is not CRC-checked

mod archive;
mod directory;
mod extractor;
mod locator;
mod resolver;
mod structures;

pub mod layout;
pub mod matcher;

pub use archive::RemoteZip;
pub use directory::parse_directory;
pub use extractor::{ExtractOptions, ProgressListener, StreamExtractor};
pub use locator::{DirectoryLocator, MAX_REDIRECT_HOPS, probe_archive_length};
pub use resolver::LocalHeaderResolver;
pub use structures::{CentralDirectoryPointer, CompressionMethod, MemberEntry, PayloadRange};
