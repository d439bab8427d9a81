//! # zipgrab
//!
//! Extract single members from a ZIP archive hosted on an HTTP server,
//! without downloading the archive in full.
//!
//! ZIP stores its central directory at the end of the file, so a client
//! that can issue HTTP Range requests only needs a small tail fetch to
//! list an archive, and one or two more ranged requests per member it
//! actually wants. This crate implements that engine: end-of-central-
//! directory discovery, central directory parsing, local header
//! resolution and streaming decompression.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use zipgrab::{ArchiveLocation, ExtractOptions, HttpTransport, RemoteZip};
//!
//! #[tokio::main]
//! async fn main() -> zipgrab::Result<()> {
//!     let transport = Arc::new(HttpTransport::new()?);
//!     let location = ArchiveLocation::parse("https://example.com/archive.zip")?;
//!     let archive = RemoteZip::connect(transport, location).await?;
//!
//!     for entry in archive.entries().await? {
//!         println!("{}", entry.name);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod zip;

pub use error::{Error, Result};
pub use io::{ArchiveLocation, HttpTransport, RangedResponse, SizeProbe, Transport};
pub use zip::{
    CentralDirectoryPointer, CompressionMethod, ExtractOptions, MemberEntry, PayloadRange,
    ProgressListener, RemoteZip,
};
