//! Error types for remote ZIP extraction.
//!
//! Every fallible operation in this crate returns [`Result<T>`]. All failures
//! are terminal for the call that raised them: the engine performs no retry
//! beyond the single re-probe after a redirect during session setup.

/// The error type for remote ZIP operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The archive URL could not be parsed.
    #[error("invalid archive URL: {0}")]
    InvalidLocation(#[from] url::ParseError),

    /// The size probe did not yield a positive content length.
    #[error("content length unavailable for {url}")]
    SizeUnavailable { url: String },

    /// The size probe was redirected more than [`MAX_REDIRECT_HOPS`] times.
    ///
    /// [`MAX_REDIRECT_HOPS`]: crate::zip::MAX_REDIRECT_HOPS
    #[error("too many redirects while probing {url}")]
    TooManyRedirects { url: String },

    /// A ranged request was answered with something other than
    /// 206 Partial Content.
    #[error("unexpected HTTP status {status} (expected 206 Partial Content)")]
    UnexpectedStatus { status: u16 },

    /// A connection-level transport fault.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A ranged request returned fewer bytes than the record requires.
    #[error("short read: wanted {expected} bytes, got {got}")]
    ShortRead { expected: usize, got: usize },

    /// The end-of-central-directory signature is absent from the tail
    /// window. The archive is not a ZIP, or its comment pushed the end
    /// record out of the window.
    #[error("end of central directory signature not found")]
    SignatureNotFound,

    /// The bytes at a central-directory-recorded offset do not start with
    /// the local file header signature. Some third-party ZIP writers emit
    /// central directories whose offsets disagree with the local headers.
    #[error("local file header signature mismatch at offset {offset}")]
    SignatureMismatch { offset: u64 },

    /// The member uses a compression method other than STORED or DEFLATE.
    #[error("unsupported compression method {0}")]
    UnsupportedMethod(u16),

    /// Extraction was cancelled between chunks. Bytes already written to
    /// the sink are kept.
    #[error("extraction cancelled")]
    Cancelled,

    /// An I/O fault while decoding or writing to the sink.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Shorthand result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
