mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::error::Result;

/// Address of a remote archive plus the optional User-Agent sent with
/// every request against it.
///
/// A redirect reported by the size probe replaces the URL and keeps the
/// user-agent; locations are never merged.
#[derive(Debug, Clone)]
pub struct ArchiveLocation {
    url: Url,
    user_agent: Option<String>,
}

impl ArchiveLocation {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            user_agent: None,
        }
    }

    /// Parse a location from a URL string.
    pub fn parse(url: &str) -> Result<Self> {
        Ok(Self::new(Url::parse(url)?))
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// The same location re-targeted at `url`.
    pub fn redirected(&self, url: Url) -> Self {
        Self {
            url,
            user_agent: self.user_agent.clone(),
        }
    }
}

impl std::fmt::Display for ArchiveLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.url.fmt(f)
    }
}

/// Outcome of a size probe.
#[derive(Debug)]
pub enum SizeProbe {
    /// The server reported the archive length in bytes.
    Length(u64),
    /// The server redirected; the probe should be retried against the new
    /// location.
    Redirect(ArchiveLocation),
}

/// A ranged response: the HTTP status and the body bytes that came back.
#[derive(Debug)]
pub struct RangedResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RangedResponse {
    /// Whether the server honored the range (206 Partial Content).
    pub fn is_partial(&self) -> bool {
        self.status == 206
    }
}

/// Trait for fetching byte ranges of a remote archive.
///
/// The extraction engine is generic over this seam; tests drive it with an
/// in-memory implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Metadata-only probe for the archive's total length. A redirect is
    /// reported back to the caller rather than followed internally.
    async fn probe_size(&self, location: &ArchiveLocation) -> Result<SizeProbe>;

    /// Fetch the inclusive byte range `[start, end]` of the archive.
    async fn ranged_get(
        &self,
        location: &ArchiveLocation,
        start: u64,
        end: u64,
    ) -> Result<RangedResponse>;
}
