use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{LOCATION, RANGE, USER_AGENT};
use reqwest::{Client, StatusCode, redirect};

use super::{ArchiveLocation, RangedResponse, SizeProbe, Transport};
use crate::error::{Error, Result};

/// HTTP transport for remote ZIP archives.
///
/// Redirect following is disabled on the client: a redirect during the size
/// probe is reported as [`SizeProbe::Redirect`] so the session can re-target
/// its [`ArchiveLocation`] and probe again. Ranged GETs run against the
/// already-resolved location and expect 206 directly.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

fn apply_user_agent(
    req: reqwest::RequestBuilder,
    location: &ArchiveLocation,
) -> reqwest::RequestBuilder {
    match location.user_agent() {
        Some(ua) => req.header(USER_AGENT, ua),
        None => req,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn probe_size(&self, location: &ArchiveLocation) -> Result<SizeProbe> {
        let req = apply_user_agent(self.client.head(location.url().clone()), location);
        let resp = req.send().await?;

        if resp.status().is_redirection() {
            let target = resp
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|loc| location.url().join(loc).ok());
            return match target {
                Some(url) => Ok(SizeProbe::Redirect(location.redirected(url))),
                None => Err(Error::SizeUnavailable {
                    url: location.to_string(),
                }),
            };
        }

        if !resp.status().is_success() {
            return Err(Error::UnexpectedStatus {
                status: resp.status().as_u16(),
            });
        }

        let length = resp
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        match length {
            Some(len) if len > 0 => Ok(SizeProbe::Length(len)),
            _ => Err(Error::SizeUnavailable {
                url: location.to_string(),
            }),
        }
    }

    async fn ranged_get(
        &self,
        location: &ArchiveLocation,
        start: u64,
        end: u64,
    ) -> Result<RangedResponse> {
        let range = format!("bytes={start}-{end}");
        let req = apply_user_agent(self.client.get(location.url().clone()), location)
            .header(RANGE, range);
        let resp = req.send().await?;

        let status = resp.status();
        if status != StatusCode::PARTIAL_CONTENT {
            return Ok(RangedResponse {
                status: status.as_u16(),
                body: bytes::Bytes::new(),
            });
        }

        let body = resp.bytes().await?;
        Ok(RangedResponse {
            status: status.as_u16(),
            body,
        })
    }
}
