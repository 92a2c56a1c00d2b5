use std::{io::Read, thread};

use url::Url;

use crate::{error::Error, util::default_ureq_agent_builder};

use super::{AssetHandle, AssetInfo, AssetSource, CancelToken};

/// Acquires remote streams over HTTP.  Readiness is established by probing the
/// locator, after which the head of the resource keeps buffering in the
/// background until the handle stops loading.
pub struct HttpAssetSource {
    agent: ureq::Agent,
    prebuffer_limit: u64,
}

impl HttpAssetSource {
    pub const DEFAULT_PREBUFFER_LIMIT: u64 = 512 * 1024;

    const CHUNK_SIZE: usize = 16 * 1024;

    pub fn new(proxy_url: Option<&str>) -> Self {
        Self::with_prebuffer_limit(proxy_url, Self::DEFAULT_PREBUFFER_LIMIT)
    }

    pub fn with_prebuffer_limit(proxy_url: Option<&str>, prebuffer_limit: u64) -> Self {
        Self {
            agent: default_ureq_agent_builder(proxy_url).build().into(),
            prebuffer_limit,
        }
    }

    fn probe(&self, url: &Url) -> Result<AssetInfo, Error> {
        match self.agent.head(url.as_str()).call() {
            Ok(response) => Ok(AssetInfo {
                content_type: header(&response, "Content-Type").map(str::to_owned),
                content_length: header(&response, "Content-Length").and_then(|v| v.parse().ok()),
            }),
            Err(ureq::Error::StatusCode(405)) => {
                log::debug!("HEAD not allowed, probing with a ranged GET: {}", url);
                let response = self
                    .agent
                    .get(url.as_str())
                    .header("Range", &range_header(0, 1))
                    .call()?;
                Ok(AssetInfo {
                    content_type: header(&response, "Content-Type").map(str::to_owned),
                    content_length: header(&response, "Content-Range")
                        .and_then(parse_total_content_length),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Range covering the head of the resource, `None` when pre-buffering is
    /// disabled by a zero limit.
    fn prebuffer_range(&self) -> Option<String> {
        (self.prebuffer_limit > 0).then(|| range_header(0, self.prebuffer_limit))
    }

    fn prebuffer(&self, handle: AssetHandle, cancel: CancelToken) {
        let Some(range) = self.prebuffer_range() else {
            log::debug!("pre-buffering disabled for {}", handle.url());
            return;
        };
        let agent = self.agent.clone();
        let limit = self.prebuffer_limit as usize;
        thread::spawn(move || {
            let response = match agent.get(handle.url().as_str()).header("Range", &range).call() {
                Ok(response) => response,
                Err(err) => {
                    log::warn!("failed to start pre-buffering {}: {}", handle.url(), err);
                    return;
                }
            };
            let mut reader = response.into_body().into_reader();
            let mut chunk = vec![0; Self::CHUNK_SIZE];
            while handle.is_loading() && !cancel.is_cancelled() && handle.buffered_len() < limit {
                match reader.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => handle.append_prefix(&chunk[..n]),
                    Err(err) => {
                        log::warn!("pre-buffering {} interrupted: {}", handle.url(), err);
                        break;
                    }
                }
            }
            log::debug!(
                "pre-buffered {} bytes of {}",
                handle.buffered_len(),
                handle.url()
            );
        });
    }
}

impl AssetSource for HttpAssetSource {
    fn open(&self, url: &Url, cancel: &CancelToken) -> Result<AssetHandle, Error> {
        let info = self.probe(url)?;
        if cancel.is_cancelled() {
            return Err(Error::LoadCancelled);
        }
        if let Some(content_type) = &info.content_type {
            if !is_playable(content_type) {
                return Err(Error::AssetNotPlayable {
                    content_type: content_type.to_owned(),
                });
            }
        }
        let handle = AssetHandle::new(url.clone(), info);
        self.prebuffer(handle.clone(), cancel.clone());
        Ok(handle)
    }
}

fn header<'a>(response: &'a ureq::http::Response<ureq::Body>, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Media containers and streaming manifests a player can start from.  Servers
/// that do not know better answer with `application/octet-stream`.
fn is_playable(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("video/")
        || mime.starts_with("audio/")
        || mime.ends_with("mpegurl")
        || mime == "application/dash+xml"
        || mime == "application/octet-stream"
        || mime == "binary/octet-stream"
}

/// Constructs a Range header value for given offset and length.
fn range_header(offset: u64, length: u64) -> String {
    let last_byte = offset + length - 1; // Offset of the last byte of the range is inclusive.
    format!("bytes={}-{}", offset, last_byte)
}

/// Parses a total content length from a Content-Range header value, e.g. 146515
/// for "bytes 0-1023/146515".  Unknown totals ("*") yield `None`.
fn parse_total_content_length(content_range: &str) -> Option<u64> {
    content_range.rsplit('/').next()?.trim().parse().ok()
}
