//! Remote source client for the xkcd JSON API.
//!
//! Two endpoints on a fixed host:
//!
//! ```text
//! GET https://xkcd.com/info.0.json        latest comic
//! GET https://xkcd.com/{id}/info.0.json   comic #id
//! ```
//!
//! Images are served from `imgs.xkcd.com`. Since 2012 most comics also have
//! a double-resolution variant named `<stem>_2x.<ext>`; [`XkcdClient`] asks
//! for that first and falls back to the URL the API reported.
//!
//! # Failure policy
//!
//! Every call makes exactly one request per URL, with no retries and no
//! backoff. Any failure (transport error, non-2xx status, bad JSON) goes
//! straight back to the caller. Re-running the archiver is the recovery
//! mechanism: comics already on disk are not fetched again.
//!
//! # Seams
//!
//! - [`ComicSource`] is what the cache and the archive driver depend on.
//! - [`Transport`] is the single blocking GET underneath [`XkcdClient`].
//!   [`HttpTransport`] is the production implementation over `ureq`.

use crate::record::{ComicRecord, RecordError};
use thiserror::Error;
use tracing::debug;

/// Endpoint of the most recent comic.
pub const LATEST_URL: &str = "https://xkcd.com/info.0.json";

/// Suffix inserted before the extension to request the high-resolution image.
pub const HIGH_RES_SUFFIX: &str = "_2x";

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
    #[error("unexpected status code {status} from {url}")]
    HttpStatus { url: String, status: u16 },
    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unexpected metadata from {url}: {source}")]
    Record {
        url: String,
        #[source]
        source: RecordError,
    },
}

/// Where comics come from.
pub trait ComicSource {
    /// Number of the most recent comic.
    fn fetch_latest_id(&self) -> Result<u32, SourceError>;

    /// Metadata of comic `id`, unknown keys preserved.
    fn fetch_metadata(&self, id: u32) -> Result<ComicRecord, SourceError>;

    /// Image bytes, preferring the high-resolution variant of `url`.
    fn fetch_image(&self, url: &str) -> Result<Vec<u8>, SourceError>;
}

/// A single blocking HTTP GET returning the body of a 2xx response.
pub trait Transport {
    fn get(&self, url: &str) -> Result<Vec<u8>, SourceError>;
}

/// Metadata endpoint of comic `id`.
pub fn metadata_url(id: u32) -> String {
    format!("https://xkcd.com/{id}/info.0.json")
}

/// Insert [`HIGH_RES_SUFFIX`] before the extension of the last path segment.
///
/// ```text
/// https://imgs.xkcd.com/comics/python.png  →  https://imgs.xkcd.com/comics/python_2x.png
/// https://imgs.xkcd.com/comics/a.b.jpg     →  https://imgs.xkcd.com/comics/a.b_2x.jpg
/// https://imgs.xkcd.com/comics/noext       →  https://imgs.xkcd.com/comics/noext_2x
/// ```
pub fn high_res_url(url: &str) -> String {
    let segment_start = url.rfind('/').map(|i| i + 1).unwrap_or(0);
    let segment = &url[segment_start..];
    match segment.rfind('.') {
        Some(dot) => {
            let split = segment_start + dot;
            format!("{}{}{}", &url[..split], HIGH_RES_SUFFIX, &url[split..])
        }
        None => format!("{url}{HIGH_RES_SUFFIX}"),
    }
}

/// Client for the xkcd API over any [`Transport`].
pub struct XkcdClient<T> {
    transport: T,
}

impl XkcdClient<HttpTransport> {
    /// Client backed by a real HTTP agent.
    pub fn http() -> Self {
        Self::new(HttpTransport::new())
    }
}

impl<T: Transport> XkcdClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    fn get_record(&self, url: &str) -> Result<ComicRecord, SourceError> {
        let body = self.transport.get(url)?;
        ComicRecord::from_slice(&body).map_err(|source| SourceError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl<T: Transport> ComicSource for XkcdClient<T> {
    fn fetch_latest_id(&self) -> Result<u32, SourceError> {
        let record = self.get_record(LATEST_URL)?;
        record.num().map_err(|source| SourceError::Record {
            url: LATEST_URL.to_string(),
            source,
        })
    }

    fn fetch_metadata(&self, id: u32) -> Result<ComicRecord, SourceError> {
        self.get_record(&metadata_url(id))
    }

    fn fetch_image(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        let high_res = high_res_url(url);
        match self.transport.get(&high_res) {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                debug!(url = %high_res, error = %e, "high-resolution image unavailable, using original");
                self.transport.get(url)
            }
        }
    }
}

/// Production transport: one shared `ureq` agent, default timeouts.
pub struct HttpTransport {
    agent: ureq::Agent,
    user_agent: String,
}

impl HttpTransport {
    pub fn new() -> Self {
        // Statuses are checked here so they surface as HttpStatus, not as
        // transport failures.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            agent,
            user_agent: format!("xkcd-archive/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        let network = |e: ureq::Error| SourceError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        debug!(%url, "GET");
        let mut response = self
            .agent
            .get(url)
            .header("User-Agent", self.user_agent.as_str())
            .call()
            .map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.body_mut().read_to_vec().map_err(network)
    }
}
