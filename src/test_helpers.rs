//! Shared test utilities for the xkcd-archive test suite.
//!
//! [`MockSource`] stands in for the remote API: it serves canned records and
//! image bytes and records every call, so tests can assert exactly how often
//! the network would have been hit.
//!
//! ```rust
//! let source = MockSource::new(3)
//!     .with_comic(comic(1, "Barrel - Part 1"))
//!     .with_image("https://imgs.xkcd.com/comics/barrel_cropped_(1).jpg", b"jpg");
//!
//! cache::get_or_fetch(&dir, 1, &source).unwrap();
//! assert_eq!(source.metadata_calls(1), 1);
//! ```

use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::record::ComicRecord;
use crate::source::{ComicSource, SourceError, metadata_url};

/// A call made against [`MockSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    Latest,
    Metadata(u32),
    Image(String),
}

/// In-memory [`ComicSource`] with a call log.
pub struct MockSource {
    pub latest: u32,
    pub comics: HashMap<u32, ComicRecord>,
    pub images: HashMap<String, Vec<u8>>,
    pub calls: Mutex<Vec<SourceCall>>,
}

impl MockSource {
    pub fn new(latest: u32) -> Self {
        Self {
            latest,
            comics: HashMap::new(),
            images: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Serve `record` under its own `num`.
    pub fn with_comic(mut self, record: ComicRecord) -> Self {
        let id = record.num().expect("test comic must have a num");
        self.comics.insert(id, record);
        self
    }

    pub fn with_image(mut self, url: &str, bytes: &[u8]) -> Self {
        self.images.insert(url.to_string(), bytes.to_vec());
        self
    }

    /// Comics 1..=latest with an image each, except 404.
    pub fn with_series(mut self) -> Self {
        for id in (1..=self.latest).filter(|id| *id != 404) {
            let record = comic(id, &format!("Comic {id}"));
            let url = image_url_of(id);
            self = self.with_comic(record).with_image(&url, b"png");
        }
        self
    }

    pub fn get_calls(&self) -> Vec<SourceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn metadata_calls(&self, id: u32) -> usize {
        self.count(|c| *c == SourceCall::Metadata(id))
    }

    pub fn network_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn count(&self, pred: impl Fn(&SourceCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }
}

impl ComicSource for MockSource {
    fn fetch_latest_id(&self) -> Result<u32, SourceError> {
        self.calls.lock().unwrap().push(SourceCall::Latest);
        Ok(self.latest)
    }

    fn fetch_metadata(&self, id: u32) -> Result<ComicRecord, SourceError> {
        self.calls.lock().unwrap().push(SourceCall::Metadata(id));
        self.comics
            .get(&id)
            .cloned()
            .ok_or_else(|| SourceError::HttpStatus {
                url: metadata_url(id),
                status: 404,
            })
    }

    fn fetch_image(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        self.calls
            .lock()
            .unwrap()
            .push(SourceCall::Image(url.to_string()));
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| SourceError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Remote image URL used by [`comic`].
pub fn image_url_of(id: u32) -> String {
    format!("https://imgs.xkcd.com/comics/comic_{id}.png")
}

/// A record shaped like the API's, with an image.
pub fn comic(id: u32, title: &str) -> ComicRecord {
    serde_json::from_value(json!({
        "month": "1",
        "num": id,
        "link": "",
        "year": "2006",
        "news": "",
        "safe_title": title,
        "transcript": "",
        "alt": format!("alt text of {id}"),
        "img": image_url_of(id),
        "title": title,
        "day": "1",
    }))
    .unwrap()
}

/// A record without a downloadable image (`img` is the placeholder).
pub fn interactive_comic(id: u32, title: &str) -> ComicRecord {
    let mut record = comic(id, title);
    record.insert("img", json!(crate::record::NO_IMAGE_URL));
    record
}
