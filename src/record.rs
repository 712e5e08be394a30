//! Comic metadata records.
//!
//! The API returns one JSON object per comic. Its schema has grown over the
//! years (`news`, `transcript`, `extra_parts`, ...), so a record is kept as
//! an open mapping rather than a fixed struct: every key the API sends is
//! preserved verbatim in `info.json`, in the order it was received.
//!
//! The fields the archiver itself relies on have typed accessors that fail
//! loudly when a field is absent or has the wrong type:
//!
//! | Key | Accessor | Type |
//! |-----|----------|------|
//! | `num` | [`ComicRecord::num`] | positive integer |
//! | `title` | [`ComicRecord::title`] | string |
//! | `alt` | [`ComicRecord::alt`] | string |
//! | `img` | [`ComicRecord::image_url`] | optional string |
//!
//! `img` is the one field with a fallback: interactive comics (1608, 1663,
//! ...) have no downloadable image and the API reports either no `img` at
//! all or the bare image directory [`NO_IMAGE_URL`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Key of the comic number.
pub const NUM: &str = "num";
/// Key of the comic title.
pub const TITLE: &str = "title";
/// Key of the hover text.
pub const ALT: &str = "alt";
/// Key of the image location: a remote URL as received, a `./file` path once archived.
pub const IMG: &str = "img";

/// Placeholder the API reports in `img` for comics without an image.
pub const NO_IMAGE_URL: &str = "https://imgs.xkcd.com/comics/";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    #[error("key '{0}' does not exist")]
    Missing(&'static str),
    #[error("key '{field}' is not {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Metadata of a single comic: an open string-to-JSON mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComicRecord(Map<String, Value>);

impl ComicRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Decode a record from raw JSON bytes. The top level must be an object.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Indented JSON, two spaces per level.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.0)
    }

    pub fn num(&self) -> Result<u32, RecordError> {
        let value = self.0.get(NUM).ok_or(RecordError::Missing(NUM))?;
        value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0)
            .ok_or(RecordError::WrongType {
                field: NUM,
                expected: "a positive integer",
            })
    }

    pub fn title(&self) -> Result<&str, RecordError> {
        self.string_field(TITLE)
    }

    pub fn alt(&self) -> Result<&str, RecordError> {
        self.string_field(ALT)
    }

    /// Remote image URL, if the comic has a downloadable image.
    ///
    /// Returns `None` when `img` is absent, not a string, empty, or equal to
    /// [`NO_IMAGE_URL`].
    pub fn image_url(&self) -> Option<&str> {
        self.0
            .get(IMG)
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty() && *url != NO_IMAGE_URL)
    }

    /// Raw `img` value as stored, without the placeholder check.
    pub fn image_path(&self) -> Option<&str> {
        self.0.get(IMG).and_then(Value::as_str)
    }

    /// Whether `img` points at a file archived next to the record.
    pub fn has_local_image(&self) -> bool {
        self.image_path().is_some_and(|p| p.starts_with("./"))
    }

    /// Point `img` at a file stored next to the record.
    pub fn set_local_image(&mut self, file_name: &str) {
        self.0
            .insert(IMG.to_string(), Value::String(format!("./{file_name}")));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    fn string_field(&self, field: &'static str) -> Result<&str, RecordError> {
        self.0
            .get(field)
            .ok_or(RecordError::Missing(field))?
            .as_str()
            .ok_or(RecordError::WrongType {
                field,
                expected: "a string",
            })
    }
}

impl From<Map<String, Value>> for ComicRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
