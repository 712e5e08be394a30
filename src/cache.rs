//! On-disk comic cache for incremental, resumable archiving.
//!
//! Fetching a comic costs two or three HTTP requests; reading it back from
//! disk costs one file read. This module decides which of the two happens
//! for a given comic, and owns the layout of one comic's directory.
//!
//! # Layout
//!
//! ```text
//! <output>/353/
//! ├── info.json      # the API's metadata, pretty-printed, `img` rewritten
//! ├── python.png     # image, named after the URL's last path segment
//! └── index.html     # written later by the site renderer
//! ```
//!
//! # Cache keys
//!
//! The cache is keyed by **directory existence**. A comic's metadata never
//! changes upstream once published, so there is nothing to invalidate: if
//! `<output>/<id>/info.json` exists it is returned verbatim, with no network
//! call and no re-validation. Records are never rewritten, so repeated runs
//! are idempotent and cheap.
//!
//! ## Interrupted runs
//!
//! Killing the process mid-comic can leave a directory holding an image but
//! no `info.json`. That directory is treated as a miss and the comic is
//! fetched again: nothing was persisted for it yet. `info.json` itself is
//! written to a temporary file and renamed into place, so it is either
//! complete or absent. An `info.json` that exists but does not decode was
//! not written by this program and is reported as [`CacheError::Corrupt`]
//! rather than overwritten.
//!
//! ## Images
//!
//! The image URL in `img` is replaced by `./<file name>` once the image has
//! been saved, so the archive is self-contained and can be moved freely. The
//! rewrite happens exactly once, on fetch. Comics without an image (`img`
//! absent or the bare placeholder) are persisted as received.

use crate::record::ComicRecord;
use crate::source::{ComicSource, SourceError};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Name of the metadata file within a comic directory.
pub const INFO_FILENAME: &str = "info.json";

/// Temporary name `info.json` is written under before the rename.
const INFO_PARTIAL_FILENAME: &str = "info.json.part";

/// Permissions of directories created by the archiver (Unix only).
pub const DIR_MODE: u32 = 0o744;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt cache entry {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("image URL has no file name: {0}")]
    InvalidImageUrl(String),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// How a record was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Read from an existing `info.json`.
    Hit,
    /// Fetched from the source and persisted.
    Fetched,
}

/// A record together with where it came from.
#[derive(Debug, Clone)]
pub struct CacheOutcome {
    pub record: ComicRecord,
    pub status: CacheStatus,
}

/// Return the record of comic `id` stored in `dir`, fetching and persisting
/// it first if it is not cached.
pub fn get_or_fetch(
    dir: &Path,
    id: u32,
    source: &dyn ComicSource,
) -> Result<CacheOutcome, CacheError> {
    match fs::metadata(dir) {
        Ok(_) => {
            if let Some(record) = read_cached(dir)? {
                debug!(id, dir = %dir.display(), "cache hit");
                return Ok(CacheOutcome {
                    record,
                    status: CacheStatus::Hit,
                });
            }
            debug!(id, dir = %dir.display(), "directory without info.json, refetching");
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(id, dir = %dir.display(), "cache miss");
        }
        Err(e) => return Err(e.into()),
    }

    let record = fetch_into(dir, id, source)?;
    Ok(CacheOutcome {
        record,
        status: CacheStatus::Fetched,
    })
}

/// Read `dir/info.json`. Returns `Ok(None)` if the file does not exist.
pub fn read_cached(dir: &Path) -> Result<Option<ComicRecord>, CacheError> {
    let path = dir.join(INFO_FILENAME);
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    ComicRecord::from_slice(&bytes)
        .map(Some)
        .map_err(|source| CacheError::Corrupt { path, source })
}

/// Fetch comic `id` (and its image, if any) into `dir`.
fn fetch_into(dir: &Path, id: u32, source: &dyn ComicSource) -> Result<ComicRecord, CacheError> {
    create_dir(dir)?;

    let mut record = source.fetch_metadata(id)?;

    if let Some(url) = record.image_url().map(str::to_string) {
        let file_name = image_file_name(&url)
            .ok_or_else(|| CacheError::InvalidImageUrl(url.clone()))?
            .to_string();
        let bytes = source.fetch_image(&url)?;
        fs::write(dir.join(&file_name), bytes)?;
        record.set_local_image(&file_name);
    } else {
        debug!(id, "comic has no image");
    }

    write_info(dir, &record)?;
    Ok(record)
}

/// Write `info.json` via a temporary file so it is never left half-written.
fn write_info(dir: &Path, record: &ComicRecord) -> Result<(), CacheError> {
    let json = record.to_pretty_json()?;
    let partial = dir.join(INFO_PARTIAL_FILENAME);
    fs::write(&partial, json)?;
    fs::rename(&partial, dir.join(INFO_FILENAME))?;
    Ok(())
}

/// File name of an image: the URL's last path segment, kept as-is.
///
/// Returns `None` for URLs ending in `/` and for `.`/`..` segments, which
/// would escape the comic directory.
pub fn image_file_name(url: &str) -> Option<&str> {
    let name = url.rsplit('/').next()?;
    match name {
        "" | "." | ".." => None,
        _ => Some(name),
    }
}

/// Create `path` and its parents with [`DIR_MODE`].
pub fn create_dir(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(path)
}

/// Summary of cache behaviour for an archive run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub fetches: u32,
}

impl CacheStats {
    pub fn record(&mut self, status: CacheStatus) {
        match status {
            CacheStatus::Hit => self.hits += 1,
            CacheStatus::Fetched => self.fetches += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.hits + self.fetches
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} fetched ({} total)",
                self.hits,
                self.fetches,
                self.total()
            )
        } else {
            write!(f, "{} fetched", self.fetches)
        }
    }
}
