//! Archive driver: walks a range of comic IDs through the cache.
//!
//! ```text
//! Init → ResolvingRange → Iterating(from..=to) → Rendering → Done
//!                                              ↘ Done         (--skip-html)
//! ```
//!
//! Any error ends the run at whatever state it occurs in. Nothing is rolled
//! back: every comic completed before the failure is already on disk and
//! will be a cache hit on the next run.
//!
//! Comic 404 does not exist upstream (the API answers with a real 404), so
//! it is skipped without touching the source or the cache.

use crate::cache::{self, CacheError, CacheStats, CacheStatus};
use crate::config::ArchiveConfig;
use crate::record::ComicRecord;
use crate::site::{self, SiteError};
use crate::source::{ComicSource, SourceError};
use std::fs;
use std::io;
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::info;

/// The one comic number upstream never published.
pub const MISSING_ID: u32 = 404;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("comic {id}: {source}")]
    Cache {
        id: u32,
        #[source]
        source: CacheError,
    },
    #[error("site generation failed: {0}")]
    Site(#[from] SiteError),
}

/// What to archive and what to produce.
#[derive(Debug, Clone, Default)]
pub struct ArchiveOptions {
    /// First comic, `None` (or 0) for the first one ever published.
    pub from: Option<u32>,
    /// Last comic, `None` (or 0) for the latest.
    pub to: Option<u32>,
    /// Delete the output directory before starting.
    pub empty: bool,
    /// Fetch and cache only, write no HTML.
    pub skip_html: bool,
}

/// Progress events emitted while archiving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveEvent {
    LatestResolved { latest: u32 },
    RangeResolved { from: u32, to: u32 },
    Comic {
        id: u32,
        title: Option<String>,
        status: CacheStatus,
    },
    Skipped { id: u32 },
    Rendered { pages: usize },
}

/// One archived comic.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveEntry {
    pub id: u32,
    pub record: ComicRecord,
}

/// Comics archived in one run, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchiveIndex {
    entries: Vec<ArchiveEntry>,
}

impl ArchiveIndex {
    pub fn new(mut entries: Vec<ArchiveEntry>) -> Self {
        entries.sort_by(|a, b| b.id.cmp(&a.id));
        Self { entries }
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn ids(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct ArchiveResult {
    pub index: ArchiveIndex,
    pub latest: u32,
    pub stats: CacheStats,
    /// HTML pages written, 0 with `skip_html`.
    pub pages: usize,
}

/// Directory name of comic `id`, zero-padded to `pad_width` digits.
pub fn comic_dir_name(id: u32, pad_width: usize) -> String {
    format!("{:0width$}", id, width = pad_width)
}

/// Apply the range defaults: `from` = 1, `to` = `latest`. Zero means unset.
/// A `from` past `to` gives an empty range.
pub fn resolve_range(from: Option<u32>, to: Option<u32>, latest: u32) -> RangeInclusive<u32> {
    let from = from.filter(|n| *n > 0).unwrap_or(1);
    let to = to.filter(|n| *n > 0).unwrap_or(latest);
    from..=to
}

/// Archive comics into `output_dir`.
pub fn run(
    output_dir: &Path,
    options: &ArchiveOptions,
    source: &dyn ComicSource,
    config: &ArchiveConfig,
    events: Option<Sender<ArchiveEvent>>,
) -> Result<ArchiveResult, ArchiveError> {
    let emit = |event: ArchiveEvent| {
        if let Some(tx) = &events {
            tx.send(event).ok();
        }
    };

    if options.empty {
        match fs::remove_dir_all(output_dir) {
            Ok(()) => info!(dir = %output_dir.display(), "emptied output directory"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    cache::create_dir(output_dir)?;

    let latest = source.fetch_latest_id()?;
    emit(ArchiveEvent::LatestResolved { latest });

    let range = resolve_range(options.from, options.to, latest);
    info!(from = range.start(), to = range.end(), latest, "resolved comic range");
    emit(ArchiveEvent::RangeResolved {
        from: *range.start(),
        to: *range.end(),
    });

    let mut entries = Vec::new();
    let mut stats = CacheStats::default();

    for id in range {
        if id == MISSING_ID {
            emit(ArchiveEvent::Skipped { id });
            continue;
        }

        let dir = output_dir.join(comic_dir_name(id, config.archive.pad_width));
        let outcome = cache::get_or_fetch(&dir, id, source)
            .map_err(|source| ArchiveError::Cache { id, source })?;

        stats.record(outcome.status);
        emit(ArchiveEvent::Comic {
            id,
            title: outcome.record.title().ok().map(str::to_string),
            status: outcome.status,
        });
        entries.push(ArchiveEntry {
            id,
            record: outcome.record,
        });
    }

    let index = ArchiveIndex::new(entries);

    let mut pages = 0;
    if !options.skip_html {
        pages = site::write_site(output_dir, &index, latest, config)?;
        for asset in site::ASSETS {
            site::copy_asset(output_dir, asset)?;
        }
        emit(ArchiveEvent::Rendered { pages });
    }

    Ok(ArchiveResult {
        index,
        latest,
        stats,
        pages,
    })
}
