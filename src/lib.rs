//! # xkcd-archive
//!
//! An incremental local archiver for [xkcd](https://xkcd.com). It mirrors
//! every comic's metadata and image into a plain directory tree and renders
//! a static HTML viewer on top of it.
//!
//! # Architecture: Fetch, Cache, Render
//!
//! ```text
//! 1. Resolve   info.0.json        →  range of comic IDs
//! 2. Archive   <id>/info.0.json   →  <out>/<id>/info.json + image   (skipped when cached)
//! 3. Render    records            →  <out>/index.html, <out>/<id>/index.html
//! ```
//!
//! The filesystem is the only state. A comic whose directory already holds
//! an `info.json` is never fetched again, so an interrupted or failed run is
//! resumed simply by running the same command again.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`record`] | Open JSON mapping for a comic's metadata, typed accessors for known keys |
//! | [`source`] | Blocking client for the xkcd JSON API, high-resolution image fallback |
//! | [`cache`] | Per-comic directory layout; read from disk or fetch and persist |
//! | [`archive`] | Walks the ID range, skips 404, builds the newest-first index |
//! | [`site`] | Renders comic and index pages with Maud, writes bundled assets |
//! | [`config`] | Optional TOML configuration layered over stock defaults |
//! | [`output`] | CLI output formatting of progress events and the run summary |
//!
//! # Design Decisions
//!
//! ## Open Records
//!
//! The API's JSON schema has grown over time and will keep growing. Records
//! are kept as ordered string-to-JSON maps, so `info.json` mirrors exactly
//! what the API served (apart from the local image path) and nothing is lost
//! when a new key appears.
//!
//! ## Fail Fast, Resume Cheaply
//!
//! There is no retry loop. The first network, decode or filesystem error
//! ends the run with a non-zero exit status. Since completed comics are
//! already on disk, re-running costs one request for the latest ID plus
//! whatever was left.
//!
//! ## Sequential by Design
//!
//! Comics are fetched one at a time. The archive is a few thousand small
//! requests against a volunteer-run site; throughput is not the goal.

pub mod archive;
pub mod cache;
pub mod config;
pub mod output;
pub mod record;
pub mod site;
pub mod source;

#[cfg(test)]
pub(crate) mod test_helpers;
