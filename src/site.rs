//! Static HTML generation for the archive.
//!
//! ## Generated Pages
//!
//! - **Index page** (`/index.html`): every comic archived in this run, newest first
//! - **Comic pages** (`/{id}/index.html`): title, image, hover text and
//!   First / Prev / Home / Next / Last navigation
//!
//! ## Output Structure
//!
//! ```text
//! archive/
//! ├── index.html
//! ├── styles.css                 # bundled
//! ├── favicon.ico                # bundled
//! ├── 1/
//! │   ├── index.html
//! │   ├── info.json
//! │   └── barrel_cropped_(1).jpg
//! └── ...
//! ```
//!
//! Every link is relative, so the archive can be opened straight from disk
//! or served from any path.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! All interpolated comic metadata is escaped.

use crate::archive::{ArchiveEntry, ArchiveIndex, MISSING_ID, comic_dir_name};
use crate::config::{self, ArchiveConfig};
use crate::record::RecordError;
use maud::{DOCTYPE, Markup, html};
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("comic {id}: {source}")]
    Record {
        id: u32,
        #[source]
        source: RecordError,
    },
    #[error("unknown asset: {0}")]
    UnknownAsset(String),
}

const STYLES_CSS: &[u8] = include_bytes!("../assets/styles.css");
const FAVICON: &[u8] = include_bytes!("../assets/favicon.ico");

/// Bundled files copied to the root of the archive.
pub const ASSETS: [&str; 2] = ["styles.css", "favicon.ico"];

/// Write every comic page and the index page. Returns the number of pages.
pub fn write_site(
    output_dir: &Path,
    index: &ArchiveIndex,
    latest: u32,
    config: &ArchiveConfig,
) -> Result<usize, SiteError> {
    fs::create_dir_all(output_dir)?;

    for entry in index.entries() {
        let dir = output_dir.join(comic_dir_name(entry.id, config.archive.pad_width));
        fs::create_dir_all(&dir)?;
        let page = render_comic_page(entry, latest, config)?;
        fs::write(dir.join("index.html"), page.into_string())?;
    }

    let home = render_index(index, config)?;
    fs::write(output_dir.join("index.html"), home.into_string())?;

    Ok(index.len() + 1)
}

/// Write the bundled asset `name` into `output_dir`.
pub fn copy_asset(output_dir: &Path, name: &str) -> Result<(), SiteError> {
    let bytes = match name {
        "styles.css" => STYLES_CSS,
        "favicon.ico" => FAVICON,
        _ => return Err(SiteError::UnknownAsset(name.to_string())),
    };
    fs::write(output_dir.join(name), bytes)?;
    Ok(())
}

// ============================================================================
// Navigation
// ============================================================================

/// The comic before `id`, stepping over 404.
pub fn prev_id(id: u32) -> Option<u32> {
    match id {
        0 | 1 => None,
        _ if id - 1 == MISSING_ID => Some(MISSING_ID - 1),
        _ => Some(id - 1),
    }
}

/// The comic after `id`, stepping over 404, if it exists yet.
pub fn next_id(id: u32, latest: u32) -> Option<u32> {
    let next = if id + 1 == MISSING_ID { id + 2 } else { id + 1 };
    (next <= latest).then_some(next)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure.
///
/// `root` is the relative path from the page back to the archive root.
fn base_document(title: &str, root: &str, config: &ArchiveConfig, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="icon" href={ (root) "favicon.ico" };
                link rel="stylesheet" href={ (root) "styles.css" };
                style { (config::generate_color_css(&config.colors)) }
            }
            body {
                (content)
            }
        }
    }
}

fn nav_link(label: &str, target: Option<u32>, pad_width: usize) -> Markup {
    html! {
        @if let Some(id) = target {
            a.nav-link href={ "../" (comic_dir_name(id, pad_width)) "/index.html" } { (label) }
        } @else {
            span.nav-link.disabled { (label) }
        }
    }
}

fn comic_nav(id: u32, latest: u32, pad_width: usize) -> Markup {
    let first = (id > 1).then_some(1);
    let last = (id < latest).then_some(latest);
    html! {
        nav.comic-nav {
            (nav_link("|< First", first, pad_width))
            (nav_link("< Prev", prev_id(id), pad_width))
            a.nav-link href="../index.html" { "Home" }
            (nav_link("Next >", next_id(id, latest), pad_width))
            (nav_link("Last >|", last, pad_width))
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the page of a single comic.
pub fn render_comic_page(
    entry: &ArchiveEntry,
    latest: u32,
    config: &ArchiveConfig,
) -> Result<Markup, SiteError> {
    let id = entry.id;
    let record = &entry.record;
    let field_error = |source| SiteError::Record { id, source };
    let title = record.title().map_err(field_error)?;
    let alt = record.alt().map_err(field_error)?;
    let transcript = record
        .get("transcript")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty());
    let original = format!("https://xkcd.com/{id}/");
    let nav = comic_nav(id, latest, config.archive.pad_width);

    let content = html! {
        main.comic-page {
            h1 {
                (title) " "
                span.comic-num { "#" (id) }
            }
            (nav)
            figure.comic {
                @if let Some(src) = record.image_path().filter(|_| record.has_local_image()) {
                    img src=(src) alt=(title) title=(alt);
                } @else {
                    p.no-image {
                        "This comic has no image. See it at "
                        a href=(original) { (original) }
                    }
                }
                @if !alt.is_empty() {
                    figcaption { (alt) }
                }
            }
            (nav)
            @if let Some(text) = transcript {
                details.transcript {
                    summary { "Transcript" }
                    pre { (text) }
                }
            }
            p.source {
                a href=(original) { "Original" }
            }
        }
    };

    let page_title = format!("{} - {} | {}", id, title, config.site.title);
    Ok(base_document(&page_title, "../", config, content))
}

/// Renders the index page, one entry per comic in index order.
pub fn render_index(index: &ArchiveIndex, config: &ArchiveConfig) -> Result<Markup, SiteError> {
    let mut items = Vec::with_capacity(index.len());
    for entry in index.entries() {
        let title = entry
            .record
            .title()
            .map_err(|source| SiteError::Record { id: entry.id, source })?;
        items.push((entry.id, title));
    }

    let pad_width = config.archive.pad_width;
    let content = html! {
        main.index-page {
            h1 { (config.site.title) }
            @if items.is_empty() {
                p.empty { "No comics archived yet." }
            } @else {
                ol.comic-list reversed {
                    @for (id, title) in &items {
                        li value=(id) {
                            a href={ "./" (comic_dir_name(*id, pad_width)) "/index.html" } {
                                span.comic-num { (id) }
                                " " (title)
                            }
                        }
                    }
                }
            }
        }
    };

    Ok(base_document(&config.site.title, "./", config, content))
}

// ============================================================================
// Tests
// ============================================================================
