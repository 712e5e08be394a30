//! CLI output formatting for archive runs.
//!
//! # Comic-First Display
//!
//! Each comic gets one line led by its number and title, followed by where
//! the record came from. Paths are only shown in the final summary.
//!
//! ```text
//! Latest comic is #2990
//! Archiving #1 to #2990
//!    1 Barrel - Part 1                              fetched
//!    2 Petit Trees (sketch)                         cached
//!  ...
//!  404 (does not exist)                             skipped
//!  ...
//! Rendered 2990 pages
//!
//! Cache: 2985 cached, 4 fetched (2989 total)
//! Archive: ./xkcd
//! ```
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` and are pure, no I/O. The CLI
//! prints them as events arrive from the archive driver.

use crate::archive::{ArchiveEvent, ArchiveResult};
use crate::cache::CacheStatus;
use std::path::Path;

/// Column at which the status word starts, after number and title.
const TITLE_WIDTH: usize = 44;

/// Right-align a comic number to four columns.
fn format_num(id: u32) -> String {
    format!("{:>4}", id)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_title(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// One comic line: number, padded title, status word.
fn comic_line(id: u32, title: &str, status: &str) -> String {
    format!(
        "{} {:<width$} {}",
        format_num(id),
        truncate_title(title, TITLE_WIDTH),
        status,
        width = TITLE_WIDTH
    )
}

/// Format a single progress event.
pub fn format_archive_event(event: &ArchiveEvent) -> Vec<String> {
    match event {
        ArchiveEvent::LatestResolved { latest } => {
            vec![format!("Latest comic is #{}", latest)]
        }
        ArchiveEvent::RangeResolved { from, to } if from > to => {
            vec![format!("Nothing to archive (#{} is after #{})", from, to)]
        }
        ArchiveEvent::RangeResolved { from, to } => {
            vec![format!("Archiving #{} to #{}", from, to)]
        }
        ArchiveEvent::Comic { id, title, status } => {
            let status = match status {
                CacheStatus::Hit => "cached",
                CacheStatus::Fetched => "fetched",
            };
            let title = title.as_deref().unwrap_or("(untitled)");
            vec![comic_line(*id, title, status)]
        }
        ArchiveEvent::Skipped { id } => {
            vec![comic_line(*id, "(does not exist)", "skipped")]
        }
        ArchiveEvent::Rendered { pages } => {
            vec![format!("Rendered {} pages", pages)]
        }
    }
}

/// Format the end-of-run summary.
pub fn format_summary(result: &ArchiveResult, output_dir: &Path) -> Vec<String> {
    let mut lines = vec![String::new()];
    if result.index.is_empty() {
        lines.push("No comics archived".to_string());
    } else {
        lines.push(format!("Cache: {}", result.stats));
    }
    lines.push(format!("Archive: {}", output_dir.display()));
    lines
}

/// Print the end-of-run summary to stdout.
pub fn print_summary(result: &ArchiveResult, output_dir: &Path) {
    for line in format_summary(result, output_dir) {
        println!("{}", line);
    }
}
