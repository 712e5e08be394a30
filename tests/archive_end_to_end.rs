//! End-to-end archive runs through the public API.
//!
//! Uses the real [`XkcdClient`] over an in-memory transport, so URL
//! construction, JSON decoding, the `_2x` fallback, caching and rendering
//! are all exercised together without touching the network.

use std::collections::HashMap;
use std::fs;
use std::sync::Mutex;

use tempfile::TempDir;
use xkcd_archive::archive::{self, ArchiveOptions};
use xkcd_archive::config::ArchiveConfig;
use xkcd_archive::source::{LATEST_URL, SourceError, Transport, XkcdClient, metadata_url};

/// Serves fixed responses; anything else is a 404.
#[derive(Default)]
struct FakeXkcd {
    responses: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl FakeXkcd {
    fn serve(&mut self, url: &str, body: impl Into<Vec<u8>>) {
        self.responses.insert(url.to_string(), body.into());
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for &FakeXkcd {
    fn get(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| SourceError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Comics 403..=406 as the API serves them: 404 missing, 405 with only a
/// low-resolution image, 406 with both.
fn fake_site() -> FakeXkcd {
    let mut site = FakeXkcd::default();
    site.serve(
        LATEST_URL,
        r#"{"num": 406, "title": "Voting Machines", "img": "https://imgs.xkcd.com/comics/voting_machines.png"}"#,
    );
    site.serve(
        &metadata_url(403),
        r#"{"month": "5", "num": 403, "link": "", "year": "2008", "news": "", "safe_title": "Convincing Pickup Line", "transcript": "", "alt": "Check it out; I've had this stamp for years.", "img": "https://imgs.xkcd.com/comics/convincing_pickup_line.png", "title": "Convincing Pickup Line", "day": "16"}"#,
    );
    site.serve(
        "https://imgs.xkcd.com/comics/convincing_pickup_line_2x.png",
        b"403 large".to_vec(),
    );
    site.serve(
        &metadata_url(405),
        r#"{"num": 405, "safe_title": "Journal 2", "alt": "Secret is out.", "img": "https://imgs.xkcd.com/comics/journal2.png", "title": "Journal 2", "extra_parts": {"links": "/405/"}}"#,
    );
    site.serve(
        "https://imgs.xkcd.com/comics/journal2.png",
        b"405 small".to_vec(),
    );
    site.serve(
        &metadata_url(406),
        r#"{"num": 406, "title": "Voting Machines", "alt": "And that's another one.", "img": "https://imgs.xkcd.com/comics/voting_machines.png"}"#,
    );
    site.serve(
        "https://imgs.xkcd.com/comics/voting_machines_2x.png",
        b"406 large".to_vec(),
    );
    site
}

fn options(from: u32) -> ArchiveOptions {
    ArchiveOptions {
        from: Some(from),
        to: None,
        empty: false,
        skip_html: false,
    }
}

#[test]
fn archives_range_across_404() {
    let tmp = TempDir::new().unwrap();
    let site = fake_site();
    let client = XkcdClient::new(&site);

    let result = archive::run(
        tmp.path(),
        &options(403),
        &client,
        &ArchiveConfig::default(),
        None,
    )
    .unwrap();

    assert_eq!(result.latest, 406);
    assert_eq!(result.index.ids(), vec![406, 405, 403]);
    assert!(
        !site
            .requests()
            .iter()
            .any(|url| url.contains("/404/"))
    );
    assert!(!tmp.path().join("404").exists());
}

#[test]
fn images_are_saved_and_records_rewritten() {
    let tmp = TempDir::new().unwrap();
    let site = fake_site();
    let client = XkcdClient::new(&site);

    archive::run(
        tmp.path(),
        &options(403),
        &client,
        &ArchiveConfig::default(),
        None,
    )
    .unwrap();

    // high resolution preferred, original name kept
    let dir = tmp.path().join("403");
    assert_eq!(
        fs::read(dir.join("convincing_pickup_line.png")).unwrap(),
        b"403 large"
    );
    // fallback to the original when _2x is missing
    assert_eq!(
        fs::read(tmp.path().join("405/journal2.png")).unwrap(),
        b"405 small"
    );

    let info: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.join("info.json")).unwrap()).unwrap();
    assert_eq!(info["img"], "./convincing_pickup_line.png");
    assert_eq!(info["day"], "16");
    assert_eq!(
        info["alt"],
        "Check it out; I've had this stamp for years."
    );

    let extra: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(tmp.path().join("405/info.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(extra["extra_parts"]["links"], "/405/");
}

#[test]
fn rerun_only_asks_for_latest() {
    let tmp = TempDir::new().unwrap();
    let site = fake_site();
    let client = XkcdClient::new(&site);
    let config = ArchiveConfig::default();

    archive::run(tmp.path(), &options(403), &client, &config, None).unwrap();
    let first_run = site.requests().len();
    let info_before = fs::read(tmp.path().join("405/info.json")).unwrap();

    let second = archive::run(tmp.path(), &options(403), &client, &config, None).unwrap();

    let new_requests = &site.requests()[first_run..];
    assert_eq!(new_requests, [LATEST_URL.to_string()]);
    assert_eq!(second.stats.hits, 3);
    assert_eq!(second.stats.fetches, 0);
    assert_eq!(
        fs::read(tmp.path().join("405/info.json")).unwrap(),
        info_before
    );
}

#[test]
fn site_links_newest_first() {
    let tmp = TempDir::new().unwrap();
    let site = fake_site();
    let client = XkcdClient::new(&site);

    let result = archive::run(
        tmp.path(),
        &options(403),
        &client,
        &ArchiveConfig::default(),
        None,
    )
    .unwrap();
    assert_eq!(result.pages, 4);

    let index = fs::read_to_string(tmp.path().join("index.html")).unwrap();
    let pos = |needle: &str| index.find(needle).unwrap();
    assert!(pos("./406/index.html") < pos("./405/index.html"));
    assert!(pos("./405/index.html") < pos("./403/index.html"));

    let page = fs::read_to_string(tmp.path().join("405/index.html")).unwrap();
    assert!(page.contains(r#"href="../403/index.html""#));
    assert!(page.contains(r#"href="../406/index.html""#));
    assert!(page.contains(r#"src="./journal2.png""#));
}

#[test]
fn failed_fetch_stops_the_run() {
    let tmp = TempDir::new().unwrap();
    let mut site = fake_site();
    site.responses.remove(&metadata_url(405));
    let client = XkcdClient::new(&site);

    let err = archive::run(
        tmp.path(),
        &options(403),
        &client,
        &ArchiveConfig::default(),
        None,
    )
    .unwrap_err();

    assert!(err.to_string().contains("unexpected status code 404"));
    assert!(tmp.path().join("403/info.json").exists());
    assert!(!tmp.path().join("406").exists());
    assert!(!tmp.path().join("index.html").exists());
}
