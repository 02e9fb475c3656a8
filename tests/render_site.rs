//! End-to-end runs against a site laid out on disk.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tempfile::{tempdir, TempDir};

use horse::enhance::FixedClock;
use horse::events::COMPONENT_LOADED;
use horse::fetch::FsFetcher;
use horse::store::{KeyValueStore, MemoryStore, SqliteStore};
use horse::{Config, Enhancer, Page};

const INDEX: &str = r#"<!DOCTYPE html>
<html><head><title>Horse</title></head>
<body>
<div data-component="header"></div>
<p>You are visitor <span class="visitor-counter">0000000</span></p>
<p>&copy; <span data-year></span></p>
<div data-component="missing">still here</div>
</body></html>"#;

const ABOUT: &str = r#"<html><body>
<div data-component="header"></div>
<img src="../assets/horse.gif" data-tooltip="neigh">
</body></html>"#;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn site(with_cursor: bool) -> TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "index.html", INDEX);
    write(root, "pages/about.html", ABOUT);
    write(root, "components/header.html", "<nav><a href=\"/\">home</a></nav>");
    if with_cursor {
        write(root, "assets/cursors/default.cur", "CUR");
    }
    dir
}

fn enhancer(page_path: &Path, store: Arc<dyn KeyValueStore>) -> Enhancer {
    Enhancer::new(Config::default(), Arc::new(FsFetcher::new(page_path)), store).with_clock(
        Arc::new(FixedClock(NaiveDate::from_ymd_opt(2003, 9, 12).unwrap())),
    )
}

#[tokio::test]
async fn test_index_page_from_disk() {
    let dir = site(true);
    let path = dir.path().join("index.html");
    let store = Arc::new(MemoryStore::new().with_value("horse_visitors", "41"));
    let mut page = Page::parse("/index.html", &fs::read_to_string(&path).unwrap());

    let report = enhancer(&path, store.clone()).run(&mut page).await;

    assert_eq!(report.components.loaded, vec!["header".to_string()]);
    assert_eq!(report.components.failed.len(), 1);
    assert_eq!(report.components.failed[0].name, "missing");
    assert_eq!(report.counters, 1);
    assert_eq!(report.years, 1);
    assert!(report.cursor.is_some());

    let html = page.html();
    assert!(html.contains("<nav><a href=\"/\">home</a></nav>"));
    assert!(html.contains(">0000042</span>"));
    assert!(html.contains("<span data-year=\"\">2003</span>"));
    assert!(html.contains(">still here</div>"));
    assert!(html.contains("assets/cursors/default.cur), auto"));
    assert_eq!(store.get("horse_visitors").unwrap().as_deref(), Some("42"));
}

#[tokio::test]
async fn test_subdirectory_page_reaches_root_components() {
    let dir = site(false);
    let path = dir.path().join("pages/about.html");
    let mut page = Page::parse("/pages/about.html", &fs::read_to_string(&path).unwrap());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let body = page.document.query_all("body").unwrap()[0];
    let sink = Arc::clone(&seen);
    page.events.on(body, COMPONENT_LOADED, move |d| {
        let name = d.event.detail_str("name").unwrap_or_default().to_string();
        let html = d.document.inner_html(d.event.target);
        sink.lock().unwrap().push((name, html));
    });

    let report = enhancer(&path, Arc::new(MemoryStore::new()))
        .run(&mut page)
        .await;

    assert_eq!(report.components.loaded, vec!["header".to_string()]);
    assert_eq!(report.cursor, None);
    assert_eq!(report.tooltips, 1);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "header");
    assert!(seen[0].1.contains("<nav>"));

    let html = page.html();
    assert!(html.contains("title=\"neigh\""));
    assert!(!html.contains("cursor:"));
}

#[tokio::test]
async fn test_counter_persists_across_runs() {
    let dir = site(false);
    let path = dir.path().join("index.html");
    let db = dir.path().join("state/horse.db");

    let first = {
        let store = Arc::new(SqliteStore::open(&db).unwrap());
        let mut page = Page::parse("/index.html", INDEX);
        enhancer(&path, store).run(&mut page).await;
        SqliteStore::open(&db)
            .unwrap()
            .get("horse_visitors")
            .unwrap()
            .unwrap()
            .parse::<u64>()
            .unwrap()
    };
    assert!((4828..=5027).contains(&first));

    let store = Arc::new(SqliteStore::open(&db).unwrap());
    let mut page = Page::parse("/index.html", INDEX);
    enhancer(&path, store).run(&mut page).await;

    assert!(page.html().contains(&format!(">{:07}</span>", first + 1)));
}
