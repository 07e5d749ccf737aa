use std::path::PathBuf;

use sitepush::catalog::Catalog;

fn temp_db(tag: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("sitepush_test_{}_{}.db", tag, chrono::Utc::now().timestamp_millis()));
    path
}

const EPOCH: &str = "2025-06-01 00:00:00";

fn seeded_catalog(tag: &str) -> (Catalog, PathBuf) {
    let db = temp_db(tag);
    let catalog = Catalog::open(&db).expect("open catalog");
    // a: never transferred, b: transferred before the epoch, c: transferred
    // exactly at the epoch (not strictly older, so not pending)
    catalog.upsert_path("a.html").unwrap();
    catalog.upsert_path("b.html").unwrap();
    catalog.upsert_path("c.html").unwrap();
    catalog.mark_transferred("b.html", "2025-05-31 23:59:59").unwrap();
    catalog.mark_transferred("c.html", EPOCH).unwrap();
    (catalog, db)
}

#[test]
fn upsert_reports_new_paths_only() {
    let catalog = Catalog::open(temp_db("upsert")).unwrap();
    assert!(catalog.upsert_path("index.html").unwrap());
    assert!(!catalog.upsert_path("index.html").unwrap());
    assert_eq!(catalog.count_total().unwrap(), 1);
}

#[test]
fn upsert_keeps_transfer_state() {
    let catalog = Catalog::open(temp_db("rescan")).unwrap();
    catalog.upsert_path("index.html").unwrap();
    catalog.mark_transferred("index.html", EPOCH).unwrap();
    // a re-scan of the same site must not reset what was already uploaded
    catalog.upsert_path("index.html").unwrap();
    assert_eq!(catalog.count_never_transferred().unwrap(), 0);
}

#[test]
fn empty_paths_are_invisible_to_selectors() {
    let catalog = Catalog::open(temp_db("empty_path")).unwrap();
    catalog.upsert_path("").unwrap();
    catalog.upsert_path("real.html").unwrap();
    assert_eq!(catalog.count_total().unwrap(), 1);
    assert_eq!(catalog.count_pending(EPOCH).unwrap(), 1);
    let batch = catalog.select_pending(EPOCH, 10).unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].file_path, "real.html");
}

#[test]
fn pending_filter_matches_null_and_strictly_older() {
    let (catalog, _db) = seeded_catalog("filter");
    let batch = catalog.select_pending(EPOCH, 10).unwrap();
    let paths: Vec<&str> = batch.iter().map(|r| r.file_path.as_str()).collect();
    assert_eq!(paths, vec!["a.html", "b.html"]);
    assert_eq!(catalog.count_pending(EPOCH).unwrap(), 2);
}

#[test]
fn total_counts_all_records_regardless_of_transfer_state() {
    let (catalog, _db) = seeded_catalog("total");
    assert_eq!(catalog.count_total().unwrap(), 3);
    // marking everything transferred must not shrink the denominator
    catalog.mark_transferred("a.html", "2025-06-01 00:00:01").unwrap();
    catalog.mark_transferred("b.html", "2025-06-01 00:00:01").unwrap();
    assert_eq!(catalog.count_total().unwrap(), 3);
    assert_eq!(catalog.count_pending(EPOCH).unwrap(), 0);
}

#[test]
fn select_respects_limit_and_order() {
    let (catalog, _db) = seeded_catalog("limit");
    let batch = catalog.select_pending(EPOCH, 1).unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].file_path, "a.html");
}

#[test]
fn mark_transferred_persists_across_reopen() {
    let (catalog, db) = seeded_catalog("persist");
    assert_eq!(catalog.count_never_transferred().unwrap(), 1);
    catalog.mark_transferred("a.html", "2025-06-01 00:00:01").unwrap();
    drop(catalog);

    let reopened = Catalog::open(&db).unwrap();
    assert_eq!(reopened.count_never_transferred().unwrap(), 0);
    assert_eq!(reopened.count_pending(EPOCH).unwrap(), 1); // only b.html remains stale
}

#[test]
fn clear_transfer_state_resets_every_record() {
    let (catalog, _db) = seeded_catalog("clear");
    catalog.clear_transfer_state().unwrap();
    assert_eq!(catalog.count_never_transferred().unwrap(), 3);
    assert_eq!(catalog.count_pending(EPOCH).unwrap(), 3);
}

#[test]
fn meta_roundtrip() {
    let catalog = Catalog::open(temp_db("meta")).unwrap();
    assert_eq!(catalog.get_meta("k").unwrap(), None);
    catalog.set_meta("k", "v1").unwrap();
    assert_eq!(catalog.get_meta("k").unwrap(), Some("v1".to_string()));
    catalog.set_meta("k", "v2").unwrap();
    assert_eq!(catalog.get_meta("k").unwrap(), Some("v2".to_string()));
    catalog.delete_meta("k").unwrap();
    assert_eq!(catalog.get_meta("k").unwrap(), None);
}
