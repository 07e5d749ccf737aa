use std::path::PathBuf;

use sitepush::catalog::Catalog;
use sitepush::epoch;

fn temp_db(tag: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("sitepush_epoch_{}_{}.db", tag, chrono::Utc::now().timestamp_millis()));
    path
}

#[test]
fn get_or_create_is_idempotent_until_cleared() {
    let catalog = Catalog::open(temp_db("idempotent")).unwrap();
    let first = epoch::get_or_create_epoch(&catalog).unwrap();
    assert_eq!(first.len(), 19); // YYYY-MM-DD HH:MM:SS
    for _ in 0..3 {
        assert_eq!(epoch::get_or_create_epoch(&catalog).unwrap(), first);
    }
    assert_eq!(epoch::current_epoch(&catalog).unwrap(), Some(first));
}

#[test]
fn epoch_survives_reopen() {
    let db = temp_db("reopen");
    let first = {
        let catalog = Catalog::open(&db).unwrap();
        epoch::get_or_create_epoch(&catalog).unwrap()
    };
    let catalog = Catalog::open(&db).unwrap();
    assert_eq!(epoch::get_or_create_epoch(&catalog).unwrap(), first);
}

#[test]
fn clear_removes_the_epoch() {
    let catalog = Catalog::open(temp_db("clear")).unwrap();
    epoch::get_or_create_epoch(&catalog).unwrap();
    epoch::clear_epoch(&catalog).unwrap();
    assert_eq!(epoch::current_epoch(&catalog).unwrap(), None);
    // clearing again is harmless
    epoch::clear_epoch(&catalog).unwrap();
    // and a new run gets a fresh baseline
    let fresh = epoch::get_or_create_epoch(&catalog).unwrap();
    assert!(!fresh.is_empty());
}

#[test]
fn current_epoch_never_creates() {
    let catalog = Catalog::open(temp_db("readonly")).unwrap();
    assert_eq!(epoch::current_epoch(&catalog).unwrap(), None);
    assert_eq!(epoch::current_epoch(&catalog).unwrap(), None);
}
