// History store behaviour against the on-disk SQLite blob store
use std::sync::Arc;

use color_snap::color::{CapturedColor, ColorValue};
use color_snap::db::{BlobStore, HistoryStore, SqliteBlobStore, HISTORY_KEY, MAX_HISTORY};

fn open_store(dir: &tempfile::TempDir) -> HistoryStore<SqliteBlobStore> {
    let blob = SqliteBlobStore::open(&dir.path().join("color-snap.db")).expect("open sqlite store");
    HistoryStore::new(blob)
}

fn sample(n: usize) -> CapturedColor {
    let v = (n % 256) as u8;
    CapturedColor::capture(ColorValue::from_rgb8(v, 255 - v, v / 2))
}

#[test]
fn save_then_load_returns_most_recent_first() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = open_store(&dir);
    let c1 = sample(1);
    let c2 = sample(2);

    store.save(c1.clone()).expect("save c1");
    store.save(c2.clone()).expect("save c2");

    assert_eq!(store.load(), vec![c2, c1]);
}

#[test]
fn overflow_keeps_the_hundred_most_recent() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = open_store(&dir);
    let records: Vec<CapturedColor> = (0..=MAX_HISTORY).map(sample).collect();
    for record in &records {
        store.save(record.clone()).expect("save");
    }

    let loaded = store.load();
    assert_eq!(loaded.len(), MAX_HISTORY);
    assert!(!loaded.contains(&records[0]));
    let expected: Vec<CapturedColor> = records[1..].iter().rev().cloned().collect();
    assert_eq!(loaded, expected);
}

#[test]
fn history_survives_reopening_the_database() {
    let dir = tempfile::tempdir().expect("temp dir");
    let c1 = sample(42);
    {
        let store = open_store(&dir);
        store.save(c1.clone()).expect("save");
    }

    let reopened = open_store(&dir);
    let loaded = reopened.load();
    assert_eq!(loaded, vec![c1.clone()]);
    assert_eq!(loaded[0].color(), c1.color());
    assert_eq!(loaded[0].picked_at(), c1.picked_at());
}

#[test]
fn remove_missing_id_and_clear() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = open_store(&dir);
    let c1 = sample(1);
    store.save(c1.clone()).expect("save");

    store.remove("missing").expect("remove missing");
    assert_eq!(store.load(), vec![c1.clone()]);

    store.remove(c1.id()).expect("remove existing");
    assert!(store.load().is_empty());

    store.save(sample(2)).expect("save again");
    store.clear().expect("clear");
    assert!(store.load().is_empty());
}

#[test]
fn corrupt_blob_is_treated_as_empty_history() {
    let dir = tempfile::tempdir().expect("temp dir");
    let blob = Arc::new(
        SqliteBlobStore::open(&dir.path().join("color-snap.db")).expect("open sqlite store"),
    );
    blob.set(HISTORY_KEY, b"{\"truncated\":").expect("seed corrupt blob");

    let store = HistoryStore::from_shared(blob);
    assert!(store.load().is_empty());
}
