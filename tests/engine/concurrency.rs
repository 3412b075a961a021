//! Concurrent writers racing on the same held version.

use crate::common::*;
use parking_lot::Mutex;
use std::sync::{Arc, Barrier};
use std::thread;

/// Spawn `writers` threads that each update a copy of `doc` at the same
/// version. Returns how many succeeded and how many hit a conflict.
fn race(db: &CellStore, doc: &CounterEntity, writers: usize) -> (usize, usize) {
    let barrier = Arc::new(Barrier::new(writers));
    let results = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..writers)
        .map(|i| {
            let db = db.clone();
            let barrier = Arc::clone(&barrier);
            let results = Arc::clone(&results);
            let mut copy = doc.clone();
            thread::spawn(move || {
                copy.model.n = i as i64 + 1;
                barrier.wait();
                let result = update(&db, &mut copy);
                results.lock().push(result);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let results = results.lock();
    let ok = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.is_conflict()))
        .count();
    (ok, conflicts)
}

#[test]
fn same_version_exactly_one_winner_memory() {
    let db = CellStore::ephemeral().unwrap();
    let mut doc = counter("r1", "c1", 0);
    insert(&db, &mut doc);

    let (ok, conflicts) = race(&db, &doc, 8);

    assert_eq!(ok, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(db.get("r1", "c1").unwrap().0.version, 1);
}

#[test]
fn independent_cells_all_commit() {
    let db = CellStore::ephemeral().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let db = db.clone();
            thread::spawn(move || {
                let mut doc = counter("row", &format!("c{}", i), 0);
                insert(&db, &mut doc);
                for n in 1..=10 {
                    doc.model.n = n;
                    update(&db, &mut doc).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for i in 0..8 {
        let doc: CounterEntity = db.load("row", &format!("c{}", i)).unwrap();
        assert_eq!(doc.version(), 10);
        assert_eq!(doc.model.n, 10);
    }
}

#[cfg(feature = "sqlite")]
#[test]
fn same_version_exactly_one_winner_sqlite_file() {
    use std::time::Duration;

    let dir = tempfile::tempdir().unwrap();
    let db = CellStore::builder()
        .path(dir.path().join("race.db"))
        .pool_size(4)
        .busy_timeout(Duration::from_secs(5))
        .open()
        .unwrap();
    let mut doc = counter("r1", "c1", 0);
    insert(&db, &mut doc);

    let (ok, conflicts) = race(&db, &doc, 4);

    assert_eq!(ok, 1);
    assert_eq!(conflicts, 3);
    let loaded: CounterEntity = db.load("r1", "c1").unwrap();
    assert_eq!(loaded.version(), 1);
}

#[test]
fn retry_loop_converges() {
    let db = CellStore::ephemeral().unwrap();
    insert(&db, &mut counter("hits", "total", 0));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let db = db.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    loop {
                        let mut doc: CounterEntity = db.load("hits", "total").unwrap();
                        doc.model.n += 1;
                        match update(&db, &mut doc) {
                            Ok(()) => break,
                            Err(e) if e.is_retryable() => continue,
                            Err(e) => panic!("unexpected error: {}", e),
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let doc: CounterEntity = db.load("hits", "total").unwrap();
    assert_eq!(doc.model.n, 100);
    assert_eq!(doc.version(), 100);
}
