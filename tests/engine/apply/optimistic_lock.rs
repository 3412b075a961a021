//! Stale writers are rejected instead of overwriting newer data.

use crate::common::*;

#[test]
fn stale_update_is_rejected() {
    for db in all_stores() {
        let mut fresh = counter("r1", "c1", 1);
        insert(&db, &mut fresh);
        let mut stale = fresh.clone();

        fresh.model.n = 2;
        update(&db, &mut fresh).unwrap();

        stale.model.n = 99;
        let err = update(&db, &mut stale).unwrap_err();
        assert!(err.is_conflict(), "{}: {:?}", db.backend_name(), err);
        assert!(err.is_retryable());
        assert_eq!(stale.version(), 0);

        let loaded: CounterEntity = db.load("r1", "c1").unwrap();
        assert_eq!(loaded.version(), 1);
        assert_eq!(loaded.model.n, 2);
    }
}

#[test]
fn retry_after_reload_succeeds() {
    for db in all_stores() {
        let mut fresh = counter("r1", "c1", 1);
        insert(&db, &mut fresh);
        let mut stale = fresh.clone();

        fresh.model.n = 2;
        update(&db, &mut fresh).unwrap();

        stale.model.n = 3;
        assert!(update(&db, &mut stale).unwrap_err().is_retryable());

        let mut reloaded: CounterEntity = db.load("r1", "c1").unwrap();
        reloaded.model.n += 1;
        update(&db, &mut reloaded).unwrap();

        let (reference, data) = db.get("r1", "c1").unwrap();
        assert_eq!(reference.version, 2);
        assert_eq!(data, br#"{"n":3}"#);
    }
}

#[test]
fn update_of_missing_cell_is_conflict() {
    for db in all_stores() {
        let mut ghost = counter("ghost", "c1", 1);
        let err = update(&db, &mut ghost).unwrap_err();
        assert!(err.is_conflict());
        assert!(db.get("ghost", "c1").unwrap_err().is_not_found());
    }
}

#[test]
fn duplicate_add_is_rejected() {
    for db in all_stores() {
        insert(&db, &mut counter("r1", "c1", 1));

        let mut again = counter("r1", "c1", 2);
        let mut batch = Batch::new();
        batch.add(&mut again);
        let err = db.apply_changes(&mut batch).unwrap_err();

        assert!(err.is_duplicate_key(), "{}: {:?}", db.backend_name(), err);
        assert!(!err.is_retryable());
        let (_, data) = db.get("r1", "c1").unwrap();
        assert_eq!(data, br#"{"n":1}"#);
    }
}
