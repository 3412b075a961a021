//! Batch apply on every backend: adds, updates and mixed sets.

use crate::common::*;

#[test]
fn add_then_read_back() {
    for db in all_stores() {
        let row = unique_row("add");
        let mut doc = counter(&row, "c1", 1);
        insert(&db, &mut doc);

        let (reference, data) = db.get(&row, "c1").unwrap();
        assert_eq!(reference.version, 0, "{}", db.backend_name());
        assert_eq!(data, br#"{"n":1}"#);
        assert_eq!(doc.version(), 0);
    }
}

#[test]
fn update_advances_held_version() {
    for db in all_stores() {
        let mut doc = counter("r1", "c1", 1);
        insert(&db, &mut doc);

        doc.model.n = 2;
        update(&db, &mut doc).unwrap();

        assert_eq!(doc.version(), 1);
        let (reference, data) = db.get("r1", "c1").unwrap();
        assert_eq!(reference.version, 1);
        assert_eq!(data, br#"{"n":2}"#);
        assert!(reference.updated_at >= reference.created_at);
        assert_eq!(doc.reference.updated_at, reference.updated_at);
    }
}

#[test]
fn repeated_updates_count_up() {
    for db in all_stores() {
        let mut doc = counter("r1", "c1", 0);
        insert(&db, &mut doc);

        for i in 1..=5 {
            doc.model.n = i;
            update(&db, &mut doc).unwrap();
            assert_eq!(doc.version(), i as u64);
        }

        let loaded: CounterEntity = db.load("r1", "c1").unwrap();
        assert_eq!(loaded.version(), 5);
        assert_eq!(loaded.model.n, 5);
    }
}

#[test]
fn mixed_batch_applies_adds_and_updates() {
    for db in all_stores() {
        let mut a = counter("r1", "a", 1);
        let mut b = counter("r1", "b", 1);
        let mut c = counter("r1", "c", 1);
        {
            let mut batch = Batch::new();
            batch.add(&mut a).add(&mut b).add(&mut c);
            db.apply_changes(&mut batch).unwrap();
        }

        let mut d = counter("r2", "a", 10);
        let mut e = counter("r2", "b", 20);
        a.model.n = 2;
        b.model.n = 2;
        c.model.n = 2;
        {
            let mut batch = Batch::new();
            batch.add(&mut d).add(&mut e);
            batch.update(&mut a).update(&mut b).update(&mut c);
            assert_eq!(batch.add_count(), 2);
            assert_eq!(batch.update_count(), 3);
            db.apply_changes(&mut batch).unwrap();
        }

        for (row, column, version, n) in [
            ("r1", "a", 1, 2),
            ("r1", "b", 1, 2),
            ("r1", "c", 1, 2),
            ("r2", "a", 0, 10),
            ("r2", "b", 0, 20),
        ] {
            let loaded: CounterEntity = db.load(row, column).unwrap();
            assert_eq!(loaded.version(), version, "{}/{}", row, column);
            assert_eq!(loaded.model.n, n, "{}/{}", row, column);
        }
    }
}

#[test]
fn empty_batch_is_noop() {
    for db in all_stores() {
        let mut batch = Batch::new();
        db.apply_changes(&mut batch).unwrap();
        assert!(db.get("r1", "c1").unwrap_err().is_not_found());
    }
}

#[test]
fn load_missing_cell() {
    for db in all_stores() {
        let err = db.load::<JsonModel<Counter>>("nope", "c1").unwrap_err();
        assert!(err.is_not_found());
    }
}

#[test]
fn load_binds_reference() {
    for db in all_stores() {
        insert(&db, &mut counter("r1", "c1", 7));

        let loaded: CounterEntity = db.load("r1", "c1").unwrap();
        assert_eq!(loaded.reference.row_id, "r1");
        assert_eq!(loaded.reference.column_name, "c1");
        assert_eq!(loaded.model.n, 7);
    }
}
