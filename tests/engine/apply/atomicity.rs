//! A failing batch leaves neither store state nor held versions changed.

use crate::common::*;
use proptest::prelude::*;

#[test]
fn marshal_failure_leaves_cell_absent() {
    for db in all_stores() {
        let mut bad = Entity::new("r1", "bad", Unencodable);
        let mut good = counter("r1", "good", 1);

        let mut batch = Batch::new();
        batch.add(&mut good).add(&mut bad);
        let err = db.apply_changes(&mut batch).unwrap_err();

        assert!(matches!(err, Error::Marshal(_)), "{:?}", err);
        assert!(db.get("r1", "bad").unwrap_err().is_not_found());
        assert!(db.get("r1", "good").unwrap_err().is_not_found());
    }
}

#[test]
fn add_must_start_at_version_zero() {
    for db in all_stores() {
        let mut fresh = counter("r1", "fresh", 1);
        let mut ahead = counter("r1", "ahead", 1);
        ahead.reference.version = u64::MAX;

        let err = {
            let mut batch = Batch::new();
            batch.add(&mut fresh).add(&mut ahead);
            db.apply_changes(&mut batch).unwrap_err()
        };

        assert!(err.is_serious(), "{}: {:?}", db.backend_name(), err);
        assert_eq!(snapshot(&db, "r1", "fresh"), None);
        assert_eq!(snapshot(&db, "r1", "ahead"), None);

        // A correctly versioned retry goes through and can be updated.
        ahead.reference.version = 0;
        insert(&db, &mut ahead);
        ahead.model.n = 2;
        update(&db, &mut ahead).unwrap();
        assert_eq!(ahead.version(), 1);
    }
}

#[test]
fn failed_batch_rolls_back_earlier_updates() {
    for db in all_stores() {
        let mut a = counter("r1", "a", 1);
        let mut b = counter("r1", "b", 1);
        insert(&db, &mut a);
        insert(&db, &mut b);

        // Move b ahead so the held copy below is stale.
        let mut b_stale = b.clone();
        b.model.n = 5;
        update(&db, &mut b).unwrap();

        let before_a = snapshot(&db, "r1", "a");
        let before_b = snapshot(&db, "r1", "b");

        a.model.n = 2;
        b_stale.model.n = 2;
        let mut added = counter("r1", "new", 1);
        let err = {
            let mut batch = Batch::new();
            batch.add(&mut added);
            batch.update(&mut a).update(&mut b_stale);
            db.apply_changes(&mut batch).unwrap_err()
        };

        assert!(err.is_conflict());
        assert_eq!(snapshot(&db, "r1", "a"), before_a);
        assert_eq!(snapshot(&db, "r1", "b"), before_b);
        assert_eq!(snapshot(&db, "r1", "new"), None);

        // Held versions are untouched, so the caller can retry as-is.
        assert_eq!(a.version(), 0);
        assert_eq!(b_stale.version(), 0);
        let mut batch = Batch::new();
        batch.update(&mut a);
        db.apply_changes(&mut batch).unwrap();
        drop(batch);
        assert_eq!(a.version(), 1);
    }
}

#[test]
fn duplicate_in_batch_discards_everything() {
    for db in all_stores() {
        let mut existing = counter("r1", "c1", 1);
        insert(&db, &mut existing);

        let mut fresh = counter("r2", "c1", 1);
        let mut clash = counter("r1", "c1", 2);
        existing.model.n = 3;
        let err = {
            let mut batch = Batch::new();
            batch.add(&mut fresh).add(&mut clash);
            batch.update(&mut existing);
            db.apply_changes(&mut batch).unwrap_err()
        };

        assert!(err.is_duplicate_key());
        assert_eq!(existing.version(), 0);
        assert_eq!(snapshot(&db, "r2", "c1"), None);
        assert_eq!(snapshot(&db, "r1", "c1"), Some((0, br#"{"n":1}"#.to_vec())));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Whatever mix of fresh and stale updates is applied, the store either
    /// takes all of them or none of them.
    #[test]
    fn all_or_nothing(stale in proptest::collection::vec(any::<bool>(), 1..6)) {
        let db = CellStore::ephemeral().unwrap();

        let mut held: Vec<CounterEntity> = Vec::new();
        for (i, is_stale) in stale.iter().enumerate() {
            let mut doc = counter("row", &format!("c{}", i), 0);
            insert(&db, &mut doc);
            if *is_stale {
                let mut ahead = doc.clone();
                ahead.model.n = -1;
                update(&db, &mut ahead).unwrap();
            }
            held.push(doc);
        }

        let before: Vec<_> = (0..held.len())
            .map(|i| snapshot(&db, "row", &format!("c{}", i)))
            .collect();

        let result = {
            let mut batch = Batch::new();
            for doc in held.iter_mut() {
                doc.model.n = 100;
                batch.update(doc);
            }
            db.apply_changes(&mut batch)
        };

        let after: Vec<_> = (0..held.len())
            .map(|i| snapshot(&db, "row", &format!("c{}", i)))
            .collect();

        if stale.iter().any(|s| *s) {
            prop_assert!(result.unwrap_err().is_conflict());
            prop_assert_eq!(before, after);
            prop_assert!(held.iter().all(|d| d.version() == 0));
        } else {
            prop_assert!(result.is_ok());
            prop_assert!(held.iter().all(|d| d.version() == 1));
            prop_assert!(after.iter().all(|s| s.as_ref().map(|(v, _)| *v) == Some(1)));
        }
    }
}
