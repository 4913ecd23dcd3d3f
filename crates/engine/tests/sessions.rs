use std::{sync::Arc, thread};

use chrono::{DateTime, TimeDelta, Utc};
use engine::{EPSILON, EngineError, Ledger, SessionStore, Snapshot, Transaction};

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn populated_store() -> SessionStore<Ledger> {
    let store = SessionStore::new(120);
    for (chat, extra) in [(-100_i64, 0.0), (7, 1.5), (42, 10.0 / 3.0)] {
        let ledger = store.get_or_create(chat, Ledger::new);
        ledger
            .add_expense("@alice", names(&["@bob", "@carol"]), 30.0 + extra)
            .unwrap();
        let removed = ledger
            .add_expense("@bob", names(&["@alice"]), 12.0)
            .unwrap();
        ledger
            .add_expense("@carol", names(&["@bob", "@bob", "@alice"]), 10.0)
            .unwrap();
        ledger.remove_expense(removed);
    }
    store
}

#[test]
fn snapshot_round_trip_preserves_balances_and_expiry() {
    let store = populated_store();
    let blob = store.export_snapshot().unwrap();

    let restored = SessionStore::<Ledger>::new(1);
    assert_eq!(restored.import_snapshot(&blob).unwrap(), 3);
    assert_eq!(restored.ids(), store.ids());

    for chat in store.ids() {
        let original = store.get(chat).unwrap();
        let copy = restored.get(chat).unwrap();

        let original_balances = original.list_balances();
        let copy_balances = copy.list_balances();
        assert_eq!(
            original_balances.keys().collect::<Vec<_>>(),
            copy_balances.keys().collect::<Vec<_>>()
        );
        for (name, balance) in &original_balances {
            assert!((copy_balances[name] - balance).abs() <= EPSILON);
        }

        let ids: Vec<_> = copy.list_expenses().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![1, 2]);

        let expected = store.expire_at(chat).unwrap().timestamp();
        assert_eq!(restored.expire_at(chat).unwrap().timestamp(), expected);
    }
}

#[test]
fn export_follows_documented_layout() {
    let store = SessionStore::new(1);
    store
        .get_or_create_at(5, at(1_000), Ledger::new)
        .add_expense("@alice", names(&["@bob"]), 2.5)
        .unwrap();

    let blob = store.export_snapshot().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&blob).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "sessions": [{
                "id": 5,
                "expire": 1_000 + 86_400,
                "transactions": [
                    { "payer": "@alice", "participants": ["@bob"], "amount": 2.5 }
                ]
            }]
        })
    );
}

#[test]
fn export_is_stable() {
    let store = populated_store();
    assert_eq!(
        store.export_snapshot().unwrap(),
        store.export_snapshot().unwrap()
    );
}

#[test]
fn empty_store_round_trip_is_a_no_op() {
    let store = SessionStore::<Ledger>::new(1);
    let blob = store.export_snapshot().unwrap();
    let snapshot = Snapshot::<Transaction>::decode(&blob).unwrap();
    assert!(snapshot.sessions.is_empty());

    let target = populated_store();
    assert_eq!(target.import_snapshot(&blob).unwrap(), 0);
    assert_eq!(target.import_snapshot(b"").unwrap(), 0);
    assert_eq!(target.import_snapshot(b"{}").unwrap(), 0);
    assert_eq!(target.len(), 3);
}

#[test]
fn failed_import_leaves_store_untouched() {
    let store = populated_store();
    let before = store.export_snapshot().unwrap();

    let empty_participants = br#"{"sessions":[
        {"id":1,"expire":10,"transactions":[{"payer":"a","participants":["b"],"amount":1.0}]},
        {"id":7,"expire":10,"transactions":[{"payer":"a","participants":[],"amount":1.0}]}
    ]}"#;
    assert!(matches!(
        store.import_snapshot(empty_participants),
        Err(EngineError::InvalidSnapshot(_))
    ));

    let duplicated = br#"{"sessions":[{"id":1,"expire":10},{"id":1,"expire":20}]}"#;
    assert!(matches!(
        store.import_snapshot(duplicated),
        Err(EngineError::InvalidSnapshot(_))
    ));

    let bad_expire = br#"{"sessions":[{"id":1,"expire":9223372036854775807}]}"#;
    assert!(matches!(
        store.import_snapshot(bad_expire),
        Err(EngineError::InvalidSnapshot(_))
    ));

    assert!(matches!(
        store.import_snapshot(b"{\"sessions\":[{\"id\":\"x\"}]}"),
        Err(EngineError::Json(_))
    ));

    assert!(store.get(1).is_none());
    assert_eq!(store.export_snapshot().unwrap(), before);
}

#[test]
fn import_replaces_existing_sessions_and_keeps_persisted_expiry() {
    let store = SessionStore::<Ledger>::new(30);
    let stale = store.get_or_create(1, Ledger::new);
    stale.add_expense("x", names(&["y"]), 99.0).unwrap();

    let blob = br#"{"sessions":[
        {"id":1,"expire":100,"transactions":[{"payer":"a","participants":["b"],"amount":4.0}]}
    ]}"#;
    store.import_snapshot(blob).unwrap();

    let ledger = store.get(1).unwrap();
    assert!(!Arc::ptr_eq(&ledger, &stale));
    assert_eq!(ledger.list_balances()["a"], 4.0);
    assert_eq!(store.expire_at(1), Some(at(100)));

    // Restored already expired: evicted by the next sweep.
    assert_eq!(store.clean_expired(), vec![1]);
}

#[test]
fn eviction_returns_each_expired_session_once() {
    let store = SessionStore::<Ledger>::new(1);
    let now = at(1_000_000);
    let old = now - TimeDelta::days(2);

    store
        .get_or_create_at(1, old, Ledger::new)
        .add_expense("a", names(&["b"]), 1.0)
        .unwrap();
    store.get_or_create_at(2, old, Ledger::new);
    store.get_or_create_at(3, now, Ledger::new);
    // Touching a session extends it.
    store.get_or_create_at(2, now, Ledger::new);

    assert_eq!(store.clean_expired_at(now), vec![1]);
    assert_eq!(store.clean_expired_at(now), Vec::<i64>::new());
    assert_eq!(store.ids(), vec![2, 3]);

    let fresh = store.get_or_create_at(1, now, Ledger::new);
    assert!(fresh.is_empty());
    assert!(fresh.list_balances().is_empty());
}

#[test]
fn concurrent_get_or_create_shares_one_ledger() {
    let store = Arc::new(SessionStore::<Ledger>::new(1));
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..25 {
                    store
                        .get_or_create(77, Ledger::new)
                        .add_expense(format!("w{worker}"), names(&["w0"]), 1.0)
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 1);
    let ledger = store.get(77).unwrap();
    assert_eq!(ledger.len(), 200);
    let total: f64 = ledger.list_balances().values().sum();
    assert!(total.abs() <= EPSILON);
}
